//! Request types exchanged with the master service.
//!
//! Worker exchanges reuse the data-loader types directly: the request is a
//! `Partition` and the response a `Vec<PredictedResult>`.
//!
//! The master accepts two request shapes on the same port:
//! - `{"categories": [...], "max_results": N}` computes recommendations
//! - `{"feed": "latest"}` returns the most recently published result set,
//!   `{"feed": "watch"}` keeps the connection open and streams every
//!   subsequently published result set as its own frame

use serde::{Deserialize, Serialize};

/// What a client asks the master for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Categories whose ratings feed the matrix
    pub categories: Vec<String>,
    /// Length of the ranked list to return
    pub max_results: usize,
}

impl RecommendationRequest {
    pub fn new(categories: Vec<String>, max_results: usize) -> Self {
        Self {
            categories,
            max_results,
        }
    }
}

/// How a client reads the master's published results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    Latest,
    Watch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRequest {
    pub feed: FeedMode,
}

impl FeedRequest {
    pub fn latest() -> Self {
        Self {
            feed: FeedMode::Latest,
        }
    }

    pub fn watch() -> Self {
        Self {
            feed: FeedMode::Watch,
        }
    }
}

/// Any request the master service understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MasterRequest {
    Recommend(RecommendationRequest),
    Feed(FeedRequest),
}

impl From<RecommendationRequest> for MasterRequest {
    fn from(request: RecommendationRequest) -> Self {
        Self::Recommend(request)
    }
}

impl From<FeedRequest> for MasterRequest {
    fn from(request: FeedRequest) -> Self {
        Self::Feed(request)
    }
}
