use data_loader::DataIndex;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/amazon_reviews_cleaned.csv"));

    println!("Loading ratings from {}...\n", path.display());

    let start = Instant::now();
    let index = DataIndex::load_from_file(&path).expect("Failed to load dataset");
    let load_elapsed = start.elapsed();

    let categories = index.known_categories();
    let start = Instant::now();
    let matrix = index.build_matrix(&categories);
    let matrix_elapsed = start.elapsed();

    let (ratings, products) = index.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", load_elapsed);
    println!("Ratings: {}", ratings);
    println!("Products: {}", products);
    println!("Categories: {}", categories.len());
    println!("Reviewers: {}", matrix.len());
    println!("Matrix build: {:?}", matrix_elapsed);
    println!("\nPerformance: {:.0} ratings/second",
             ratings as f64 / load_elapsed.as_secs_f64());
}
