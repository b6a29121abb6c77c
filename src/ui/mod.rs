/// View builders for the scanner window
///
/// - Result list cards with confidence rendering (results.rs)
/// - Candidate detail view with the price-comparison chart (detail.rs)

pub mod detail;
pub mod results;
