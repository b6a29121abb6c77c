/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the recognition client and the UI layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory where bottle artwork shipped with the app lives.
/// Candidate `image_url` values are reduced to a bare filename and
/// resolved against this directory; the service's own path structure
/// is never trusted or replayed.
pub const IMAGE_ASSET_DIR: &str = "images";

/// One recognized bottle hypothesis returned by the recognition service
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Bottle name (e.g., "Lagavulin 16 Year Old")
    pub name: String,
    /// Category label (e.g., "Single Malt Scotch")
    #[serde(rename = "type")]
    pub kind: String,
    /// Alcohol by volume, percent (0..=100)
    pub abv: f64,
    /// Bottle size in millilitres
    pub size_ml: f64,
    /// Manufacturer's suggested retail price, USD
    pub msrp: f64,
    /// Service-assigned match score, 0.0..=1.0
    pub confidence: f64,
    /// Optional artwork path as reported by the service
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Candidate {
    /// Confidence as a percentage rounded to one decimal place
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 1000.0).round() / 10.0
    }

    /// Confidence rendered for display (e.g., 0.873 -> "87.3%")
    pub fn confidence_label(&self) -> String {
        format!("{:.1}%", self.confidence_percent())
    }

    /// Resolve the service-reported artwork path to a local asset.
    ///
    /// Only the final path component is kept; both `/` and `\`
    /// separators are handled so Windows-style paths from the service
    /// resolve the same way as POSIX ones.
    pub fn local_asset_path(&self) -> Option<PathBuf> {
        let url = self.image_url.as_deref()?;
        let filename = url.rsplit(['/', '\\']).next().filter(|f| !f.is_empty())?;
        Some(Path::new(IMAGE_ASSET_DIR).join(filename))
    }
}

/// One bar of the synthetic price-comparison series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub label: &'static str,
    pub price: f64,
}

/// Derive the three-point comparison series shown in the detail view.
///
/// The series is synthetic and computed client-side, never fetched:
/// a market average at 90% of MSRP, the current MSRP, and a high at 110%.
pub fn price_comparison(msrp: f64) -> [PricePoint; 3] {
    [
        PricePoint { label: "Average", price: msrp * 0.9 },
        PricePoint { label: "Current", price: msrp },
        PricePoint { label: "High", price: msrp * 1.1 },
    ]
}
