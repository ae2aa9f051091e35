pub mod trig;

use chrono::{DateTime, Utc};

pub use trig::write_trig;

pub const DATASET_URI: &str =
    "http://gss-data.org.uk/data/gss_data/housing/statswales-dwelling-stock-estimates";
pub const LANDING_PAGE: &str = "https://statswales.gov.wales/Catalogue/Housing/Dwelling-Stock-Estimates/dwellingstockestimates-by-localauthority-tenure";
pub const PUBLISHER: &str = "https://www.gov.wales/organisations/welsh-government";
pub const THEME_BASE: &str = "http://gss-data.org.uk/def/concept/statistics-authority-themes/";

/// Dataset-level metadata carried into `dataset.trig`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetadata {
    pub uri: String,
    pub title: String,
    pub landing_page: String,
    /// gdp family slug, e.g. `housing`
    pub family: String,
    /// statistics-authority theme slug
    pub theme: String,
    pub publisher: String,
    pub creator: Option<String>,
    pub modified: DateTime<Utc>,
}

impl DatasetMetadata {
    /// Metadata for the HOUS0501 release, modified `now`, credited to its publisher.
    pub fn dwelling_stock(now: DateTime<Utc>) -> Self {
        let mut meta = Self {
            uri: DATASET_URI.to_string(),
            title: "Dwelling stock estimates by local authority and tenure".to_string(),
            landing_page: LANDING_PAGE.to_string(),
            family: "housing".to_string(),
            theme: "housing-planning-local-services".to_string(),
            publisher: PUBLISHER.to_string(),
            creator: None,
            modified: now,
        };
        meta.creator = Some(meta.publisher.clone());
        meta
    }

    pub fn graph_uri(&self) -> String {
        format!("{}/metadata", self.uri.replacen("/data/", "/graph/", 1))
    }

    pub fn theme_uri(&self) -> String {
        format!("{}{}", THEME_BASE, self.theme)
    }
}
