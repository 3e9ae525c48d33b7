use serde::{Deserialize, Serialize};

/// One job listing extracted from a results page
///
/// Immutable once built; the extractor is the only producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub location: String,
    pub description: String,
    pub experience_level: String,
    pub url: String,
}

impl JobRecord {
    /// A record is complete when title, location and url are all non-empty.
    /// Only complete records are handed to a sink.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.location.is_empty() && !self.url.is_empty()
    }

    /// Fields in CSV column order: Title, Location, Description, ExperienceLevel, URL
    #[must_use]
    pub fn csv_row(&self) -> [&str; 5] {
        [
            &self.title,
            &self.location,
            &self.description,
            &self.experience_level,
            &self.url,
        ]
    }
}
