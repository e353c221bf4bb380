//! Catalog entities collected during a harvest
//!
//! The hierarchy is province → city → district → grade → textbook. Cities and
//! districts are transient descriptors used to drive the crawl; textbook
//! records are the leaf entries that end up in the export.

use serde::{Deserialize, Serialize};

/// A city link found on the root catalog page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityDescriptor {
    /// Province label the city was listed under
    pub province: String,

    /// City name as shown in the link text
    pub name: String,

    /// Absolute URL of the city page
    pub url: String,
}

/// A district link found on a city page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictDescriptor {
    pub name: String,
    pub url: String,
}

/// A single textbook entry from a district page
///
/// Field renames match the export header so the same type is used to write
/// and to re-read exported files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextbookRecord {
    #[serde(rename = "省")]
    pub province: String,

    #[serde(rename = "市")]
    pub city: String,

    #[serde(rename = "区/县")]
    pub district: String,

    #[serde(rename = "年级")]
    pub grade: String,

    /// Book title
    #[serde(rename = "科目")]
    pub subject: String,

    /// Publisher edition
    #[serde(rename = "版本")]
    pub version: String,

    #[serde(rename = "课本链接")]
    pub book_url: String,
}

impl TextbookRecord {
    /// Identity key used for deduplication
    ///
    /// The book URL is deliberately not part of the identity.
    pub fn identity_key(&self) -> String {
        [
            self.province.as_str(),
            self.city.as_str(),
            self.district.as_str(),
            self.grade.as_str(),
            self.subject.as_str(),
            self.version.as_str(),
        ]
        .join("|")
    }
}
