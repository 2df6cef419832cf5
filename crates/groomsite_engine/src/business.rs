use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use groomsite_base::{FilePath, GroomsiteError, GroomsiteResult, PalHandle, ResultExt};

use crate::cities::City;

/// A customer review quoted on a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub text: String,
    #[serde(default = "default_review_rating")]
    pub rating: u8,
    #[serde(default = "default_review_author")]
    pub author: String,
}

fn default_review_rating() -> u8 {
    5
}

fn default_review_author() -> String {
    "Customer".to_string()
}

/// One business record as persisted in the directory JSON.
///
/// Only `name` is required for a record to be rendered. Fields this type does not know
/// about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Business {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_time: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_area: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Business {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The name, treating an empty or whitespace-only name as missing.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Identity used for de-duplication. A missing field counts as the empty string.
    pub fn identity(&self) -> (&str, &str) {
        (
            self.name.as_deref().unwrap_or_default(),
            self.phone.as_deref().unwrap_or_default(),
        )
    }
}

/// Business records keyed by location (`"{city}, {state}"`), sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessDirectory {
    locations: BTreeMap<String, Vec<Business>>,
}

impl BusinessDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location_key: impl Into<String>, businesses: Vec<Business>) {
        self.locations.insert(location_key.into(), businesses);
    }

    pub fn insert_city(&mut self, city: &City, businesses: Vec<Business>) {
        self.insert(city.location_key(), businesses);
    }

    pub fn get(&self, location_key: &str) -> Option<&[Business]> {
        self.locations.get(location_key).map(Vec::as_slice)
    }

    pub fn for_city(&self, city: &City) -> Option<&[Business]> {
        self.get(&city.location_key())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Business])> {
        self.locations
            .iter()
            .map(|(key, businesses)| (key.as_str(), businesses.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<Business>)> {
        self.locations
            .iter_mut()
            .map(|(key, businesses)| (key.as_str(), businesses))
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn business_count(&self) -> usize {
        self.locations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Parse the directory JSON one record at a time. Records that do not fit the `Business`
/// shape are logged and dropped; only a document that is not a map of arrays is an error.
pub fn parse_directory(contents: &str) -> GroomsiteResult<BusinessDirectory> {
    let raw: BTreeMap<String, Vec<serde_json::Value>> = serde_json::from_str(contents)
        .map_err(|e| Box::new(GroomsiteError::message(e.to_string())))?;
    let mut directory = BusinessDirectory::new();
    for (location, records) in raw {
        let mut businesses = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Business>(record) {
                Ok(business) => businesses.push(business),
                Err(e) => warn!(%location, index, error = %e, "skipping malformed business record"),
            }
        }
        directory.insert(location, businesses);
    }
    Ok(directory)
}

pub fn directory_to_json(directory: &BusinessDirectory) -> GroomsiteResult<String> {
    serde_json::to_string_pretty(directory)
        .map_err(|e| groomsite_base::err!("Failed to serialize business directory: {}", e))
}

/// Load the persisted directory. A missing or malformed file is reported as a warning
/// and yields an empty directory.
#[instrument(skip(pal), fields(path = %path))]
pub fn load_directory(pal: &PalHandle, path: &FilePath) -> BusinessDirectory {
    match pal.file_exists(path) {
        Ok(true) => {}
        Ok(false) => {
            warn!("business data file not found, run `groomsite scrape` or `groomsite synthesize` first");
            return BusinessDirectory::new();
        }
        Err(e) => {
            warn!(error = %e, "could not check business data file");
            return BusinessDirectory::new();
        }
    }
    match pal
        .read_file_to_string(path)
        .and_then(|contents| parse_directory(&contents))
    {
        Ok(directory) => {
            debug!(
                locations = directory.location_count(),
                businesses = directory.business_count(),
                "loaded business data"
            );
            directory
        }
        Err(e) => {
            warn!(error = %e, "business data file is unreadable or corrupted");
            BusinessDirectory::new()
        }
    }
}

#[instrument(skip(pal, directory), fields(path = %path))]
pub fn save_directory(
    pal: &PalHandle,
    path: &FilePath,
    directory: &BusinessDirectory,
) -> GroomsiteResult<()> {
    let json = directory_to_json(directory)?;
    pal.write_file(path, json.as_bytes())
        .with_context(|| format!("Failed to save business data to {}", path))
}
