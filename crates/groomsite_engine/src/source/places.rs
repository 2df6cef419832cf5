use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use groomsite_base::{GroomsiteError, GroomsiteResult, ResultExt};

use crate::business::{Business, BusinessDirectory, Review};
use crate::cities::City;
use crate::config::PlacesConfig;
use crate::source::{BusinessSource, clean_business};

const MOBILE_NAME_TERMS: [&str; 4] = ["mobile", "traveling", "home", "door"];

const HOURS_UNKNOWN: &str = "Hours vary - call for availability";

const MAX_REVIEWS_CONSIDERED: usize = 3;
const MIN_REVIEW_LENGTH: usize = 50;
const MAX_REVIEW_LENGTH: usize = 200;

const MAX_SERVICES: usize = 4;

const SERVICE_KEYWORDS: [(&str, &[&str]); 8] = [
    ("Full-service grooming", &["full service", "complete grooming", "full grooming"]),
    ("Bath and brush", &["bath", "wash", "shampoo"]),
    ("Nail trimming", &["nail", "nails", "claw"]),
    ("Ear cleaning", &["ear", "ears"]),
    ("Teeth cleaning", &["teeth", "dental"]),
    ("De-shedding", &["shedding", "deshed", "undercoat"]),
    ("Flea treatment", &["flea", "tick", "parasite"]),
    ("De-matting", &["mat", "matting", "tangle"]),
];

const DETECTED_SERVICE_DEFAULTS: [&str; 3] = ["Full-service grooming", "Bath and brush", "Nail trimming"];

pub const LISTING_DETAIL_FIELDS: &str = "name,rating,user_ratings_total,formatted_address,formatted_phone_number,website,opening_hours,price_level,reviews,business_status";

pub const CONTACT_DETAIL_FIELDS: &str = "formatted_phone_number,website,url";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSearchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub business_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceReview {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub author_name: Option<String>,
}

/// The two Places endpoints the scraper uses.
pub trait PlacesApi: Send {
    fn text_search(&self, query: &str) -> GroomsiteResult<TextSearchResponse>;

    fn place_details(&self, place_id: &str, fields: &str) -> GroomsiteResult<DetailsResponse>;
}

/// `PlacesApi` over HTTPS with a blocking reqwest client.
pub struct HttpPlacesApi {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl HttpPlacesApi {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> GroomsiteResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("groomsite/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| groomsite_base::err!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, query: &[(&str, &str)]) -> GroomsiteResult<T> {
        self.client
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<T>())
            .map_err(|e| Box::new(GroomsiteError::message(e.to_string())))
    }
}

impl PlacesApi for HttpPlacesApi {
    fn text_search(&self, query: &str) -> GroomsiteResult<TextSearchResponse> {
        let url = format!("{}/textsearch/json", self.endpoint);
        self.get_json(&url, &[("query", query), ("type", "establishment")])
            .with_context(|| format!("Text search for '{}' failed", query))
    }

    fn place_details(&self, place_id: &str, fields: &str) -> GroomsiteResult<DetailsResponse> {
        let url = format!("{}/details/json", self.endpoint);
        self.get_json(&url, &[("place_id", place_id), ("fields", fields)])
            .with_context(|| format!("Details request for place {} failed", place_id))
    }
}

/// Business source backed by the Places text search and details endpoints.
pub struct PlacesSource {
    api: Box<dyn PlacesApi>,
    search_terms: Vec<String>,
    request_delay: Duration,
}

impl PlacesSource {
    pub fn new(api: Box<dyn PlacesApi>, config: &PlacesConfig) -> Self {
        Self {
            api,
            search_terms: config.search_terms.clone(),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }

    /// Build a source talking to the configured endpoint. Fails when no API key is set.
    pub fn from_config(config: &PlacesConfig) -> GroomsiteResult<Self> {
        let Some(api_key) = config.api_key.as_deref().filter(|key| !key.is_empty()) else {
            groomsite_base::bail!(
                "No Places API key configured, set places.api_key or {}",
                crate::config::PLACES_API_KEY_ENV
            );
        };
        let api = HttpPlacesApi::new(config.endpoint.as_str(), api_key)?;
        Ok(Self::new(Box::new(api), config))
    }

    fn pause(&self) {
        if !self.request_delay.is_zero() {
            thread::sleep(self.request_delay);
        }
    }

    #[instrument(skip(self))]
    fn search(&self, query: &str) -> Vec<Business> {
        let response = match self.api.text_search(query) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "text search failed");
                return Vec::new();
            }
        };
        if response.status != "OK" {
            warn!(
                status = %response.status,
                message = response.error_message.as_deref().unwrap_or_default(),
                "text search returned an error status"
            );
            return Vec::new();
        }

        let mut businesses = Vec::new();
        for place in &response.results {
            let Some(mut business) = business_from_place(place) else {
                continue;
            };
            if let Some(place_id) = place.place_id.as_deref()
                && let Some(details) = self.details(place_id, LISTING_DETAIL_FIELDS)
            {
                apply_listing_details(&mut business, &details);
            }
            businesses.push(business);
            self.pause();
        }
        debug!(results = response.results.len(), kept = businesses.len(), "search finished");
        businesses
    }

    fn details(&self, place_id: &str, fields: &str) -> Option<PlaceDetails> {
        match self.api.place_details(place_id, fields) {
            Ok(DetailsResponse { status, result }) if status == "OK" => result,
            Ok(DetailsResponse { status, .. }) => {
                warn!(%place_id, %status, "place details returned an error status");
                None
            }
            Err(e) => {
                warn!(%place_id, error = %e, "place details request failed");
                None
            }
        }
    }

    /// Fetch phone, website and maps URL for every record with a place id, overwriting
    /// fields for which the details response has a value. Returns the number of records updated.
    #[instrument(skip_all)]
    pub fn enrich_contacts(&self, directory: &mut BusinessDirectory) -> usize {
        let mut updated = 0;
        for (location, businesses) in directory.iter_mut() {
            for business in businesses.iter_mut() {
                let Some(place_id) = business.place_id.clone() else {
                    continue;
                };
                if let Some(details) = self.details(&place_id, CONTACT_DETAIL_FIELDS)
                    && apply_contact_details(business, &details)
                {
                    updated += 1;
                }
                self.pause();
            }
            debug!(%location, "enriched location");
        }
        info!(updated, "contact enrichment finished");
        updated
    }
}

impl BusinessSource for PlacesSource {
    fn name(&self) -> &str {
        "places"
    }

    fn businesses_for(&mut self, city: &City) -> Vec<Business> {
        let mut found = Vec::new();
        for term in &self.search_terms {
            let query = format!("{} {}, {}", term, city.city, city.state);
            found.extend(self.search(&query));
            self.pause();
        }
        found.retain_mut(clean_business);
        found
    }
}

/// Whether a place name looks like a mobile business.
pub fn is_mobile_name(name: &str) -> bool {
    let name = name.to_lowercase();
    MOBILE_NAME_TERMS.iter().any(|term| name.contains(term))
}

/// A record for a text search result, or `None` when the name does not look mobile.
pub fn business_from_place(place: &PlaceResult) -> Option<Business> {
    let name = place.name.as_deref().filter(|name| is_mobile_name(name))?;
    Some(Business {
        rating: Some(place.rating.unwrap_or(0.0)),
        review_count: Some(place.user_ratings_total.unwrap_or(0)),
        address: place.formatted_address.clone(),
        phone: place.formatted_phone_number.clone(),
        website: place.website.clone(),
        place_id: place.place_id.clone(),
        price_level: place.price_level,
        business_status: Some(
            place
                .business_status
                .clone()
                .unwrap_or_else(|| "OPERATIONAL".to_string()),
        ),
        ..Business::named(name)
    })
}

pub fn apply_listing_details(business: &mut Business, details: &PlaceDetails) {
    business.hours = Some(format_hours(details.opening_hours.as_ref()));
    business.reviews = extract_reviews(&details.reviews);
    let mut text = details.name.clone().unwrap_or_default();
    for review in details.reviews.iter().take(MAX_REVIEWS_CONSIDERED) {
        text.push(' ');
        text.push_str(&review.text);
    }
    business.services = detect_services(&text);
    if business.phone.is_none() {
        business.phone = details.formatted_phone_number.clone();
    }
}

/// Returns true if any field changed.
pub fn apply_contact_details(business: &mut Business, details: &PlaceDetails) -> bool {
    let mut changed = false;
    for (field, value) in [
        (&mut business.phone, &details.formatted_phone_number),
        (&mut business.website, &details.website),
        (&mut business.google_url, &details.url),
    ] {
        if let Some(value) = value.as_ref().filter(|value| !value.is_empty())
            && field.as_ref() != Some(value)
        {
            *field = Some(value.clone());
            changed = true;
        }
    }
    changed
}

pub fn format_hours(opening_hours: Option<&OpeningHours>) -> String {
    opening_hours
        .and_then(|hours| hours.weekday_text.first())
        .cloned()
        .unwrap_or_else(|| HOURS_UNKNOWN.to_string())
}

/// Up to three quotable reviews taken from the first three returned.
pub fn extract_reviews(reviews: &[PlaceReview]) -> Vec<Review> {
    reviews
        .iter()
        .take(MAX_REVIEWS_CONSIDERED)
        .filter(|review| review.text.chars().count() > MIN_REVIEW_LENGTH)
        .map(|review| Review {
            text: truncate_review(&review.text),
            rating: review.rating.unwrap_or(5),
            author: review
                .author_name
                .clone()
                .unwrap_or_else(|| "Customer".to_string()),
        })
        .collect()
}

fn truncate_review(text: &str) -> String {
    if text.chars().count() <= MAX_REVIEW_LENGTH {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_REVIEW_LENGTH).collect();
    truncated.push_str("...");
    truncated
}

/// Services mentioned in `text`, in table order, at most four.
pub fn detect_services(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let mut services: Vec<String> = SERVICE_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(service, _)| service.to_string())
        .collect();
    if services.is_empty() {
        services = DETECTED_SERVICE_DEFAULTS.iter().map(|s| s.to_string()).collect();
    }
    services.truncate(MAX_SERVICES);
    services
}

#[cfg(test)]
#[path = "places_tests.rs"]
mod tests;
