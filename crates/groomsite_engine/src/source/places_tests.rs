use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::*;
use crate::config::PlacesConfig;

/// Serves canned JSON documents and records every call.
#[derive(Default, Clone)]
struct FakePlacesApi {
    searches: HashMap<String, String>,
    details: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakePlacesApi {
    fn with_search(mut self, query: &str, json: &str) -> Self {
        self.searches.insert(query.to_string(), json.to_string());
        self
    }

    fn with_details(mut self, place_id: &str, json: &str) -> Self {
        self.details.insert(place_id.to_string(), json.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlacesApi for FakePlacesApi {
    fn text_search(&self, query: &str) -> GroomsiteResult<TextSearchResponse> {
        self.calls.lock().unwrap().push(format!("search {query}"));
        match self.searches.get(query) {
            Some(json) => serde_json::from_str(json).map_err(|e| groomsite_base::err!("{}", e)),
            None => Err(groomsite_base::err!("connection refused")),
        }
    }

    fn place_details(&self, place_id: &str, fields: &str) -> GroomsiteResult<DetailsResponse> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("details {place_id} {fields}"));
        match self.details.get(place_id) {
            Some(json) => serde_json::from_str(json).map_err(|e| groomsite_base::err!("{}", e)),
            None => Err(groomsite_base::err!("connection refused")),
        }
    }
}

fn config(terms: &[&str]) -> PlacesConfig {
    PlacesConfig {
        search_terms: terms.iter().map(|term| term.to_string()).collect(),
        request_delay_ms: 0,
        ..PlacesConfig::default()
    }
}

const SEARCH_OK: &str = r#"{
    "status": "OK",
    "results": [
        {"place_id": "p1", "name": "Austin Mobile Pet Spa", "rating": 4.8, "user_ratings_total": 120,
         "formatted_address": "1 Main St, Austin, TX", "price_level": 2},
        {"place_id": "p2", "name": "Downtown Dog Salon", "rating": 4.9},
        {"place_id": "p3", "name": "Door to Door Groomers", "formatted_phone_number": "(512) 555-0103"}
    ]
}"#;

const DETAILS_P1: &str = r#"{
    "status": "OK",
    "result": {
        "name": "Austin Mobile Pet Spa",
        "formatted_phone_number": "(512) 555-0101",
        "opening_hours": {"weekday_text": ["Monday: 8:00 AM - 6:00 PM", "Tuesday: 8:00 AM - 6:00 PM"]},
        "reviews": [
            {"text": "Short and sweet.", "rating": 5, "author_name": "Ann"},
            {"text": "They gave my poodle a bath and trimmed her nails right in our driveway, wonderful.", "rating": 4, "author_name": "Ben"}
        ]
    }
}"#;

#[test]
fn test_is_mobile_name() {
    assert!(is_mobile_name("Austin MOBILE Grooming"));
    assert!(is_mobile_name("Traveling Tails"));
    assert!(is_mobile_name("Home Pet Care"));
    assert!(is_mobile_name("Door to Door Dogs"));
    assert!(!is_mobile_name("Downtown Dog Salon"));
}

#[test]
fn test_format_hours() {
    assert_eq!(format_hours(None), "Hours vary - call for availability");
    assert_eq!(
        format_hours(Some(&OpeningHours::default())),
        "Hours vary - call for availability"
    );
    let hours = OpeningHours {
        weekday_text: vec!["Monday: Closed".to_string(), "Tuesday: 9-5".to_string()],
    };
    assert_eq!(format_hours(Some(&hours)), "Monday: Closed");
}

#[test]
fn test_extract_reviews() {
    let long = "x".repeat(250);
    let reviews = vec![
        PlaceReview { text: "too short".to_string(), rating: Some(3), author_name: None },
        PlaceReview { text: long.clone(), rating: None, author_name: None },
        PlaceReview {
            text: "A thoroughly pleasant experience from start to finish, would book again.".to_string(),
            rating: Some(4),
            author_name: Some("Cleo".to_string()),
        },
        PlaceReview { text: long, rating: Some(5), author_name: Some("Dan".to_string()) },
    ];

    let extracted = extract_reviews(&reviews);
    assert_eq!(extracted.len(), 2);
    assert_eq!(extracted[0].text.chars().count(), 203);
    assert!(extracted[0].text.ends_with("..."));
    assert_eq!(extracted[0].rating, 5);
    assert_eq!(extracted[0].author, "Customer");
    assert_eq!(extracted[1].author, "Cleo");
    assert_eq!(extracted[1].rating, 4);
}

#[test]
fn test_detect_services() {
    assert_eq!(
        detect_services("Full Grooming with a flea bath and teeth cleaning"),
        ["Full-service grooming", "Bath and brush", "Teeth cleaning", "Flea treatment"]
    );
    assert_eq!(
        detect_services("Paws"),
        ["Full-service grooming", "Bath and brush", "Nail trimming"]
    );
    assert_eq!(
        detect_services("bath nails ears dental shedding flea matting").len(),
        4
    );
}

#[test]
fn test_search_keeps_mobile_results_with_phone() {
    let api = FakePlacesApi::default()
        .with_search("mobile pet grooming Austin, Texas", SEARCH_OK)
        .with_details("p1", DETAILS_P1)
        .with_details("p3", r#"{"status": "NOT_FOUND"}"#);
    let mut source = PlacesSource::new(Box::new(api.clone()), &config(&["mobile pet grooming"]));

    let businesses = source.businesses_for(&City::new("Austin", "Texas", "TX"));

    let names: Vec<_> = businesses.iter().filter_map(Business::display_name).collect();
    assert_eq!(names, ["Austin Mobile Pet Spa", "Door to Door Groomers"]);

    let spa = &businesses[0];
    assert_eq!(spa.phone.as_deref(), Some("(512) 555-0101"));
    assert_eq!(spa.hours.as_deref(), Some("Monday: 8:00 AM - 6:00 PM"));
    assert_eq!(spa.rating, Some(4.8));
    assert_eq!(spa.review_count, Some(120));
    assert_eq!(spa.price_level, Some(2));
    assert_eq!(spa.business_status.as_deref(), Some("OPERATIONAL"));
    assert_eq!(spa.reviews.len(), 1);
    assert_eq!(spa.reviews[0].author, "Ben");
    assert_eq!(spa.services, ["Bath and brush", "Nail trimming"]);

    let door = &businesses[1];
    assert_eq!(door.rating, Some(0.0));
    assert_eq!(door.hours, None);

    assert_eq!(
        api.calls(),
        [
            "search mobile pet grooming Austin, Texas".to_string(),
            format!("details p1 {LISTING_DETAIL_FIELDS}"),
            format!("details p3 {LISTING_DETAIL_FIELDS}"),
        ]
    );
}

#[test]
fn test_mobile_result_without_phone_is_kept_for_enrichment() {
    let api = FakePlacesApi::default()
        .with_search(
            "mobile pet grooming Austin, Texas",
            r#"{"status": "OK", "results": [{"place_id": "p9", "name": "Austin Mobile Paws"}]}"#,
        )
        .with_details("p9", r#"{"status": "OK", "result": {"name": "Austin Mobile Paws"}}"#);
    let mut source = PlacesSource::new(Box::new(api), &config(&["mobile pet grooming"]));

    let businesses = source.businesses_for(&City::new("Austin", "Texas", "TX"));

    assert_eq!(businesses.len(), 1);
    assert_eq!(businesses[0].display_name(), Some("Austin Mobile Paws"));
    assert_eq!(businesses[0].phone, None);
    assert_eq!(businesses[0].place_id.as_deref(), Some("p9"));

    let enrich_api = FakePlacesApi::default().with_details(
        "p9",
        r#"{"status": "OK", "result": {"formatted_phone_number": "(512) 555-0109"}}"#,
    );
    let enricher = PlacesSource::new(Box::new(enrich_api), &config(&[]));
    let mut directory = BusinessDirectory::new();
    directory.insert("Austin, Texas", businesses);

    assert_eq!(enricher.enrich_contacts(&mut directory), 1);
    assert_eq!(
        directory.get("Austin, Texas").unwrap()[0].phone.as_deref(),
        Some("(512) 555-0109")
    );
}

#[test]
fn test_failures_yield_no_results() {
    let api = FakePlacesApi::default().with_search(
        "mobile dog grooming Austin, Texas",
        r#"{"status": "REQUEST_DENIED", "error_message": "bad key"}"#,
    );
    let mut source = PlacesSource::new(
        Box::new(api.clone()),
        &config(&["mobile pet grooming", "mobile dog grooming"]),
    );

    assert!(source.businesses_for(&City::new("Austin", "Texas", "TX")).is_empty());
    assert_eq!(api.calls().len(), 2);
}

#[test]
fn test_enrich_contacts_overwrites_present_fields() {
    let api = FakePlacesApi::default()
        .with_details(
            "p1",
            r#"{"status": "OK", "result": {"formatted_phone_number": "(512) 555-0199",
                "url": "https://maps.google.com/?cid=1"}}"#,
        )
        .with_details("p2", r#"{"status": "OK", "result": {}}"#);
    let source = PlacesSource::new(Box::new(api.clone()), &config(&[]));

    let mut directory = BusinessDirectory::new();
    directory.insert(
        "Austin, Texas",
        vec![
            Business {
                place_id: Some("p1".to_string()),
                phone: Some("(512) 555-0101".to_string()),
                website: Some("https://spa.example".to_string()),
                ..Business::named("Austin Mobile Pet Spa")
            },
            Business {
                place_id: Some("p2".to_string()),
                ..Business::named("Home Groomers")
            },
            Business::named("No Place Id Mobile"),
        ],
    );

    assert_eq!(source.enrich_contacts(&mut directory), 1);

    let businesses = directory.get("Austin, Texas").unwrap();
    assert_eq!(businesses[0].phone.as_deref(), Some("(512) 555-0199"));
    assert_eq!(businesses[0].website.as_deref(), Some("https://spa.example"));
    assert_eq!(
        businesses[0].google_url.as_deref(),
        Some("https://maps.google.com/?cid=1")
    );
    assert_eq!(businesses[1].phone, None);
    assert_eq!(api.calls().len(), 2);
}

#[test]
fn test_from_config_requires_api_key() {
    let error = PlacesSource::from_config(&PlacesConfig::default())
        .err()
        .unwrap();
    assert!(error.to_string().contains("No Places API key configured"));
}
