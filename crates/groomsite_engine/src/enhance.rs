use rand::Rng;
use tracing::warn;

use crate::business::{Business, BusinessDirectory};
use crate::cities::City;
use crate::dedupe::dedupe;
use crate::random::pick;

pub const FALLBACK_PRICE_RANGE: &str = "$60-100";

const RANDOM_PRICE_RANGES: [&str; 4] = ["$50-80", "$60-100", "$75-120", "$65-110"];

const SERVICE_TIMES: [&str; 3] = ["45-75 minutes", "60-90 minutes", "75-105 minutes"];

pub const DEFAULT_SERVICES: [&str; 3] = ["Mobile grooming", "Bath and brush", "Nail trimming"];

fn price_range_for_level(level: u8) -> &'static str {
    match level {
        1 => "$40-70",
        2 => "$60-100",
        3 => "$80-130",
        4 => "$100-180",
        _ => FALLBACK_PRICE_RANGE,
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|value| value.trim().is_empty())
}

/// A record can be rendered if it has a non-empty name.
pub fn validate_business(business: &Business) -> bool {
    business.display_name().is_some()
}

/// Fill in the presentation fields a listing needs. Existing values win, except the
/// serving area which always names the page's city.
pub fn enhance_business(mut business: Business, city: &City, rng: &mut impl Rng) -> Business {
    if is_blank(&business.price_range) {
        let range = match business.price_level {
            Some(level) if level > 0 => price_range_for_level(level),
            _ => pick(rng, &RANDOM_PRICE_RANGES),
        };
        business.price_range = Some(range.to_string());
    }
    if is_blank(&business.service_time) {
        business.service_time = Some(pick(rng, &SERVICE_TIMES).to_string());
    }
    if business.services.is_empty() {
        business.services = DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect();
    }
    business.serving_area = Some(format!("{} and surrounding areas", city.city));
    business
}

/// The validated, enhanced and de-duplicated records for one city.
pub fn city_businesses(directory: &BusinessDirectory, city: &City, rng: &mut impl Rng) -> Vec<Business> {
    let Some(records) = directory.for_city(city) else {
        warn!(location = %city.location_key(), "no business data for city");
        return Vec::new();
    };
    let enhanced = records
        .iter()
        .filter(|business| validate_business(business))
        .map(|business| enhance_business(business.clone(), city, rng))
        .collect();
    dedupe(enhanced)
}
