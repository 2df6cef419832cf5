/* 📖 # How business data is collected
A `BusinessSource` produces the raw records for one city at a time. The Places
source queries the remote API, the synthetic source fabricates plausible records
from a seeded generator. Either way `collect_directory` de-duplicates each city's
records and hands the growing directory to a callback, so callers can persist
progress after every city.
*/

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument};

use groomsite_base::GroomsiteResult;

use crate::business::{Business, BusinessDirectory};
use crate::cities::City;
use crate::dedupe::dedupe;
use crate::enhance::DEFAULT_SERVICES;

pub mod places;
pub mod synthetic;

pub use places::{HttpPlacesApi, PlacesApi, PlacesSource};
pub use synthetic::SyntheticSource;

pub trait BusinessSource {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Raw records for one city. Failures are logged by the source and yield fewer records.
    fn businesses_for(&mut self, city: &City) -> Vec<Business>;
}

/// Run `source` for every city and return the de-duplicated directory.
pub fn collect_directory(source: &mut dyn BusinessSource, cities: &[City]) -> BusinessDirectory {
    let mut directory = BusinessDirectory::new();
    for city in cities {
        collect_city(source, city, &mut directory);
    }
    directory
}

/// Like [`collect_directory`], calling `after_city` with the directory so far after each
/// city. An error from the callback stops collection.
pub fn collect_directory_with(
    source: &mut dyn BusinessSource,
    cities: &[City],
    mut after_city: impl FnMut(&City, &BusinessDirectory) -> GroomsiteResult<()>,
) -> GroomsiteResult<BusinessDirectory> {
    let mut directory = BusinessDirectory::new();
    for city in cities {
        collect_city(source, city, &mut directory);
        after_city(city, &directory)?;
    }
    Ok(directory)
}

#[instrument(skip_all, fields(source = source.name(), location = %city.location_key()))]
fn collect_city(source: &mut dyn BusinessSource, city: &City, directory: &mut BusinessDirectory) {
    let businesses = dedupe(source.businesses_for(city));
    info!(count = businesses.len(), "collected businesses");
    directory.insert_city(city, businesses);
}

static PHONE_JUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d()\-\s+]").expect("valid regex"));

/// Validate and normalize a scraped record in place. Returns false if the record has no
/// name and should be dropped. A missing phone is kept for `enrich` to fill in later.
pub fn clean_business(business: &mut Business) -> bool {
    if business.display_name().is_none() {
        return false;
    }
    business.phone = business
        .phone
        .as_deref()
        .map(|phone| PHONE_JUNK.replace_all(phone, "").into_owned())
        .filter(|phone| !phone.trim().is_empty());
    if let Some(rating) = business.rating {
        business.rating = Some(rating.clamp(0.0, 5.0));
    }
    if business.services.is_empty() {
        business.services = DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        calls: Vec<String>,
    }

    impl BusinessSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        fn businesses_for(&mut self, city: &City) -> Vec<Business> {
            self.calls.push(city.city.clone());
            let spa = Business {
                phone: Some("(555) 555-0100".to_string()),
                ..Business::named(format!("{} Mobile Spa", city.city))
            };
            vec![spa.clone(), spa]
        }
    }

    fn cities() -> Vec<City> {
        vec![City::new("Austin", "Texas", "TX"), City::new("Tampa", "Florida", "FL")]
    }

    #[test]
    fn test_collect_directory_dedupes_per_city() {
        let mut source = FixedSource { calls: Vec::new() };
        let directory = collect_directory(&mut source, &cities());

        assert_eq!(source.calls, ["Austin", "Tampa"]);
        assert_eq!(directory.location_count(), 2);
        assert_eq!(directory.get("Austin, Texas").unwrap().len(), 1);
        assert_eq!(directory.business_count(), 2);
    }

    #[test]
    fn test_collect_directory_reports_progress() {
        let mut source = FixedSource { calls: Vec::new() };
        let mut seen = Vec::new();
        collect_directory_with(&mut source, &cities(), |city, directory| {
            seen.push((city.city.clone(), directory.location_count()));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, [("Austin".to_string(), 1), ("Tampa".to_string(), 2)]);
    }

    #[test]
    fn test_collect_directory_stops_on_callback_error() {
        let mut source = FixedSource { calls: Vec::new() };
        let result = collect_directory_with(&mut source, &cities(), |_, _| {
            Err(groomsite_base::err!("disk full"))
        });
        assert_eq!(result.unwrap_err().to_string(), "disk full");
        assert_eq!(source.calls, ["Austin"]);
    }

    #[test]
    fn test_clean_business() {
        let mut business = Business {
            phone: Some("Call: (512) 555-0100 ext.7".to_string()),
            rating: Some(7.5),
            ..Business::named("Pup Spa")
        };
        assert!(clean_business(&mut business));
        assert_eq!(business.phone.as_deref(), Some(" (512) 555-0100 7"));
        assert_eq!(business.rating, Some(5.0));
        assert_eq!(business.services, DEFAULT_SERVICES);

        let mut no_phone = Business::named("Pup Spa");
        assert!(clean_business(&mut no_phone));
        assert_eq!(no_phone.phone, None);
        assert_eq!(no_phone.services, DEFAULT_SERVICES);

        let mut blank_phone = Business {
            phone: Some("call us".to_string()),
            ..Business::named("Pup Spa")
        };
        assert!(clean_business(&mut blank_phone));
        assert_eq!(blank_phone.phone, None);

        let mut no_name = Business {
            phone: Some("555-0100".to_string()),
            ..Business::default()
        };
        assert!(!clean_business(&mut no_name));
    }

    #[test]
    fn test_clean_business_keeps_plus_and_negative_rating_clamps() {
        let mut business = Business {
            phone: Some("+1 512-555-0100".to_string()),
            rating: Some(-1.0),
            services: vec!["De-matting".to_string()],
            ..Business::named("Pup Spa")
        };
        assert!(clean_business(&mut business));
        assert_eq!(business.phone.as_deref(), Some("+1 512-555-0100"));
        assert_eq!(business.rating, Some(0.0));
        assert_eq!(business.services, ["De-matting"]);
    }
}
