use serde::Deserialize;
use tracing::{debug, info, instrument};

use groomsite_base::{FilePath, GroomsiteResult, PalHandle, ResultExt};

/// Written by `ensure_cities_file` when no city list exists yet.
pub const SAMPLE_CITIES_CSV: &str = "city,state,state_abbr
Princeton,Texas,TX
Plano,Texas,TX
Scottsdale,Arizona,AZ
Raleigh,North Carolina,NC
Austin,Texas,TX
Kansas City,Missouri,MO
Asheville,North Carolina,NC
Santa Fe,New Mexico,NM
Tampa,Florida,FL
Colorado Springs,Colorado,CO
";

/// One target locality.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct City {
    pub city: String,
    pub state: String,
    pub state_abbr: String,
}

impl City {
    pub fn new(city: impl Into<String>, state: impl Into<String>, state_abbr: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            state_abbr: state_abbr.into(),
        }
    }

    /// URL path segment: lower-cased with spaces replaced by hyphens.
    pub fn slug(&self) -> String {
        self.city.to_lowercase().replace(' ', "-")
    }

    /// Key into the business directory, `"{city}, {state}"`.
    pub fn location_key(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// Parse a `city,state,state_abbr` table with a header row.
pub fn parse_cities(contents: &str) -> GroomsiteResult<Vec<City>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut cities = Vec::new();
    for (index, record) in reader.deserialize::<City>().enumerate() {
        // header is line 1
        let city = record.map_err(|e| groomsite_base::err!("Invalid city row {}: {}", index + 2, e))?;
        cities.push(city);
    }
    Ok(cities)
}

#[instrument(skip(pal), fields(path = %path))]
pub fn load_cities(pal: &PalHandle, path: &FilePath) -> GroomsiteResult<Vec<City>> {
    let contents = pal
        .read_file_to_string(path)
        .with_context(|| format!("Failed to read city list {}", path))?;
    let cities = parse_cities(&contents).with_context(|| format!("Failed to parse {}", path))?;
    debug!(count = cities.len(), "loaded cities");
    Ok(cities)
}

/// Write the sample city list if `path` does not exist yet. Returns true if it was written.
pub fn ensure_cities_file(pal: &PalHandle, path: &FilePath) -> GroomsiteResult<bool> {
    if pal.file_exists(path)? {
        return Ok(false);
    }
    pal.write_file(path, SAMPLE_CITIES_CSV.as_bytes())?;
    info!(%path, "created sample city list");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use groomsite_base::MockPal;

    #[test]
    fn test_slug_and_location_key() {
        let city = City::new("Colorado Springs", "Colorado", "CO");
        assert_eq!(city.slug(), "colorado-springs");
        assert_eq!(city.location_key(), "Colorado Springs, Colorado");
        assert_eq!(City::new("Austin", "Texas", "TX").slug(), "austin");
    }

    #[test]
    fn test_parse_cities() {
        let cities = parse_cities("city,state,state_abbr\nAustin,Texas,TX\nSanta Fe, New Mexico ,NM\n").unwrap();
        assert_eq!(
            cities,
            [
                City::new("Austin", "Texas", "TX"),
                City::new("Santa Fe", "New Mexico", "NM"),
            ]
        );
    }

    #[test]
    fn test_parse_cities_reports_bad_row() {
        let error = parse_cities("city,state,state_abbr\nAustin,Texas,TX\nPlano,Texas\n").unwrap_err();
        assert!(error.to_string().starts_with("Invalid city row 3"), "{error}");
    }

    #[test]
    fn test_sample_file_is_written_once() {
        let mock = MockPal::new();
        let pal = PalHandle::new(mock.clone());
        let path = FilePath::from("cities.csv");

        assert!(ensure_cities_file(&pal, &path).unwrap());
        assert!(!ensure_cities_file(&pal, &path).unwrap());

        let cities = load_cities(&pal, &path).unwrap();
        assert_eq!(cities.len(), 10);
        assert_eq!(cities[4], City::new("Austin", "Texas", "TX"));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let pal = PalHandle::new(MockPal::new());
        let error = load_cities(&pal, &FilePath::from("cities.csv")).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read city list cities.csv"));
    }
}
