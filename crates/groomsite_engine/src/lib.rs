pub mod business;
pub mod cities;
pub mod config;
pub mod content;
pub mod dedupe;
pub mod enhance;
pub mod random;
pub mod render;
pub mod server;
pub mod site;
pub mod source;
pub mod watcher;

pub use business::{Business, BusinessDirectory, Review, load_directory, save_directory};
pub use cities::{City, ensure_cities_file, load_cities};
pub use config::{PLACES_API_KEY_ENV, SiteConfig, load_config};
pub use content::{CityContent, Faq, compose_city_content};
pub use dedupe::dedupe;
pub use enhance::{city_businesses, enhance_business, validate_business};
pub use random::make_rng;
pub use render::RenderContext;
pub use server::{DevServer, StaticSiteService, start_dev_server};
pub use site::{CitySummary, GenerationReport, SiteGenerator};
pub use source::{BusinessSource, PlacesSource, SyntheticSource, collect_directory, collect_directory_with};
pub use watcher::{ChangeNotification, ChangeWatcher, ChangeWatcherHandle, Snapshot, detect_change, scan};
