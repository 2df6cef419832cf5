use rand::rngs::StdRng;
use tracing::{info, instrument, warn};

use groomsite_base::{FilePath, GroomsiteResult, PalHandle, ResultExt};

use crate::business::BusinessDirectory;
use crate::cities::City;
use crate::config::SiteConfig;
use crate::content::{CityContent, compose_city_content};
use crate::enhance::city_businesses;
use crate::random::make_rng;
use crate::render::{
    LEGAL_PAGES, RenderContext, render_city_page, render_headers, render_homepage, render_legal_page,
    render_not_found_page, render_redirects, render_robots, render_sitemap,
};

/// What the homepage, sitemap and redirects need to know about a generated city page.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySummary {
    pub city: String,
    pub state: String,
    pub state_abbr: String,
    pub slug: String,
    pub business_count: usize,
    pub avg_rating: f64,
}

impl From<&CityContent> for CitySummary {
    fn from(content: &CityContent) -> Self {
        Self {
            city: content.city.clone(),
            state: content.state.clone(),
            state_abbr: content.state_abbr.clone(),
            slug: content.url_slug.clone(),
            business_count: content.business_count,
            avg_rating: content.avg_rating,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub generated: Vec<CitySummary>,
    /// Cities without any valid business records.
    pub skipped: Vec<City>,
}

impl GenerationReport {
    pub fn page_count(&self) -> usize {
        self.generated.len()
    }
}

/// Writes the complete static site into the configured output directory.
pub struct SiteGenerator {
    pal: PalHandle,
    output: FilePath,
    context: RenderContext,
    rng: StdRng,
}

impl SiteGenerator {
    pub fn new(pal: PalHandle, config: &SiteConfig, context: RenderContext) -> Self {
        Self {
            pal,
            output: config.output_path(),
            context,
            rng: make_rng(config.seed),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    fn write(&self, relative: &str, contents: &str) -> GroomsiteResult<()> {
        let path = self.output.join(relative);
        self.pal
            .write_file(&path, contents.as_bytes())
            .with_context(|| format!("Failed to write {}", path))
    }

    #[instrument(skip_all, fields(output = %self.output, cities = cities.len()))]
    pub fn generate(&mut self, cities: &[City], directory: &BusinessDirectory) -> GroomsiteResult<GenerationReport> {
        self.pal.create_directory_all(&self.output)?;
        let mut report = GenerationReport::default();

        for city in cities {
            let businesses = city_businesses(directory, city, &mut self.rng);
            let Some(content) = compose_city_content(city, businesses, &mut self.rng) else {
                warn!(city = %city.city, "skipped city without business data");
                report.skipped.push(city.clone());
                continue;
            };
            let html = render_city_page(&content, &self.context);
            self.write(&format!("{}/index.html", content.url_slug), &html)?;
            info!(city = %city.city, businesses = content.business_count, "generated city page");
            report.generated.push(CitySummary::from(&content));
        }

        self.write("index.html", &render_homepage(&report.generated, &self.context))?;
        for page in LEGAL_PAGES {
            self.write(
                &format!("{}/index.html", page.slug()),
                &render_legal_page(page, &self.context),
            )?;
        }
        self.write("404.html", &render_not_found_page(&self.context.site_name))?;
        self.write("sitemap.xml", &render_sitemap(&report.generated, &self.context))?;
        self.write("_redirects", &render_redirects(&report.generated))?;
        self.write("robots.txt", &render_robots(&self.context))?;
        self.write("_headers", &render_headers())?;

        info!(
            pages = report.page_count(),
            skipped = report.skipped.len(),
            "site generation complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "site_tests.rs"]
mod tests;
