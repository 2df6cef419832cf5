/* 📖 # How pages are rendered
Every page is a self-contained HTML document with inline CSS. Renderers take the
composed content plus a `RenderContext` carrying the site name, the absolute base
URL and the generation date, so output is a pure function of its inputs.

Record text is escaped with `pulldown-cmark-escape` before it is written into the
markup, and URLs go through `escape_href`. Structured data is built as
`serde_json::Value` and embedded with `</` neutralised, so a business name can never
close the surrounding script element.
*/

use chrono::{Datelike, NaiveDate};
use pulldown_cmark_escape::{escape_href, escape_html};

use crate::config::SiteConfig;

mod city;
mod files;
mod home;
mod legal;

pub use city::render_city_page;
pub use files::{
    render_headers, render_not_found_page, render_redirects, render_robots, render_sitemap,
};
pub use home::render_homepage;
pub use legal::{LEGAL_PAGES, LegalPage, render_legal_page};

/// Site-wide values every renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub site_name: String,
    /// Without trailing slash.
    pub base_url: String,
    pub generated_on: NaiveDate,
}

impl RenderContext {
    pub fn new(site_name: impl Into<String>, base_url: &str, generated_on: NaiveDate) -> Self {
        Self {
            site_name: site_name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            generated_on,
        }
    }

    pub fn from_config(config: &SiteConfig, generated_on: NaiveDate) -> Self {
        Self::new(config.site_name.as_str(), config.base_url(), generated_on)
    }

    /// Absolute URL for a site path such as `/austin`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// e.g. "January 05, 2026"
    pub fn long_date(&self) -> String {
        self.generated_on.format("%B %d, %Y").to_string()
    }

    /// e.g. "2026-01-05"
    pub fn iso_date(&self) -> String {
        self.generated_on.format("%Y-%m-%d").to_string()
    }

    pub fn year(&self) -> i32 {
        self.generated_on.year()
    }
}

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let _ = escape_html(&mut escaped, text);
    escaped
}

pub(crate) fn escape_url(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    let _ = escape_href(&mut escaped, url);
    escaped
}

/// Serialize structured data for a `<script type="application/ld+json">` element.
pub(crate) fn json_ld(value: &serde_json::Value) -> String {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    json.replace("</", "<\\/")
}

/// Shared document skeleton.
pub(crate) struct PageShell<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub canonical: String,
    pub json_ld: Option<serde_json::Value>,
    pub style: &'a str,
}

impl PageShell<'_> {
    pub fn wrap(&self, body: &str) -> String {
        let structured_data = self
            .json_ld
            .as_ref()
            .map(|value| {
                format!(
                    "\n    <script type=\"application/ld+json\">\n{}\n    </script>",
                    json_ld(value)
                )
            })
            .unwrap_or_default();
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <link rel="canonical" href="{canonical}">{structured_data}
    <style>
{style}
    </style>
</head>
<body>
{body}
</body>
</html>
"#,
            title = escape(self.title),
            description = escape(self.description),
            canonical = escape_url(&self.canonical),
            style = self.style,
        )
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> RenderContext {
    RenderContext::new(
        "Local Pet Grooming",
        "https://local-pet-grooming.com/",
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap_or_default(),
    )
}
