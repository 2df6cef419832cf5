use std::fmt::Write;

use crate::render::legal::LEGAL_PAGES;
use crate::render::{RenderContext, escape};
use crate::site::CitySummary;

/// `sitemap.xml` listing the homepage, the legal pages and every city page.
pub fn render_sitemap(cities: &[CitySummary], context: &RenderContext) -> String {
    let mut paths = vec!["/".to_string()];
    paths.extend(LEGAL_PAGES.iter().map(|page| format!("/{}", page.slug())));
    paths.extend(cities.iter().map(|city| format!("/{}", city.slug)));

    let lastmod = context.iso_date();
    let mut sitemap = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in &paths {
        let priority = if path == "/" { "1.0" } else { "0.8" };
        let _ = write!(
            sitemap,
            "    <url>\n        <loc>{}</loc>\n        <lastmod>{}</lastmod>\n        <changefreq>monthly</changefreq>\n        <priority>{}</priority>\n    </url>\n",
            escape(&context.url(path)),
            lastmod,
            priority
        );
    }
    sitemap.push_str("</urlset>\n");
    sitemap
}

/// `_redirects` mapping legacy `/{slug}.html` URLs to the clean ones.
pub fn render_redirects(cities: &[CitySummary]) -> String {
    cities
        .iter()
        .map(|city| format!("/{slug}.html /{slug} 301", slug = city.slug))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_robots(context: &RenderContext) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}",
        context.url("/sitemap.xml")
    )
}

/// `_headers` applying security and caching headers to every path.
pub fn render_headers() -> String {
    [
        "/*",
        "  X-Content-Type-Options: nosniff",
        "  X-Frame-Options: DENY",
        "  X-XSS-Protection: 1; mode=block",
        "  Referrer-Policy: strict-origin-when-cross-origin",
        "  Cache-Control: public, max-age=86400",
    ]
    .join("\n")
        + "\n"
}

pub fn render_not_found_page(site_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Page Not Found | {site_name}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: linear-gradient(135deg, #fff8dc 0%, #e6e6fa 100%); text-align: center; padding: 2rem; min-height: 100vh; display: flex; flex-direction: column; justify-content: center; align-items: center; }}
        .container {{ max-width: 600px; background: white; padding: 3rem; border-radius: 24px; box-shadow: 0 8px 32px rgba(0,0,0,0.08); }}
        .emoji {{ font-size: 4rem; }}
        .back-link {{ display: inline-block; margin-top: 2rem; padding: 1rem 2rem; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; text-decoration: none; border-radius: 16px; font-weight: 600; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="emoji">🐕</div>
        <h1>Page Not Found</h1>
        <p>Sorry, we couldn't find the page you're looking for.</p>
        <p>Let's get you back to finding great pet groomers!</p>
        <a href="/" class="back-link">🏠 Back to Home</a>
    </div>
</body>
</html>
"#,
        site_name = escape(site_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_context;
    use expect_test::expect;

    fn cities() -> Vec<CitySummary> {
        ["Austin", "Kansas City"]
            .into_iter()
            .map(|name| CitySummary {
                city: name.to_string(),
                state: "Texas".to_string(),
                state_abbr: "TX".to_string(),
                slug: name.to_lowercase().replace(' ', "-"),
                business_count: 4,
                avg_rating: 4.6,
            })
            .collect()
    }

    #[test]
    fn test_sitemap() {
        let sitemap = render_sitemap(&cities()[..1], &test_context());
        expect![[r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url>
                    <loc>https://local-pet-grooming.com/</loc>
                    <lastmod>2026-01-05</lastmod>
                    <changefreq>monthly</changefreq>
                    <priority>1.0</priority>
                </url>
                <url>
                    <loc>https://local-pet-grooming.com/privacy</loc>
                    <lastmod>2026-01-05</lastmod>
                    <changefreq>monthly</changefreq>
                    <priority>0.8</priority>
                </url>
                <url>
                    <loc>https://local-pet-grooming.com/terms</loc>
                    <lastmod>2026-01-05</lastmod>
                    <changefreq>monthly</changefreq>
                    <priority>0.8</priority>
                </url>
                <url>
                    <loc>https://local-pet-grooming.com/contact</loc>
                    <lastmod>2026-01-05</lastmod>
                    <changefreq>monthly</changefreq>
                    <priority>0.8</priority>
                </url>
                <url>
                    <loc>https://local-pet-grooming.com/about</loc>
                    <lastmod>2026-01-05</lastmod>
                    <changefreq>monthly</changefreq>
                    <priority>0.8</priority>
                </url>
                <url>
                    <loc>https://local-pet-grooming.com/austin</loc>
                    <lastmod>2026-01-05</lastmod>
                    <changefreq>monthly</changefreq>
                    <priority>0.8</priority>
                </url>
            </urlset>
        "#]]
        .assert_eq(&sitemap);
    }

    #[test]
    fn test_redirects() {
        expect![[r#"
            /austin.html /austin 301
            /kansas-city.html /kansas-city 301"#]]
        .assert_eq(&render_redirects(&cities()));
        assert_eq!(render_redirects(&[]), "");
    }

    #[test]
    fn test_robots() {
        assert_eq!(
            render_robots(&test_context()),
            "User-agent: *\nAllow: /\n\nSitemap: https://local-pet-grooming.com/sitemap.xml"
        );
    }

    #[test]
    fn test_headers_and_not_found() {
        assert!(render_headers().starts_with("/*\n  X-Content-Type-Options: nosniff\n"));
        let page = render_not_found_page(&test_context().site_name);
        assert!(page.contains("<title>Page Not Found | Local Pet Grooming</title>"));
        assert!(page.contains("<a href=\"/\" class=\"back-link\">"));
    }
}
