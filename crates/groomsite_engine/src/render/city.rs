use std::fmt::Write;

use serde_json::json;

use crate::business::Business;
use crate::content::CityContent;
use crate::render::{PageShell, RenderContext, escape, escape_url};

const MAX_LISTED_SERVICES: usize = 4;
const MAX_STRUCTURED_ITEMS: usize = 5;

const CITY_STYLE: &str = r#"        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; margin: 0; padding: 20px; background: #f8f9fa; }
        .container { max-width: 1000px; margin: 0 auto; background: white; padding: 40px; border-radius: 15px; box-shadow: 0 4px 20px rgba(0,0,0,0.1); }
        .business-card { background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%); padding: 25px; margin: 20px 0; border-radius: 10px; border-left: 5px solid #3498db; }
        .business-card h3 { color: #2c3e50; margin-bottom: 15px; }
        .rating { color: #f39c12; font-weight: bold; margin: 10px 0; }
        .contact { color: #7f8c8d; font-size: 0.9em; margin: 10px 0; }
        .services { margin: 15px 0; }
        .address, .website, .hours { margin: 8px 0; font-size: 0.9em; color: #5a6c7d; }
        .website a { color: #3498db; text-decoration: none; }
        .faq-item { margin: 25px 0; background: #fafafa; padding: 20px; border-radius: 8px; }
        .faq-item h3 { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
        .tips-section, .cta-section { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; margin: 30px 0; border-radius: 12px; }
        .tips-section h2, .cta-section h2 { color: white; border: none; }
        .tips-section ul { list-style-type: none; padding: 0; }
        .tips-section li { background: rgba(255,255,255,0.15); margin: 12px 0; padding: 15px; border-radius: 8px; }
        h1 { color: #2c3e50; text-align: center; border-bottom: 3px solid #3498db; padding-bottom: 15px; }
        h2 { color: #34495e; border-left: 4px solid #3498db; padding-left: 15px; }
        .intro { font-size: 1.1em; color: #555; text-align: center; margin-bottom: 30px; }
        .stats { background: #e8f5e8; padding: 20px; border-radius: 10px; text-align: center; margin: 30px 0; }
        footer { text-align: center; padding: 20px; border-top: 1px solid #eee; margin-top: 40px; color: #7f8c8d; }
        footer a { color: #3498db; }
        @media (max-width: 768px) {
            .container { padding: 20px; margin: 10px; }
            h1 { font-size: 1.8em; }
        }"#;

fn business_card(position: usize, business: &Business) -> String {
    let name = business.display_name().unwrap_or("Mobile Groomer");
    let rating = business
        .rating
        .map(|rating| rating.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let services = if business.services.is_empty() {
        "Mobile grooming".to_string()
    } else {
        business
            .services
            .iter()
            .take(MAX_LISTED_SERVICES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut contact = Vec::new();
    if let Some(phone) = non_empty(&business.phone) {
        contact.push(format!("📞 {}", escape(phone)));
    }
    if let Some(price_range) = non_empty(&business.price_range) {
        contact.push(format!("💰 {}", escape(price_range)));
    }
    if let Some(service_time) = non_empty(&business.service_time) {
        contact.push(format!("⏱️ {}", escape(service_time)));
    }

    let mut card = String::new();
    let _ = write!(
        card,
        r#"
            <div class="business-card">
                <h3>#{position}. {name}</h3>
                <div class="rating">⭐ {rating}/5 ({review_count} reviews)</div>
                <div class="contact">{contact}</div>
                <div class="services"><strong>Services:</strong> {services}</div>"#,
        name = escape(name),
        review_count = business.review_count.unwrap_or(0),
        contact = contact.join(" | "),
        services = escape(&services),
    );
    if let Some(address) = non_empty(&business.address) {
        let _ = write!(card, "\n                <div class=\"address\">📍 {}</div>", escape(address));
    }
    if let Some(website) = non_empty(&business.website).filter(|url| is_web_url(url)) {
        let _ = write!(
            card,
            "\n                <div class=\"website\">🌐 <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Visit Website</a></div>",
            escape_url(website)
        );
    }
    if let Some(hours) = non_empty(&business.hours) {
        let _ = write!(card, "\n                <div class=\"hours\">🕒 {}</div>", escape(hours));
    }
    card.push_str("\n            </div>");
    card
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// Only http and https links are rendered.
fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn item_list(content: &CityContent) -> serde_json::Value {
    let items: Vec<_> = content
        .businesses
        .iter()
        .take(MAX_STRUCTURED_ITEMS)
        .enumerate()
        .map(|(index, business)| {
            json!({
                "@type": "LocalBusiness",
                "position": index + 1,
                "name": business.display_name().unwrap_or_default(),
                "telephone": business.phone.as_deref().unwrap_or_default(),
                "address": business.address.as_deref().unwrap_or_default(),
                "aggregateRating": {
                    "@type": "AggregateRating",
                    "ratingValue": business.rating.unwrap_or(5.0),
                    "reviewCount": business.review_count.unwrap_or(1),
                }
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "ItemList",
        "name": format!("Mobile Pet Grooming Services in {}, {}", content.city, content.state_abbr),
        "description": format!("Top-rated mobile pet grooming businesses serving {}", content.city),
        "numberOfItems": content.business_count,
        "itemListElement": items,
    })
}

pub(crate) fn footer(context: &RenderContext) -> String {
    format!(
        r#"        <footer>
            <p>&copy; {year} {site_name}. All rights reserved. | <a href="/privacy">Privacy Policy</a> | <a href="/terms">Terms of Service</a> | <a href="/contact">Contact</a> | <a href="/about">About Us</a></p>
            <p>Last updated: {date}</p>
        </footer>"#,
        year = context.year(),
        site_name = escape(&context.site_name),
        date = context.long_date(),
    )
}

/// Full HTML document for one city page.
pub fn render_city_page(content: &CityContent, context: &RenderContext) -> String {
    let city = escape(&content.city);
    let businesses: String = content
        .businesses
        .iter()
        .enumerate()
        .map(|(index, business)| business_card(index + 1, business))
        .collect();
    let tips: String = content
        .grooming_tips
        .iter()
        .map(|tip| format!("\n                <li>{}</li>", escape(tip)))
        .collect();
    let faqs: String = content
        .faqs
        .iter()
        .map(|faq| {
            format!(
                "\n            <div class=\"faq-item\">\n                <h3>{}</h3>\n                <p>{}</p>\n            </div>",
                escape(&faq.question),
                escape(&faq.answer)
            )
        })
        .collect();

    let body = format!(
        r#"    <div class="container">
        <h1>{h1}</h1>

        <div class="intro">{intro}</div>

        <div class="stats">
            <strong>📊 {count} Verified Mobile Groomers | ⭐ {avg_rating:.1} Average Rating | 📍 Serving {city} Area</strong>
        </div>

        <section class="businesses">
            <h2>🐕 Top Rated Mobile Pet Groomers in {city}</h2>{businesses}
        </section>

        <section class="tips-section">
            <h2>💡 Expert Grooming Tips for {city} Pet Owners</h2>
            <ul>{tips}
                <li><strong>Seasonal Tip:</strong> {seasonal_tip}</li>
            </ul>
        </section>

        <section class="faqs">
            <h2>❓ Frequently Asked Questions About Mobile Pet Grooming in {city}</h2>{faqs}
        </section>

        <div class="cta-section">
            <h2>Find Your Perfect Mobile Groomer in {city} 🚐✨</h2>
            <p>Contact any of the verified mobile groomers listed above to schedule your pet's appointment. Most offer online booking and can accommodate same-day requests!</p>
        </div>

{footer}
    </div>"#,
        h1 = escape(&content.h1),
        intro = escape(&content.intro),
        count = content.business_count,
        avg_rating = content.avg_rating,
        seasonal_tip = escape(&content.seasonal_tip),
        footer = footer(context),
    );

    PageShell {
        title: &content.title,
        description: &content.meta_description,
        canonical: context.url(&format!("/{}", content.url_slug)),
        json_ld: Some(item_list(content)),
        style: CITY_STYLE,
    }
    .wrap(&body)
}
