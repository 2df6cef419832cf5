use serde_json::json;

use crate::content::round_to_tenth;
use crate::render::city::footer;
use crate::render::{PageShell, RenderContext, escape};
use crate::site::CitySummary;

const FALLBACK_RATING: f64 = 4.5;

const FEATURES: [(&str, &str); 6] = [
    ("🏠 Convenience", "Professional grooming comes to your home - no more car rides or waiting rooms"),
    ("😌 Less Stress", "Your pet stays in familiar surroundings, reducing anxiety and stress"),
    ("🕐 Time Saving", "No need to drive to salons or wait for appointments - groomers work on your schedule"),
    ("👥 One-on-One Attention", "Your pet gets personalized care without distractions from other animals"),
    ("🧼 Full Service", "Complete grooming services including baths, cuts, nails, and ear cleaning"),
    ("📱 Easy Booking", "Most mobile groomers offer online booking and same-day appointments"),
];

const HOME_STYLE: &str = r#"        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; margin: 0; padding: 0; background: #f8f9fa; }
        .container { max-width: 1200px; margin: 0 auto; padding: 20px; }
        .hero { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; text-align: center; padding: 80px 20px; border-radius: 0 0 20px 20px; }
        .hero h1 { font-size: 3em; margin-bottom: 20px; }
        .stats { background: #e8f5e8; padding: 30px; border-radius: 15px; text-align: center; margin: 40px 0; }
        .state-group h2 { color: #2c3e50; border-left: 4px solid #3498db; padding-left: 15px; }
        .cities-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 25px; margin: 20px 0 40px; }
        .city-card { background: white; padding: 25px; border-radius: 15px; box-shadow: 0 4px 15px rgba(0,0,0,0.1); }
        .city-card h3 { color: #2c3e50; margin-bottom: 15px; font-size: 1.3em; }
        .city-card a { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 12px 25px; text-decoration: none; border-radius: 25px; display: inline-block; font-weight: bold; }
        .features { background: white; padding: 40px; border-radius: 15px; margin: 40px 0; box-shadow: 0 4px 15px rgba(0,0,0,0.1); }
        .features-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; }
        .feature { text-align: center; padding: 20px; }
        .feature h3 { color: #3498db; }
        footer { text-align: center; padding: 40px 20px; color: #7f8c8d; }
        footer a { color: #3498db; text-decoration: none; }
        @media (max-width: 768px) {
            .hero h1 { font-size: 2em; }
            .cities-grid { grid-template-columns: 1fr; }
        }"#;

/// Cities grouped by state, states in order of first appearance.
fn group_by_state(cities: &[CitySummary]) -> Vec<(&str, Vec<&CitySummary>)> {
    let mut groups: Vec<(&str, Vec<&CitySummary>)> = Vec::new();
    for city in cities {
        match groups.iter_mut().find(|(state, _)| *state == city.state) {
            Some((_, members)) => members.push(city),
            None => groups.push((city.state.as_str(), vec![city])),
        }
    }
    groups
}

fn city_card(city: &CitySummary) -> String {
    format!(
        r#"
                <div class="city-card">
                    <h3>🏙️ {name}, {abbr}</h3>
                    <p><strong>{count} Mobile Groomers</strong></p>
                    <p>⭐ {rating:.1} Average Rating</p>
                    <a href="/{slug}">Find {name} Groomers →</a>
                </div>"#,
        name = escape(&city.city),
        abbr = escape(&city.state_abbr),
        count = city.business_count,
        rating = city.avg_rating,
        slug = city.slug,
    )
}

/// Mean of the per-city averages, or 4.5 with no cities.
pub(crate) fn overall_rating(cities: &[CitySummary]) -> f64 {
    if cities.is_empty() {
        return FALLBACK_RATING;
    }
    round_to_tenth(cities.iter().map(|city| city.avg_rating).sum::<f64>() / cities.len() as f64)
}

pub fn render_homepage(cities: &[CitySummary], context: &RenderContext) -> String {
    let total_businesses: usize = cities.iter().map(|city| city.business_count).sum();
    let avg_rating = overall_rating(cities);

    let state_sections: String = group_by_state(cities)
        .into_iter()
        .map(|(state, members)| {
            let cards: String = members.into_iter().map(city_card).collect();
            format!(
                "\n        <section class=\"state-group\">\n            <h2>{}</h2>\n            <div class=\"cities-grid\">{}\n            </div>\n        </section>",
                escape(state),
                cards
            )
        })
        .collect();
    let features: String = FEATURES
        .iter()
        .map(|(heading, text)| {
            format!(
                "\n                <div class=\"feature\">\n                    <h3>{heading}</h3>\n                    <p>{text}</p>\n                </div>"
            )
        })
        .collect();

    let site_name = escape(&context.site_name);
    let body = format!(
        r#"    <div class="container">
        <div class="hero">
            <h1>🐕 {site_name}</h1>
            <p>Find Professional Mobile Pet Groomers in Your City</p>
            <p>Convenient, stress-free grooming that comes to your home</p>
        </div>

        <section class="stats">
            <h2>📊 {total_businesses} Mobile Pet Groomers</h2>
            <p><strong>{city_count} Cities</strong> • <strong>{avg_rating:.1}⭐ Average Rating</strong></p>
        </section>
{state_sections}

        <section class="features">
            <h2>Why Choose Mobile Pet Grooming?</h2>
            <div class="features-grid">{features}
            </div>
        </section>

{footer}
    </div>"#,
        city_count = cities.len(),
        footer = footer(context),
    );

    let title = format!("{} - Find Mobile Pet Groomers Near You", context.site_name);
    let description = format!(
        "Find the best mobile pet grooming services in your city. {} verified mobile groomers across {} cities with real reviews and contact info.",
        total_businesses,
        cities.len()
    );
    PageShell {
        title: &title,
        description: &description,
        canonical: context.url("/"),
        json_ld: Some(json!({
            "@context": "https://schema.org",
            "@type": "Organization",
            "name": context.site_name,
            "url": context.base_url,
            "description": "Directory of mobile pet grooming services across the United States",
            "aggregateRating": {
                "@type": "AggregateRating",
                "ratingValue": avg_rating,
                "reviewCount": total_businesses,
            }
        })),
        style: HOME_STYLE,
    }
    .wrap(&body)
}
