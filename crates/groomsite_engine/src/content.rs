use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::warn;

use crate::business::Business;
use crate::cities::City;
use crate::enhance::FALLBACK_PRICE_RANGE;
use crate::random::{pick, pick_many};

const DEFAULT_RATING: f64 = 4.5;

const INTRO_TEMPLATES: [&str; 3] = [
    "Looking for professional mobile pet grooming in {city}? These verified local businesses bring salon-quality grooming directly to your home. We've researched and compiled the top-rated mobile pet groomers serving {city} and surrounding areas.",
    "Transform your pet's grooming experience with trusted mobile services in {city}. Skip the stress of traditional salons and enjoy the convenience of professional groomers who come to you. Here are the best mobile pet grooming services in {city}, {state}.",
    "Discover {city}'s premier mobile pet grooming professionals. These licensed and insured groomers provide full-service care in the comfort of your own driveway, making grooming stress-free for both you and your furry family members.",
];

const GROOMING_TIPS: [&str; 10] = [
    "Brush your pet regularly between mobile grooming appointments to prevent matting and reduce shedding",
    "Mobile grooming reduces anxiety for pets who get stressed in traditional salon environments",
    "Schedule regular nail trims every 4-6 weeks to maintain your pet's comfort and health",
    "Ask your mobile groomer about seasonal coat treatments for your local climate",
    "Keep your pet calm during mobile grooming by staying nearby during the first few appointments",
    "Mobile groomers often provide more personalized attention since they focus on one pet at a time",
    "Ensure your mobile groomer is licensed and insured for your protection",
    "Mobile grooming is ideal for elderly pets who struggle with car travel",
    "Ask about package deals for multiple pets in the same household",
    "Mobile grooming eliminates exposure to other animals and potential illnesses",
];

const SEASONAL_TIPS: [&str; 4] = [
    "Spring shedding season calls for professional de-shedding treatments",
    "Summer grooming helps keep pets cool and prevents overheating",
    "Fall coat preparation helps pets adapt to changing temperatures",
    "Winter grooming maintains coat health despite indoor heating",
];

const FAQ_COUNT: usize = 3;
const TIP_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

impl Faq {
    fn new(question: String, answer: String) -> Self {
        Self { question, answer }
    }
}

/// Everything a city page shows, in plain text. Escaping happens when rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CityContent {
    pub title: String,
    pub meta_description: String,
    pub h1: String,
    pub intro: String,
    pub businesses: Vec<Business>,
    pub faqs: Vec<Faq>,
    pub grooming_tips: Vec<String>,
    pub seasonal_tip: String,
    pub city: String,
    pub state: String,
    pub state_abbr: String,
    pub business_count: usize,
    pub avg_rating: f64,
    pub url_slug: String,
}

/// Mean rating with missing ratings counted as 4.5, rounded to one decimal.
pub fn average_rating(businesses: &[Business]) -> f64 {
    if businesses.is_empty() {
        return DEFAULT_RATING;
    }
    let total: f64 = businesses
        .iter()
        .map(|business| business.rating.unwrap_or(DEFAULT_RATING))
        .sum();
    round_to_tenth(total / businesses.len() as f64)
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn faq_pool(city: &City, typical_range: &str, avg_rating: f64) -> Vec<Faq> {
    let City { city, state, .. } = city;
    vec![
        Faq::new(
            format!("How much does mobile pet grooming cost in {city}?"),
            format!("Mobile pet grooming in {city} typically costs {typical_range} depending on your pet's size and services needed. Our listed groomers offer competitive pricing with the convenience of coming to your home."),
        ),
        Faq::new(
            format!("Which mobile pet groomers in {city} have the best reviews?"),
            format!("The mobile groomers listed above maintain an average rating of {avg_rating:.1} stars from local {city} customers. We've verified all businesses and their review scores from Google and other platforms."),
        ),
        Faq::new(
            format!("Do mobile pet groomers in {city} service both dogs and cats?"),
            format!("Yes! Most mobile groomers in {city} service both dogs and cats. Mobile grooming is especially beneficial for cats who get stressed by car travel and unfamiliar environments."),
        ),
        Faq::new(
            format!("How far do mobile groomers travel in the {city} area?"),
            format!("Mobile groomers in {city} typically service a 15-20 mile radius. Many of our listed groomers also serve surrounding communities in {state}. Contact them directly to confirm service to your specific location."),
        ),
        Faq::new(
            format!("What should I expect during a mobile grooming appointment in {city}?"),
            format!("Mobile groomers in {city} arrive with fully equipped vans or trailers. Most appointments take 1-2 hours and include everything from basic washing to full grooming services. You'll just need to provide access to electricity and water."),
        ),
        Faq::new(
            format!("Are mobile pet groomers in {city} licensed and insured?"),
            format!("Professional mobile groomers in {city} should be licensed and insured. Always verify credentials before booking and ask about their insurance coverage for your peace of mind."),
        ),
        Faq::new(
            format!("How often should I schedule mobile grooming for my pet in {city}?"),
            format!("Most pets in {city} benefit from professional grooming every 4-8 weeks, depending on breed and coat type. Your mobile groomer can recommend the best schedule for your pet's specific needs."),
        ),
    ]
}

/// Compose the page content for `city`, or `None` when there is nothing to list.
///
/// All prose choices come from `rng`, so a seeded generator gives identical pages.
pub fn compose_city_content(city: &City, businesses: Vec<Business>, rng: &mut impl Rng) -> Option<CityContent> {
    if businesses.is_empty() {
        warn!(location = %city.location_key(), "no valid businesses, skipping city page");
        return None;
    }
    let count = businesses.len();
    let avg_rating = average_rating(&businesses);
    let typical_range = businesses
        .iter()
        .find_map(|business| business.price_range.as_deref().filter(|range| !range.is_empty()))
        .unwrap_or(FALLBACK_PRICE_RANGE)
        .to_string();

    let intro = pick(rng, &INTRO_TEMPLATES)
        .replace("{city}", &city.city)
        .replace("{state}", &city.state);
    let faqs = faq_pool(city, &typical_range, avg_rating)
        .choose_multiple(rng, FAQ_COUNT)
        .cloned()
        .collect();
    let grooming_tips = pick_many(rng, &GROOMING_TIPS, TIP_COUNT)
        .into_iter()
        .map(String::from)
        .collect();
    let seasonal_tip = pick(rng, &SEASONAL_TIPS).to_string();

    Some(CityContent {
        title: format!(
            "Best Mobile Pet Grooming in {}, {} - {} Top Rated Services",
            city.city, city.state_abbr, count
        ),
        meta_description: format!(
            "Find the best mobile pet grooming in {}. {} verified local groomers with real reviews. Professional at-home pet grooming services.",
            city.city, count
        ),
        h1: format!("Mobile Pet Grooming in {}, {}", city.city, city.state_abbr),
        intro,
        businesses,
        faqs,
        grooming_tips,
        seasonal_tip,
        city: city.city.clone(),
        state: city.state.clone(),
        state_abbr: city.state_abbr.clone(),
        business_count: count,
        avg_rating,
        url_slug: city.slug(),
    })
}
