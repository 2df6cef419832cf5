use rand::Rng;
use rand::rngs::StdRng;

use crate::business::{Business, Review};
use crate::cities::City;
use crate::random::{make_rng, pick, pick_many};
use crate::source::BusinessSource;

const PREFIXES: [&str; 13] = [
    "Mobile", "VIP", "Premier", "Luxury", "Elite", "Happy", "Pampered", "Professional", "Express",
    "Gentle", "Royal", "Golden", "Diamond",
];

const MIDDLE_TERMS: [&str; 8] = ["Pet", "Dog", "Pup", "Paws", "Furry", "K9", "Canine", "Pooch"];

const SUFFIXES: [&str; 10] = [
    "Spa",
    "Grooming",
    "Salon",
    "Mobile Grooming",
    "Pet Services",
    "Care",
    "Styling",
    "Wellness",
    "Mobile Spa",
    "Grooming Co",
];

const CITY_NAME_TEMPLATES: [&str; 5] = [
    "{city} Mobile Pet Spa",
    "{city} Pet Grooming",
    "Mobile Groomers of {city}",
    "{city} Dog Wash",
    "{city} Pet Care Mobile",
];

const CREATIVE_NAME_TEMPLATES: [&str; 5] = [
    "Paws & Suds Mobile {city}",
    "{city} Doggy Day Spa Mobile",
    "Scrub-A-Pup {city}",
    "{city} Mobile Pet Pampering",
    "Fur-Get-Me-Not Mobile Grooming",
];

const SERVICES: [&str; 18] = [
    "Full-service grooming",
    "Bath and brush out",
    "Nail trimming and filing",
    "Ear cleaning and plucking",
    "Sanitary trimming",
    "De-shedding treatment",
    "Flea and tick treatment",
    "Teeth brushing",
    "De-matting service",
    "Breed-specific cuts",
    "Show dog grooming",
    "Puppy introduction packages",
    "Senior dog gentle care",
    "Cat grooming specialist",
    "Hand scissoring",
    "Blow dry and brush out",
    "Aromatherapy baths",
    "Nail polish application",
];

const REVIEW_TEMPLATES: [&str; 8] = [
    "Amazing service! {name} came right to our house and my dog {dog_name} looked fantastic. Very professional and gentle.",
    "I've been using {name} for months now. They're always on time and {dog_name} actually enjoys grooming day now!",
    "Best mobile groomer in {city}! {name} is so patient with anxious dogs. Highly recommend for busy pet parents.",
    "Professional service from start to finish. {name} brought everything needed and left {dog_name} looking like a show dog.",
    "Love the convenience of mobile grooming. {name} is skilled and {dog_name} stays calm in our familiar environment.",
    "Excellent work by {name}. {dog_name} has never looked better! Will definitely book again.",
    "Great experience with {name}. They were gentle with {dog_name} and very reasonably priced for the quality.",
    "Finally found a groomer {dog_name} likes! {name} is professional and the mobile setup is spotless.",
];

const DOG_NAMES: [&str; 16] = [
    "Buddy", "Luna", "Charlie", "Bella", "Max", "Lucy", "Cooper", "Daisy", "Rocky", "Molly", "Duke",
    "Sadie", "Bear", "Lola", "Tucker", "Sophie",
];

const OWNER_NAMES: [&str; 12] = [
    "Sarah M.", "Mike R.", "Jennifer L.", "David S.", "Lisa K.", "John D.", "Amanda T.", "Chris W.",
    "Rachel P.", "Mark H.", "Jessica C.", "Ryan B.",
];

const PRICE_RANGES: [&str; 6] = ["$45-75", "$55-85", "$65-95", "$50-80", "$60-100", "$70-110"];

const SERVICE_TIMES: [&str; 4] = ["45-75 minutes", "60-90 minutes", "75-105 minutes", "50-80 minutes"];

const HOURS: [&str; 5] = [
    "Monday-Saturday 8AM-6PM",
    "Tuesday-Saturday 9AM-5PM",
    "Monday-Friday 8AM-6PM, Saturday 9AM-4PM",
    "By appointment - 7 days a week",
    "Monday-Saturday 7AM-7PM",
];

const SPECIALTIES: [&str; 9] = [
    "Anxiety-friendly techniques",
    "Senior dog specialists",
    "Show dog preparation",
    "Flea treatment experts",
    "Large breed specialists",
    "Cat grooming available",
    "Eco-friendly products",
    "Breed-specific styling",
    "Puppy introduction packages",
];

const FALLBACK_AREA_CODE: &str = "555";

fn area_codes(state: &str) -> &'static [&'static str] {
    match state {
        "Texas" => &["214", "469", "972", "945"],
        "Arizona" => &["480", "602", "623", "928"],
        "North Carolina" => &["919", "984", "336", "704"],
        "Missouri" => &["816", "975"],
        "New Mexico" => &["505", "575"],
        "Florida" => &["813", "727", "863"],
        "Colorado" => &["719", "303"],
        _ => &[FALLBACK_AREA_CODE],
    }
}

/// Fabricates plausible listings when no Places API key is available.
pub struct SyntheticSource<R: Rng = StdRng> {
    rng: R,
}

impl SyntheticSource {
    pub fn from_seed(seed: Option<u64>) -> Self {
        Self::new(make_rng(seed))
    }
}

impl<R: Rng> SyntheticSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate_business(&mut self, city: &City) -> Business {
        generate_business(&mut self.rng, city)
    }
}

impl<R: Rng> BusinessSource for SyntheticSource<R> {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn businesses_for(&mut self, city: &City) -> Vec<Business> {
        let count = self.rng.random_range(4..=7);
        (0..count).map(|_| self.generate_business(city)).collect()
    }
}

pub fn generate_name(rng: &mut impl Rng, city: &str) -> String {
    match rng.random_range(0..3) {
        0 => format!(
            "{} {} {}",
            pick(rng, &PREFIXES),
            pick(rng, &MIDDLE_TERMS),
            pick(rng, &SUFFIXES)
        ),
        1 => pick(rng, &CITY_NAME_TEMPLATES).replace("{city}", city),
        _ => pick(rng, &CREATIVE_NAME_TEMPLATES).replace("{city}", city),
    }
}

pub fn generate_phone(rng: &mut impl Rng, state: &str) -> String {
    let area_code = pick(rng, area_codes(state));
    format!(
        "({}) {}-{}",
        area_code,
        rng.random_range(200..=999),
        rng.random_range(1000..=9999)
    )
}

/// `https://` + up to 15 alphanumeric characters of the name + the city, lower-cased.
pub fn website_for(name: &str, city: &str) -> String {
    let name_part: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(15)
        .collect();
    let city_part: String = city.chars().filter(char::is_ascii_alphanumeric).collect();
    format!(
        "https://{}{}.com",
        name_part.to_lowercase(),
        city_part.to_lowercase()
    )
}

fn generate_reviews(rng: &mut impl Rng, business_name: &str, city: &str) -> Vec<Review> {
    let short_name = business_name.split_whitespace().next().unwrap_or(business_name);
    let count = rng.random_range(2..=3);
    (0..count)
        .map(|_| {
            let text = pick(rng, &REVIEW_TEMPLATES)
                .replace("{name}", short_name)
                .replace("{dog_name}", pick(rng, &DOG_NAMES))
                .replace("{city}", city);
            Review {
                text,
                rating: rng.random_range(4..=5),
                author: pick(rng, &OWNER_NAMES).to_string(),
            }
        })
        .collect()
}

pub fn generate_business(rng: &mut impl Rng, city: &City) -> Business {
    let name = generate_name(rng, &city.city);
    let phone = generate_phone(rng, &city.state);
    let rating = (rng.random_range(4.2..=4.9_f64) * 10.0).round() / 10.0;
    let review_count = rng.random_range(45..=280);
    let service_count = rng.random_range(4..=7);
    let services = pick_many(rng, &SERVICES, service_count)
        .into_iter()
        .map(String::from)
        .collect();
    let reviews = generate_reviews(rng, &name, &city.city);
    Business {
        rating: Some(rating),
        review_count: Some(review_count),
        phone: Some(phone),
        address: Some(format!("Serving {}, {} and surrounding areas", city.city, city.state)),
        services,
        price_range: Some(pick(rng, &PRICE_RANGES).to_string()),
        service_time: Some(pick(rng, &SERVICE_TIMES).to_string()),
        reviews,
        hours: Some(pick(rng, &HOURS).to_string()),
        website: Some(website_for(&name, &city.city)),
        specialty: Some(pick(rng, &SPECIALTIES).to_string()),
        years_experience: Some(rng.random_range(3..=15)),
        serving_area: Some(format!(
            "{} and {} mile radius",
            city.city,
            rng.random_range(15..=25)
        )),
        ..Business::named(name)
    }
}
