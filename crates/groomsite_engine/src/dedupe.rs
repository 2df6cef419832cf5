use std::collections::HashSet;

use crate::business::Business;

/// Drop records whose `(name, phone)` pair was already seen, keeping the first occurrence
/// and the original order.
pub fn dedupe(businesses: Vec<Business>) -> Vec<Business> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    businesses
        .into_iter()
        .filter(|business| {
            let (name, phone) = business.identity();
            seen.insert((name.to_string(), phone.to_string()))
        })
        .collect()
}
