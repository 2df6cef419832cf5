use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// A seeded generator when `seed` is set, otherwise one drawn from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// One element of a non-empty table.
pub(crate) fn pick<'a>(rng: &mut impl Rng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// `count` distinct elements in random order, fewer if the table is shorter.
pub(crate) fn pick_many<'a>(rng: &mut impl Rng, options: &[&'a str], count: usize) -> Vec<&'a str> {
    options.choose_multiple(rng, count).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_choices() {
        let options = ["a", "b", "c", "d", "e"];
        let first: Vec<_> = (0..10).map(|_| pick(&mut make_rng(Some(3)), &options)).collect();
        let second: Vec<_> = (0..10).map(|_| pick(&mut make_rng(Some(3)), &options)).collect();
        assert_eq!(first, second);

        let mut a = make_rng(Some(11));
        let mut b = make_rng(Some(11));
        assert_eq!(pick_many(&mut a, &options, 3), pick_many(&mut b, &options, 3));
    }

    #[test]
    fn test_pick_many_is_distinct() {
        let options = ["a", "b", "c", "d", "e"];
        let mut rng = make_rng(Some(5));
        let mut chosen = pick_many(&mut rng, &options, 3);
        chosen.sort();
        chosen.dedup();
        assert_eq!(chosen.len(), 3);
        assert_eq!(pick_many(&mut rng, &options, 9).len(), 5);
    }
}
