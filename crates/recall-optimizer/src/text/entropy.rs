use std::collections::BTreeMap;

/// Bits of entropy treated as the ceiling for natural-language text.
pub const MAX_ENTROPY_BITS: f64 = 6.6;

/// Shannon entropy of the lowercase character distribution, scaled by
/// [`MAX_ENTROPY_BITS`] and capped at 1.
pub fn normalized_entropy(text: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in text.chars().flat_map(char::to_lowercase) {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let bits: f64 = counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();
    (bits / MAX_ENTROPY_BITS).min(1.0)
}
