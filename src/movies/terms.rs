use rand::Rng;

/// Vocabulary the random batches are drawn from.
pub const SEARCH_TERMS: [&str; 20] = [
    "love", "war", "space", "hero", "time", "dark", "light", "life", "death", "dream", "king",
    "star", "power", "magic", "world", "night", "day", "shadow", "fire", "water",
];

/// Fisher-Yates over a copy of the vocabulary.
pub fn shuffle_terms<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static str> {
    let mut terms = SEARCH_TERMS.to_vec();
    shuffle(&mut terms, rng);
    terms
}

pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
