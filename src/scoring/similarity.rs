//! Normalized edit-distance similarity between a heard transcript and a target

/// Characters removed before comparison
const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Lowercase, strip punctuation and trim surrounding whitespace
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect();
    stripped.trim().to_string()
}

/// Levenshtein distance with unit insert/delete/substitute costs
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows over `b`
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity in [0.0, 1.0]; 1.0 iff both strings are equal after normalization.
pub fn similarity(heard: &str, target: &str) -> f64 {
    let heard = normalize(heard);
    let target = normalize(target);

    if heard == target {
        return 1.0;
    }
    if heard.is_empty() || target.is_empty() {
        return 0.0;
    }

    let heard: Vec<char> = heard.chars().collect();
    let target: Vec<char> = target.chars().collect();

    let distance = levenshtein(&heard, &target);
    let max_len = heard.len().max(target.len());
    (max_len - distance) as f64 / max_len as f64
}
