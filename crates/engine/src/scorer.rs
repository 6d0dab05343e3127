/// Abstraction over the fuzzy text-similarity heuristic used for exclusion
/// matching, so tests can substitute a deterministic scorer.
pub trait SimilarityScorer: Send + Sync {
    /// Similarity between free text and a phrase, 0–100.
    fn score(&self, text: &str, phrase: &str) -> u8;
}

/// Partial-ratio similarity: the shorter string is slid across every
/// equal-length window of the longer one and the best Levenshtein ratio
/// wins. A short exclusion phrase buried inside a long statement line still
/// scores high.
#[derive(Debug, Default)]
pub struct PartialRatioScorer;

impl SimilarityScorer for PartialRatioScorer {
    fn score(&self, text: &str, phrase: &str) -> u8 {
        partial_ratio(text, phrase)
    }
}

fn partial_ratio(s1: &str, s2: &str) -> u8 {
    let a: Vec<char> = s1.to_lowercase().chars().collect();
    let b: Vec<char> = s2.to_lowercase().chars().collect();

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if shorter.is_empty() {
        return if longer.is_empty() { 100 } else { 0 };
    }

    let mut best = 0.0f64;
    for start in 0..=(longer.len() - shorter.len()) {
        let window = &longer[start..start + shorter.len()];
        let distance = levenshtein(shorter, window);
        let ratio = 1.0 - distance as f64 / shorter.len() as f64;
        if ratio > best {
            best = ratio;
        }
        if best == 1.0 {
            break;
        }
    }

    (best * 100.0).round() as u8
}

/// Two-row Levenshtein over chars. Statement text is Thai, so byte-wise
/// distance would overcount.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let (m, n) = (a.len(), b.len());
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
