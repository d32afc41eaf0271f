// ============================================================
// Layer 4 — Seeded Sampling and Stratified Splitting
// ============================================================
// All random choices in the dataset pipeline go through these
// helpers, driven by a single caller-owned StdRng. Given the
// same input order and the same seed the output is identical
// byte for byte — dataset builds are reproducible.
//
// Why stratify the train/eval split?
//   The balanced pool has equal class counts by construction.
//   A naive random split could still hand one class mostly to
//   eval; splitting per class preserves every class's
//   proportion in both subsets.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom
// which is the standard unbiased shuffle algorithm.
//
// Reference: rand crate documentation
//            Rust Book §8 (Vectors)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::example::LabeledExample;

/// Sample exactly `n` items without replacement, preserving
/// nothing about the original order. `n` must be <= items.len().
pub fn sample_exact<T>(mut items: Vec<T>, n: usize, rng: &mut StdRng) -> Vec<T> {
    items.shuffle(rng);
    items.truncate(n);
    items
}

/// Shuffle `items` and split at `round(len * train_fraction)`.
/// Returns (train, rest).
pub fn shuffle_and_split<T>(
    mut items: Vec<T>,
    train_fraction: f64,
    rng: &mut StdRng,
) -> (Vec<T>, Vec<T>) {
    items.shuffle(rng);

    let total    = items.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let rest = items.split_off(split_at);
    (items, rest)
}

/// Stratified split of labelled examples: shuffle and split each
/// class separately, then concatenate. Classes are visited in the
/// order given by `class_order` so the result is deterministic.
pub fn stratified_split(
    examples: Vec<LabeledExample>,
    train_fraction: f64,
    class_order: &[&str],
    rng: &mut StdRng,
) -> (Vec<LabeledExample>, Vec<LabeledExample>) {
    let mut train = Vec::with_capacity(examples.len());
    let mut eval  = Vec::new();

    for class in class_order {
        let members: Vec<LabeledExample> = examples
            .iter()
            .filter(|e| e.label == *class)
            .cloned()
            .collect();

        let (mut t, mut e) = shuffle_and_split(members, train_fraction, rng);
        train.append(&mut t);
        eval.append(&mut e);
    }

    tracing::debug!(
        "Stratified split: {} training, {} evaluation",
        train.len(),
        eval.len(),
    );

    (train, eval)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize>  = (0..100).collect();
        let (train, rest)      = shuffle_and_split(items, 0.8, &mut rng());
        assert_eq!(train.len(), 80);
        assert_eq!(rest.len(),  20);
    }

    #[test]
    fn test_all_items_preserved() {
        // No items should be lost in the split
        let items: Vec<usize> = (0..50).collect();
        let (train, rest)     = shuffle_and_split(items, 0.7, &mut rng());
        assert_eq!(train.len() + rest.len(), 50);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, rest)     = shuffle_and_split(items, 0.8, &mut rng());
        assert!(train.is_empty());
        assert!(rest.is_empty());
    }

    #[test]
    fn test_sample_exact_is_deterministic() {
        let items: Vec<usize> = (0..30).collect();
        let a = sample_exact(items.clone(), 10, &mut rng());
        let b = sample_exact(items, 10, &mut rng());
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn test_stratified_split_preserves_class_proportions() {
        let mut examples = Vec::new();
        for i in 0..40 {
            examples.push(LabeledExample::new(format!("brake {i}"), "SERVICE BRAKES"));
        }
        for i in 0..40 {
            examples.push(LabeledExample::new(format!("airbag {i}"), "AIR BAGS"));
        }

        let order = ["SERVICE BRAKES", "AIR BAGS"];
        let (train, eval) = stratified_split(examples, 0.8, &order, &mut rng());

        assert_eq!(train.len(), 64);
        assert_eq!(eval.len(),  16);
        for class in order {
            assert_eq!(train.iter().filter(|e| e.label == class).count(), 32);
            assert_eq!(eval.iter().filter(|e| e.label == class).count(),  8);
        }
    }
}
