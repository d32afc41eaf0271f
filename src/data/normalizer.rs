// ============================================================
// Layer 4 — Text Normalizer
// ============================================================
// Cleans complaint narratives before tokenisation.
//
// Why do we need to clean text?
//   NHTSA summaries are consumer-typed free text containing:
//   - Decorative bullets and box characters (•, ●, ▪, □)
//   - Currency and accent marks (£, ¢, ´, ¨)
//   - Tab characters from copy-pasted tables
//   - Long runs of dashes and dots used as separators
//   - Inconsistent casing (many summaries are ALL CAPS)
//
// The same transform runs at dataset-build time and at
// inference time, so train/serve skew is impossible.
//
// Cleaning steps (applied in order):
//   1. Replace the fixed decorative symbol set with a space
//   2. Collapse runs of `-` into one `-`
//   3. Collapse runs of `.` into one `.`
//   4. Collapse whitespace runs into one space
//   5. Remove a trailing " ." before end-of-string
//   6. Lower-case and trim
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

/// The decorative/punctuation symbols that become a single space.
const STRIP_TO_SPACE: &[char] = &[
    '•', '●', '▪', '_', '·', '□', '»', '«', '#', '£', '¢', '¿', '&', '^', '~',
    '´', '`', '¨', '\t',
];

pub struct Normalizer;

impl Normalizer {
    /// Create a new Normalizer instance
    pub fn new() -> Self {
        Self
    }

    /// Normalize one complaint narrative.
    /// Pure and deterministic; idempotent by construction.
    pub fn clean(&self, text: &str) -> String {

        // ── Step 1: strip decorative symbols ─────────────────────────────────
        let step1: String = text
            .chars()
            .map(|c| if STRIP_TO_SPACE.contains(&c) { ' ' } else { c })
            .collect();

        // ── Steps 2–4: collapse runs of '-', '.' and whitespace ──────────────
        // One pass over the chars; each collapsible class only emits
        // its first character until a different character resets it.
        let mut step2 = String::with_capacity(step1.len());
        let mut prev: Option<char> = None;

        for c in step1.chars() {
            let emitted = if c.is_whitespace() { ' ' } else { c };
            let collapsible = emitted == ' ' || emitted == '-' || emitted == '.';

            if collapsible && prev == Some(emitted) {
                continue;
            }
            step2.push(emitted);
            prev = Some(emitted);
        }

        // ── Step 5: drop a trailing " ." ─────────────────────────────────────
        // The remainder may itself end in spaces or dots (e.g. ". .")
        // and naively re-appending '.' would create a fresh dot run
        // that only a second pass could collapse. Trim the whole
        // trailing space/dot run before closing with a single '.'.
        let step3 = match step2.strip_suffix(" .") {
            Some(rest) => format!("{}.", rest.trim_end_matches([' ', '.'])),
            None       => step2,
        };

        // ── Step 6: lower-case and trim ──────────────────────────────────────
        step3.to_lowercase().trim().to_string()
    }
}

/// Implement Default so Normalizer can be created with Normalizer::default()
impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        let n = Normalizer::new();
        assert_eq!(
            n.clean("Brake failure!!   •• multiple\t issues..."),
            "brake failure!! multiple issues."
        );
    }

    #[test]
    fn test_collapses_dash_and_dot_runs() {
        let n = Normalizer::new();
        assert_eq!(n.clean("stuck----open"), "stuck-open");
        assert_eq!(n.clean("it stopped....then restarted"), "it stopped.then restarted");
    }

    #[test]
    fn test_strips_trailing_space_dot() {
        let n = Normalizer::new();
        assert_eq!(n.clean("the airbag failed ."), "the airbag failed.");
        // Alternating space/dot tails collapse to a single dot
        assert_eq!(n.clean("the airbag failed . ."), "the airbag failed.");
        assert_eq!(n.clean("the airbag failed. . ."), "the airbag failed.");
    }

    #[test]
    fn test_empty_string() {
        let n = Normalizer::new();
        assert_eq!(n.clean(""), "");
    }

    #[test]
    fn test_plain_text_only_lowercased_and_trimmed() {
        let n = Normalizer::new();
        assert_eq!(n.clean("  The Engine Stalled  "), "the engine stalled");
    }

    #[test]
    fn test_idempotent() {
        let n = Normalizer::new();
        for input in [
            "Brake failure!!   •• multiple\t issues...",
            "£500 repair bill -- dealer refused",
            "  plain text  ",
            "a . .",
            "it finally gave out . . .",
            " .",
            "",
        ] {
            let once  = n.clean(input);
            let twice = n.clean(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_output_invariants() {
        let n = Normalizer::new();
        for input in [
            "a\t\tb", "a      b", "ends with .", "ends with . .",
            "dots..... and --- dashes \t",
        ] {
            let out = n.clean(input);
            assert!(!out.contains('\t'));
            assert!(!out.contains("  "));
            assert!(!out.contains(".."));
            assert!(!out.ends_with(" ."));
        }
    }
}
