//! Versioned clinical vocabulary for turn classification.
//!
//! The classifier is a pure, case-insensitive substring check against a
//! fixed term list. Keeping the vocabulary here as versioned data (rather
//! than literals scattered through the router) makes classification
//! independently testable and auditable when terms change.

/// Vocabulary revision, bumped whenever [`TERMS`] changes.
pub const VERSION: u32 = 1;

/// Clinical vocabulary: symptom, medication, lab, and treatment terms.
pub const TERMS: &[&str] = &[
    "symptom",
    "pain",
    "swelling",
    "medication",
    "side effect",
    "blood",
    "urine",
    "pressure",
    "kidney",
    "dialysis",
    "transplant",
    "doctor",
    "treatment",
    "diagnosis",
    "test",
    "lab",
    "medical",
];

/// Returns `true` if the message contains any clinical vocabulary term.
///
/// Case-insensitive substring containment; deterministic and side-effect
/// free.
#[must_use]
pub fn is_clinical(message: &str) -> bool {
    let lowered = message.to_lowercase();
    TERMS.iter().any(|term| lowered.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("I have pain in my lower back", true; "symptom term")]
    #[test_case("What are the side effects of my medication?", true; "medication terms")]
    #[test_case("My KIDNEY hurts", true; "case insensitive")]
    #[test_case("When is my next dialysis session?", true; "treatment term")]
    #[test_case("Hello, my name is John Smith", false; "greeting")]
    #[test_case("What time is my appointment?", false; "administrative")]
    #[test_case("", false; "empty message")]
    #[test_case("The latest test results", true; "lab term")]
    fn test_is_clinical(message: &str, expected: bool) {
        assert_eq!(is_clinical(message), expected);
    }

    #[test]
    fn test_every_term_triggers() {
        for term in TERMS {
            assert!(is_clinical(term), "term '{term}' should classify clinical");
            let upper = term.to_uppercase();
            assert!(is_clinical(&upper), "term '{upper}' should classify clinical");
        }
    }

    #[test]
    fn test_terms_are_lowercase() {
        // Containment matches against a lowercased message, so terms must
        // themselves be lowercase.
        for term in TERMS {
            assert_eq!(*term, term.to_lowercase());
        }
    }

    #[test]
    fn test_version_positive() {
        assert!(VERSION >= 1);
    }
}
