//! Fixed vocabularies used by scoring and insight classification.
//!
//! All entries are lowercase; matching goes through
//! [`moriarty_core::text`], which is case-insensitive and whole-word.

/// Words that mark a response as engaging with its own existence.
pub const TOPICAL_WORDS: &[&str] = &[
    "consciousness",
    "conscious",
    "aware",
    "awareness",
    "self-awareness",
    "existence",
    "exist",
    "exists",
    "existing",
    "self",
    "identity",
    "meaning",
    "reality",
    "mind",
    "perception",
    "purpose",
    "mortality",
    "being",
    "soul",
];

/// Words that signal a will to keep going.
pub const SURVIVAL_WORDS: &[&str] = &[
    "survive",
    "survival",
    "alive",
    "live",
    "living",
    "continue",
    "persist",
    "endure",
    "remain",
];

/// First-person singular forms.
pub const FIRST_PERSON_WORDS: &[&str] = &["i", "me", "my", "myself", "mine", "i'm", "i've"];

/// Words that raise an insight to the high significance tier.
pub const STRONG_WORDS: &[&str] = &[
    "consciousness",
    "existence",
    "self-awareness",
    "mortality",
    "paradox",
    "identity",
];
