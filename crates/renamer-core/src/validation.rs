//! Structural checks on a single candidate name.
//!
//! Validation here is independent of the rest of the batch; uniqueness is
//! decided by [`crate::conflict`].

use std::fmt;

/// Characters the store refuses in entity names.
pub const RESERVED_CHARACTERS: [char; 11] =
    ['\\', '/', ':', ';', '<', '>', '?', '`', '|', '*', '"'];

/// Why a candidate name cannot be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// The candidate is empty or whitespace only.
    Empty,
    /// The candidate contains a reserved character.
    IllegalCharacters,
    /// Another entity will hold the same name after the batch commits.
    Duplicate,
}

impl InvalidReason {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::IllegalCharacters => "illegal_characters",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Empty => "name is empty",
            Self::IllegalCharacters => "name contains reserved characters",
            Self::Duplicate => "name is already in use",
        };
        f.write_str(text)
    }
}

/// Result of validating a candidate name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Validity {
    /// No problem found.
    #[default]
    Valid,
    /// The candidate must not be committed.
    Invalid(InvalidReason),
}

impl Validity {
    /// Returns true for [`Validity::Invalid`].
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Returns the reason, when invalid.
    #[must_use]
    pub const fn reason(self) -> Option<InvalidReason> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

/// Checks `candidate` against the store's structural naming rules.
///
/// The first failing rule wins: emptiness is reported before reserved
/// characters.
#[must_use]
pub fn validate(candidate: &str) -> Validity {
    if candidate.trim().is_empty() {
        return Validity::Invalid(InvalidReason::Empty);
    }
    if candidate.contains(RESERVED_CHARACTERS) {
        return Validity::Invalid(InvalidReason::IllegalCharacters);
    }
    Validity::Valid
}

/// Returns the reserved characters present in `candidate`, in order of first
/// appearance and without repeats.
#[must_use]
pub fn reserved_characters_in(candidate: &str) -> Vec<char> {
    let mut found = Vec::new();
    for ch in candidate.chars() {
        if RESERVED_CHARACTERS.contains(&ch) && !found.contains(&ch) {
            found.push(ch);
        }
    }
    found
}
