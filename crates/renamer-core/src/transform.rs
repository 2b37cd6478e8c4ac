//! Name transforms: find/replace with optional wildcards, then prefix, then suffix.
//!
//! A [`TransformSpec`] is compiled once per recomputation pass into a
//! [`CompiledTransform`], which is then applied to every name in the batch.
//! Compilation never fails from the caller's point of view: a pattern the
//! regex engine refuses degrades to a pass-through transform that returns
//! names verbatim and carries a [`TransformDiagnostic`].
//!
//! # Wildcards
//!
//! A `find` string containing `?` or `*` is a wildcard pattern. `?` matches
//! exactly one character and `*` matches any run of characters, including an
//! empty one. Every other character matches itself. Matches are substrings,
//! not whole names, so `W?ll` rewrites the `Wall` inside `Wall-Type`.

use std::fmt;

use regex::{NoExpand, Regex, RegexBuilder};

/// Upper bound on the compiled size of a find pattern, in bytes.
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

const WILDCARD_ONE: char = '?';
const WILDCARD_ANY: char = '*';

/// The operator's transform configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformSpec {
    /// Text or wildcard pattern to search for. Empty disables find/replace.
    pub find: String,
    /// Literal replacement text for each match.
    pub replace: String,
    /// Text prepended to every name unless already present.
    pub prefix: String,
    /// Text appended to every name unless already present.
    pub suffix: String,
    /// Match `find` without regard to case.
    pub ignore_case: bool,
}

impl TransformSpec {
    /// Creates an empty spec; applying it leaves every name unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the find and replace strings.
    #[must_use]
    pub fn with_find(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.find = find.into();
        self.replace = replace.into();
        self
    }

    /// Sets the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets case-insensitive matching.
    #[must_use]
    pub fn ignoring_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Returns true when `find` contains wildcard metacharacters.
    #[must_use]
    pub fn uses_wildcards(&self) -> bool {
        self.find.contains([WILDCARD_ONE, WILDCARD_ANY])
    }

    /// Returns true when applying it cannot change any name.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.find.is_empty() && self.prefix.is_empty() && self.suffix.is_empty()
    }
}

/// Describes a find pattern the engine could not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformDiagnostic {
    pattern: String,
    message: String,
}

impl TransformDiagnostic {
    /// Builds a diagnostic for `pattern`.
    #[must_use]
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// The find text that failed to compile.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Why it failed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransformDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unusable find pattern '{}': {}", self.pattern, self.message)
    }
}

#[derive(Debug, Clone)]
enum Finder {
    Skip,
    Literal { find: String, replace: String },
    Pattern { regex: Regex, replace: String },
}

#[derive(Debug, Clone)]
enum Stage {
    Rewrite {
        finder: Finder,
        prefix: String,
        suffix: String,
    },
    Passthrough {
        diagnostic: TransformDiagnostic,
    },
}

/// A [`TransformSpec`] ready to be applied to many names.
#[derive(Debug, Clone)]
pub struct CompiledTransform {
    stage: Stage,
}

impl CompiledTransform {
    /// Compiles `spec`.
    ///
    /// A pattern the regex engine rejects yields a pass-through transform;
    /// inspect [`CompiledTransform::diagnostic`] to find out why.
    #[must_use]
    pub fn compile(spec: &TransformSpec) -> Self {
        let stage = match build_finder(spec) {
            Ok(finder) => Stage::Rewrite {
                finder,
                prefix: spec.prefix.clone(),
                suffix: spec.suffix.clone(),
            },
            Err(diagnostic) => {
                tracing::warn!(
                    pattern = %diagnostic.pattern(),
                    reason = %diagnostic.message(),
                    "find pattern rejected; names will pass through unchanged"
                );
                Stage::Passthrough { diagnostic }
            }
        };
        Self { stage }
    }

    /// Returns the compilation diagnostic, if the pattern was unusable.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&TransformDiagnostic> {
        match &self.stage {
            Stage::Passthrough { diagnostic } => Some(diagnostic),
            Stage::Rewrite { .. } => None,
        }
    }

    /// Returns true when the find step would rewrite part of `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match &self.stage {
            Stage::Rewrite { finder, .. } => match finder {
                Finder::Skip => false,
                Finder::Literal { find, .. } => name.contains(find.as_str()),
                Finder::Pattern { regex, .. } => regex.is_match(name),
            },
            Stage::Passthrough { .. } => false,
        }
    }

    /// Produces the candidate name for `original`.
    ///
    /// Find/replace runs first, then the prefix, then the suffix. The result
    /// is not trimmed or normalised.
    #[must_use]
    pub fn apply(&self, original: &str) -> String {
        let Stage::Rewrite {
            finder,
            prefix,
            suffix,
        } = &self.stage
        else {
            return original.to_owned();
        };

        let mut name = match finder {
            Finder::Skip => original.to_owned(),
            Finder::Literal { find, replace } => original.replace(find.as_str(), replace),
            Finder::Pattern { regex, replace } => regex
                .replace_all(original, NoExpand(replace.as_str()))
                .into_owned(),
        };

        if !prefix.is_empty() && !name.starts_with(prefix.as_str()) {
            name.insert_str(0, prefix);
        }
        if !suffix.is_empty() && !name.ends_with(suffix.as_str()) {
            name.push_str(suffix);
        }
        name
    }
}

/// Applies `spec` to a single name.
///
/// Convenience for one-off use; batches should compile once with
/// [`CompiledTransform::compile`].
#[must_use]
pub fn apply(original: &str, spec: &TransformSpec) -> String {
    CompiledTransform::compile(spec).apply(original)
}

fn build_finder(spec: &TransformSpec) -> Result<Finder, TransformDiagnostic> {
    if spec.find.is_empty() {
        return Ok(Finder::Skip);
    }

    let pattern = if spec.uses_wildcards() {
        wildcard_to_pattern(&spec.find)
    } else if spec.ignore_case {
        regex::escape(&spec.find)
    } else {
        return Ok(Finder::Literal {
            find: spec.find.clone(),
            replace: spec.replace.clone(),
        });
    };

    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(spec.ignore_case)
        .dot_matches_new_line(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|error| TransformDiagnostic::new(spec.find.as_str(), error.to_string()))?;

    Ok(Finder::Pattern {
        regex,
        replace: spec.replace.clone(),
    })
}

/// Translates a shell-style wildcard string into an unanchored regex.
fn wildcard_to_pattern(find: &str) -> String {
    let mut pattern = String::with_capacity(find.len() * 2);
    let mut buffer = [0_u8; 4];
    for ch in find.chars() {
        match ch {
            WILDCARD_ONE => pattern.push('.'),
            WILDCARD_ANY => pattern.push_str(".*"),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut buffer))),
        }
    }
    pattern
}
