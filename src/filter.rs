//! Canonicalization of caller-supplied stage/status tokens into the labels
//! the remote store filters on.

/// Status token that maps to [`OPEN_STATUS_LABEL`].
pub const OPEN_STATUS_TOKEN: &str = "aberto";
/// Remote label for the "open" status category.
pub const OPEN_STATUS_LABEL: &str = "Em aberto";

/// Normalized stage/status pair sent to the remote store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub stage: String,
    pub status: String,
}

impl Filter {
    pub fn normalized(stage: &str, status: &str) -> Self {
        Self {
            stage: normalize_stage(stage),
            status: normalize_status(status),
        }
    }
}

/// `"aberto"` in any case becomes `"Em aberto"`; anything else is lowercased
/// and gets an uppercase first character.
pub fn normalize_status(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if lower == OPEN_STATUS_TOKEN {
        return OPEN_STATUS_LABEL.to_owned();
    }
    capitalize_first(&lower)
}

/// Lowercases the token and uppercases its first character.
pub fn normalize_stage(raw: &str) -> String {
    capitalize_first(&raw.trim().to_lowercase())
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
