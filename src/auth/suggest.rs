//! Username suggestions.
//!
//! The raw input is reduced to a base name, then `base`, `base2`, `base3`,
//! ... are tried in order until five free names are found or suffix 999
//! is exhausted.

use std::collections::HashSet;

use crate::db::{DbPool, UserRepository};
use crate::Result;

/// Number of suggestions returned at most.
pub const MAX_SUGGESTIONS: usize = 5;

/// Highest numeric suffix tried.
pub const MAX_SUFFIX: u32 = 999;

/// Base used when nothing usable survives normalization.
pub const FALLBACK_BASE: &str = "user";

/// Reduce raw input to a base username.
///
/// Returns `None` for blank input. Otherwise keeps only alphanumerics and
/// `_` of the trimmed, lower-cased input, falling back to `"user"`.
pub fn base_username(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let base: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if base.is_empty() {
        Some(FALLBACK_BASE.to_string())
    } else {
        Some(base)
    }
}

/// Candidate for a given suffix; suffix 1 is the bare base.
fn candidate(base: &str, suffix: u32) -> String {
    if suffix == 1 {
        base.to_string()
    } else {
        format!("{base}{suffix}")
    }
}

/// Pure suggestion core. `is_taken` receives lower-case candidates.
pub fn suggest_with<F>(raw: &str, is_taken: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let Some(base) = base_username(raw) else {
        return Vec::new();
    };

    (1..=MAX_SUFFIX)
        .map(|suffix| candidate(&base, suffix))
        .filter(|name| !is_taken(name))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggest up to five available usernames for `raw`.
pub async fn suggest_usernames(pool: &DbPool, raw: &str) -> Result<Vec<String>> {
    let Some(base) = base_username(raw) else {
        return Ok(Vec::new());
    };

    let taken: HashSet<String> = UserRepository::new(pool)
        .usernames_with_prefix(&base)
        .await?
        .into_iter()
        .collect();

    Ok(suggest_with(raw, |name| taken.contains(name)))
}
