//! Unique cleanup tags for insert probes.
//!
//! Every record a probe creates carries a tag-derived name so the cleanup
//! pass can delete exactly what this run inserted, keeping the shared
//! backing store idempotent across runs.

/// Random hex suffix length in bytes (8 hex chars).
const SUFFIX_BYTES: usize = 4;

/// Errors raised while generating a run tag.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("failed to source randomness for run tag: {0}")]
    Randomness(String),
}

/// Generate a fresh run tag, e.g. `rowscan-3fa9c21b`.
///
/// # Errors
///
/// Returns [`TagError::Randomness`] if the OS randomness source fails.
pub fn unique_tag(prefix: &str) -> Result<String, TagError> {
    let mut bytes = [0u8; SUFFIX_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| TagError::Randomness(e.to_string()))?;
    let suffix: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("{prefix}-{suffix}"))
}

/// The display name given to a record created under `tag` by `identity_tag`.
///
/// Both halves are embedded so a leaked record is attributable from the
/// backend's dashboard alone.
#[must_use]
pub fn tagged_record_name(tag: &str, identity_tag: &str) -> String {
    format!("rowscan probe record {tag} ({identity_tag})")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tags_carry_prefix_and_hex_suffix() {
        let tag = unique_tag("rowscan").expect("randomness should be available");
        let suffix = tag.strip_prefix("rowscan-").expect("prefix should match");
        assert_eq!(suffix.len(), SUFFIX_BYTES * 2);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_tags_differ() {
        let a = unique_tag("rowscan").expect("randomness should be available");
        let b = unique_tag("rowscan").expect("randomness should be available");
        assert_ne!(a, b);
    }

    #[test]
    fn record_names_embed_tag_and_identity() {
        let name = tagged_record_name("rowscan-00ff00ff", "attacker");
        assert_eq!(name, "rowscan probe record rowscan-00ff00ff (attacker)");
    }
}
