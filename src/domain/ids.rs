//! OrderCloud identifier sanitization
//!
//! OrderCloud resource IDs only allow `[A-Za-z0-9_]`. Every source
//! identifier, display name, or composite key that becomes a destination
//! resource ID passes through [`sanitize`], so re-runs always resolve the
//! same source entity to the same destination ID.

/// Sanitizes an arbitrary source identifier into a valid OrderCloud ID.
///
/// Replaces every character outside `[A-Za-z0-9_]` with `_`. Total and
/// deterministic; the empty string maps to the empty string.
pub fn sanitize(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
