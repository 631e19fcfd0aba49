//! Key normalization for repeat-group exports.
//!
//! Child rows exported from a repeat group reference their submission with a
//! compound path such as `uuid:1234/Antibioticform/Core_variables[1]`. Only the
//! leading segment identifies the parent submission.

/// Substring that marks the form segment of a compound key.
pub const FORM_MARKER: &str = "form/";

/// Extract the leading identifier from a compound key.
///
/// Keys without a form segment are returned unchanged.
pub fn normalize_key(raw: &str) -> &str {
    let Some(marker_at) = raw.find(FORM_MARKER) else {
        return raw;
    };
    match raw[..marker_at].rfind('/') {
        Some(slash) => &raw[..slash],
        None => raw,
    }
}
