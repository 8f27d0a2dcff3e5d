//! Composite identifier codec
//!
//! Some resources have multi-field primary keys; the host only stores one
//! opaque string. The codec joins the parts with a per-resource delimiter
//! (`|`, `,` or `/` — chosen from characters the underlying values cannot
//! contain, so no escaping is needed) and is the only component allowed to
//! split the identifier back apart.

use crate::error::ProviderError;

/// Join identifier parts with the resource's delimiter
pub fn encode_composite_id(parts: &[&str], delimiter: char) -> String {
    parts.join(&delimiter.to_string())
}

/// Split a composite identifier, verifying the expected part count
///
/// `part_names` documents the format; a malformed identifier produces an
/// error naming it (e.g. `expected patch-group,baseline-id`).
pub fn decode_composite_id(
    id: &str,
    delimiter: char,
    part_names: &[&str],
) -> Result<Vec<String>, ProviderError> {
    let parts: Vec<&str> = id.split(delimiter).collect();
    if parts.len() != part_names.len() || parts.iter().any(|p| p.is_empty()) {
        return Err(ProviderError::InvalidId {
            id: id.to_string(),
            expected: part_names.join(&delimiter.to_string()),
        });
    }
    Ok(parts.into_iter().map(str::to_string).collect())
}
