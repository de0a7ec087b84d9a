//! App version normalization
//!
//! The sink stores `app_version` as an integer built by concatenating the
//! numeric components of a dotted version: `"2.3.0"` becomes `230`.

use crate::domain::message::json_type_name;
use crate::domain::TransformError;
use serde_json::Value;

/// Normalize a dotted version string
///
/// # Errors
///
/// Returns [`TransformError::InvalidVersion`] for an empty string, an empty
/// or non-numeric component, or a result that does not fit an `i32`.
///
/// # Examples
///
/// ```
/// use veil::core::transform::normalize_version;
///
/// assert_eq!(normalize_version("2.3.0").unwrap(), 230);
/// assert_eq!(normalize_version("10.0.1").unwrap(), 1001);
/// assert!(normalize_version("1.a.2").is_err());
/// ```
pub fn normalize_version(version: &str) -> Result<i32, TransformError> {
    let invalid = || TransformError::InvalidVersion(version.to_string());

    let mut digits = String::with_capacity(version.len());
    for component in version.split('.') {
        if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.push_str(component);
    }

    digits.parse::<i32>().map_err(|_| invalid())
}

/// Normalize the `app_version` field of a message
///
/// Absent or null is invalid; an integral JSON number is taken as already
/// normalized.
pub(crate) fn normalize_version_value(value: Option<&Value>) -> Result<i32, TransformError> {
    match value {
        None | Some(Value::Null) => Err(TransformError::InvalidVersion(String::new())),
        Some(Value::String(s)) => normalize_version(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .filter(|v| *v >= 0)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| TransformError::InvalidVersion(n.to_string())),
        Some(other) => Err(TransformError::InvalidVersion(format!(
            "<{}>",
            json_type_name(other)
        ))),
    }
}
