//! Result type alias for Veil

use super::errors::VeilError;

/// Result type alias for Veil operations
///
/// # Examples
///
/// ```
/// use veil::domain::result::Result;
/// use veil::domain::errors::VeilError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(VeilError::Configuration("missing salt".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, VeilError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::StoreError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> std::result::Result<u32, StoreError> {
            Ok(7)
        }

        let value = inner()?;
        assert_eq!(value, 7);
        Ok(())
    }

    #[test]
    fn test_store_error_converts_into_result() {
        fn inner() -> Result<()> {
            Err(StoreError::io("device.csv", "permission denied"))?;
            Ok(())
        }

        let err = inner().unwrap_err();
        assert!(matches!(err, VeilError::Store(StoreError::Io { .. })));
        assert!(err.to_string().contains("device.csv"));
    }
}
