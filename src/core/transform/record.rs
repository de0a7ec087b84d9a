//! Message-to-record transformation

use crate::core::transform::version::normalize_version_value;
use crate::domain::{Category, OutputRecord, RawMessage, SensitiveField, TransformError};
use crate::pseudonymization::Pseudonymizer;
use chrono::{NaiveDate, Utc};

/// Locale written when a message carries none
pub const DEFAULT_LOCALE: &str = "NA";

/// Turns raw messages into pseudonymized output records
///
/// Every check runs before any pseudonym is issued, so a rejected message
/// leaves the stores untouched.
pub struct RecordTransformer {
    pseudonymizer: Pseudonymizer,
    locale_default: String,
}

impl RecordTransformer {
    pub fn new(pseudonymizer: Pseudonymizer) -> Self {
        Self {
            pseudonymizer,
            locale_default: DEFAULT_LOCALE.to_string(),
        }
    }

    /// Override the locale used when a message has none
    pub fn with_locale_default(mut self, locale: impl Into<String>) -> Self {
        self.locale_default = locale.into();
        self
    }

    /// Transform a message, stamping today's UTC date
    pub fn transform(&mut self, raw: &RawMessage) -> Result<OutputRecord, TransformError> {
        self.transform_on(raw, Utc::now().date_naive())
    }

    /// Transform a message, stamping `create_date`
    ///
    /// # Errors
    ///
    /// - [`TransformError::MissingField`] if `ip` or `device_id` is absent, null or empty
    /// - [`TransformError::InvalidFieldType`] if either is not a string
    /// - [`TransformError::InvalidVersion`] if `app_version` cannot be normalized
    pub fn transform_on(
        &mut self,
        raw: &RawMessage,
        create_date: NaiveDate,
    ) -> Result<OutputRecord, TransformError> {
        let [ip, device] = sensitive_fields(raw)?;
        let app_version = normalize_version_value(raw.get("app_version"))?;
        let locale = raw
            .passthrough("locale")
            .unwrap_or_else(|| self.locale_default.clone());

        let masked_ip = self.pseudonymizer.pseudonymize_field(&ip);
        let masked_device_id = self.pseudonymizer.pseudonymize_field(&device);

        Ok(OutputRecord {
            user_id: raw.passthrough("user_id"),
            app_version,
            device_type: raw.passthrough("device_type"),
            masked_ip,
            locale,
            masked_device_id,
            create_date,
        })
    }

    pub fn pseudonymizer(&self) -> &Pseudonymizer {
        &self.pseudonymizer
    }

    pub fn pseudonymizer_mut(&mut self) -> &mut Pseudonymizer {
        &mut self.pseudonymizer
    }
}

/// The required sensitive fields of a message, IP first
pub fn sensitive_fields(raw: &RawMessage) -> Result<[SensitiveField; 2], TransformError> {
    let ip = raw.required_str(Category::Ip.source_field())?;
    let device = raw.required_str(Category::Device.source_field())?;
    Ok([SensitiveField::ip(ip), SensitiveField::device(device)])
}
