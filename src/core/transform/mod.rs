//! Data transformation logic
//!
//! Reshapes one raw queue message into an [`OutputRecord`](crate::domain::OutputRecord):
//!
//! 1. `ip` and `device_id` must be present, non-empty strings
//! 2. `app_version` is normalized to an integer (`"2.3.0"` → `230`)
//! 3. `locale` defaults to `"NA"`
//! 4. `ip` and `device_id` are replaced by their pseudonyms
//! 5. `create_date` is stamped with the current UTC date
//!
//! `user_id` and `device_type` are passed through unvalidated.

pub mod record;
pub mod version;

pub use record::{sensitive_fields, RecordTransformer, DEFAULT_LOCALE};
pub use version::normalize_version;
