//! Pseudonymization module for Veil
//!
//! Replaces IP addresses and device identifiers with salted SHA-256 digests
//! and remembers every issued pseudonym so it can be looked up in reverse.
//!
//! # Architecture
//!
//! - **Digest**: hex SHA-256 of `value ++ salt`
//! - **Store**: per-category mapping file, loaded at start and flushed at batch boundaries
//! - **Pseudonymizer**: computes or recalls pseudonyms and records new ones
//! - **Lock**: keeps concurrent runs off the same mapping directory
//!
//! # Usage
//!
//! ```rust,no_run
//! use veil::config::secret_string;
//! use veil::domain::Category;
//! use veil::pseudonymization::{Pseudonymizer, ReverseLookup, StoreSet};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stores = StoreSet::load(Path::new("mappings"), ReverseLookup::OnDemand)?;
//! let mut pseudonymizer = Pseudonymizer::new(secret_string("salt".to_string()), stores);
//!
//! let masked = pseudonymizer.pseudonymize(Category::Ip, "10.0.0.1");
//! assert_eq!(pseudonymizer.reverse(&masked, Category::Ip)?, Some("10.0.0.1"));
//! pseudonymizer.flush_dirty()?;
//! # Ok(())
//! # }
//! ```

pub mod digest;
pub mod lock;
pub mod pseudonymizer;
pub mod store;

pub use lock::MappingLock;
pub use pseudonymizer::Pseudonymizer;
pub use store::{PseudonymStore, ReverseLookup, StoreSet};
