// Veil - Pseudonymizing queue-to-PostgreSQL loader
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - pseudonymizing queue loader
//!
//! Veil pulls login events from an SQS-compatible queue, replaces the IP
//! address and device identifier of each event with a deterministic
//! pseudonym, and loads the result into PostgreSQL.
//!
//! ## Architecture
//!
//! - [`domain`] - Messages, records, categories and the error taxonomy
//! - [`pseudonymization`] - Salted digests backed by durable mapping files
//! - [`core`] - Record transformation and batch orchestration
//! - [`adapters`] - Queue and sink integrations
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Pseudonyms
//!
//! A pseudonym is the lowercase hex SHA-256 of `value ++ salt`. Every pair
//! issued is recorded per category (`ip.csv`, `device.csv`), so the same
//! value always gets the same pseudonym and a pseudonym can be reversed by
//! lookup.
//!
//! ```rust
//! use veil::config::secret_string;
//! use veil::domain::Category;
//! use veil::pseudonymization::{PseudonymStore, Pseudonymizer, ReverseLookup, StoreSet};
//!
//! let stores = StoreSet::from_stores(
//!     PseudonymStore::empty(Category::Ip, "ip.csv", ReverseLookup::OnDemand),
//!     PseudonymStore::empty(Category::Device, "device.csv", ReverseLookup::OnDemand),
//! );
//! let mut pseudonymizer = Pseudonymizer::new(secret_string("pepper".to_string()), stores);
//!
//! let masked = pseudonymizer.pseudonymize(Category::Ip, "10.0.0.1");
//! assert_eq!(masked.len(), 64);
//! assert_eq!(pseudonymizer.pseudonymize(Category::Ip, "10.0.0.1"), masked);
//! assert_eq!(pseudonymizer.reverse(&masked, Category::Ip).unwrap(), Some("10.0.0.1"));
//! ```
//!
//! ## Error Handling
//!
//! Per-message problems ([`domain::TransformError`]) and rejected rows
//! ([`domain::SinkError::WriteFailed`]) are counted and the batch carries
//! on. Queue failures, lost database connections and mapping file I/O
//! failures abort the batch with a [`domain::VeilError`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod pseudonymization;
