//! Deterministic, store-backed pseudonymization
//!
//! The pseudonym of a value is the salted digest of the value. The first time
//! a value is seen in a category the pair is recorded in that category's
//! store; later calls return the recorded pseudonym without growing the
//! store. Returning the recorded value (rather than recomputing) keeps
//! previously issued pseudonyms stable if the salt is rotated.

use crate::config::SecretString;
use crate::domain::{Category, SensitiveField, StoreError};
use crate::pseudonymization::digest::digest;
use crate::pseudonymization::store::StoreSet;
use secrecy::ExposeSecret;

/// Pseudonymizer for every category, sharing one salt
pub struct Pseudonymizer {
    salt: SecretString,
    stores: StoreSet,
    created: usize,
}

impl Pseudonymizer {
    pub fn new(salt: SecretString, stores: StoreSet) -> Self {
        Self {
            salt,
            stores,
            created: 0,
        }
    }

    /// Pseudonym for `value` in `category`
    ///
    /// Idempotent: repeated calls with the same arguments return the same
    /// string and only the first call can insert into the store.
    pub fn pseudonymize(&mut self, category: Category, value: &str) -> String {
        let store = self.stores.get_mut(category);
        if let Some(existing) = store.lookup_forward(value) {
            return existing.to_string();
        }

        let pseudonym = digest(value, self.salt.expose_secret().as_ref());
        if store.upsert(value.to_string(), pseudonym.clone()) {
            self.created += 1;
            tracing::trace!(category = %category, pseudonym = %pseudonym, "New pseudonym");
        }
        pseudonym
    }

    pub fn pseudonymize_field(&mut self, field: &SensitiveField) -> String {
        self.pseudonymize(field.category, &field.value)
    }

    /// Original value behind `pseudonym`, if this deployment issued it
    pub fn reverse(&self, pseudonym: &str, category: Category) -> Result<Option<&str>, StoreError> {
        self.stores.get(category).lookup_reverse(pseudonym)
    }

    /// Flush every store changed since its last flush
    ///
    /// Returns the categories that were written.
    pub fn flush_dirty(&mut self) -> Result<Vec<Category>, StoreError> {
        let mut flushed = Vec::new();
        for category in Category::ALL {
            let store = self.stores.get_mut(category);
            if store.is_dirty() {
                store.flush()?;
                flushed.push(category);
            }
        }
        Ok(flushed)
    }

    /// Number of pairs inserted by this instance
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn stores(&self) -> &StoreSet {
        &self.stores
    }
}
