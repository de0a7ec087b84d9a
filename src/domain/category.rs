//! Sensitive field categories
//!
//! Each category is an independent pseudonym namespace: the same string seen
//! as an IP address and as a device identifier gets two unrelated mappings.

use crate::domain::{Result, VeilError};
use std::fmt;
use std::str::FromStr;

/// Namespace of a pseudonymized field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Client IP address (`ip` message field)
    Ip,
    /// Device identifier (`device_id` message field)
    Device,
}

impl Category {
    /// Every category, in mapping-file load order
    pub const ALL: [Category; 2] = [Category::Ip, Category::Device];

    /// Stable label used in logs and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ip => "ip",
            Category::Device => "device",
        }
    }

    /// Message field holding the raw value for this category
    pub fn source_field(&self) -> &'static str {
        match self {
            Category::Ip => "ip",
            Category::Device => "device_id",
        }
    }

    /// Mapping file name inside the mapping directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Ip => "ip.csv",
            Category::Device => "device.csv",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = VeilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ip" => Ok(Category::Ip),
            "device" | "device_id" => Ok(Category::Device),
            _ => Err(VeilError::Configuration(format!(
                "Invalid category: {s}. Expected 'ip' or 'device'"
            ))),
        }
    }
}

/// A raw sensitive value tagged with its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveField {
    pub category: Category,
    pub value: String,
}

impl SensitiveField {
    pub fn new(category: Category, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }

    pub fn ip(value: impl Into<String>) -> Self {
        Self::new(Category::Ip, value)
    }

    pub fn device(value: impl Into<String>) -> Self {
        Self::new(Category::Device, value)
    }
}
