// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Non-empty string validation for provider configuration
//!
//! Base URLs and API keys are wrapped in [`NonEmptyString`] so a client can
//! never be built around a blank value.
//!
//! ```rust
//! use external_apis::NonEmptyString;
//!
//! let key = NonEmptyString::new("alchemy-key").unwrap();
//! assert_eq!(key.as_str(), "alchemy-key");
//! assert!(NonEmptyString::new(" \t").is_err());
//! assert_eq!(NonEmptyString::optional(Some("  ".to_string())), None);
//! ```

use core::fmt;
use std::str::FromStr;

/// A string holding at least one non-whitespace character
#[derive(Clone, PartialEq, Eq)]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Validates and wraps `s`
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.trim().is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(s.into_boxed_str()))
        }
    }

    /// Treats blank values as absent
    pub fn optional(s: Option<String>) -> Option<Self> {
        s.and_then(|s| Self::new(s).ok())
    }

    /// The wrapped value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Values are often API keys, so they stay out of debug output.
impl fmt::Debug for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NonEmptyString(<{} chars>)", self.0.chars().count())
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
