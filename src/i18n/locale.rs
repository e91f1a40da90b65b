//! Locale type: a locale code validated against the registry.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// A validated locale.
///
/// Only supported, enabled locales can be constructed, so holding a `Locale`
/// means its bundle key and URL prefix are known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    pub const ENGLISH: Locale = Locale { code: "en" };

    /// Create a Locale from a locale code string.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the code is registered and enabled
    /// * `Err` if the code is unknown or disabled
    pub fn from_code(code: &str) -> Result<Locale> {
        Self::from_registry(LocaleRegistry::get(), code)
    }

    /// Same as [`Locale::from_code`] but against an explicit registry.
    pub fn from_registry(registry: &LocaleRegistry, code: &str) -> Result<Locale> {
        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale { code: config.code }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// The global registry's default locale.
    pub fn default_locale() -> Locale {
        Self::default_in(LocaleRegistry::get())
    }

    /// The default locale of an explicit registry.
    pub fn default_in(registry: &LocaleRegistry) -> Locale {
        Locale {
            code: registry.default_locale().code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full configuration from the global registry.
    ///
    /// # Panics
    /// Panics if the code is not in the global registry, which can only
    /// happen for a Locale built from a custom registry.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::default_locale()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
