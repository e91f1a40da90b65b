//! Locale registry: Single source of truth for all supported locales.
//!
//! The registry is built once on first access (`OnceLock`) and is read-only
//! afterwards, so every request handler can share it without locking.

use std::sync::OnceLock;

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Locale identifier as it appears in URLs and bundle keys (e.g., "en", "zh-Hant")
    pub code: &'static str,

    /// English name of the locale (e.g., "English", "Traditional Chinese")
    pub name: &'static str,

    /// Native name of the locale (e.g., "English", "繁體中文")
    pub native_name: &'static str,

    /// Whether this is the default locale (only one should be true)
    pub is_default: bool,

    /// Whether this locale is enabled for use
    pub enabled: bool,
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Build a registry from an explicit list (used by tests).
    pub fn from_locales(locales: Vec<LocaleConfig>) -> Self {
        Self { locales }
    }

    /// Get a locale configuration by its code.
    ///
    /// Matching is exact and case-sensitive: `"zh-Hant"` and `"zh-hant"` are
    /// different keys.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// Get all enabled locales, in registry order.
    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    /// Get all locales (including disabled ones).
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    /// Get the default locale configuration.
    ///
    /// # Panics
    /// Panics if no default locale is found or if multiple default locales
    /// are defined (this indicates a configuration error).
    pub fn default_locale(&self) -> &LocaleConfig {
        let defaults: Vec<_> = self
            .locales
            .iter()
            .filter(|locale| locale.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default locale found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default locales found in registry"),
        }
    }

    /// Check if a locale code is supported and enabled.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.enabled)
            .unwrap_or(false)
    }
}

/// Default locale configurations.
fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            enabled: true,
        },
        LocaleConfig {
            code: "zh",
            name: "Simplified Chinese",
            native_name: "简体中文",
            is_default: false,
            enabled: true,
        },
        LocaleConfig {
            code: "zh-Hant",
            name: "Traditional Chinese",
            native_name: "繁體中文",
            is_default: false,
            enabled: true,
        },
        LocaleConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
            is_default: false,
            enabled: true,
        },
        LocaleConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_default: false,
            enabled: true,
        },
        LocaleConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
            is_default: false,
            enabled: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LocaleRegistry::get();
        let registry2 = LocaleRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let config = LocaleRegistry::get().get_by_code("en").unwrap();
        assert_eq!(config.code, "en");
        assert_eq!(config.name, "English");
        assert!(config.is_default);
        assert!(config.enabled);
    }

    #[test]
    fn test_get_by_code_is_case_sensitive() {
        let registry = LocaleRegistry::get();
        assert!(registry.get_by_code("zh-Hant").is_some());
        assert!(registry.get_by_code("zh-hant").is_none());
        assert!(registry.get_by_code("EN").is_none());
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LocaleRegistry::get().get_by_code("fr").is_none());
    }

    #[test]
    fn test_list_enabled_contains_all_six() {
        let enabled = LocaleRegistry::get().list_enabled();
        let codes: Vec<_> = enabled.iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["en", "zh", "zh-Hant", "ko", "es", "ja"]);
    }

    #[test]
    fn test_default_locale_is_english() {
        let default = LocaleRegistry::get().default_locale();
        assert_eq!(default.code, "en");
    }

    #[test]
    fn test_disabled_locale_not_supported() {
        let registry = LocaleRegistry::from_locales(vec![
            LocaleConfig {
                code: "en",
                name: "English",
                native_name: "English",
                is_default: true,
                enabled: true,
            },
            LocaleConfig {
                code: "ko",
                name: "Korean",
                native_name: "한국어",
                is_default: false,
                enabled: false,
            },
        ]);

        assert!(registry.is_supported("en"));
        assert!(!registry.is_supported("ko"));
        assert_eq!(registry.list_enabled().len(), 1);
        assert_eq!(registry.list_all().len(), 2);
    }

    #[test]
    #[should_panic(expected = "No default locale")]
    fn test_default_locale_missing_panics() {
        let registry = LocaleRegistry::from_locales(vec![]);
        registry.default_locale();
    }
}
