//! Internationalization (i18n): supported locales and their message bundles.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported locales and the default
//! - `locale`: Validated `Locale` type
//! - `messages`: Message bundles and the per-request loader
//! - `validator`: Bundle coverage checks against the default locale
//! - `metrics`: Bundle load counters
//!
//! # Example
//!
//! ```rust,ignore
//! use site_portal::i18n::{Locale, MessageLoader};
//!
//! let locale = Locale::from_code("zh-Hant")?;
//! let messages = MessageLoader::embedded().load(locale.code()).await;
//! let title = messages.text("blog.title");
//! ```

mod locale;
mod messages;
mod metrics;
mod registry;
mod validator;

pub use locale::Locale;
pub use messages::{MessageBundle, MessageError, MessageLoader, MessageSource};
pub use metrics::{LoadMetrics, LoadReport};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use validator::{BundleValidator, ValidationReport};
