pub mod config;
pub mod content;
pub mod i18n;
pub mod optimistic;
pub mod routing;
pub mod security;
pub mod server;
pub mod taxonomy;
