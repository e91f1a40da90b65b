use anyhow::{Context, Result};
use site_portal::config::Config;
use site_portal::i18n::{BundleValidator, LocaleRegistry, MessageLoader};
use site_portal::server::{build_app, AppState};
use tracing::{error, info, warn};

/// Check every locale's bundle against the default locale's and log gaps.
async fn validate_bundles(loader: &MessageLoader) {
    let registry = LocaleRegistry::get();
    let default_code = registry.default_locale().code;

    let reference = match loader.try_load(default_code).await {
        Ok(bundle) => bundle,
        Err(e) => {
            error!("Default locale bundle failed to load: {}", e);
            return;
        }
    };

    for config in registry.list_enabled() {
        if config.code == default_code {
            continue;
        }
        let candidate = match loader.try_load(config.code).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("Bundle for '{}' failed to load: {}", config.code, e);
                continue;
            }
        };

        let report = BundleValidator::validate(&reference, &candidate);
        for message in &report.errors {
            warn!("[{}] {}", config.code, message);
        }
        for message in &report.warnings {
            info!("[{}] {}", config.code, message);
        }
        if report.is_clean() {
            info!("Bundle for '{}' covers all {} keys", config.code, reference.keys().len());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_portal=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting site portal");

    // Load configuration from environment
    let config = Config::from_env()?;
    let port = config.port;

    let state = AppState::new(config);
    validate_bundles(&state.messages).await;

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
