//! Admin CLI for the category taxonomy
//!
//! Usage:
//!   cargo run --bin admin -- categories                # Print the hierarchy (default locale)
//!   cargo run --bin admin -- categories --locale ko    # Print with Korean titles
//!   cargo run --bin admin -- delete-category <id>      # Delete a category
//!
//! Required environment variables:
//! - CMS_API_URL, DB_URL, DB_ANON_KEY
//! - CMS_TOKEN (for delete-category)

use anyhow::{bail, Context, Result};
use site_portal::config::Config;
use site_portal::content::CmsClient;
use site_portal::i18n::Locale;
use site_portal::optimistic::{apply_remove, OptimisticList};
use site_portal::taxonomy::{build_hierarchy, order_categories, Category};
use tracing::{error, info};

fn usage() -> &'static str {
    "usage: admin categories [--locale <code>] | admin delete-category <id>"
}

fn print_categories(categories: &[Category], locale: Locale) {
    let hierarchy = build_hierarchy(categories, locale);
    if hierarchy.is_empty() {
        println!("(no categories)");
        return;
    }

    for row in hierarchy.rows() {
        let indent = "  ".repeat(row.depth as usize);
        println!(
            "{}{}  [{}] ({} posts)",
            indent, row.display_title, row.category.id, row.category.post_count
        );
    }
    if !hierarchy.orphans.is_empty() {
        println!("\n{} orphaned categories listed last", hierarchy.orphans.len());
    }
}

async fn list(cms: &CmsClient, args: &[String]) -> Result<()> {
    let locale = match args.iter().position(|arg| arg == "--locale") {
        Some(index) => {
            let code = args.get(index + 1).context("--locale needs a value")?;
            Locale::from_code(code)?
        }
        None => Locale::default_locale(),
    };

    let categories = cms.list_categories().await?;
    info!("Fetched {} categories", categories.len());
    print_categories(&categories, locale);
    Ok(())
}

async fn delete(cms: &CmsClient, id: &str) -> Result<()> {
    let locale = Locale::default_locale();
    let mut list = OptimisticList::new(order_categories(&cms.list_categories().await?, locale));

    if !list.contains(id) {
        bail!("No category with id '{}'", id);
    }

    match apply_remove(&mut list, id, cms.delete_category(id)).await {
        Ok(()) => {
            info!("Deleted category {}", id);
            print_categories(list.items(), locale);
            Ok(())
        }
        Err(e) => {
            error!("Delete failed, list restored: {}", e);
            print_categories(list.items(), locale);
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("admin=info".parse()?)
                .add_directive("site_portal=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_env()?;
    let cms = CmsClient::new(&config);

    match args.first().map(String::as_str) {
        Some("categories") => list(&cms, &args[1..]).await,
        Some("delete-category") => {
            let id = args.get(1).context(usage())?;
            delete(&cms, id).await
        }
        _ => bail!(usage()),
    }
}
