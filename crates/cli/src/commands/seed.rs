//! Seed the storefront catalog from a YAML file.
//!
//! ```yaml
//! - name: Tomato
//!   price: "40.00"
//!   image: tomato.jpg
//! - name: Spinach
//!   price: "25"
//!   image: spinach.png
//! ```
//!
//! Image files are expected to already be in the upload directory; only the
//! filename is stored. Products whose name already exists are skipped.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use greengrocer_core::{ImageFilename, Price};
use greengrocer_storefront::config::StorefrontConfig;
use greengrocer_storefront::db::{self, ProductRepository, products::ProductInput};

/// One catalog entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub price: String,
    pub image: String,
}

/// Insert products from a YAML file.
///
/// Every entry is validated before the database is touched.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, an entry is invalid,
/// or a database operation fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let entries: Vec<SeedProduct> = serde_yaml::from_str(&content)?;

    let mut validated = Vec::with_capacity(entries.len());
    for entry in &entries {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err("product name must not be empty".into());
        }
        let price = Price::parse(&entry.price)
            .map_err(|e| format!("invalid price for {name}: {e}"))?;
        let image = ImageFilename::sanitize(&entry.image)
            .map_err(|e| format!("invalid image for {name}: {e}"))?;
        validated.push((name, price, image));
    }
    info!(products = validated.len(), "Parsed catalog");

    let config = StorefrontConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::migrate(&pool).await?;
    let repo = ProductRepository::new(&pool);

    let mut inserted = 0_usize;
    for (name, price, image) in &validated {
        if repo.name_exists(name).await? {
            warn!(name = %name, "Product already exists, skipping");
            continue;
        }

        if !config.upload_dir.join(image.as_str()).exists() {
            warn!(image = %image, "Image file not found in upload directory");
        }

        repo.create(ProductInput {
            name,
            price,
            image,
        })
        .await?;
        inserted += 1;
    }

    info!(inserted, skipped = validated.len() - inserted, "Seeding complete");
    Ok(())
}
