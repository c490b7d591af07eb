//! create-stripe-product - provision the report product and its price
//!
//! Reads `STRIPE_SECRET_KEY`, creates the product and a fixed EUR price,
//! and prints the ids as `KEY=value` lines ready for an env file.

use anyhow::{bail, Result};
use astromatch_common::config::DEFAULT_STRIPE_BASE;
use astromatch_web::checkout::{StripeClient, StripeError, CURRENCY, PRICE_CENTS};
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let secret_key = match std::env::var("STRIPE_SECRET_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            error!("STRIPE_SECRET_KEY is not set");
            bail!("missing STRIPE_SECRET_KEY");
        }
    };

    let client = StripeClient::new(DEFAULT_STRIPE_BASE, secret_key.trim(), Duration::from_secs(30))?;

    let product = match client.provision_product().await {
        Ok(product) => product,
        Err(StripeError::Authentication(message)) => {
            error!("Stripe rejected the secret key: {}", message);
            bail!("authentication failed");
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Created product {} with price {} ({} cents {})",
        product.product_id, product.price_id, PRICE_CENTS, CURRENCY
    );
    println!("STRIPE_PRODUCT_ID={}", product.product_id);
    println!("STRIPE_PRICE_ID={}", product.price_id);

    Ok(())
}
