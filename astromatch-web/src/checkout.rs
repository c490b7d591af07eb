//! Hosted checkout (Stripe)
//!
//! Creates checkout sessions for the full report and provisions the
//! product/price pair used by the `create-stripe-product` tool. All calls
//! are form-encoded with the secret key as bearer token.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use astromatch_common::models::CheckoutRequest;

/// Report price in cents
pub const PRICE_CENTS: u32 = 990;
pub const CURRENCY: &str = "eur";
/// Product name used when provisioning a fixed price
pub const PRODUCT_NAME: &str = "AstroMatch - Rapport de Compatibilité";

/// Stripe client errors
#[derive(Debug, Error)]
pub enum StripeError {
    /// Missing, invalid or revoked secret key
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Stripe error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StripeError {
    fn from(err: reqwest::Error) -> Self {
        StripeError::Network(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

/// Product and price created by [`StripeClient::provision_product`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedProduct {
    pub product_id: String,
    pub price_id: String,
}

/// Success URL; Stripe substitutes the session id placeholder
pub fn success_url(origin: &str) -> String {
    format!(
        "{}/full-report?session_id={{CHECKOUT_SESSION_ID}}",
        origin.trim_end_matches('/')
    )
}

pub fn cancel_url(origin: &str) -> String {
    format!("{}/", origin.trim_end_matches('/'))
}

/// Form fields of a one-item payment session
pub fn checkout_form(request: &CheckoutRequest, price_id: Option<&str>, origin: &str) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), success_url(origin)),
        ("cancel_url".to_string(), cancel_url(origin)),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "metadata[person1_firstname]".to_string(),
            request.person1_firstname.clone(),
        ),
        (
            "metadata[person2_firstname]".to_string(),
            request.person2_firstname.clone(),
        ),
    ];

    match price_id.filter(|id| !id.is_empty()) {
        Some(id) => form.push(("line_items[0][price]".to_string(), id.to_string())),
        None => {
            form.push((
                "line_items[0][price_data][currency]".to_string(),
                CURRENCY.to_string(),
            ));
            form.push((
                "line_items[0][price_data][unit_amount]".to_string(),
                PRICE_CENTS.to_string(),
            ));
            form.push((
                "line_items[0][price_data][product_data][name]".to_string(),
                format!(
                    "AstroMatch - {} & {}",
                    request.person1_firstname, request.person2_firstname
                ),
            ));
        }
    }
    form
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    http_client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(base_url: &str, secret_key: &str, timeout: Duration) -> Result<Self, StripeError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StripeError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    async fn post_form(&self, path: &str, form: &[(String, String)]) -> Result<CreatedObject, StripeError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling Stripe");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| text.clone());
            return Err(match status.as_u16() {
                401 => StripeError::Authentication(message),
                code => StripeError::Api {
                    status: code,
                    message,
                },
            });
        }

        serde_json::from_str(&text).map_err(|e| StripeError::Parse(e.to_string()))
    }

    /// Create a payment session and return its hosted page URL
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        price_id: Option<&str>,
        origin: &str,
    ) -> Result<String, StripeError> {
        let form = checkout_form(request, price_id, origin);
        let session = self.post_form("/v1/checkout/sessions", &form).await?;
        tracing::info!(session_id = %session.id, "Checkout session created");
        session
            .url
            .ok_or_else(|| StripeError::Parse("checkout session without url".to_string()))
    }

    pub async fn create_product(&self, name: &str, description: &str) -> Result<String, StripeError> {
        let form = vec![
            ("name".to_string(), name.to_string()),
            ("description".to_string(), description.to_string()),
        ];
        Ok(self.post_form("/v1/products", &form).await?.id)
    }

    pub async fn create_price(&self, product_id: &str, unit_amount: u32, currency: &str) -> Result<String, StripeError> {
        let form = vec![
            ("product".to_string(), product_id.to_string()),
            ("unit_amount".to_string(), unit_amount.to_string()),
            ("currency".to_string(), currency.to_string()),
        ];
        Ok(self.post_form("/v1/prices", &form).await?.id)
    }

    /// Create the report product and its fixed EUR price
    pub async fn provision_product(&self) -> Result<ProvisionedProduct, StripeError> {
        let product_id = self
            .create_product(
                PRODUCT_NAME,
                "Rapport PDF complet de compatibilité astrologique",
            )
            .await?;
        let price_id = self.create_price(&product_id, PRICE_CENTS, CURRENCY).await?;
        Ok(ProvisionedProduct {
            product_id,
            price_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            person1_firstname: "Ana".to_string(),
            person2_firstname: "Léo".to_string(),
        }
    }

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_inline_price_when_no_price_id() {
        let form = checkout_form(&request(), None, "https://astromatch.example/");
        assert_eq!(field(&form, "line_items[0][price_data][unit_amount]"), Some("990"));
        assert_eq!(field(&form, "line_items[0][price_data][currency]"), Some("eur"));
        assert_eq!(
            field(&form, "line_items[0][price_data][product_data][name]"),
            Some("AstroMatch - Ana & Léo")
        );
        assert_eq!(field(&form, "line_items[0][price]"), None);
        assert_eq!(
            field(&form, "success_url"),
            Some("https://astromatch.example/full-report?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(field(&form, "cancel_url"), Some("https://astromatch.example/"));
    }

    #[test]
    fn test_fixed_price_id() {
        let form = checkout_form(&request(), Some("price_123"), "http://localhost:5730");
        assert_eq!(field(&form, "line_items[0][price]"), Some("price_123"));
        assert_eq!(field(&form, "line_items[0][price_data][currency]"), None);
    }

    #[test]
    fn test_empty_price_id_falls_back_to_inline() {
        let form = checkout_form(&request(), Some(""), "http://localhost:5730");
        assert_eq!(field(&form, "line_items[0][price]"), None);
        assert!(field(&form, "line_items[0][price_data][unit_amount]").is_some());
    }
}
