//! Stripe REST client for customers and checkout sessions.
//!
//! Stripe's API is form-encoded; nested fields use bracket syntax
//! (`line_items[0][price_data][currency]`). We only implement the two
//! calls the service makes.

use listcraft_core::types::DbId;
use serde::Deserialize;

use crate::packages::CreditPackage;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("Stripe request failed: {0}")]
    Http(String),

    #[error("Stripe returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Base of the frontend the checkout session redirects back to.
    pub app_url: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `STRIPE_SECRET_KEY`     | (required)              |
    /// | `STRIPE_WEBHOOK_SECRET` | (required)              |
    /// | `APP_URL`               | `http://localhost:3000` |
    pub fn from_env() -> Self {
        Self {
            secret_key: std::env::var("STRIPE_SECRET_KEY")
                .expect("STRIPE_SECRET_KEY must be set"),
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
                .expect("STRIPE_WEBHOOK_SECRET must be set"),
            app_url: std::env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

pub struct StripeClient {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let response = self
            .http
            .post(format!("{STRIPE_API_BASE}{path}"))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(form)
            .send()
            .await
            .map_err(|e| StripeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_default();
            tracing::warn!(%status, path, "Stripe API error");
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StripeError::Http(format!("Unparseable Stripe response: {e}")))
    }

    /// Create a Stripe customer linked back to our user id.
    pub async fn create_customer(
        &self,
        user_id: DbId,
        email: &str,
    ) -> Result<Customer, StripeError> {
        let form = vec![
            ("email".to_string(), email.to_string()),
            ("metadata[user_id]".to_string(), user_id.to_string()),
        ];
        self.post_form("/customers", &form).await
    }

    /// Create a one-time payment checkout session for a credit package.
    ///
    /// The metadata round-trips through the `checkout.session.completed`
    /// webhook and drives the credit grant, so it must stay in sync with
    /// the webhook handler.
    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        user_id: DbId,
        package: &CreditPackage,
    ) -> Result<CheckoutSession, StripeError> {
        let form = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                "usd".to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                package.name.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                format!("{} image generation credits", package.credits),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                package.price.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "success_url".to_string(),
                format!("{}/credits?success=true", self.config.app_url),
            ),
            (
                "cancel_url".to_string(),
                format!("{}/credits?canceled=true", self.config.app_url),
            ),
            ("metadata[user_id]".to_string(), user_id.to_string()),
            ("metadata[package_id]".to_string(), package.id.to_string()),
            ("metadata[credits]".to_string(), package.credits.to_string()),
        ];
        self.post_form("/checkout/sessions", &form).await
    }
}
