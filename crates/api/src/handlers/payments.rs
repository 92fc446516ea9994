//! Stripe checkout and webhook handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use listcraft_core::credits::TransactionType;
use listcraft_core::error::CoreError;
use listcraft_db::repositories::{CreditLedgerRepo, ProfileRepo};
use listcraft_payments::{package_by_id, verify_signature, CheckoutSessionCompleted, StripeEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub package_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

/// POST /api/v1/payments/checkout
///
/// Creates a Stripe checkout session for a credit package, minting a
/// Stripe customer for the user on first purchase.
pub async fn create_checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CheckoutBody>,
) -> AppResult<Json<DataResponse<CheckoutResponse>>> {
    let package = package_by_id(&body.package_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown package: {}", body.package_id)))?;

    let profile = ProfileRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "profile",
            id: user.user_id,
        })?;

    let customer_id = match profile.stripe_customer_id {
        Some(id) => id,
        None => {
            let customer = state
                .stripe
                .create_customer(user.user_id, &profile.email)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            ProfileRepo::set_stripe_customer_id(&state.pool, user.user_id, &customer.id).await?;
            customer.id
        }
    };

    let session = state
        .stripe
        .create_checkout_session(&customer_id, user.user_id, package)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(Json(DataResponse {
        data: CheckoutResponse {
            session_id: session.id,
            url: session.url,
        },
    }))
}

/// POST /api/v1/payments/webhook
///
/// Stripe calls this endpoint; it is authenticated by the signature
/// header, not a bearer token. The response shape is dictated by Stripe,
/// so it skips the `{ "data": ... }` envelope.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::PaymentVerification(
                "Missing stripe-signature header".into(),
            ))
        })?;

    verify_signature(
        &payload,
        signature,
        state.stripe.webhook_secret(),
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| AppError::Core(CoreError::PaymentVerification(e.to_string())))?;

    let event: StripeEvent = serde_json::from_slice(&payload)
        .map_err(|e| AppError::BadRequest(format!("Unparseable event payload: {e}")))?;

    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSessionCompleted =
                serde_json::from_value(event.data.object).map_err(|e| {
                    AppError::BadRequest(format!("Unparseable checkout session: {e}"))
                })?;

            match session.credit_grant() {
                Some(grant) => {
                    let outcome = CreditLedgerRepo::credit(
                        &state.pool,
                        grant.user_id,
                        grant.credits,
                        TransactionType::Purchase,
                        Some(&grant.payment_intent),
                        Some(&format!(
                            "Purchased {}: {} credits",
                            grant.package_id, grant.credits
                        )),
                    )
                    .await
                    .map_err(|e| AppError::InternalError(e.to_string()))?;

                    if outcome.applied {
                        tracing::info!(
                            user_id = %grant.user_id,
                            credits = grant.credits,
                            payment_intent = %grant.payment_intent,
                            "Credited purchase"
                        );
                    } else {
                        tracing::info!(
                            payment_intent = %grant.payment_intent,
                            "Webhook redelivery; purchase already credited"
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        session_id = %session.id,
                        "Checkout session without usable metadata; skipping"
                    );
                }
            }
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring unhandled event type");
        }
    }

    Ok(Json(json!({ "received": true })))
}
