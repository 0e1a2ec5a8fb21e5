//! Provider payload shaping.
//!
//! Each webhook provider posts its own body shape; the gateway normalizes it
//! into one namespaced entry in the run's initial context (`googleForm` or
//! `stripe`) so downstream nodes address trigger data uniformly. The full
//! original body is preserved under `raw` for fields the normalized view
//! doesn't lift out.

use serde_json::{Value, json};

use crate::context::ExecutionContext;

/// Context key the Google Forms trigger payload is stored under.
pub const GOOGLE_FORM_KEY: &str = "googleForm";

/// Context key the Stripe trigger payload is stored under.
pub const STRIPE_KEY: &str = "stripe";

/// Build the initial context for a Google Forms submission.
///
/// Lifts the identifying fields out of the body and keeps the whole
/// submission under `raw`. Missing fields become `null` rather than
/// rejecting the request; form add-ons vary in what they send.
#[must_use]
pub fn google_form_context(body: &Value) -> ExecutionContext {
    let entry = json!({
        "formId": body.get("formId").cloned().unwrap_or(Value::Null),
        "formTitle": body.get("formTitle").cloned().unwrap_or(Value::Null),
        "responseId": body.get("responseId").cloned().unwrap_or(Value::Null),
        "timestamp": body.get("timestamp").cloned().unwrap_or(Value::Null),
        "respondentEmail": body.get("respondentEmail").cloned().unwrap_or(Value::Null),
        "responses": body.get("responses").cloned().unwrap_or(Value::Null),
        "raw": body.clone(),
    });
    ExecutionContext::from_entries([(GOOGLE_FORM_KEY.to_string(), entry)])
}

/// Build the initial context for a Stripe event.
///
/// Follows Stripe's envelope: `id`/`type`/`created`/`livemode` at the top,
/// the affected resource under `data.object`. Only `data.object` is kept as
/// `raw`; the envelope fields are lifted into the normalized view.
#[must_use]
pub fn stripe_context(body: &Value) -> ExecutionContext {
    let object = body
        .get("data")
        .and_then(|data| data.get("object"))
        .cloned()
        .unwrap_or(Value::Null);
    let entry = json!({
        "eventId": body.get("id").cloned().unwrap_or(Value::Null),
        "eventType": body.get("type").cloned().unwrap_or(Value::Null),
        "timestamp": body.get("created").cloned().unwrap_or(Value::Null),
        "livemode": body.get("livemode").cloned().unwrap_or(Value::Null),
        "raw": object,
    });
    ExecutionContext::from_entries([(STRIPE_KEY.to_string(), entry)])
}
