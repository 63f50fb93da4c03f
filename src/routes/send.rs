use actix_web::web;
use actix_web::HttpResponse;
use serde_json::Value;

use crate::domain::WaitlistEmail;
use crate::notification::DispatchError;
use crate::notification::NotificationDispatcher;

/// Pull the recipient out of a raw request body.
///
/// We don't use `web::Json<T>`, because its extractor rejects bad bodies with
/// its own (plain text) 400 before the handler runs, and callers rely on the
/// exact `{"error": ...}` bodies. Only a falsy `email` (absent, `null`, `""`,
/// not a string) counts as missing.
fn recipient_from_body(body: &[u8]) -> Result<WaitlistEmail, DispatchError> {
    let body: Value = serde_json::from_slice(body).map_err(DispatchError::InvalidJson)?;
    let email = body
        .get("email")
        .and_then(Value::as_str)
        .filter(|email| !email.is_empty())
        .ok_or(DispatchError::MissingEmail)?;
    WaitlistEmail::parse(email).map_err(DispatchError::InvalidEmail)
}

/// `POST /api/send`
///
/// Sends the welcome email to the address in a `{"email": "..."}` body and
/// returns the provider's response payload untouched.
///
/// # Request example
///
/// ```sh
///     curl -v --json '{"email": "john@foo.com"}' http://127.0.0.1:8000/api/send
/// ```
#[tracing::instrument(
    name = "Sending welcome email",
    skip(body, dispatcher),
    fields(recipient = tracing::field::Empty)
)]
pub async fn send_notification(
    body: web::Bytes,
    dispatcher: web::Data<NotificationDispatcher>,
) -> Result<HttpResponse, DispatchError> {
    let recipient = recipient_from_body(&body)?;
    tracing::Span::current().record("recipient", tracing::field::display(&recipient));

    let payload = dispatcher.dispatch(&recipient).await?;
    Ok(HttpResponse::Ok().json(payload))
}
