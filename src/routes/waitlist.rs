use actix_web::web;
use actix_web::HttpResponse;
use actix_web_flash_messages::FlashMessage;
use serde::Deserialize;

use crate::signup::SignupError;
use crate::signup::SignupForm;
use crate::signup::SignupService;
use crate::signup::SUCCESS_MESSAGE;
use crate::utils::redirect;

#[derive(Deserialize)]
pub struct FormData {
    email: String,
}

/// `POST /waitlist`
///
/// Runs one signup cycle for the submitted email, then redirects back to `/`,
/// where the outcome is shown as a flash message.
///
/// A body without an `email` field never reaches this function; the `Form`
/// extractor answers 400 on its own.
///
/// # Request example
///
/// ```sh
///     curl -v --data 'email=john%40foo.com' http://127.0.0.1:8000/waitlist
/// ```
#[tracing::instrument(
    name = "Submitting waitlist form",
    skip(form, service),
    fields(waitlist_email = %form.email)
)]
pub async fn join_waitlist(
    form: web::Form<FormData>,
    service: web::Data<SignupService>,
) -> HttpResponse {
    // a fresh form per request: the browser holds the real form state, we
    // only need it for the duration of one submission
    let mut signup = SignupForm::new(service.into_inner());
    signup.set_email(form.0.email);

    match signup.submit().await {
        Ok(_) => FlashMessage::success(SUCCESS_MESSAGE).send(),
        Err(e) => {
            match &e {
                SignupError::ValidationError(_) | SignupError::DuplicateError(_) => {
                    tracing::info!(error.message = %e, "Signup rejected")
                }
                SignupError::StoreError(_) | SignupError::DeliveryFailed { .. } => {
                    tracing::error!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "Signup failed"
                    )
                }
            }
            FlashMessage::error(e.user_message()).send()
        }
    }

    redirect("/")
}
