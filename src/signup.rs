use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::WaitlistEmail;
use crate::domain::WaitlistEntry;
use crate::notification::Notifier;
use crate::store::StoreError;
use crate::store::WaitlistStore;
use crate::utils::error_chain_fmt;

pub const SUCCESS_MESSAGE: &str = "Successfully joined the waitlist!";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const DUPLICATE_MESSAGE: &str = "This email is already on the waitlist!";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(thiserror::Error)]
pub enum SignupError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0} is already on the waitlist")]
    DuplicateError(WaitlistEmail),
    #[error("Failed to access the waitlist store")]
    StoreError(#[source] anyhow::Error),
    /// The insert went through but the welcome email did not. The entry is
    /// kept: there is no transaction spanning the store and the email API, and
    /// delivery is best-effort. `entry` is what remains recorded.
    #[error("{} was added to the waitlist, but the welcome email failed", .entry.email)]
    DeliveryFailed {
        entry: WaitlistEntry,
        #[source]
        source: anyhow::Error,
    },
}

impl Debug for SignupError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl SignupError {
    /// What the person filling in the form gets to see. Dependency failures
    /// all collapse into one generic message.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => INVALID_EMAIL_MESSAGE,
            Self::DuplicateError(_) => DUPLICATE_MESSAGE,
            Self::StoreError(_) | Self::DeliveryFailed { .. } => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<StoreError> for SignupError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(email) => Self::DuplicateError(email),
            StoreError::UnexpectedError(e) => Self::StoreError(e),
        }
    }
}

/// The two external steps of joining the waitlist: record the email, then ask
/// for the welcome email. Shared by all requests; holds no per-form state.
pub struct SignupService {
    store: Arc<dyn WaitlistStore>,
    notifier: Arc<dyn Notifier>,
}

impl SignupService {
    pub fn new(
        store: Arc<dyn WaitlistStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { store, notifier }
    }

    /// Idle -> checking duplicate -> inserting -> dispatching
    ///
    /// A failure after the insert does not undo it; see
    /// `SignupError::DeliveryFailed`.
    #[tracing::instrument(
        name = "Joining the waitlist",
        skip(self, email),
        fields(waitlist_email = %email)
    )]
    pub async fn join(
        &self,
        email: WaitlistEmail,
    ) -> Result<WaitlistEntry, SignupError> {
        // fast path only; two concurrent submissions can both get past this,
        // and then the store's uniqueness constraint decides
        if self.store.find_by_email(&email).await?.is_some() {
            tracing::info!("Email is already on the waitlist");
            return Err(SignupError::DuplicateError(email));
        }

        let entry = self.store.insert(&email).await?;
        tracing::info!("Added new waitlist entry");

        if let Err(e) = self.notifier.notify(&entry.email).await {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Welcome email failed; keeping waitlist entry"
            );
            return Err(SignupError::DeliveryFailed { entry, source: e });
        }

        Ok(entry)
    }
}

/// Ephemeral state of one signup form. Reset at the start of every submission
/// cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormState {
    /// Current value of the input field
    pub email: String,
    /// A submission is outstanding. Only true inside `SignupForm::submit`;
    /// the page disables its button on its own.
    pub is_loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

/// One instance of the signup form.
///
/// `submit` takes `&mut self`: the exclusive borrow is what keeps a single
/// form from having two submissions in flight, not `is_loading`.
pub struct SignupForm {
    service: Arc<SignupService>,
    state: FormState,
}

impl SignupForm {
    pub fn new(service: Arc<SignupService>) -> Self {
        Self {
            service,
            state: FormState::default(),
        }
    }

    pub fn state(&self) -> &FormState { &self.state }

    pub fn set_email(
        &mut self,
        value: impl Into<String>,
    ) {
        self.state.email = value.into();
    }

    /// Invalid input is rejected before anything leaves the form: no store
    /// lookup, no insert, no email.
    pub async fn submit(&mut self) -> Result<WaitlistEntry, SignupError> {
        self.state.error = None;
        self.state.success = false;

        let email = match WaitlistEmail::parse(&self.state.email) {
            Ok(email) => email,
            Err(e) => {
                let e = SignupError::ValidationError(e);
                self.state.error = Some(e.user_message().to_string());
                return Err(e);
            }
        };

        self.state.is_loading = true;
        let outcome = self.service.join(email).await;
        self.state.is_loading = false;

        match &outcome {
            Ok(_) => {
                self.state.success = true;
                self.state.email.clear();
            }
            Err(e) => self.state.error = Some(e.user_message().to_string()),
        }
        outcome
    }
}
