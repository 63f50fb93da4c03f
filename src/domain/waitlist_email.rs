use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateEmail;

/// A lowercased, trimmed email address that matches the signup form's shape
/// (`local@domain.tld`). Used both as the waitlist key and as an email
/// recipient/sender.
///
/// Must be instantiated with `WaitlistEmail::parse`; the field is left private
/// so that an unnormalised address can never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaitlistEmail(String);

impl WaitlistEmail {
    pub fn parse(email: impl AsRef<str>) -> Result<Self, String> {
        let raw = email.as_ref();
        // normalise first; the form pattern only knows lowercase
        let email = raw.trim().to_lowercase();
        match ValidateEmail::validate_email(&email) && SIGNUP_PATTERN.is_match(&email) {
            true => Ok(Self(email)),
            false => Err(format!("Invalid email: {raw:?}")),
        }
    }
}

/// The pattern on the landing page form. `validator` alone accepts dotless
/// domains like `john@localhost`.
static SIGNUP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").unwrap());

impl AsRef<str> for WaitlistEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for WaitlistEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
