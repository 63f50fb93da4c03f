use super::WaitlistEmail;

/// A single recorded email address. Entries are created once, on the first
/// successful submission, and never mutated by this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistEntry {
    pub email: WaitlistEmail,
}
