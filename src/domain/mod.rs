mod waitlist_email;
mod waitlist_entry;
// allow external `use` statements to skip `waitlist_email` etc
pub use waitlist_email::WaitlistEmail;
pub use waitlist_entry::WaitlistEntry;
