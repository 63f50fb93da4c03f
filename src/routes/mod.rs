mod health_check;
mod home;
mod send;
mod waitlist;

pub use health_check::*;
pub use home::*;
pub use send::*;
pub use waitlist::*;
