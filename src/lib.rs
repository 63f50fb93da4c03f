//! Waitlist service for the Dinnersaurus landing page.
//!
//! A visitor submits their email on `/`; `POST /waitlist` records it (once per
//! normalised address) and asks the notification dispatcher (`POST /api/send`)
//! to send the welcome email through the transactional email API.
//!
//! Almost everything lives in the library so that `tests/api` can drive the
//! real server; `main.rs` only loads config and starts it.

pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod email_template;
pub mod notification;
pub mod routes;
pub mod signup;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod utils;
