//! Backend test support utilities
//!
//! Shared by the backend's unit and integration tests: one-time logging
//! initialisation and assertions for the two error shapes the service emits
//! (problem-details JSON from handlers, plain-text 401s from the auth gate).

pub mod logging;
pub mod problem_details;
