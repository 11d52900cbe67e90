//! HTTP handlers for the user API.

pub mod users;
