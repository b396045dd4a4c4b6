//! Use cases (application services)
//!
//! - [`session_controller`] — turn taking for one chat session

pub mod session_controller;
