//! Hiroba terminal chat client.

pub mod auth;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::{ClientOptions, run_client};
