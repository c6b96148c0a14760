//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], which implements the
//! [`Shortener`] operations over any storage [`Repository`] and code
//! [`Generator`]. Core types are re-exported from `pinhole_core`.
//!
//! [`Repository`]: pinhole_core::Repository
//! [`Generator`]: pinhole_generator::Generator

pub mod service;

pub use pinhole_core::{Shortened, Shortener, ShortenerError};
pub use service::{ShortenerService, MAX_ATTEMPTS, MAX_URL_LENGTH};
