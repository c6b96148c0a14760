//! Core types and traits for the Pinhole URL shortener.
//!
//! This crate provides the shared vocabulary used by the shortener service,
//! the storage backends and the HTTP gateway.

pub mod error;
pub mod owner;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CoreError, ShortenerError, StorageError};
pub use owner::OwnerId;
pub use repository::{NewShortUrl, ReadRepository, Repository, ShortUrl};
pub use shortcode::ShortCode;
pub use shortener::{Shortened, Shortener};
