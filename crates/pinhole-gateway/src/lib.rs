//! HTTP gateway for the Pinhole URL shortener.
//!
//! Exposes the shortener over a JSON API and serves redirects for
//! resolved short codes. Every JSON body is wrapped in an [`Envelope`].
//!
//! [`Envelope`]: model::Envelope

pub mod app;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use auth::{Claims, CurrentOwner, IdentityProvider, JwtIdentityProvider};
pub use error::AppError;
pub use state::AppState;
