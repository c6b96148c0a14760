//! Short code generators.

pub mod hash;

pub use hash::HashGenerator;

use pinhole_core::ShortCode;

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage:
/// uniqueness is checked by the caller, which asks for a new candidate on
/// collision. Consecutive calls for the same URL must not intentionally
/// repeat a candidate.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Generates a candidate short code for `long_url`.
    fn generate(&self, long_url: &str) -> Self::Output;
}
