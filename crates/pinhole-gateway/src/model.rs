mod envelope;
mod url;

pub use envelope::{Envelope, FieldErrors, Message};
pub use url::{CreateUrlRequest, HealthResponse, UrlResponse};
