#![forbid(unsafe_code)]

mod client;
mod error;
mod types;

pub use client::{HttpClient, MAX_REDIRECTS};
pub use error::{Error, HttpTransportErrorKind, Result};
pub use types::{HttpRequest, HttpResponse};
