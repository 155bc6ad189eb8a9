pub mod runner;

pub use burstr_http::{
    Error as HttpError, HttpClient, HttpRequest, HttpResponse, HttpTransportErrorKind,
    Result as HttpResult,
};
