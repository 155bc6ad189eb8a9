use bytes::Bytes;
use http_body_util::{BodyExt as _, Empty};
use http::StatusCode;
use http::header::LOCATION;
use hyper::Request;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

use super::{Error, HttpRequest, HttpResponse, Result};

/// Redirect hops followed for one request before it fails.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
}

impl Default for HttpClient {
    fn default() -> Self {
        // The OS-level TCP connect timeout can be very long (tens of seconds), which can cause
        // short runs to appear “hung” when the target host is unreachable.
        //
        // We apply a sane default so failed connects surface promptly.
        Self::new(Some(Duration::from_secs(3)))
    }
}

impl HttpClient {
    #[must_use]
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_connect_timeout(connect_timeout);

        let https_connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let inner = Client::builder(TokioExecutor::new()).build(https_connector);

        Self { inner }
    }

    /// Issue a GET and drain the whole response body.
    ///
    /// 301/302/303/307/308 responses with a `Location` are followed, up to [`MAX_REDIRECTS`]
    /// hops. `req.timeout` bounds the complete exchange, every hop and body included.
    pub async fn request(&self, req: HttpRequest) -> Result<HttpResponse> {
        match req.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.exchange(req.url)).await {
                Ok(res) => res,
                Err(_) => Err(Error::Timeout(timeout)),
            },
            None => self.exchange(req.url).await,
        }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.request(HttpRequest::get(url)).await
    }

    async fn exchange(&self, url: String) -> Result<HttpResponse> {
        let mut current = url::Url::parse(&url).map_err(|_| Error::InvalidUrl(url.clone()))?;
        check_scheme(&current)?;

        let mut hops = 0usize;
        loop {
            let uri: hyper::Uri = current
                .as_str()
                .parse()
                .map_err(|_| Error::InvalidUrl(current.to_string()))?;

            let req = Request::builder()
                .method(http::Method::GET)
                .uri(uri)
                .body(Empty::<Bytes>::new())?;

            let res = self.inner.request(req).await?;
            let status = res.status();
            let location = if follows_redirect(status) {
                res.headers().get(LOCATION).cloned()
            } else {
                None
            };
            let body_bytes = drain_body(res.into_body()).await?;

            let Some(location) = location else {
                return Ok(HttpResponse {
                    status: status.as_u16(),
                    body_bytes,
                });
            };

            if hops == MAX_REDIRECTS {
                return Err(Error::TooManyRedirects(MAX_REDIRECTS));
            }
            hops += 1;

            let location = location.to_str().map_err(|_| {
                Error::InvalidRedirect(String::from_utf8_lossy(location.as_bytes()).into_owned())
            })?;
            let next = current
                .join(location)
                .map_err(|_| Error::InvalidRedirect(location.to_string()))?;
            check_scheme(&next)?;
            current = next;
        }
    }
}

fn check_scheme(url: &url::Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(Error::UnsupportedScheme(url.to_string())),
    }
}

fn follows_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Content is irrelevant; only count what was read off the wire.
async fn drain_body(mut body: Incoming) -> Result<u64> {
    let mut body_bytes = 0u64;
    while let Some(frame) = body.frame().await {
        if let Some(data) = frame?.data_ref() {
            body_bytes = body_bytes.saturating_add(data.len() as u64);
        }
    }
    Ok(body_bytes)
}
