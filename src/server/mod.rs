//! The HTTP side: a read-only file server over the generated site.
//!
//! Requests are answered by a stack of [`Handler`]s. The innermost one,
//! [`FileServer`], maps request paths onto the generated directory; the
//! decorators in [`middleware`] wrap it to rewrite `/` to `/home.html`,
//! attach `Cache-Control`, and gzip the body when the client accepts it.
//! [`http::serve`] adapts the stack to a `tiny_http` server.
//!
//! ```text
//! ContentEncoding ─► BasicCacheControl ─► Proxy ─► FileServer
//! ```

pub mod files;
pub mod http;
pub mod middleware;

pub use files::FileServer;
pub use middleware::{BasicCacheControl, CacheControl, ContentEncoding, Proxy};

use std::path::Path;

/// The page served for `/`.
pub const HOME_PAGE: &str = "/home.html";

/// An incoming request, reduced to what the handlers look at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,

    /// The decoded path, without any query string.
    pub path: String,

    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(path: &str) -> Request {
        Request {
            method: String::from("GET"),
            path: path.to_owned(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Request {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Returns the first value of the header `name`, compared
    /// case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An outgoing response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: Vec<u8>) -> Response {
        Response {
            status,
            headers: Vec::new(),
            body,
        }
    }

    pub fn ok(body: Vec<u8>) -> Response {
        Response::new(200, body)
    }

    pub fn not_found() -> Response {
        let mut response = Response::new(404, b"404 page not found\n".to_vec());
        response.set_header("Content-Type", "text/plain; charset=utf-8");
        response
    }

    /// Returns the first value of the header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).into_iter().next()
    }

    /// Returns every value of the header `name`.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Sets the header `name` to `value`, replacing any values it already
    /// had.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }
}

/// Answers requests. Handlers are stateless, so the same handler may serve
/// any number of requests.
pub trait Handler {
    fn serve(&self, request: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response,
{
    fn serve(&self, request: &Request) -> Response {
        self(request)
    }
}

/// Builds the full handler stack serving the site generated into `root`.
pub fn handler(root: &Path) -> impl Handler {
    let files = FileServer::new(root);
    let proxied = Proxy::new(files, "/", HOME_PAGE);
    let cached = BasicCacheControl::new(proxied);
    ContentEncoding::new(cached)
}
