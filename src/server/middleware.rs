//! Decorators around a [`Handler`]: path proxying, cache control, and gzip
//! content encoding.

use super::{Handler, Request, Response};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const YEAR: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Serves requests for `src` as if they were for `dest`. Every other path is
/// passed through untouched.
pub struct Proxy<H> {
    inner: H,
    src: String,
    dest: String,
}

impl<H: Handler> Proxy<H> {
    pub fn new(inner: H, src: &str, dest: &str) -> Proxy<H> {
        Proxy {
            inner,
            src: src.to_owned(),
            dest: dest.to_owned(),
        }
    }
}

impl<H: Handler> Handler for Proxy<H> {
    fn serve(&self, request: &Request) -> Response {
        if request.path == self.src {
            let mut rewritten = request.clone();
            rewritten.path = self.dest.clone();
            return self.inner.serve(&rewritten);
        }
        self.inner.serve(request)
    }
}

/// Sets `Cache-Control: max-age=...` on every response.
pub struct CacheControl<H> {
    inner: H,
    max_age: Duration,
}

impl<H: Handler> CacheControl<H> {
    pub fn new(inner: H, max_age: Duration) -> CacheControl<H> {
        CacheControl { inner, max_age }
    }
}

impl<H: Handler> Handler for CacheControl<H> {
    fn serve(&self, request: &Request) -> Response {
        let mut response = self.inner.serve(request);
        let value = format!("max-age={}", self.max_age.as_secs());
        response.set_header("Cache-Control", &value);
        response
    }
}

/// Caches pages (`.html` and extensionless paths) for a day and everything
/// else for a year, through a [`CacheControl`] picked per request.
pub struct BasicCacheControl<H> {
    inner: H,
}

impl<H: Handler> BasicCacheControl<H> {
    pub fn new(inner: H) -> BasicCacheControl<H> {
        BasicCacheControl { inner }
    }
}

impl<H: Handler> Handler for BasicCacheControl<H> {
    fn serve(&self, request: &Request) -> Response {
        let max_age = match Path::new(&request.path).extension() {
            None => DAY,
            Some(ext) if ext == "html" => DAY,
            Some(_) => YEAR,
        };
        CacheControl::new(|r: &Request| self.inner.serve(r), max_age).serve(request)
    }
}

/// Gzips the response body when the request's `Accept-Encoding` mentions
/// `gzip`. Any other encoding is ignored and the body is sent as is.
pub struct ContentEncoding<H> {
    inner: H,
}

impl<H: Handler> ContentEncoding<H> {
    pub fn new(inner: H) -> ContentEncoding<H> {
        ContentEncoding { inner }
    }
}

impl<H: Handler> Handler for ContentEncoding<H> {
    fn serve(&self, request: &Request) -> Response {
        let accepts_gzip = request
            .header("Accept-Encoding")
            .map_or(false, |enc| enc.contains("gzip"));
        let mut response = self.inner.serve(request);
        if !accepts_gzip {
            return response;
        }
        match gzip(&response.body) {
            Ok(body) => {
                response.body = body;
                response.set_header("Content-Encoding", "gzip");
                response
            }
            Err(err) => {
                log::error!("gzip encoding `{}`: {}", request.path, err);
                Response::new(500, b"500 internal server error\n".to_vec())
            }
        }
    }
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn echo_path(request: &Request) -> Response {
        Response::ok(request.path.clone().into_bytes())
    }

    #[test]
    fn test_proxy() {
        let h = Proxy::new(echo_path, "/replace", "/redirect");
        for (url, want) in &[
            ("/a", "/a"),
            ("/replace", "/redirect"),
            ("/redirect", "/redirect"),
        ] {
            let body = h.serve(&Request::get(url)).body;
            assert_eq!(want.as_bytes(), &body[..], "url {}", url);
        }
    }

    #[test]
    fn test_cache_control() {
        let h = CacheControl::new(|_: &Request| Response::ok(b"OK_1549".to_vec()), Duration::from_secs(60));
        let response = h.serve(&Request::get("/"));
        assert_eq!(b"OK_1549".to_vec(), response.body);
        assert_eq!(Some("max-age=60"), response.header("Cache-Control"));
    }

    #[test]
    fn test_basic_cache_control_durations() {
        let h = BasicCacheControl::new(echo_path);
        for (url, want) in &[
            ("/", "max-age=86400"),
            ("/home.html", "max-age=86400"),
            ("/about", "max-age=86400"),
            ("/images/logo.png", "max-age=31536000"),
            ("/resources/events/2023/handout.pdf", "max-age=31536000"),
        ] {
            let response = h.serve(&Request::get(url));
            assert_eq!(Some(*want), response.header("Cache-Control"), "url {}", url);
        }
    }

    #[test]
    fn test_basic_cache_control_added_once() {
        let h = BasicCacheControl::new(|_: &Request| Response::ok(b"once".to_vec()));
        h.serve(&Request::get("/"));
        let second = h.serve(&Request::get("/"));
        assert_eq!(1, second.header_values("Cache-Control").len());

        // nesting the decorator still leaves a single header
        let nested = BasicCacheControl::new(BasicCacheControl::new(echo_path));
        let response = nested.serve(&Request::get("/logo.png"));
        assert_eq!(vec!["max-age=31536000"], response.header_values("Cache-Control"));
    }

    #[test]
    fn test_content_encoding_gzip() {
        let h = ContentEncoding::new(|_: &Request| Response::ok(b"OK_gzip".to_vec()));
        let response = h.serve(&Request::get("/").with_header("Accept-Encoding", "gzip, deflate, br"));
        assert_eq!(Some("gzip"), response.header("Content-Encoding"));

        let mut body = String::new();
        GzDecoder::new(&response.body[..])
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!("OK_gzip", body);
    }

    #[test]
    fn test_content_encoding_unknown() {
        let h = ContentEncoding::new(|_: &Request| Response::ok(b"OK_gzip".to_vec()));
        let response = h.serve(&Request::get("/").with_header("Accept-Encoding", "UNKNOWN"));
        assert_eq!(None, response.header("Content-Encoding"));
        assert_eq!(b"OK_gzip".to_vec(), response.body);

        let response = h.serve(&Request::get("/"));
        assert_eq!(None, response.header("Content-Encoding"));
    }
}
