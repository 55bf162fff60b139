//! Runs a [`Handler`] behind a `tiny_http` server until Ctrl-C.

use super::{Handler, Request, Response};
use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Header, Server, StatusCode};

/// Binds `addr` and answers every request with `handler`. Blocks until the
/// process receives Ctrl-C.
pub fn serve<H: Handler>(addr: SocketAddr, handler: H) -> Result<()> {
    let server = Server::http(addr).map_err(|e| anyhow!("binding {}: {}", addr, e))?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log::info!("shutting down");
        server_for_signal.unblock();
    })
    .context("setting Ctrl-C handler")?;

    log::info!("Serving site at http://127.0.0.1:{}", addr.port());
    log::info!("Press Ctrl-C to stop");

    for request in server.incoming_requests() {
        if let Err(err) = respond(request, &handler) {
            log::error!("request error: {:#}", err);
        }
    }
    Ok(())
}

fn respond<H: Handler>(request: tiny_http::Request, handler: &H) -> Result<()> {
    let converted = convert_request(&request);
    let response = handler.serve(&converted);
    log::debug!(
        "{} {} -> {}",
        converted.method,
        converted.path,
        response.status
    );
    let response = convert_response(response)?;
    request.respond(response).context("writing response")?;
    Ok(())
}

fn convert_request(request: &tiny_http::Request) -> Request {
    Request {
        method: request.method().as_str().to_owned(),
        path: request_path(request.url()),
        headers: request
            .headers()
            .iter()
            .map(|h| (h.field.to_string(), h.value.to_string()))
            .collect(),
    }
}

/// Strips the query string from `url` and decodes its percent-encoding. A
/// path that doesn't decode to UTF-8 is returned as is.
fn request_path(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    urlencoding::decode(path)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| path.to_owned())
}

fn convert_response(response: Response) -> Result<tiny_http::Response<std::io::Cursor<Vec<u8>>>> {
    let mut converted =
        tiny_http::Response::from_data(response.body).with_status_code(StatusCode(response.status));
    for (name, value) in &response.headers {
        let header = Header::from_bytes(name.as_bytes(), value.as_bytes())
            .map_err(|()| anyhow!("invalid header `{}: {}`", name, value))?;
        converted.add_header(header);
    }
    Ok(converted)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::server::FileServer;

    #[test]
    fn test_request_path() {
        for (url, want) in &[
            ("/home.html", "/home.html"),
            ("/home.html?t=1", "/home.html"),
            ("/fonts/a.woff2?v=2&x=y", "/fonts/a.woff2"),
            ("/a%20b.pdf", "/a b.pdf"),
            ("/%2e%2e/x", "/../x"),
            ("/%ff.html", "/%ff.html"),
        ] {
            assert_eq!(*want, request_path(url), "url {}", url);
        }
    }

    #[test]
    fn test_request_path_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a b.pdf"), b"%PDF").unwrap();
        let files = FileServer::new(dir.path());

        let found = files.serve(&Request::get(&request_path("/a%20b.pdf?download=1")));
        assert_eq!(200, found.status);
        assert_eq!(b"%PDF".to_vec(), found.body);

        let escaped = files.serve(&Request::get(&request_path("/%2e%2e/x")));
        assert_eq!(404, escaped.status);
    }
}
