//! Serves files out of the generated site directory.

use super::{Handler, Request, Response};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Maps request paths onto files under `root`. Directories, missing files,
/// and paths that try to climb out of `root` are all answered with 404.
pub struct FileServer {
    root: PathBuf,
}

impl FileServer {
    pub fn new(root: &Path) -> FileServer {
        FileServer {
            root: root.to_owned(),
        }
    }

    /// Resolves `path` against the root, or `None` if any segment is `..`.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut local = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                segment => local.push(segment),
            }
        }
        Some(local)
    }
}

impl Handler for FileServer {
    fn serve(&self, request: &Request) -> Response {
        let local = match self.resolve(&request.path) {
            Some(local) => local,
            None => return Response::not_found(),
        };
        if !local.is_file() {
            return Response::not_found();
        }
        match std::fs::read(&local) {
            Ok(body) => {
                let mut response = Response::ok(body);
                response.set_header("Content-Type", content_type(&local));
                response
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Response::not_found(),
            Err(err) => {
                log::error!("reading `{}`: {}", local.display(), err);
                Response::new(500, b"500 internal server error\n".to_vec())
            }
        }
    }
}

/// Guesses the MIME type from the file extension.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        // text
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        // images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        // documents
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.html"), "<p>home</p>").unwrap();
        std::fs::create_dir_all(dir.path().join("resources/events/2023")).unwrap();
        std::fs::write(
            dir.path().join("resources/events/2023/handout.pdf"),
            b"%PDF-1.4",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_serves_files() {
        let dir = site();
        let files = FileServer::new(dir.path());

        let home = files.serve(&Request::get("/home.html"));
        assert_eq!(200, home.status);
        assert_eq!(b"<p>home</p>".to_vec(), home.body);
        assert_eq!(Some("text/html; charset=utf-8"), home.header("Content-Type"));

        let pdf = files.serve(&Request::get("/resources/events/2023/handout.pdf"));
        assert_eq!(200, pdf.status);
        assert_eq!(Some("application/pdf"), pdf.header("Content-Type"));
    }

    #[test]
    fn test_not_found() {
        let dir = site();
        let files = FileServer::new(dir.path());
        for url in &["/missing.html", "/", "/resources", "/../home.html", "/resources/../home.html"] {
            let response = files.serve(&Request::get(url));
            assert_eq!(404, response.status, "url {}", url);
            assert_eq!(b"404 page not found\n".to_vec(), response.body);
        }
    }

    #[test]
    fn test_content_type() {
        for (name, want) in &[
            ("a.HTML", "text/html; charset=utf-8"),
            ("a.jpg", "image/jpeg"),
            ("a.pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
            ("a", "application/octet-stream"),
            ("a.bin", "application/octet-stream"),
        ] {
            assert_eq!(*want, content_type(Path::new(name)), "name {}", name);
        }
    }
}
