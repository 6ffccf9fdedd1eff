//! Downloader against an in-process HTTP server on loopback

use cuaderno::download::{DownloadOptions, DownloadOutcome, Downloader};
use cuaderno::Error;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::tempdir;

/// Minimal HTTP/1.1 server: one request per connection, canned responses
struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    fn start<F>(respond: F) -> Self
    where
        F: Fn(&str, SocketAddr) -> Vec<u8> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let request = read_request(&mut stream);
                let path = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                log.lock().unwrap().push(request);
                let _ = stream.write_all(&respond(&path, addr));
                let _ = stream.flush();
            }
        });

        Self { addr, requests }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn first_request(&self) -> String {
        self.requests.lock().unwrap()[0].to_lowercase()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(0) | Err(_) => break,
            Ok(_) => buf.push(byte[0]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn response(status: &str, headers: &[(&str, String)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

fn ok_with_length(body: &[u8]) -> Vec<u8> {
    response(
        "200 OK",
        &[("Content-Length", body.len().to_string())],
        body,
    )
}

fn quiet_downloader(chunk_size: usize) -> Downloader {
    Downloader::with_options(
        DownloadOptions::default()
            .with_progress(false)
            .with_chunk_size(chunk_size),
    )
    .unwrap()
}

fn assert_nothing_left(path: &Path) {
    assert!(!path.exists(), "{} should not exist", path.display());
    let part = path.with_file_name(format!(
        "{}.part",
        path.file_name().unwrap().to_str().unwrap()
    ));
    assert!(!part.exists(), "{} should not exist", part.display());
}

fn payload() -> Vec<u8> {
    (0..10_000u32).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_download_writes_exact_body() {
    let body = payload();
    let served = body.clone();
    let server = TestServer::start(move |_, _| ok_with_length(&served));

    let dir = tempdir().unwrap();
    let path = dir.path().join("data.bin");
    let outcome = quiet_downloader(1000)
        .download(&server.url("/data.bin"), &path)
        .unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Downloaded {
            bytes: body.len() as u64
        }
    );
    assert_eq!(std::fs::read(&path).unwrap(), body);
    assert!(server.first_request().starts_with("get /data.bin"));
    assert!(server.first_request().contains("accept-encoding: identity"));
}

#[test]
fn test_second_call_skips_without_request() {
    let server = TestServer::start(|_, _| ok_with_length(b"fresh bytes"));

    let dir = tempdir().unwrap();
    let path = dir.path().join("cached.txt");
    let downloader = quiet_downloader(4);

    downloader.download(&server.url("/cached.txt"), &path).unwrap();
    let outcome = downloader.download(&server.url("/cached.txt"), &path).unwrap();

    assert_eq!(outcome, DownloadOutcome::Skipped);
    assert_eq!(server.request_count(), 1);
    assert_eq!(std::fs::read(&path).unwrap(), b"fresh bytes");
}

#[test]
fn test_not_found_leaves_no_file() {
    let server = TestServer::start(|_, _| {
        response("404 Not Found", &[("Content-Length", "9".to_string())], b"not found")
    });

    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.bin");
    let url = server.url("/missing.bin");
    let err = quiet_downloader(64).download(&url, &path).unwrap_err();

    match err {
        Error::HttpStatus { status, url: failed } => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_nothing_left(&path);
}

#[test]
fn test_missing_content_length_is_an_error() {
    // Body delimited by connection close, no length header
    let server = TestServer::start(|_, _| response("200 OK", &[], b"streamed without length"));

    let dir = tempdir().unwrap();
    let path = dir.path().join("nolength.bin");
    let err = quiet_downloader(64)
        .download(&server.url("/nolength.bin"), &path)
        .unwrap_err();

    assert!(matches!(err, Error::MissingContentLength(_)));
    assert_nothing_left(&path);
}

#[test]
fn test_redirect_is_followed() {
    let server = TestServer::start(|path, addr| match path {
        "/old" => response(
            "302 Found",
            &[
                ("Location", format!("http://{addr}/new")),
                ("Content-Length", "0".to_string()),
            ],
            b"",
        ),
        _ => ok_with_length(b"moved content"),
    });

    let dir = tempdir().unwrap();
    let path = dir.path().join("moved.txt");
    let outcome = quiet_downloader(5).download(&server.url("/old"), &path).unwrap();

    assert_eq!(outcome, DownloadOutcome::Downloaded { bytes: 13 });
    assert_eq!(std::fs::read(&path).unwrap(), b"moved content");
    assert_eq!(server.request_count(), 2);
}

#[test]
fn test_truncated_body_leaves_no_file() {
    // Announces more bytes than it sends, then closes
    let server = TestServer::start(|_, _| {
        response("200 OK", &[("Content-Length", "1000".to_string())], b"short")
    });

    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.bin");
    let result = quiet_downloader(16).download(&server.url("/partial.bin"), &path);

    assert!(result.is_err());
    assert_nothing_left(&path);
}
