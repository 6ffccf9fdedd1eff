//! Streaming file download with a progress bar
//!
//! Fetches a URL into a local file, skipping the request entirely when the
//! file is already present. The body streams through a large buffered writer
//! into `<path>.part`, which is renamed into place only once every byte the
//! server announced has arrived.

use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT_ENCODING;
use reqwest::redirect::Policy;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const MIB: usize = 1024 * 1024;

/// Tuning for [`Downloader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Bytes requested from the response per read
    pub chunk_size: usize,
    /// Capacity of the buffered file writer
    pub buffer_size: usize,
    /// Draw a progress bar on stderr
    pub progress: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            chunk_size: MIB,
            buffer_size: 16 * MIB,
            progress: true,
        }
    }
}

impl DownloadOptions {
    /// Enable/disable the progress bar
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Set the per-read chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// What a download call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The target already existed; no request was made
    Skipped,
    /// The file was fetched and written
    Downloaded {
        /// Bytes written to disk
        bytes: u64,
    },
}

/// Blocking HTTP downloader
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    options: DownloadOptions,
}

impl Downloader {
    /// Downloader with default options
    pub fn new() -> Result<Self> {
        Self::with_options(DownloadOptions::default())
    }

    /// Downloader with explicit options
    ///
    /// Rejects a zero `chunk_size` and a `buffer_size` smaller than it, the
    /// same rules config validation applies.
    pub fn with_options(options: DownloadOptions) -> Result<Self> {
        if options.chunk_size == 0 {
            return Err(Error::InvalidParameter(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if options.buffer_size < options.chunk_size {
            return Err(Error::InvalidParameter(format!(
                "buffer_size {} must be >= chunk_size {}",
                options.buffer_size, options.chunk_size
            )));
        }
        let client = Client::builder().redirect(Policy::limited(10)).build()?;
        Ok(Self { client, options })
    }

    /// Active options
    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Fetch `url` into `path` unless `path` already exists
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success status codes, a response
    /// without `Content-Length`, a body shorter than announced, or any
    /// file-system error. On failure no file is left at `path` or at the
    /// temporary `.part` path.
    pub fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<DownloadOutcome> {
        let path = path.as_ref();
        if path.exists() {
            tracing::warn!(path = %path.display(), "file exists, skipping download");
            return Ok(DownloadOutcome::Skipped);
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidParameter(format!("no file name in {}", path.display()))
            })?
            .to_string();

        // Ask for the raw bytes so Content-Length matches what we read
        let response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, "identity")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let total = response
            .content_length()
            .ok_or_else(|| Error::MissingContentLength(url.to_string()))?;

        let bar = self.progress_bar(total, &file_name);
        let part = part_path(path, &file_name);

        let written = match self.stream_to(response, &part, &bar) {
            Ok(written) if written == total => written,
            Ok(written) => {
                bar.abandon();
                let _ = std::fs::remove_file(&part);
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("expected {total} bytes from {url}, got {written}"),
                )));
            }
            Err(e) => {
                bar.abandon();
                let _ = std::fs::remove_file(&part);
                return Err(e);
            }
        };

        if let Err(e) = std::fs::rename(&part, path) {
            let _ = std::fs::remove_file(&part);
            return Err(e.into());
        }
        bar.finish();

        tracing::info!(url, path = %path.display(), bytes = written, "download complete");
        Ok(DownloadOutcome::Downloaded { bytes: written })
    }

    fn stream_to(&self, mut body: impl Read, part: &Path, bar: &ProgressBar) -> Result<u64> {
        let file = File::create(part)?;
        let mut writer = BufWriter::with_capacity(self.options.buffer_size, file);
        let mut chunk = vec![0u8; self.options.chunk_size];
        let mut written = 0u64;

        loop {
            let n = body.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            writer.write_all(&chunk[..n])?;
            written += n as u64;
            bar.inc(n as u64);
        }

        writer.flush()?;
        Ok(written)
    }

    fn progress_bar(&self, total: u64, name: &str) -> ProgressBar {
        if !self.options.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        bar.set_message(name.to_string());
        bar
    }
}

fn part_path(path: &Path, file_name: &str) -> PathBuf {
    path.with_file_name(format!("{file_name}.part"))
}

/// Fetch `url` into `path` with default options, skipping if `path` exists
pub fn download_file(url: &str, path: impl AsRef<Path>) -> Result<DownloadOutcome> {
    Downloader::new()?.download(url, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_options() {
        let options = DownloadOptions::default();
        assert_eq!(options.chunk_size, 1024 * 1024);
        assert_eq!(options.buffer_size, 16 * 1024 * 1024);
        assert!(options.progress);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = Downloader::with_options(DownloadOptions::default().with_chunk_size(0));
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_buffer_smaller_than_chunk_rejected() {
        let options = DownloadOptions {
            chunk_size: 4096,
            buffer_size: 1024,
            progress: false,
        };
        let err = Downloader::with_options(options).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert!(err.to_string().contains("buffer_size 1024"));

        let equal = DownloadOptions {
            chunk_size: 4096,
            buffer_size: 4096,
            progress: false,
        };
        assert!(Downloader::with_options(equal).is_ok());
    }

    #[test]
    fn test_existing_file_is_skipped_without_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"already here").unwrap();

        // Port 9 (discard) on loopback: any request attempt would fail
        let downloader =
            Downloader::with_options(DownloadOptions::default().with_progress(false)).unwrap();
        let outcome = downloader.download("http://127.0.0.1:9/data.bin", &path).unwrap();

        assert_eq!(outcome, DownloadOutcome::Skipped);
        assert_eq!(std::fs::read(&path).unwrap(), b"already here");
    }

    #[test]
    fn test_part_path_sits_next_to_target() {
        let part = part_path(Path::new("/data/model.h5"), "model.h5");
        assert_eq!(part, PathBuf::from("/data/model.h5.part"));
    }

    #[test]
    fn test_stream_to_counts_bytes() {
        let dir = tempdir().unwrap();
        let part = dir.path().join("x.part");
        let downloader = Downloader::with_options(
            DownloadOptions::default()
                .with_progress(false)
                .with_chunk_size(3),
        )
        .unwrap();

        let body: &[u8] = b"hello world";
        let written = downloader
            .stream_to(body, &part, &ProgressBar::hidden())
            .unwrap();

        assert_eq!(written, 11);
        assert_eq!(std::fs::read(&part).unwrap(), b"hello world");
    }
}
