//! Fetch the ChEBI flat files over HTTPS.

use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::{DownloadError, DownloadResult};

use super::FlatFile;

/// What a download pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub fetched: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Blocking HTTP downloader with bounded retries.
pub struct Downloader {
    agent: ureq::Agent,
    base_url: String,
    retries: u32,
    redownload: bool,
}

impl Downloader {
    pub fn new(config: &PipelineConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retries: config.retries.max(1),
            redownload: config.redownload,
        }
    }

    pub fn url(&self, file: FlatFile) -> String {
        format!("{}/{}", self.base_url, file.file_name())
    }

    /// Download every flat file into `dir`.
    ///
    /// A file already present (compressed or not) is kept unless the
    /// downloader was configured with `redownload`.
    pub fn fetch_all(&self, dir: &Path) -> DownloadResult<DownloadReport> {
        std::fs::create_dir_all(dir).map_err(|e| DownloadError::Write {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut report = DownloadReport::default();
        for file in FlatFile::ALL {
            if !self.redownload {
                if let Some(existing) = file.locate(dir) {
                    tracing::info!(file = %existing.display(), "already present, skipping download");
                    report.skipped.push(existing);
                    continue;
                }
            }
            let target = dir.join(file.file_name());
            self.fetch(&self.url(file), &target)?;
            report.fetched.push(target);
        }
        Ok(report)
    }

    /// Download one URL to `target`, retrying transient failures.
    pub fn fetch(&self, url: &str, target: &Path) -> DownloadResult<u64> {
        let mut last_error = String::new();
        for attempt in 1..=self.retries {
            match self.try_fetch(url, target) {
                Ok(bytes) => {
                    tracing::info!(url, bytes, attempt, "downloaded");
                    return Ok(bytes);
                }
                Err(FetchFailure::Write(e)) => return Err(e),
                Err(FetchFailure::Http { message, retryable }) => {
                    tracing::warn!(url, attempt, error = %message, "download attempt failed");
                    last_error = message;
                    if !retryable {
                        return Err(DownloadError::Failed {
                            url: url.to_string(),
                            attempts: attempt,
                            message: last_error,
                        });
                    }
                    if attempt < self.retries {
                        std::thread::sleep(Duration::from_millis(500 * u64::from(attempt)));
                    }
                }
            }
        }
        Err(DownloadError::Failed {
            url: url.to_string(),
            attempts: self.retries,
            message: last_error,
        })
    }

    fn try_fetch(&self, url: &str, target: &Path) -> Result<u64, FetchFailure> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(FetchFailure::Http {
                    message: format!("server returned status {code}"),
                    // Client errors will not change on retry.
                    retryable: code >= 500,
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchFailure::Http {
                    message: transport.to_string(),
                    retryable: true,
                });
            }
        };

        // Stream to a sibling file and rename, so an interrupted download
        // never looks like a complete one.
        let partial = target.with_extension("part");
        let file = File::create(&partial).map_err(|e| write_err(&partial, e))?;
        let streamed = stream(response.into_reader(), BufWriter::new(file), &partial);
        let bytes = match streamed {
            Ok(bytes) => bytes,
            Err(failure) => {
                let _ = std::fs::remove_file(&partial);
                return Err(failure);
            }
        };
        std::fs::rename(&partial, target).map_err(|e| write_err(target, e))?;
        Ok(bytes)
    }
}

fn write_err(path: &Path, e: std::io::Error) -> FetchFailure {
    FetchFailure::Write(DownloadError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

/// Copy a response body into `writer`. A failed read is a dropped
/// connection and may be retried; a failed write is a local problem and
/// is not.
fn stream(mut reader: impl Read, mut writer: impl Write, path: &Path) -> Result<u64, FetchFailure> {
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(FetchFailure::Http {
                    message: format!("connection dropped: {e}"),
                    retryable: true,
                });
            }
        };
        writer.write_all(&buf[..n]).map_err(|e| write_err(path, e))?;
        total += n as u64;
    }
    writer.flush().map_err(|e| write_err(path, e))?;
    Ok(total)
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("base_url", &self.base_url)
            .field("retries", &self.retries)
            .field("redownload", &self.redownload)
            .finish()
    }
}

enum FetchFailure {
    Http { message: String, retryable: bool },
    Write(DownloadError),
}
