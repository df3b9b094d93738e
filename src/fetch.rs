//! # Upstream Retrieval
//!
//! Downloads the upstream configuration file. A sync run makes exactly one
//! request, through the [`Fetcher`] trait so that the orchestrator can be
//! driven by a different source in tests.
//!
//! [`HttpFetcher`] handles `http`, `https` and `file` URLs. GitHub "blob"
//! page URLs are rewritten to their raw-content equivalent by
//! [`github_url_to_raw_url`] before any request is made.

use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::defaults::{GITHUB_HOST, GITHUB_RAW_HOST};
use crate::error::{Error, Result};

/// Source of upstream configuration text
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the document at `url` as UTF-8 text
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Fetches over HTTP(S), or from disk for `file://` URLs
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("ruff-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {}", e),
                hint: None,
            })?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_http_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                message: format!("server responded with status {}", status),
            });
        }

        let text = response.text().await.map_err(|e| map_http_error(url, e))?;
        info!("Downloaded upstream file from {} ({} bytes)", url, text.len());
        Ok(text)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("Fetching {}", url);
        match url.scheme() {
            "http" | "https" => self.fetch_http(url).await,
            "file" => read_file_url(url),
            scheme => Err(Error::Fetch {
                url: url.to_string(),
                message: format!("unsupported URL scheme `{}`", scheme),
            }),
        }
    }
}

fn read_file_url(url: &Url) -> Result<String> {
    let path = url.to_file_path().map_err(|()| Error::Fetch {
        url: url.to_string(),
        message: "not a local file path".to_string(),
    })?;
    let text = fs::read_to_string(&path).map_err(|e| Error::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    info!("Read upstream file from {}", path.display());
    Ok(text)
}

fn map_http_error(url: &Url, error: reqwest::Error) -> Error {
    let url = url.to_string();
    if error.is_timeout() {
        Error::FetchTimeout { url }
    } else if let Some(status) = error.status() {
        Error::Fetch {
            url,
            message: format!("server responded with status {}", status),
        }
    } else if error.is_connect() {
        Error::Fetch {
            url,
            message: format!("connection error: {}", error),
        }
    } else {
        Error::Fetch {
            url,
            message: error.to_string(),
        }
    }
}

/// Convert a GitHub file page URL to its raw content URL
///
/// `https://github.com/<owner>/<repo>/blob/<ref>/<path>` becomes
/// `https://raw.githubusercontent.com/<owner>/<repo>/<ref>/<path>`. Any other
/// URL is returned unchanged.
///
/// ```
/// use ruff_sync::fetch::github_url_to_raw_url;
/// use url::Url;
///
/// let url = Url::parse("https://github.com/pydantic/pydantic/blob/main/pyproject.toml").unwrap();
/// assert_eq!(
///     github_url_to_raw_url(url).as_str(),
///     "https://raw.githubusercontent.com/pydantic/pydantic/main/pyproject.toml"
/// );
/// ```
pub fn github_url_to_raw_url(url: Url) -> Url {
    if url.host_str() != Some(GITHUB_HOST) || !url.path().contains("/blob/") {
        return url;
    }

    let mut raw = url.clone();
    if raw.set_host(Some(GITHUB_RAW_HOST)).is_err() {
        return url;
    }
    raw.set_path(&url.path().replacen("/blob/", "/", 1));
    debug!("Using raw content URL {}", raw);
    raw
}

/// Interpret a command-line or configured upstream location
///
/// Absolute URLs are normalized with [`github_url_to_raw_url`]. A string
/// that is not a URL but names an existing file is turned into a `file://`
/// URL.
///
/// # Errors
///
/// Returns `Error::InvalidUrl` if `upstream` is neither a URL nor an existing
/// path, and `Error::FileAccess` if the path cannot be resolved.
pub fn parse_upstream(upstream: &str) -> Result<Url> {
    match Url::parse(upstream) {
        Ok(url) => Ok(github_url_to_raw_url(url)),
        Err(url::ParseError::RelativeUrlWithoutBase) if Path::new(upstream).is_file() => {
            let path = fs::canonicalize(upstream).map_err(|e| Error::FileAccess {
                path: upstream.to_string(),
                message: e.to_string(),
            })?;
            Url::from_file_path(&path).map_err(|()| Error::FileAccess {
                path: path.display().to_string(),
                message: "cannot be expressed as a file URL".to_string(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod url_tests {
        use super::*;

        #[test]
        fn test_blob_url_is_converted() {
            let url =
                Url::parse("https://github.com/astral-sh/ruff/blob/main/pyproject.toml").unwrap();
            assert_eq!(
                github_url_to_raw_url(url).as_str(),
                "https://raw.githubusercontent.com/astral-sh/ruff/main/pyproject.toml"
            );
        }

        #[test]
        fn test_raw_url_is_unchanged() {
            let text = "https://raw.githubusercontent.com/astral-sh/ruff/main/pyproject.toml";
            let url = Url::parse(text).unwrap();
            assert_eq!(github_url_to_raw_url(url).as_str(), text);
        }

        #[test]
        fn test_github_url_without_blob_is_unchanged() {
            let text = "https://github.com/astral-sh/ruff/raw/main/pyproject.toml";
            assert_eq!(github_url_to_raw_url(Url::parse(text).unwrap()).as_str(), text);
        }

        #[test]
        fn test_other_host_with_blob_is_unchanged() {
            let text = "https://gitlab.com/group/project/blob/main/pyproject.toml";
            assert_eq!(github_url_to_raw_url(Url::parse(text).unwrap()).as_str(), text);
        }

        #[test]
        fn test_parse_upstream_url() {
            let url = parse_upstream("https://github.com/o/r/blob/v1/pyproject.toml").unwrap();
            assert_eq!(url.host_str(), Some("raw.githubusercontent.com"));
            assert_eq!(url.path(), "/o/r/v1/pyproject.toml");
        }

        #[test]
        fn test_parse_upstream_existing_path() {
            let temp = tempfile::TempDir::new().unwrap();
            let path = temp.path().join("upstream.toml");
            fs::write(&path, "[tool.ruff]\n").unwrap();

            let url = parse_upstream(path.to_str().unwrap()).unwrap();
            assert_eq!(url.scheme(), "file");
            assert_eq!(
                url.to_file_path().unwrap(),
                fs::canonicalize(&path).unwrap()
            );
        }

        #[test]
        fn test_parse_upstream_garbage() {
            let err = parse_upstream("definitely/not/here.toml").unwrap_err();
            assert!(matches!(err, Error::InvalidUrl(_)));
        }
    }

    mod fetch_tests {
        use super::*;
        use std::io::{Read, Write};
        use std::net::TcpListener;
        use std::thread;

        fn fetcher() -> HttpFetcher {
            HttpFetcher::new(Duration::from_secs(5)).unwrap()
        }

        #[tokio::test]
        async fn test_fetch_file_url() {
            let temp = tempfile::TempDir::new().unwrap();
            let path = temp.path().join("pyproject.toml");
            fs::write(&path, "[tool.ruff]\nline-length = 100\n").unwrap();

            let url = Url::from_file_path(&path).unwrap();
            let text = fetcher().fetch(&url).await.unwrap();
            assert_eq!(text, "[tool.ruff]\nline-length = 100\n");
        }

        #[tokio::test]
        async fn test_fetch_missing_file_is_fetch_error() {
            let temp = tempfile::TempDir::new().unwrap();
            let url = Url::from_file_path(temp.path().join("missing.toml")).unwrap();
            let err = fetcher().fetch(&url).await.unwrap_err();
            match err {
                Error::Fetch { url: failed, .. } => assert_eq!(failed, url.to_string()),
                other => panic!("Expected Fetch error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_fetch_unsupported_scheme() {
            let url = Url::parse("ftp://example.com/pyproject.toml").unwrap();
            let err = fetcher().fetch(&url).await.unwrap_err();
            assert!(err.to_string().contains("unsupported URL scheme `ftp`"));
        }

        /// Serve one connection on loopback, answering with `response` or, when
        /// it is `None`, holding the connection open without replying
        fn serve_once(response: Option<String>) -> Url {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let address = listener.local_addr().unwrap();
            thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request);
                match response {
                    Some(response) => {
                        let _ = stream.write_all(response.as_bytes());
                    }
                    None => thread::sleep(Duration::from_secs(5)),
                }
            });
            Url::parse(&format!("http://{}/pyproject.toml", address)).unwrap()
        }

        #[tokio::test]
        async fn test_fetch_http_success() {
            let body = "[tool.ruff]\nline-length = 100\n";
            let url = serve_once(Some(format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )));
            let text = fetcher().fetch(&url).await.unwrap();
            assert_eq!(text, body);
        }

        #[tokio::test]
        async fn test_fetch_non_success_status_is_fetch_error() {
            let url = serve_once(Some(
                "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_string(),
            ));
            let err = fetcher().fetch(&url).await.unwrap_err();
            match err {
                Error::Fetch { url: failed, message } => {
                    assert_eq!(failed, url.to_string());
                    assert!(message.contains("404"), "message: {}", message);
                }
                other => panic!("Expected Fetch error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_fetch_silent_server_times_out() {
            let url = serve_once(None);
            let fetcher = HttpFetcher::new(Duration::from_millis(300)).unwrap();
            let err = fetcher.fetch(&url).await.unwrap_err();
            match err {
                Error::FetchTimeout { url: failed } => assert_eq!(failed, url.to_string()),
                other => panic!("Expected FetchTimeout error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_fetch_connection_refused_is_fetch_error() {
            let address = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
            let url = Url::parse(&format!("http://{}/pyproject.toml", address)).unwrap();
            let err = fetcher().fetch(&url).await.unwrap_err();
            assert!(matches!(err, Error::Fetch { .. }), "unexpected error: {:?}", err);
        }
    }
}
