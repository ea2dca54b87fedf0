use crate::error::{Result, ScanError};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest sanitized target kept verbatim in a dump file name. Longer ones
/// are cut and suffixed with a digest so the name stays under 255 bytes.
const MAX_DUMP_STEM: usize = 160;

/// Retrieves a page and leaves a local dump of it for scanning.
pub trait Fetcher {
    fn fetch(&self, target: &str) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Downloads pages over HTTP(S) into a dump directory.
pub struct HttpFetcher {
    client: Client,
    dump_dir: PathBuf,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "Gleaner/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/trapdoorsec/gleaner)"
            ))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            dump_dir: std::env::temp_dir().join("gleaner"),
        })
    }

    pub fn with_dump_dir(mut self, dump_dir: PathBuf) -> Self {
        self.dump_dir = dump_dir;
        self
    }

    pub fn dump_dir(&self) -> &Path {
        &self.dump_dir
    }

    /// Where the page for `target` is written.
    pub fn dump_path(&self, target: &str) -> PathBuf {
        self.dump_dir
            .join(format!("scraped-url-for-{}.txt", dump_stem(target)))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str) -> Result<PathBuf> {
        let url = normalize_target(target);
        Url::parse(&url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        let fetch_failed = |e: reqwest::Error| ScanError::FetchFailed {
            target: target.to_string(),
            reason: e.to_string(),
        };

        debug!("Fetching {}", url);
        let mut response = self.client.get(&url).send().await.map_err(fetch_failed)?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}, scanning the body anyway", url, status);
        }

        fs::create_dir_all(&self.dump_dir).await?;
        let path = self.dump_path(target);
        let mut file = File::create(&path).await?;

        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await.map_err(fetch_failed)? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        info!("Downloaded {} ({} bytes) to {}", url, written, path.display());
        Ok(path)
    }
}

/// Prefixes `http://` unless the target already carries an HTTP(S) scheme.
pub fn normalize_target(target: &str) -> String {
    if has_http_scheme(target) {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

fn has_http_scheme(target: &str) -> bool {
    let head = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Host part of a target given with or without a scheme.
pub fn target_hostname(target: &str) -> Result<String> {
    let url = normalize_target(target);
    Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(|| ScanError::InvalidUrl(target.to_string()))
}

/// Makes a target usable as part of a file name.
pub fn sanitize_target(target: &str) -> String {
    target
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitized target, cut to [`MAX_DUMP_STEM`] bytes plus a digest of the
/// full target when it is too long for a file name.
fn dump_stem(target: &str) -> String {
    let sanitized = sanitize_target(target);
    if sanitized.len() <= MAX_DUMP_STEM {
        return sanitized;
    }

    let mut hasher = Sha256::new();
    hasher.update(target.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}-{}", &sanitized[..MAX_DUMP_STEM], &digest[..16])
}

/// Reads `path` in chunks of exactly `chunk_size` bytes (the last one may be
/// shorter), handing each to `on_chunk` as lossily decoded text.
///
/// Returns the number of bytes read. A failure to open the file is an
/// [`ScanError::IoError`]; a failure once reading has begun is a
/// [`ScanError::ReadError`].
pub async fn read_chunks<F>(path: &Path, chunk_size: usize, mut on_chunk: F) -> Result<usize>
where
    F: FnMut(&str),
{
    let mut file = File::open(path).await?;
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total = 0;

    loop {
        let mut filled = 0;
        while filled < buffer.len() {
            match file.read(&mut buffer[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScanError::ReadError {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        if filled == 0 {
            break;
        }
        total += filled;
        on_chunk(&String::from_utf8_lossy(&buffer[..filled]));

        if filled < buffer.len() {
            break;
        }
    }

    debug!("Read {} bytes from {}", total, path.display());
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[test]
    fn test_normalize_target_adds_scheme() {
        assert_eq!(normalize_target("example.com"), "http://example.com");
        assert_eq!(normalize_target("example.com/a.js"), "http://example.com/a.js");
    }

    #[test]
    fn test_normalize_target_keeps_scheme() {
        assert_eq!(normalize_target("http://example.com"), "http://example.com");
        assert_eq!(normalize_target("https://example.com"), "https://example.com");
        assert_eq!(normalize_target("HTTPS://example.com"), "HTTPS://example.com");
    }

    #[test]
    fn test_normalize_target_host_starting_with_http() {
        assert_eq!(normalize_target("httpbin.org"), "http://httpbin.org");
        assert_eq!(
            normalize_target("httpstatic.cloudflare.com/a.js"),
            "http://httpstatic.cloudflare.com/a.js"
        );
        assert_eq!(normalize_target("https.example.com"), "http://https.example.com");
    }

    #[test]
    fn test_target_hostname() {
        assert_eq!(target_hostname("example.com").unwrap(), "example.com");
        assert_eq!(
            target_hostname("cdn.cloudflare.com/lib.js?v=2").unwrap(),
            "cdn.cloudflare.com"
        );
        assert_eq!(target_hostname("https://Example.COM:8443/x").unwrap(), "example.com");
        assert_eq!(target_hostname("httpbin.org").unwrap(), "httpbin.org");
        assert_eq!(
            target_hostname("httpstatic.cloudflare.com/a.js").unwrap(),
            "httpstatic.cloudflare.com"
        );
        assert!(target_hostname("").is_err());
    }

    #[test]
    fn test_sanitize_target() {
        assert_eq!(
            sanitize_target("https://cdn.example.com/lib.js?v=2"),
            "https___cdn.example.com_lib.js_v_2"
        );
    }

    #[test]
    fn test_dump_path_inside_dump_dir() {
        let dir = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new()
            .unwrap()
            .with_dump_dir(dir.path().to_path_buf());
        let dump = fetcher.dump_path("example.com");
        assert_eq!(dump, dir.path().join("scraped-url-for-example.com.txt"));
    }

    #[test]
    fn test_dump_path_long_target_is_bounded() {
        let fetcher = HttpFetcher::new().unwrap();
        let base = format!("cdn.example.com/static/app.js?v={}", "a".repeat(300));
        let other = format!("{}b", base);

        let dump = fetcher.dump_path(&base);
        let name = dump.file_name().unwrap().to_str().unwrap();
        assert!(name.len() < 255, "{} bytes", name.len());
        assert!(name.starts_with("scraped-url-for-cdn.example.com_static_app.js_v_aaa"));
        assert_ne!(dump, fetcher.dump_path(&other));
        assert_eq!(dump, fetcher.dump_path(&base));
    }

    #[tokio::test]
    async fn test_read_chunks_fixed_size() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'a'; 2500]).unwrap();

        let mut sizes = Vec::new();
        let total = read_chunks(file.path(), 1024, |chunk| sizes.push(chunk.len()))
            .await
            .unwrap();

        assert_eq!(total, 2500);
        assert_eq!(sizes, vec![1024, 1024, 452]);
    }

    #[tokio::test]
    async fn test_read_chunks_exact_multiple() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'x'; 2048]).unwrap();

        let mut count = 0;
        read_chunks(file.path(), 1024, |_| count += 1).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_read_chunks_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let mut count = 0;
        let total = read_chunks(file.path(), 1024, |_| count += 1).await.unwrap();
        assert_eq!(total, 0);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_read_chunks_invalid_utf8_is_lossy() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\"a.com\xff\xfe 1.2.3.4").unwrap();

        let mut text = String::new();
        read_chunks(file.path(), 1024, |chunk| text.push_str(chunk))
            .await
            .unwrap();
        assert!(text.starts_with("\"a.com"));
        assert!(text.ends_with("1.2.3.4"));
    }

    #[tokio::test]
    async fn test_read_chunks_missing_file() {
        let result = read_chunks(Path::new("/nonexistent/page.txt"), 1024, |_| {}).await;
        assert!(matches!(result, Err(ScanError::IoError(_))));
    }

    #[tokio::test]
    async fn test_fetch_writes_dump() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(b"<script src=\"//cdn.cloudflare.com/lib.js\"></script>"),
            )
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let fetcher = HttpFetcher::with_timeout(5)
            .unwrap()
            .with_dump_dir(dir.path().join("dumps"));

        let dump = fetcher.fetch(&mock_server.uri()).await.unwrap();
        assert_eq!(fetcher.dump_dir(), dir.path().join("dumps"));
        assert!(dump.starts_with(fetcher.dump_dir()));

        let body = std::fs::read_to_string(&dump).unwrap();
        assert_eq!(body, "<script src=\"//cdn.cloudflare.com/lib.js\"></script>");
    }

    #[tokio::test]
    async fn test_fetch_error_status_still_dumps_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_bytes(b"not here \"a.com\""))
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new()
            .unwrap()
            .with_dump_dir(dir.path().to_path_buf());

        let dump = fetcher
            .fetch(&format!("{}/missing", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(dump).unwrap(), "not here \"a.com\"");
    }

    #[tokio::test]
    async fn test_fetch_long_query_string() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/app.js"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\"cdn.example.com\""))
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new()
            .unwrap()
            .with_dump_dir(dir.path().to_path_buf());

        let target = format!("{}/static/app.js?v={}", mock_server.uri(), "a".repeat(260));
        let dump = fetcher.fetch(&target).await.unwrap();
        assert_eq!(std::fs::read_to_string(dump).unwrap(), "\"cdn.example.com\"");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_fails() {
        let dir = TempDir::new().unwrap();
        let fetcher = HttpFetcher::with_timeout(2)
            .unwrap()
            .with_dump_dir(dir.path().to_path_buf());

        // Port 9 (discard) on localhost is closed in test environments.
        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        let err = result.unwrap_err();
        assert!(matches!(err, ScanError::FetchFailed { .. }));
        assert!(err.is_fetch_failure());
    }
}
