//! Remote reachability probing and caching.
//!
//! A fetch is only attempted against remotes that answer a quick probe.
//! [`ReachabilityCache`] remembers answers per URL; the caller owns it and
//! decides how long answers stay valid.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::url_parser::{RemoteLocation, classify};

/// Upper bound for a whole probe request once connected.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Decides whether a remote URL is worth contacting.
pub trait ReachabilityProbe: Send + Sync {
    /// Probe `url` once.
    fn probe(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// Probes HTTP(S) remotes with a short connect timeout.
///
/// Any HTTP response counts as reachable, whatever its status. Local paths
/// are reachable when they exist. Other transports cannot be probed and
/// follow `assume_ssh_reachable`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    assume_ssh_reachable: bool,
}

impl HttpProbe {
    /// Default connect timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Build a probe with the given connect timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(REQUEST_TIMEOUT.max(connect_timeout))
            .build()?;
        Ok(Self {
            client,
            assume_ssh_reachable: false,
        })
    }

    /// Treat ssh, git-protocol and other non-HTTP remotes as reachable.
    #[must_use]
    pub fn assume_ssh_reachable(mut self, on: bool) -> Self {
        self.assume_ssh_reachable = on;
        self
    }
}

impl ReachabilityProbe for HttpProbe {
    async fn probe(&self, url: &str) -> bool {
        match classify(url) {
            RemoteLocation::Http(u) => match self.client.head(u).send().await {
                Ok(resp) => {
                    debug!(url, status = %resp.status(), "remote answered");
                    true
                }
                Err(e) => {
                    debug!(url, error = %e, "remote unreachable");
                    false
                }
            },
            RemoteLocation::Local(path) => path.exists(),
            RemoteLocation::Other(scheme) => {
                debug!(url, scheme = %scheme, "cannot probe over HTTP");
                self.assume_ssh_reachable
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    reachable: bool,
    checked_at: Instant,
}

/// Per-URL memo of probe results.
///
/// Without a TTL, answers never expire. Entries can be dropped with
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear).
#[derive(Debug)]
pub struct ReachabilityCache<P> {
    probe: P,
    ttl: Option<Duration>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<P: ReachabilityProbe> ReachabilityCache<P> {
    /// Create an empty cache whose answers never expire.
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            ttl: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Expire answers after `ttl`; `None` keeps them forever.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Whether `url` is reachable, probing only on a miss or expired entry.
    pub async fn is_reachable(&self, url: &str) -> bool {
        if let Some(reachable) = self.lookup(url) {
            trace!(url, reachable, "reachability cache hit");
            return reachable;
        }

        let reachable = self.probe.probe(url).await;
        debug!(url, reachable, "probed remote");
        self.entries().insert(
            url.to_string(),
            CacheEntry {
                reachable,
                checked_at: Instant::now(),
            },
        );
        reachable
    }

    /// Forget the answer for `url`. Returns whether one was cached.
    pub fn invalidate(&self, url: &str) -> bool {
        self.entries().remove(url).is_some()
    }

    /// Forget every answer.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of cached answers, including expired ones not yet replaced.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    fn lookup(&self, url: &str) -> Option<bool> {
        let entries = self.entries();
        let entry = entries.get(url)?;
        match self.ttl {
            Some(ttl) if entry.checked_at.elapsed() >= ttl => None,
            _ => Some(entry.reachable),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Answers from a fixed set of reachable URLs and counts calls.
    #[derive(Debug, Default)]
    pub(crate) struct CountingProbe {
        pub(crate) reachable: HashSet<String>,
        pub(crate) calls: AtomicUsize,
    }

    impl CountingProbe {
        pub(crate) fn reaching(urls: &[&str]) -> Self {
            Self {
                reachable: urls.iter().map(|u| (*u).to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ReachabilityProbe for CountingProbe {
        async fn probe(&self, url: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reachable.contains(url)
        }
    }

    #[tokio::test]
    async fn test_should_probe_once_per_url() {
        let cache = ReachabilityCache::new(CountingProbe::reaching(&["https://a.example/r.git"]));

        assert!(cache.is_reachable("https://a.example/r.git").await);
        assert!(cache.is_reachable("https://a.example/r.git").await);
        assert_eq!(cache.probe().calls(), 1);

        assert!(!cache.is_reachable("https://b.example/r.git").await);
        assert!(!cache.is_reachable("https://b.example/r.git").await);
        assert_eq!(cache.probe().calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_should_probe_again_after_invalidate() {
        let cache = ReachabilityCache::new(CountingProbe::reaching(&["u"]));
        cache.is_reachable("u").await;
        assert!(cache.invalidate("u"));
        assert!(!cache.invalidate("u"));
        cache.is_reachable("u").await;
        assert_eq!(cache.probe().calls(), 2);
    }

    #[tokio::test]
    async fn test_should_probe_again_after_clear() {
        let cache = ReachabilityCache::new(CountingProbe::default());
        cache.is_reachable("a").await;
        cache.is_reachable("b").await;
        cache.clear();
        assert!(cache.is_empty());
        cache.is_reachable("a").await;
        assert_eq!(cache.probe().calls(), 3);
    }

    #[tokio::test]
    async fn test_should_expire_entries_after_ttl() {
        let cache =
            ReachabilityCache::new(CountingProbe::reaching(&["u"])).with_ttl(Some(Duration::ZERO));
        cache.is_reachable("u").await;
        cache.is_reachable("u").await;
        assert_eq!(cache.probe().calls(), 2);
    }

    #[tokio::test]
    async fn test_should_keep_entries_within_ttl() {
        let cache = ReachabilityCache::new(CountingProbe::reaching(&["u"]))
            .with_ttl(Some(Duration::from_secs(3600)));
        cache.is_reachable("u").await;
        cache.is_reachable("u").await;
        assert_eq!(cache.probe().calls(), 1);
    }

    #[tokio::test]
    async fn test_should_reach_http_server_with_ok_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(HttpProbe::DEFAULT_CONNECT_TIMEOUT).unwrap();
        assert!(probe.probe(&format!("{}/repo.git", server.uri())).await);
    }

    #[tokio::test]
    async fn test_should_reach_http_server_with_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(HttpProbe::DEFAULT_CONNECT_TIMEOUT).unwrap();
        assert!(probe.probe(&format!("{}/missing.git", server.uri())).await);
    }

    #[tokio::test]
    async fn test_should_not_reach_closed_port() {
        let probe = HttpProbe::new(Duration::from_millis(500)).unwrap();
        assert!(!probe.probe("http://127.0.0.1:1/repo.git").await);
    }

    #[tokio::test]
    async fn test_should_probe_local_paths_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let probe = HttpProbe::new(HttpProbe::DEFAULT_CONNECT_TIMEOUT).unwrap();
        assert!(probe.probe(dir.path().to_str().unwrap()).await);
        assert!(!probe.probe("/nonexistent/gitshell/remote.git").await);
    }

    #[tokio::test]
    async fn test_should_follow_ssh_assumption() {
        let probe = HttpProbe::new(HttpProbe::DEFAULT_CONNECT_TIMEOUT).unwrap();
        assert!(!probe.probe("git@example.com:org/repo.git").await);

        let probe = probe.assume_ssh_reachable(true);
        assert!(probe.probe("git@example.com:org/repo.git").await);
    }
}
