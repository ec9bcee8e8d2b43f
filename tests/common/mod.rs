//! Shared utilities for integration tests.

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

use keyword_matcher::campaign::CampaignCache;
use keyword_matcher::config::ServiceConfig;
use keyword_matcher::http::HttpServer;
use keyword_matcher::lifecycle::Shutdown;
use keyword_matcher::matching::MatchOptions;

/// Campaign used across tests.
pub const ACME: &str = r#"{
    "honeypot_hardcoded_s2": ["test call"],
    "interested_p1_s2": ["this is a test call", "yes"],
    "donotcall_p1_s3": ["do not call", "remove me"],
    "interested_p2_s3": ["interested", "sounds good"],
    "dnq_p5_s3": ["not qualified"],
    "foo_bar_baz": ["ignored"]
}"#;

/// Keyword directory in a temp location.
pub struct KeywordsDir {
    pub dir: TempDir,
}

impl KeywordsDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn write(&self, campaign: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(format!("{}.json", campaign));
        fs::write(&path, body).unwrap();
        path
    }

    pub fn cache(&self) -> Arc<CampaignCache> {
        Arc::new(CampaignCache::new(self.dir.path(), MatchOptions::default()))
    }
}

/// A server bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub cache: Arc<CampaignCache>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start(keywords: &KeywordsDir, api_key: Option<&str>) -> Self {
        let mut config = ServiceConfig::default();
        config.campaigns.keywords_dir = keywords.dir.path().to_path_buf();
        config.admin.api_key = api_key.map(str::to_string);

        let cache = keywords.cache();
        let shutdown = Shutdown::new();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = HttpServer::new(&config, cache.clone());
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            cache,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Poll `check` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_until<F: Fn() -> bool>(check: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    check()
}

/// HTTP client that bypasses any environment proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
