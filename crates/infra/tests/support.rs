use std::sync::Arc;

use ksef_common::testing::RecordingSleeper;
use ksef_domain::{ClientSettings, Timeouts};
use ksef_infra::{KsefClient, MemoryApiLog};

pub const VALID_CERT: &str = include_str!("fixtures/encryption_cert.der.b64");
pub const PRIVATE_KEY: &str = include_str!("fixtures/encryption_key.pem");

/// Real blocking client pointed at a mock server, with recorded sleeps.
pub struct TestClient {
    pub client: Arc<KsefClient>,
    pub log: Arc<MemoryApiLog>,
    pub sleeper: RecordingSleeper,
}

impl TestClient {
    pub fn new(base_url: &str, max_retries: u32) -> Self {
        Self::with_timeouts(base_url, max_retries, Timeouts::default())
    }

    pub fn with_timeouts(base_url: &str, max_retries: u32, timeouts: Timeouts) -> Self {
        let settings = ClientSettings {
            max_retries,
            timeouts,
            ..ClientSettings::with_base_url(format!("{base_url}/v2"))
        };
        let log = Arc::new(MemoryApiLog::new());
        let sleeper = RecordingSleeper::new();
        let client = KsefClient::builder(settings)
            .log_sink(log.clone())
            .sleeper(Arc::new(sleeper.clone()))
            .build()
            .expect("client should build");

        Self { client: Arc::new(client), log, sleeper }
    }
}

/// Run blocking client code off the async test runtime.
pub async fn blocking<F, T>(work: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.expect("blocking task should not panic")
}
