use super::client::HttpClient;
use async_trait::async_trait;
use tracing::warn;

const USER_AGENT: &str = concat!("brt_ridership/", env!("CARGO_PKG_VERSION"));

/// Plain `reqwest` client with no timeout and no retry policy.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Client builder failed, using default client");
                reqwest::Client::new()
            });
        Self(client)
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
