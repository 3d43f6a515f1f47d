use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport used by every fetch in the crate.
///
/// Stores are generic over this trait so tests can answer requests from
/// canned bodies instead of the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
