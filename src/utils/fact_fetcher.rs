#![forbid(unsafe_code)]

use log::debug;
use reqwest::Client;

use crate::utils::errors::{Errors, UpstreamError};

// ***************************************************************************
//                                Constants
// ***************************************************************************
pub const DEFAULT_NUMBERS_API_URL: &str = "http://numbersapi.com";

// ***************************************************************************
//                               FactFetcher
// ***************************************************************************
/// Looks up math trivia for a number from the Numbers API.
///
/// One fetcher is created at startup and shared by every request.  The
/// underlying reqwest client is reference counted and pools connections,
/// so clones are cheap and no locking is needed.
#[derive(Debug, Clone)]
pub struct FactFetcher {
    client: Client,
    base_url: String,
}

impl FactFetcher {
    pub fn new(base_url: &str) -> Result<Self, Errors> {
        let client = Client::builder()
            .build()
            .map_err(|e| Errors::HttpClientInit(e.to_string()))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// The lookup url for n, {base_url}/{n}/math.
    pub fn fact_url(&self, n: u64) -> String {
        format!("{}/{}/math", self.base_url, n)
    }

    /** Return the raw response body as the fact.  The body is not inspected,
     * so a non-2xx reply still produces a fact (whatever the server sent).
     * Only transport failures are errors.
     */
    pub async fn fetch(&self, n: u64) -> Result<String, UpstreamError> {
        let url = self.fact_url(n);
        debug!("Fetching fun fact from {}", url);
        let resp = self.client.get(&url).send().await?;
        debug!("Numbers API returned status {} for {}", resp.status(), n);
        Ok(resp.text().await?)
    }
}
