use std::time::Duration;

use async_trait::async_trait;
use url::Url;

/// Whether the device can reach the network at all.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_network_available(&self) -> bool;
}

/// Treats "the API host resolves" as being online.
#[derive(Debug, Clone)]
pub struct DnsConnectivity {
    host: String,
    port: u16,
    timeout: Duration,
}

impl DnsConnectivity {
    const TIMEOUT_SECS: u64 = 3;

    /// Probe the host of `base_url`, or `None` if the URL has no host.
    pub fn for_url(base_url: &str) -> Option<Self> {
        let url = Url::parse(base_url).ok()?;
        let host = url.host_str()?.to_string();
        let port = url.port_or_known_default().unwrap_or(443);

        Some(Self {
            host,
            port,
            timeout: Duration::from_secs(Self::TIMEOUT_SECS),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl Connectivity for DnsConnectivity {
    async fn is_network_available(&self) -> bool {
        let lookup = tokio::net::lookup_host((self.host.as_str(), self.port));

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                tracing::debug!("Connectivity probe for {} failed: {}", self.host, e);
                false
            }
            Err(_) => {
                tracing::debug!("Connectivity probe for {} timed out", self.host);
                false
            }
        }
    }
}
