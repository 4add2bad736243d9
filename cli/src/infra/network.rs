//! Network infrastructure: implements `AddressLookup` using `spawn_blocking`.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::AddressLookup;
use crate::domain::error::ProvisionError;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Asks an HTTPS endpoint that echoes the caller's address as plain text.
pub struct UreqAddressLookup {
    url: String,
}

impl UreqAddressLookup {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl AddressLookup for UreqAddressLookup {
    async fn public_address(&self) -> Result<String> {
        let url = self.url.clone();
        let body = tokio::task::spawn_blocking(move || {
            let agent = ureq::AgentBuilder::new().timeout(LOOKUP_TIMEOUT).build();
            agent
                .get(&url)
                .call()
                .map_err(|e| ProvisionError::NetworkUnavailable(e.to_string()))?
                .into_string()
                .map_err(|e| ProvisionError::NetworkUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))??;

        parse_address(&body).ok_or_else(|| {
            ProvisionError::NetworkUnavailable(format!("unexpected reply: {body}")).into()
        })
    }
}

/// Accept only a bare IPv4/IPv6 address.
fn parse_address(body: &str) -> Option<String> {
    let trimmed = body.trim();
    trimmed
        .parse::<std::net::IpAddr>()
        .ok()
        .map(|_| trimmed.to_string())
}
