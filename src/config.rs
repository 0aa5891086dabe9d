use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/videos";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Document store connection target
    pub mongodb_uri: String,
    /// Bound on the startup connection attempt
    pub connect_timeout: Duration,
    pub bind_address: SocketAddr,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mongodb_uri = lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string());

        let connect_timeout = match lookup("MONGODB_CONNECT_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .with_context(|| format!("MONGODB_CONNECT_TIMEOUT_MS is not a number: {raw}"))?,
            ),
            None => Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        };

        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDRESS is not a socket address: {bind_address}"))?;

        Ok(Self {
            mongodb_uri,
            connect_timeout,
            bind_address,
        })
    }
}
