use crate::error::{Result, ScanError};
use reqwest::{Client, Url};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

/// Default Tor Browser SOCKS port.
pub const DEFAULT_SOCKS_ADDR: &str = "127.0.0.1:9150";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the local SOCKS5 endpoint lives and how long a request may take.
///
/// The HTTP client and the headless browser both derive their proxy settings
/// from the same config, so a run never mixes routes.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub socks_addr: String,
    pub timeout: Duration,
}

impl ProxyConfig {
    pub fn new(socks_addr: impl Into<String>) -> Self {
        Self {
            socks_addr: socks_addr.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Proxy URL for reqwest. `socks5h` hands host names to the proxy so
    /// name resolution happens on the far side of the circuit.
    pub fn client_proxy_url(&self) -> String {
        format!("socks5h://{}", self.socks_addr)
    }

    /// Value for Chromium's `--proxy-server` flag.
    pub fn browser_proxy_server(&self) -> String {
        format!("socks5://{}", self.socks_addr)
    }

    /// Accepts `host:port`, where host is an IPv4 address, a bracketed IPv6
    /// address or a host name.
    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            ScanError::ProxySetup(format!(
                "Invalid SOCKS5 address '{}': {}",
                self.socks_addr, reason
            ))
        };

        let url = Url::parse(&self.client_proxy_url()).map_err(|e| invalid(&e.to_string()))?;
        let host = url.host_str().unwrap_or_default();
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        if url.port().is_none() {
            return Err(invalid("missing port"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials are not supported"));
        }
        if !matches!(url.path(), "" | "/") || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("expected host:port only"));
        }
        // socks5h is not a special scheme, so dotted quads arrive unchecked
        if host.chars().all(|c| c.is_ascii_digit() || c == '.') && host.parse::<Ipv4Addr>().is_err()
        {
            return Err(invalid("invalid IPv4 address"));
        }
        Ok(())
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKS_ADDR)
    }
}

/// HTTP client whose every request is dialed through the SOCKS5 proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
}

impl ProxyClient {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Building proxy client via {} (timeout {:?})",
            config.socks_addr, config.timeout
        );

        let proxy = reqwest::Proxy::all(config.client_proxy_url())
            .map_err(|e| ScanError::ProxySetup(format!("Invalid proxy URL: {}", e)))?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::ProxySetup(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap a client the caller has already configured. No proxy is added.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn inner(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_tor_browser() {
        let config = ProxyConfig::default();
        assert_eq!(config.socks_addr, "127.0.0.1:9150");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.client_proxy_url(), "socks5h://127.0.0.1:9150");
        assert_eq!(config.browser_proxy_server(), "socks5://127.0.0.1:9150");
    }

    #[test]
    fn test_client_builds_for_valid_address() {
        let config = ProxyConfig::new("127.0.0.1:9050").with_timeout(Duration::from_secs(5));
        assert!(ProxyClient::new(&config).is_ok());
    }

    #[test]
    fn test_host_name_and_ipv6_addresses_are_accepted() {
        for addr in ["localhost:9050", "tor.internal:9150", "[::1]:9050"] {
            let config = ProxyConfig::new(addr);
            assert!(
                ProxyClient::new(&config).is_ok(),
                "expected {:?} to be accepted",
                addr
            );
        }
        assert_eq!(
            ProxyConfig::new("localhost:9050").client_proxy_url(),
            "socks5h://localhost:9050"
        );
    }

    #[test]
    fn test_malformed_address_is_proxy_setup_error() {
        for addr in [
            "",
            "localhost",
            "127.0.0.1",
            "127.0.0.1:notaport",
            "999.0.0.1:9150",
            ":9050",
            "127.0.0.1:9050/tor",
            "user:secret@127.0.0.1:9050",
        ] {
            let result = ProxyClient::new(&ProxyConfig::new(addr));
            assert!(
                matches!(result, Err(ScanError::ProxySetup(_))),
                "expected ProxySetup for {:?}",
                addr
            );
        }
    }
}
