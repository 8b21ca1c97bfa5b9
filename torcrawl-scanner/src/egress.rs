use crate::proxy::ProxyClient;
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_CHECK_URL: &str = "https://check.torproject.org/api/ip";

const CONNECTION_ERROR: &str = "Connection Error";
const INVALID_RESPONSE: &str = "Invalid Response";

/// Verdict of a single egress check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EgressStatus {
    pub is_anonymized: bool,
    pub observed_ip: String,
}

impl EgressStatus {
    fn failed(reason: &str) -> Self {
        Self {
            is_anonymized: false,
            observed_ip: reason.to_string(),
        }
    }
}

/// Body returned by the Tor Project's check API.
#[derive(Debug, Default, Deserialize)]
struct TorCheckResponse {
    #[serde(rename = "IsTor", default)]
    is_tor: bool,
    #[serde(rename = "IP", default)]
    ip: String,
}

/// A proxy client that has passed egress verification.
///
/// Only [`EgressVerifier::verify`] can build one, so anything that takes a
/// `VerifiedClient` cannot run ahead of the check.
#[derive(Debug, Clone)]
pub struct VerifiedClient {
    client: ProxyClient,
    status: EgressStatus,
}

impl VerifiedClient {
    pub fn egress(&self) -> &EgressStatus {
        &self.status
    }

    pub(crate) fn proxy_client(&self) -> &ProxyClient {
        &self.client
    }

    #[cfg(test)]
    pub(crate) fn for_tests(client: ProxyClient) -> Self {
        Self {
            client,
            status: EgressStatus {
                is_anonymized: true,
                observed_ip: "127.0.0.1".to_string(),
            },
        }
    }
}

#[derive(Debug)]
pub enum Verification {
    Anonymized(VerifiedClient),
    Exposed(EgressStatus),
}

pub struct EgressVerifier {
    check_url: String,
}

impl EgressVerifier {
    pub fn new(check_url: impl Into<String>) -> Self {
        Self {
            check_url: check_url.into(),
        }
    }

    pub fn check_url(&self) -> &str {
        &self.check_url
    }

    /// Ask the identity-check service what it sees. Any failure to get a
    /// usable answer is reported as not anonymized.
    pub async fn check(&self, client: &ProxyClient) -> EgressStatus {
        debug!("Checking egress via {}", self.check_url);

        let response = match client.inner().get(&self.check_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Egress check request failed: {}", e);
                return EgressStatus::failed(CONNECTION_ERROR);
            }
        };

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Egress check body could not be read: {}", e);
                return EgressStatus::failed(CONNECTION_ERROR);
            }
        };

        match serde_json::from_slice::<TorCheckResponse>(&body) {
            Ok(parsed) => EgressStatus {
                is_anonymized: parsed.is_tor,
                observed_ip: parsed.ip,
            },
            Err(e) => {
                warn!("Egress check returned an unparseable body: {}", e);
                EgressStatus::failed(INVALID_RESPONSE)
            }
        }
    }

    /// Run the check and, on success, hand back the client as a
    /// [`VerifiedClient`].
    pub async fn verify(&self, client: ProxyClient) -> Verification {
        let status = self.check(&client).await;
        if status.is_anonymized {
            Verification::Anonymized(VerifiedClient { client, status })
        } else {
            Verification::Exposed(status)
        }
    }
}

impl Default for EgressVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn check_server(body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn direct_client() -> ProxyClient {
        ProxyClient::from_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn test_tor_exit_is_anonymized() {
        let mock_server = check_server(r#"{"IsTor":true,"IP":"185.220.101.4"}"#).await;
        let verifier = EgressVerifier::new(format!("{}/api/ip", mock_server.uri()));

        match verifier.verify(direct_client()).await {
            Verification::Anonymized(client) => {
                assert!(client.egress().is_anonymized);
                assert_eq!(client.egress().observed_ip, "185.220.101.4");
            }
            Verification::Exposed(status) => panic!("unexpected leak verdict: {:?}", status),
        }
    }

    #[tokio::test]
    async fn test_clearnet_ip_is_exposed() {
        let mock_server = check_server(r#"{"IsTor":false,"IP":"203.0.113.7"}"#).await;
        let verifier = EgressVerifier::new(format!("{}/api/ip", mock_server.uri()));

        match verifier.verify(direct_client()).await {
            Verification::Exposed(status) => {
                assert!(!status.is_anonymized);
                assert_eq!(status.observed_ip, "203.0.113.7");
            }
            Verification::Anonymized(_) => panic!("clearnet IP must not verify"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_check_service_is_connection_error() {
        // Nothing listens on port 1
        let verifier = EgressVerifier::new("http://127.0.0.1:1/api/ip");
        let status = verifier.check(&direct_client()).await;

        assert_eq!(
            status,
            EgressStatus {
                is_anonymized: false,
                observed_ip: "Connection Error".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_garbage_body_is_not_anonymized() {
        let mock_server = check_server("<html>captive portal</html>").await;
        let verifier = EgressVerifier::new(format!("{}/api/ip", mock_server.uri()));
        let status = verifier.check(&direct_client()).await;

        assert!(!status.is_anonymized);
        assert_eq!(status.observed_ip, "Invalid Response");
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_not_anonymized() {
        let mock_server = check_server(r#"{"IP":"198.51.100.2"}"#).await;
        let verifier = EgressVerifier::new(format!("{}/api/ip", mock_server.uri()));
        let status = verifier.check(&direct_client()).await;

        assert!(!status.is_anonymized);
        assert_eq!(status.observed_ip, "198.51.100.2");
    }

    #[test]
    fn test_default_check_url() {
        assert_eq!(
            EgressVerifier::default().check_url(),
            "https://check.torproject.org/api/ip"
        );
    }
}
