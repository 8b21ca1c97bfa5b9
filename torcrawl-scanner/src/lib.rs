pub mod egress;
pub mod error;
pub mod fetch;
pub mod proxy;
pub mod render;

pub use egress::{EgressStatus, EgressVerifier, Verification, VerifiedClient};
pub use error::ScanError;
pub use fetch::{FetchedPage, normalize_target};
pub use proxy::{ProxyClient, ProxyConfig};
pub use render::{ChromiumRenderer, RenderConfig, Renderer};
