//! Clients for the services SplitEase talks to over HTTP: the identity
//! provider that resolves bearer credentials and the optional expense
//! mirror.
//!
//! Both sit behind async traits so the server can be wired with fakes.

mod error;
mod identity;
mod mirror;

pub use error::UpstreamError;
pub use identity::{Identity, IdentityProvider, SupabaseAuth};
pub use mirror::{ExpenseMirror, MirrorExpense, MirrorFriend, SplitwiseClient};

use reqwest::Url;

/// Parses a service base url, making sure relative joins keep its path.
fn base_url(raw: &str) -> Result<Url, UpstreamError> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|err| UpstreamError::InvalidUrl(format!("{raw}: {err}")))
}

/// Reads the body of a failed response into an `UpstreamError::Status`.
async fn status_error(res: reqwest::Response) -> UpstreamError {
    let status = res.status().as_u16();
    let message = res
        .text()
        .await
        .ok()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| "no response body".to_string());
    UpstreamError::Status { status, message }
}
