//! # Care Desk API
//!
//! HTTP implementations of the remote traits in `desk_core::remote`:
//! - [`CareClient`]: CARE REST API (patients, geography, facilities)
//! - [`PincodeDirectory`]: public pincode directory used for address enrichment
//!
//! Errors surface as [`ApiError`] and convert into `DeskError` at the trait boundary.

pub mod care;
pub mod error;
pub mod pincode;

pub use care::CareClient;
pub use error::{ApiError, ApiResult};
pub use pincode::PincodeDirectory;

use url::Url;

pub(crate) const USER_AGENT: &str = concat!("care-desk/", env!("CARGO_PKG_VERSION"));

/// Returns `url` with a trailing slash so relative joins extend its path.
pub(crate) fn base_url(url: &Url) -> Url {
    let mut base = url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

pub(crate) fn ensure_success(
    response: reqwest::Response,
    path: &str,
) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    tracing::warn!(status = status.as_u16(), path, "remote request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        path: path.to_string(),
    })
}
