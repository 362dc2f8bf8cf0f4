//! SDK plumbing shared by the service clients

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_kafka::error::{ProvideErrorMetadata, SdkError};
use settle_core::FindError;

/// Error code returned by MSK and MSK Connect for missing resources
pub const KAFKA_NOT_FOUND: &str = "NotFoundException";

/// Error code returned by AppFabric for missing resources
pub const APPFABRIC_NOT_FOUND: &str = "ResourceNotFoundException";

/// Load the shared AWS configuration
///
/// Without an explicit region the default provider chain decides
/// (`AWS_REGION`, profile, IMDS).
pub async fn load_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

/// Map an SDK error onto a finder error
///
/// Service errors whose code is `not_found_code` become [`FindError::NotFound`];
/// everything else (throttling, access denied, transport) is a remote failure.
pub fn classify<E, R>(err: SdkError<E, R>, not_found_code: &str) -> FindError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    if err.code() == Some(not_found_code) {
        let message = err.message().unwrap_or(not_found_code).to_string();
        return FindError::not_found(message);
    }
    FindError::remote(err)
}

/// Convert an optional SDK string into an owned one
pub(crate) fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}
