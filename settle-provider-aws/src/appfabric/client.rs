//! AppFabricFinder backed by the AppFabric SDK client

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_appfabric::Client;
use aws_sdk_appfabric::types::{
    AppAuthorization as SdkAppAuthorization, AppAuthorizationStatus as SdkAuthorizationStatus,
    IngestionDestination as SdkIngestionDestination,
    IngestionDestinationStatus as SdkDestinationStatus,
};
use settle_core::{FindError, FindResult};

use super::{AppAuthorization, AppFabricFinder, IngestionDestination};
use crate::sdk::{APPFABRIC_NOT_FOUND, classify, owned};

/// AppFabric API client
#[derive(Clone)]
pub struct AppFabricClient {
    client: Client,
}

impl AppFabricClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl AppFabricFinder for AppFabricClient {
    async fn find_app_authorization(
        &self,
        app_bundle: &str,
        authorization: &str,
    ) -> FindResult<AppAuthorization> {
        let output = self
            .client
            .get_app_authorization()
            .app_bundle_identifier(app_bundle)
            .app_authorization_identifier(authorization)
            .send()
            .await
            .map_err(|e| classify(e, APPFABRIC_NOT_FOUND))?;

        let found: Option<&SdkAppAuthorization> = output.app_authorization().into();
        let found = found.ok_or(FindError::EmptyResult)?;
        let arn: Option<&str> = found.app_authorization_arn().into();
        let bundle: Option<&str> = found.app_bundle_arn().into();
        let app: Option<&str> = found.app().into();
        let status: Option<&SdkAuthorizationStatus> = found.status().into();

        Ok(AppAuthorization {
            arn: arn.unwrap_or(authorization).to_string(),
            app_bundle_arn: bundle.unwrap_or(app_bundle).to_string(),
            app: owned(app),
            status: status.map(|s| s.as_str()).unwrap_or_default().into(),
        })
    }

    async fn find_ingestion_destination(
        &self,
        app_bundle: &str,
        ingestion: &str,
        destination: &str,
    ) -> FindResult<IngestionDestination> {
        let output = self
            .client
            .get_ingestion_destination()
            .app_bundle_identifier(app_bundle)
            .ingestion_identifier(ingestion)
            .ingestion_destination_identifier(destination)
            .send()
            .await
            .map_err(|e| classify(e, APPFABRIC_NOT_FOUND))?;

        let found: Option<&SdkIngestionDestination> = output.ingestion_destination().into();
        let found = found.ok_or(FindError::EmptyResult)?;
        let arn: Option<&str> = found.arn().into();
        let ingestion_arn: Option<&str> = found.ingestion_arn().into();
        let status: Option<&SdkDestinationStatus> = found.status().into();

        Ok(IngestionDestination {
            arn: arn.unwrap_or(destination).to_string(),
            ingestion_arn: ingestion_arn.unwrap_or(ingestion).to_string(),
            status: status.map(|s| s.as_str()).unwrap_or_default().into(),
            status_reason: owned(found.status_reason()),
        })
    }
}
