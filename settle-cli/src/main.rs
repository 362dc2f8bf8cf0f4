use std::fmt;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use settle_core::{CancellationToken, Observed, WaitError, WaitFailure};
use settle_provider_aws::appfabric::{app_authorization, ingestion_destination};
use settle_provider_aws::kafka::{
    cluster, cluster_operation, configuration, replicator, vpc_connection,
};
use settle_provider_aws::kafkaconnect::connector;
use settle_provider_aws::{AwsWaiters, waiters};

#[derive(Parser)]
#[command(name = "settle")]
#[command(about = "Wait for AWS resources to reach a stable state", long_about = None)]
struct Cli {
    /// Log every poll
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Block until a resource operation settles
    Wait {
        resource: ResourceKind,

        operation: WaitOperation,

        /// Resource identifiers (ARNs); app-authorization takes the app bundle
        /// and authorization, ingestion-destination the app bundle, ingestion
        /// and destination
        #[arg(required = true)]
        ids: Vec<String>,

        /// Override the default timeout for this wait
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// AWS region
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,
    },
    /// List every available wait with its states and default timeout
    Specs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResourceKind {
    Cluster,
    ClusterOperation,
    Configuration,
    Replicator,
    VpcConnection,
    Connector,
    AppAuthorization,
    IngestionDestination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WaitOperation {
    Create,
    Update,
    Delete,
    Complete,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

impl fmt::Display for WaitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Wait {
            resource,
            operation,
            ids,
            timeout_secs,
            region,
        } => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, cancelling wait");
                    on_interrupt.cancel();
                }
            });

            let waiters = AwsWaiters::new(region.as_deref())
                .await
                .with_cancellation(cancel);
            run_wait(
                &waiters,
                resource,
                operation,
                &ids,
                timeout_secs.map(Duration::from_secs),
            )
            .await
        }
        Commands::Specs => {
            run_specs();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run_wait(
    waiters: &AwsWaiters,
    resource: ResourceKind,
    operation: WaitOperation,
    ids: &[String],
    timeout_override: Option<Duration>,
) -> Result<(), String> {
    let timeout = |default: Duration| timeout_override.unwrap_or(default);

    println!(
        "{}",
        format!("Waiting for {} {}...", resource, operation).cyan()
    );

    let outcome = match (resource, operation) {
        (ResourceKind::Cluster, WaitOperation::Create) => {
            let [arn] = identifiers::<1>(ids)?;
            reached(
                waiters
                    .kafka
                    .wait_cluster_created(arn, timeout(cluster::TIMEOUTS.create))
                    .await,
            )?
        }
        (ResourceKind::Cluster, WaitOperation::Delete) => {
            let [arn] = identifiers::<1>(ids)?;
            gone(
                waiters
                    .kafka
                    .wait_cluster_deleted(arn, timeout(cluster::TIMEOUTS.delete))
                    .await,
            )?
        }
        (ResourceKind::ClusterOperation, WaitOperation::Complete) => {
            let [arn] = identifiers::<1>(ids)?;
            reached(
                waiters
                    .kafka
                    .wait_cluster_operation_completed(arn, timeout(cluster_operation::TIMEOUT))
                    .await,
            )?
        }
        (ResourceKind::Configuration, WaitOperation::Delete) => {
            let [arn] = identifiers::<1>(ids)?;
            gone(
                waiters
                    .kafka
                    .wait_configuration_deleted(arn, timeout(configuration::TIMEOUTS.delete))
                    .await,
            )?
        }
        (ResourceKind::Replicator, WaitOperation::Create) => {
            let [arn] = identifiers::<1>(ids)?;
            reached(
                waiters
                    .kafka
                    .wait_replicator_created(arn, timeout(replicator::TIMEOUTS.create))
                    .await,
            )?
        }
        (ResourceKind::Replicator, WaitOperation::Update) => {
            let [arn] = identifiers::<1>(ids)?;
            reached(
                waiters
                    .kafka
                    .wait_replicator_updated(arn, timeout(replicator::TIMEOUTS.update))
                    .await,
            )?
        }
        (ResourceKind::Replicator, WaitOperation::Delete) => {
            let [arn] = identifiers::<1>(ids)?;
            gone(
                waiters
                    .kafka
                    .wait_replicator_deleted(arn, timeout(replicator::TIMEOUTS.delete))
                    .await,
            )?
        }
        (ResourceKind::VpcConnection, WaitOperation::Create) => {
            let [arn] = identifiers::<1>(ids)?;
            reached(
                waiters
                    .kafka
                    .wait_vpc_connection_created(arn, timeout(vpc_connection::TIMEOUTS.create))
                    .await,
            )?
        }
        (ResourceKind::VpcConnection, WaitOperation::Delete) => {
            let [arn] = identifiers::<1>(ids)?;
            gone(
                waiters
                    .kafka
                    .wait_vpc_connection_deleted(arn, timeout(vpc_connection::TIMEOUTS.delete))
                    .await,
            )?
        }
        (ResourceKind::Connector, WaitOperation::Create) => {
            let [arn] = identifiers::<1>(ids)?;
            reached(
                waiters
                    .kafka_connect
                    .wait_connector_created(arn, timeout(connector::TIMEOUTS.create))
                    .await,
            )?
        }
        (ResourceKind::Connector, WaitOperation::Update) => {
            let [arn] = identifiers::<1>(ids)?;
            reached(
                waiters
                    .kafka_connect
                    .wait_connector_updated(arn, timeout(connector::TIMEOUTS.update))
                    .await,
            )?
        }
        (ResourceKind::Connector, WaitOperation::Delete) => {
            let [arn] = identifiers::<1>(ids)?;
            gone(
                waiters
                    .kafka_connect
                    .wait_connector_deleted(arn, timeout(connector::TIMEOUTS.delete))
                    .await,
            )?
        }
        (ResourceKind::AppAuthorization, WaitOperation::Create) => {
            let [bundle, authorization] = identifiers::<2>(ids)?;
            reached(
                waiters
                    .appfabric
                    .wait_app_authorization_created(
                        bundle,
                        authorization,
                        timeout(app_authorization::TIMEOUTS.create),
                    )
                    .await,
            )?
        }
        (ResourceKind::AppAuthorization, WaitOperation::Update) => {
            let [bundle, authorization] = identifiers::<2>(ids)?;
            reached(
                waiters
                    .appfabric
                    .wait_app_authorization_updated(
                        bundle,
                        authorization,
                        timeout(app_authorization::TIMEOUTS.update),
                    )
                    .await,
            )?
        }
        (ResourceKind::IngestionDestination, WaitOperation::Create) => {
            let [bundle, ingestion, destination] = identifiers::<3>(ids)?;
            reached(
                waiters
                    .appfabric
                    .wait_ingestion_destination_created(
                        bundle,
                        ingestion,
                        destination,
                        timeout(ingestion_destination::TIMEOUTS.create),
                    )
                    .await,
            )?
        }
        (ResourceKind::IngestionDestination, WaitOperation::Update) => {
            let [bundle, ingestion, destination] = identifiers::<3>(ids)?;
            reached(
                waiters
                    .appfabric
                    .wait_ingestion_destination_updated(
                        bundle,
                        ingestion,
                        destination,
                        timeout(ingestion_destination::TIMEOUTS.update),
                    )
                    .await,
            )?
        }
        (ResourceKind::IngestionDestination, WaitOperation::Delete) => {
            let [bundle, ingestion, destination] = identifiers::<3>(ids)?;
            gone(
                waiters
                    .appfabric
                    .wait_ingestion_destination_deleted(
                        bundle,
                        ingestion,
                        destination,
                        timeout(ingestion_destination::TIMEOUTS.delete),
                    )
                    .await,
            )?
        }
        (resource, operation) => {
            return Err(format!(
                "{} has no {} wait (run `settle specs` to list waits)",
                resource, operation
            ));
        }
    };

    println!("  {} {}", "✓".green(), outcome);
    Ok(())
}

fn run_specs() {
    let header = format!(
        "{:<32} {:<10} {:<38} {:<28} {:>8}",
        "RESOURCE", "WAIT", "PENDING", "TARGET", "TIMEOUT"
    );
    println!("{}", header.bold());
    for waiter in waiters() {
        let spec = &waiter.spec;
        let pending = if spec.pending.is_empty() {
            "-".to_string()
        } else {
            spec.pending.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        let mut target = if spec.expects_disappearance() {
            "(gone)".to_string()
        } else {
            spec.target_list().join(", ")
        };
        if spec.continuous_target_occurrence > 1 {
            target = format!("{} x{}", target, spec.continuous_target_occurrence);
        }
        println!(
            "{:<32} {:<10} {:<38} {:<28} {:>7}m",
            waiter.resource,
            waiter.operation.to_string(),
            pending,
            target,
            spec.timeout.as_secs() / 60
        );
    }
}

/// Split positional identifiers into exactly `N` parts
fn identifiers<const N: usize>(ids: &[String]) -> Result<[&str; N], String> {
    let parts: Vec<&str> = ids.iter().map(String::as_str).collect();
    parts.try_into().map_err(|parts: Vec<&str>| {
        format!("expected {} identifier(s), got {}", N, parts.len())
    })
}

fn reached<T: Observed>(result: Result<T, WaitFailure<T>>) -> Result<String, String> {
    result
        .map(|object| format!("reached {}", object.status()))
        .map_err(failure_message)
}

fn gone<T: Observed>(result: Result<(), WaitFailure<T>>) -> Result<String, String> {
    result
        .map(|()| "resource is gone".to_string())
        .map_err(failure_message)
}

fn failure_message<T: Observed>(failure: WaitFailure<T>) -> String {
    let failure = failure.map_object(|object| object.status().to_string());
    if let Some(status) = &failure.last_object {
        log::debug!("Last observed status: {}", status);
    }

    let message = failure.to_string();
    match failure.into_error() {
        WaitError::Timeout { .. } => format!("{} (raise --timeout-secs to wait longer)", message),
        _ => message,
    }
}
