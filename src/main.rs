//! mcsync - stale resource reconciler for cluster set members

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcsync::commonarea::{KubeCommonArea, SharedCommonAreaManager};
use mcsync::controller::{StaleController, StaleControllerConfig};
use mcsync::crd::{owned_crds, render_crds};
use mcsync::kube_utils::{
    apply_crds, create_client, create_client_with_timeout, DEFAULT_CONNECT_TIMEOUT,
};
use mcsync::local::KubeLocalClient;

/// mcsync - removes federated objects whose source no longer exists
#[derive(Parser, Debug)]
#[command(name = "mcsync", version, about, long_about = None)]
struct Cli {
    /// Generate CRD manifests and exit
    #[arg(long)]
    crd: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the stale resource controller until interrupted
    ///
    /// Waits for the leader connection, cleans up once, then again on every
    /// resync interval.
    Controller(ReconcilerArgs),

    /// Run a single cleanup and exit
    ///
    /// Exits non-zero if any pass failed.
    Cleanup(ReconcilerArgs),
}

/// Arguments shared by every mode that talks to a cluster set
#[derive(Args, Debug)]
struct ReconcilerArgs {
    /// Name of the cluster set this member belongs to
    #[arg(long, env = "MCSYNC_CLUSTER_SET")]
    cluster_set: String,

    /// ID of this member cluster
    #[arg(long, env = "MCSYNC_CLUSTER_ID")]
    cluster_id: String,

    /// Member namespace holding ClusterInfoImports
    #[arg(long, env = "MCSYNC_NAMESPACE", default_value = mcsync::DEFAULT_NAMESPACE)]
    namespace: String,

    /// Kubeconfig for the leader cluster
    ///
    /// Without it no leader connection exists and every cleanup is skipped.
    #[arg(long, env = "MCSYNC_LEADER_KUBECONFIG")]
    leader_kubeconfig: Option<PathBuf>,

    /// Common-area namespace in the leader cluster
    #[arg(long, env = "MCSYNC_LEADER_NAMESPACE")]
    leader_namespace: Option<String>,

    /// Seconds between periodic cleanups
    #[arg(long, default_value = "300")]
    resync_interval_secs: u64,

    /// Deadline in seconds for each list or delete call
    #[arg(long, default_value = "30")]
    call_timeout_secs: u64,

    /// Install or update mcsync's CRDs in the member cluster on startup
    #[arg(long)]
    install_crds: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: failed to install crypto provider: {:?}", e);
        std::process::exit(1);
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.crd {
        let yaml = render_crds().map_err(|e| anyhow::anyhow!("{}", e))?;
        print!("{yaml}");
        return Ok(());
    }

    match cli.command {
        Some(Commands::Controller(args)) => run_controller(args).await,
        Some(Commands::Cleanup(args)) => run_cleanup(args).await,
        None => Err(anyhow::anyhow!(
            "no command given, run `mcsync --help` for usage"
        )),
    }
}

/// Build the controller and register the leader's common area if configured
async fn build_controller(
    args: &ReconcilerArgs,
) -> anyhow::Result<(StaleController, SharedCommonAreaManager)> {
    let config = StaleControllerConfig {
        resync_interval: Duration::from_secs(args.resync_interval_secs),
        call_timeout: Duration::from_secs(args.call_timeout_secs),
        ..StaleControllerConfig::new(&args.cluster_set, &args.namespace)
    };

    let local_client = create_client(None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create member cluster client: {}", e))?;

    if args.install_crds {
        apply_crds(&local_client, &owned_crds())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to install CRDs: {}", e))?;
    }

    let manager = SharedCommonAreaManager::new();
    manager.set_local_cluster_id(&args.cluster_id);

    match (&args.leader_kubeconfig, &args.leader_namespace) {
        (Some(kubeconfig), Some(namespace)) => {
            let leader_client = create_client_with_timeout(
                Some(kubeconfig.as_path()),
                DEFAULT_CONNECT_TIMEOUT,
                config.call_timeout,
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create leader client: {}", e))?;
            manager.register(
                &args.cluster_set,
                Arc::new(KubeCommonArea::new(leader_client, namespace)),
            );
        }
        (Some(_), None) => {
            return Err(anyhow::anyhow!(
                "--leader-namespace is required with --leader-kubeconfig"
            ));
        }
        (None, _) => {
            tracing::warn!(
                cluster_set = %args.cluster_set,
                "no leader kubeconfig configured, cleanups will be skipped"
            );
        }
    }

    let controller = StaleController::new(
        config,
        Arc::new(KubeLocalClient::new(local_client)),
        Arc::new(manager.clone()),
    )
    .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    Ok((controller, manager))
}

/// Run the periodic controller until Ctrl-C
async fn run_controller(args: ReconcilerArgs) -> anyhow::Result<()> {
    tracing::info!(
        cluster_set = %args.cluster_set,
        cluster_id = %args.cluster_id,
        "mcsync controller starting..."
    );

    let (controller, _manager) = build_controller(&args).await?;
    let controller = Arc::new(controller);

    controller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await;

    tracing::info!("mcsync controller shutting down");
    Ok(())
}

/// Run one cleanup and report the result
async fn run_cleanup(args: ReconcilerArgs) -> anyhow::Result<()> {
    let (controller, _manager) = build_controller(&args).await?;

    let report = controller
        .cleanup()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if let Some(reason) = report.skipped {
        println!("Cleanup skipped: {reason}");
        return Ok(());
    }
    for (kind, deleted) in &report.deleted {
        println!("{kind}: {deleted} deleted");
    }
    println!("Total: {} deleted", report.total_deleted());
    Ok(())
}
