use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use specgate::config::GatewayConfig;
use specgate::dispatcher::Dispatcher;
use specgate::fsutil;
use specgate::kit::KitWriter;
use specgate::logging;
use specgate::registration::RegistrationService;
use specgate::registry::RuntimeRegistry;
use specgate::validate::SpecValidator;
use specgate::worker::GenerationWorker;
use specgate_metrics::MetricsRegistry;

#[derive(Parser, Debug)]
#[command(name = "specgate", version)]
#[command(about = "Registers API specs, generates client kits, and dispatches operations")]
struct Cli {
    /// Directory holding the per-version spec copies
    #[arg(long, default_value = "mappings")]
    mappings_root: PathBuf,

    /// Directory holding the generated client kits
    #[arg(long, default_value = "clientkit")]
    clientkit_root: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a spec, persist it under a version, and generate its client kit.
    Register { version: String, spec_path: PathBuf },
    /// List every operation known to the runtime registry.
    List,
    /// Dispatch a single operation with a payload.
    Execute {
        operation_id: String,
        payload: String,
    },
    /// Print counter values and queue statistics.
    Metrics,
    /// Probe the data directories and report component statistics.
    Health,
}

struct Gateway {
    config: GatewayConfig,
    metrics: Arc<MetricsRegistry>,
    worker: Arc<GenerationWorker>,
    registration: RegistrationService,
    dispatcher: Dispatcher,
}

impl Gateway {
    fn build(cli: &Cli) -> Self {
        let mut config = GatewayConfig::from_env();
        config.mappings_root = cli.mappings_root.clone();
        config.clientkit_root = cli.clientkit_root.clone();

        let metrics = Arc::new(MetricsRegistry::new());
        let writer = Arc::new(KitWriter::new(config.clientkit_root.clone()));
        let worker = Arc::new(GenerationWorker::new(
            writer,
            config.max_retries,
            config.max_queue_size,
            Some(Arc::clone(&metrics)),
        ));
        let registration = RegistrationService::new(
            config.mappings_root.clone(),
            Some(Arc::clone(&worker)),
            SpecValidator::new(config.max_spec_bytes),
            Some(Arc::clone(&metrics)),
        );
        let registry = RuntimeRegistry::new(config.clientkit_root.clone(), Some(Arc::clone(&metrics)));
        let dispatcher = Dispatcher::new(registry, config.max_concurrent_ops, Some(Arc::clone(&metrics)));

        Self {
            config,
            metrics,
            worker,
            registration,
            dispatcher,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_from_env();
    let gateway = Gateway::build(&cli);

    let code = match &cli.cmd {
        Commands::Register { version, spec_path } => run_register(&gateway, version, spec_path),
        Commands::List => {
            print!("{}", gateway.dispatcher.list_operations());
            ExitCode::SUCCESS
        }
        Commands::Execute {
            operation_id,
            payload,
        } => {
            println!("{}", gateway.dispatcher.execute_operation(operation_id, payload));
            ExitCode::SUCCESS
        }
        Commands::Metrics => run_metrics(&gateway),
        Commands::Health => run_health(&gateway)?,
    };
    Ok(code)
}

fn run_register(gateway: &Gateway, version: &str, spec_path: &PathBuf) -> ExitCode {
    gateway.worker.start();
    let outcome = gateway.registration.register_spec(version, spec_path);
    gateway.worker.wait_for_idle();
    gateway.worker.stop();

    if !outcome.ok {
        eprintln!("Registration failed: {}", outcome.message);
        return ExitCode::FAILURE;
    }
    let stored = outcome.stored_path.unwrap_or_default();
    println!(
        "Registration succeeded for version {} using {}",
        version,
        stored.display()
    );
    ExitCode::SUCCESS
}

fn run_metrics(gateway: &Gateway) -> ExitCode {
    print!("{}", gateway.metrics.render());
    let stats = gateway.worker.stats();
    println!("gateway_queue_depth {}", stats.queue_depth);
    println!("gateway_queue_active {}", stats.active);
    println!("gateway_queue_capacity {}", stats.capacity);
    ExitCode::SUCCESS
}

fn run_health(gateway: &Gateway) -> Result<ExitCode> {
    let mut healthy = true;
    for (label, root) in [
        ("mappings", &gateway.config.mappings_root),
        ("clientkit", &gateway.config.clientkit_root),
    ] {
        match fsutil::is_writable_directory(root) {
            Ok(()) => println!("{label}: ok"),
            Err(e) => {
                healthy = false;
                println!("{label}: {e}");
            }
        }
    }

    println!("worker: {}", serde_json::to_string(&gateway.worker.stats())?);
    println!(
        "registry: {}",
        serde_json::to_string(&gateway.dispatcher.registry_stats())?
    );

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
