use anyhow::{Context, Result};
use taskflow::cli::{Args, Commands, ConfigDiscovery, EngineConfig};
use taskflow::task::builtin_listener;
use taskflow::{ConsoleReportingService, ReportForwarder, TaskManager, TaskPriority, TaskSpec};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = ConfigDiscovery::load(args.config.as_deref())?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(loaded.config.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    loaded.log_source();
    let mut config = loaded.config;

    match args.command {
        Commands::Run {
            strategy,
            max_concurrency,
            report_name,
        } => {
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            if max_concurrency.is_some() {
                config.max_concurrency = max_concurrency;
            }
            if let Some(report_name) = report_name {
                config.report_name = report_name;
            }
            run_cycle(&config).await
        }
        Commands::Summary => {
            let manager = build_manager(&config)?;
            println!("{}", manager.summary());
            Ok(())
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Sample workload: a quick default-length task and a longer high-priority one
fn build_manager(config: &EngineConfig) -> Result<TaskManager> {
    let mut manager = TaskManager::from_config(config.task_manager_config())?;

    manager.add_task(TaskSpec::new(
        "Review email",
        "Review and answer pending email",
        TaskPriority::Medium,
    ))?;
    manager.add_task(
        TaskSpec::new(
            "Prepare presentation",
            "Create slides for the meeting",
            TaskPriority::High,
        )
        .with_duration(120),
    )?;

    for &category in &config.listeners {
        match builtin_listener(category) {
            Some(listener) => manager.add_listener(listener),
            None => warn!("No built-in listener for category '{}'", category),
        }
    }

    Ok(manager)
}

async fn run_cycle(config: &EngineConfig) -> Result<()> {
    let manager = build_manager(config)?;
    println!("{}", manager.summary());

    let report = manager.run().await.context("execution cycle failed")?;
    for task in manager.tasks() {
        println!("  {}", task);
    }
    for failure in &report.listener_failures {
        eprintln!("Listener failure: {}", failure);
    }

    let forwarder = ReportForwarder::new(ConsoleReportingService, config.report_name.clone());
    let delivered = forwarder.forward(&manager.summary(), &report).await?;
    println!(
        "Report sent: {}",
        if delivered { "success" } else { "failed" }
    );

    info!("Cycle {} finished", report.cycle_id);
    report.into_result()?;
    Ok(())
}

