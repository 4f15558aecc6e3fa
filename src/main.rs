use catpoint_security::classifier::{CAT_CONFIDENCE_THRESHOLD, FakeImageClassifier};
use catpoint_security::config::{Config, load_dotenv};
use catpoint_security::input::Console;
use catpoint_security::input::simulation::{run_sensor_simulation, seed_demo_sensors};
use catpoint_security::instance_lock::{InstanceLock, lock_name};
use catpoint_security::repository::{InMemoryRepository, JsonFileRepository, SecurityRepository};
use catpoint_security::service::{LoggingListener, SecurityService};
use catpoint_security::{ArmingStatus, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "catpoint", version, about = "Home security panel")]
struct Cli {
    /// JSON file holding sensors and statuses
    #[arg(long, conflicts_with_all = ["memory", "persist"])]
    repository: Option<PathBuf>,

    /// Keep all state in memory
    #[arg(long)]
    memory: bool,

    /// Store state in the default data directory
    #[arg(long, conflicts_with = "memory")]
    persist: bool,

    /// Panel name; locks the panel when state is kept in memory
    #[arg(long, env = "CATPOINT_PANEL_NAME")]
    panel: Option<String>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Read commands from stdin (default)
    Console,
    /// Generate sensor and camera activity
    Simulate {
        /// Number of ticks to run; 0 runs until Ctrl+C
        #[arg(long, default_value_t = 0)]
        ticks: u64,

        #[arg(long)]
        interval_ms: Option<u64>,

        /// Arming status to set before the first tick
        #[arg(long)]
        arm: Option<ArmingStatus>,
    },
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn apply_cli(config: &mut Config, cli: &Cli) {
    if let Some(panel) = &cli.panel {
        config.panel.name = panel.clone();
    }
    if cli.memory {
        config.repository.path = None;
    } else if let Some(path) = &cli.repository {
        config.repository.path = Some(path.clone());
    } else if cli.persist {
        config.repository.path = Some(JsonFileRepository::default_path());
    }
    if let Some(Mode::Simulate {
        interval_ms: Some(interval_ms),
        ..
    }) = &cli.mode
    {
        config.simulation.interval_ms = *interval_ms;
    }
}

fn open_repository(config: &Config) -> Result<Arc<dyn SecurityRepository>> {
    Ok(match &config.repository.path {
        Some(path) => {
            let repository = JsonFileRepository::open(path)?;
            info!("  Repository: {}", repository.path().display());
            Arc::new(repository)
        }
        None => {
            info!("  Repository: in memory");
            Arc::new(InMemoryRepository::new())
        }
    })
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    apply_cli(&mut config, &cli);

    info!("Configuration loaded:");
    info!("  Panel: {}", config.panel.name);
    info!("  Cat probability: {}", config.camera.cat_probability);
    info!("  Confidence threshold: {}", CAT_CONFIDENCE_THRESHOLD);

    let _lock = InstanceLock::acquire(&lock_name(
        &config.panel.name,
        config.repository.path.as_deref(),
    ))?;

    let repository = open_repository(&config)?;
    let classifier = Arc::new(match config.camera.seed {
        Some(seed) => FakeImageClassifier::seeded(config.camera.cat_probability, seed),
        None => FakeImageClassifier::new(config.camera.cat_probability),
    });
    let service = SecurityService::new(repository, classifier).into_shared();

    match cli.mode.unwrap_or(Mode::Console) {
        Mode::Console => {
            let (width, height) = (config.simulation.frame_width, config.simulation.frame_height);
            tokio::task::spawn_blocking(move || {
                let stdin = std::io::stdin();
                Console::new(service, std::io::stdout())
                    .with_frame_size(width, height)
                    .run(stdin.lock())
            })
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;
        }
        Mode::Simulate { ticks, arm, .. } => {
            {
                let mut guard = service.lock();
                guard.add_status_listener(Arc::new(LoggingListener::new(config.panel.name.clone())));
                if seed_demo_sensors(&mut guard) {
                    info!("Installed demo sensors");
                }
                if let Some(arm) = arm {
                    guard.set_arming_status(arm);
                }
            }

            let limit = (ticks > 0).then_some(ticks);
            let mut handle =
                run_sensor_simulation(service.clone(), config.simulation.clone(), config.camera.seed, limit);
            info!("Simulation running - press Ctrl+C to exit");

            tokio::select! {
                result = &mut handle => {
                    if let Err(e) = result {
                        error!("Simulation task failed: {}", e);
                    }
                }
                result = signal::ctrl_c() => {
                    match result {
                        Ok(()) => info!("Received shutdown signal"),
                        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
                    }
                    handle.abort();
                }
            }

            let service = service.lock();
            info!(
                "Final state: alarm={} arming={}",
                service.alarm_status(),
                service.arming_status()
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    init_logger();

    let cli = Cli::parse();
    info!("Starting Catpoint security panel");

    match run(cli).await {
        Ok(()) => {
            info!("Catpoint security panel stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
