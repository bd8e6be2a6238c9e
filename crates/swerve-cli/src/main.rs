//! `swerve-cli` – the `swervebot` command line.
//!
//! ```text
//! swervebot run [--cycles N] [--auto]    run the robot loop on the simulated drivetrain
//! swervebot config                        show (or create) ~/.swervebot/config.toml
//! swervebot schema                        print the config JSON Schema
//! ```
//!
//! **Ctrl-C** publishes an emergency-stop fault on the alert topic and asks
//! the robot loop to stop the modules and exit.

mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use swerve_autonomy::{AutoBridge, LinearTrajectory, fixed_alliance};
use swerve_drive::SwerveSubsystem;
use swerve_hal::sim::SimDrivetrain;
use swerve_middleware::{EventBus, Topic};
use swerve_runtime::RobotLoop;
use swerve_types::{DriveError, Event, EventPayload};

const EVENT_SOURCE: &str = "swerve-cli";

/// swervebot command line.
#[derive(Parser, Debug)]
#[command(name = "swervebot", author, version, about = "Vision-assisted swerve drive", long_about = None)]
struct Cli {
    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Run the robot loop on the simulated drivetrain
    Run {
        /// Stop after this many cycles (runs until Ctrl-C otherwise)
        #[arg(long)]
        cycles: Option<u64>,

        /// Drive to the coral station once autonomy is configured
        #[arg(long)]
        auto: bool,
    },
    /// Show (or create) ~/.swervebot/config.toml
    Config,
    /// Print the config JSON Schema
    Schema,
}

impl Cli {
    fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run {
            cycles: None,
            auto: false,
        })
    }
}

fn main() {
    let _telemetry = swerve_runtime::init_tracing("swervebot");

    let command = Cli::parse().into_command();

    let result = match command {
        Command::Schema => config::schema_json().map(|s| println!("{s}")),
        Command::Config => show_config(),
        Command::Run { cycles, auto } => {
            print_banner();
            run(cycles, auto)
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommands
// ─────────────────────────────────────────────────────────────────────────────

fn show_config() -> Result<(), DriveError> {
    let path = config::config_path();
    let cfg = match config::load()? {
        Some(cfg) => cfg,
        None => {
            let cfg = config::Config::default();
            config::save(&cfg)?;
            println!(
                "  {} No configuration found; defaults written to {}\n",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            cfg
        }
    };
    let raw = toml::to_string_pretty(&cfg)
        .map_err(|e| DriveError::Serialization(format!("failed to render config: {e}")))?;
    println!("# {}", path.display());
    println!("{raw}");
    Ok(())
}

fn load_config_or_default() -> config::Config {
    let (cfg, origin) = config::load_or_default();
    match origin {
        config::ConfigOrigin::File => println!(
            "  Config loaded from {}",
            config::config_path().display().to_string().bold()
        ),
        config::ConfigOrigin::Defaults => println!(
            "  {} Run `{}` to create one.",
            "No configuration found; using defaults.".dimmed(),
            "swervebot config".bold()
        ),
        config::ConfigOrigin::Fallback(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
        }
    }
    cfg
}

fn run(cycles: Option<u64>, auto: bool) -> Result<(), DriveError> {
    let cfg = load_config_or_default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| DriveError::Config(format!("failed to start async runtime: {e}")))?;

    let bus = EventBus::default();
    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(bus.clone(), shutdown.clone());

    runtime.block_on(async move {
        // Print alerts as they arrive, including the autonomy one below.
        let mut alerts = bus.subscribe_to(Topic::SystemAlerts);
        tokio::spawn(async move {
            while let Some(event) = alerts.next().await {
                print_alert(&event);
            }
        });

        let sim = SimDrivetrain::builder()
            .with_limelight(cfg.vision.source)
            .build();
        let drive = SwerveSubsystem::simulated(&sim, &cfg.vision, cfg.estimator, bus.clone());

        let autonomy = AutoBridge::configure_or_alert(
            &cfg.autonomy,
            fixed_alliance(cfg.alliance.alliance()),
            cfg.loop_timing.period_s(),
            &bus,
        );
        let coral_station = autonomy.as_ref().map(|bridge| bridge.go_to_coral_station());

        let mut robot = RobotLoop::new(drive, autonomy, cfg.loop_timing);
        robot.start();

        if auto {
            match coral_station {
                Some(request) => {
                    let trajectory = LinearTrajectory::new(
                        robot.drive().pose(),
                        request.target,
                        request.constraints.max_velocity_mps,
                    );
                    robot.begin_routine(Box::new(trajectory))?;
                    println!(
                        "  {} Driving to the coral station at ({:.2}, {:.2})",
                        "▶".cyan().bold(),
                        request.target.x(),
                        request.target.y()
                    );
                }
                None => println!("  {}", "Autonomy disabled; `--auto` ignored.".yellow()),
            }
        }

        // Integrate the simulated wheels at the loop period.
        let period = Duration::from_millis(cfg.loop_timing.period_ms.max(1));
        let physics_sim = sim.clone();
        let physics_stop = shutdown.clone();
        let physics = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            while !physics_stop.load(Ordering::SeqCst) {
                ticker.tick().await;
                physics_sim.advance(period.as_secs_f64());
            }
        });

        println!();
        println!(
            "  Robot loop running every {} ms. Press {} to stop.\n",
            period.as_millis(),
            "Ctrl-C".bold()
        );

        let stats = robot.run(shutdown.clone(), cycles).await;
        shutdown.store(true, Ordering::SeqCst);
        if let Err(e) = physics.await {
            warn!(error = %e, "simulation task ended abnormally");
        }

        let pose = robot.drive().pose();
        info!(
            cycles = stats.cycles,
            vision_fused = stats.vision_fused,
            routines_completed = stats.routines_completed,
            "robot loop stopped"
        );
        println!();
        println!("  {} {} cycle(s), {} vision fusion(s), {} routine(s) completed",
            "■".bold(),
            stats.cycles,
            stats.vision_fused,
            stats.routines_completed
        );
        println!("  Final pose: {}", format!("{pose}").bold());
        Ok::<(), DriveError>(())
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Ctrl-C
// ─────────────────────────────────────────────────────────────────────────────

fn install_ctrlc_handler(bus: EventBus, shutdown: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the drivetrain …".yellow().bold());

        let stop_event = Event::new(
            EVENT_SOURCE,
            EventPayload::HardwareFault {
                component: "cli".to_string(),
                code: 911,
                message: "EMERGENCY_STOP: operator Ctrl-C".to_string(),
            },
        );
        bus.publish_to(Topic::SystemAlerts, stop_event);

        shutdown.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }
}

fn print_alert(event: &Event) {
    match &event.payload {
        EventPayload::HardwareFault { component, code, message } => println!(
            "  {} [{}:{}] {}",
            "FAULT".red().bold(),
            component,
            code,
            message
        ),
        EventPayload::OperatorAlert { component, message } => {
            println!("  {} [{}] {}", "ALERT".yellow().bold(), component, message)
        }
        _ => {}
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ____                         __          __ "#.bold().cyan());
    println!("{}", r#"  / __/    _____ _____  _____  / /  ___   / /_"#.bold().cyan());
    println!("{}", r#" _\ \| |/|/ / -_) __/ |/ / -_)/ _ \/ _ \ / __/"#.bold().cyan());
    println!("{}", r#"/___/|__,__/\__/_/  |___/\__//_.__/\___/ \__/ "#.bold().cyan());
    println!();
    println!("  {} {}",
        "swervebot".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Vision-assisted swerve drive");
    println!();
}
