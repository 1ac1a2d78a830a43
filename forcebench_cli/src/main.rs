//! `forcebench`: drive a linear actuator to track a sequence of force setpoints.

mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use forcebench_config::{Config, Logging};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hooks: {e}");
    }
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = forcebench_config::load_toml(&text).wrap_err("invalid configuration")?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: Option<&str>, logging: &Logging) -> Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

    let level = level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        layers.push(console.json().boxed());
    } else {
        layers.push(console.boxed());
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("invalid configuration: logging.file has no file name"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .wrap_err("install tracing subscriber")
}

fn print_json(value: &serde_json::Value) {
    println!("{value}");
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .wrap_err("install Ctrl-C handler")?;
    }

    let setpoints = || -> Result<Vec<i32>> {
        match &cli.setpoints {
            Some(path) => forcebench_config::load_setpoints(path),
            None => cfg.resolve_setpoints(cli.config.parent()),
        }
    };

    match cli.cmd {
        Commands::Run { cycles, max_force } => {
            let summary = run::run_track(&cfg, setpoints()?, max_force, cycles, &stop)?;
            if cli.json {
                print_json(&serde_json::json!({
                    "status": "complete",
                    "stop": format!("{:?}", summary.cause),
                    "setpoints_completed": summary.setpoints_completed,
                    "moves": summary.moves,
                    "last_measurement": summary.last_measurement,
                }));
            } else {
                println!(
                    "run complete ({:?}): {} setpoints reached, {} moves, last force {}",
                    summary.cause,
                    summary.setpoints_completed,
                    summary.moves,
                    summary
                        .last_measurement
                        .map_or_else(|| "n/a".to_string(), |f| format!("{f:.1}")),
                );
            }
        }
        Commands::Jog {
            distance,
            direction,
        } => {
            let report = run::run_jog(&cfg, distance, direction.into(), &stop)?;
            if cli.json {
                print_json(&serde_json::json!({
                    "status": "complete",
                    "moved_mm": report.moved_mm,
                    "steps": report.steps,
                    "last_force": report.last_force,
                    "interrupted": report.interrupted,
                }));
            } else {
                println!(
                    "jog complete: moved {:.1} mm in {} steps{}",
                    report.moved_mm,
                    report.steps,
                    if report.interrupted { " (interrupted)" } else { "" },
                );
            }
        }
        Commands::Probe { samples } => {
            let report = run::run_probe(&cfg, samples)?;
            if cli.json {
                print_json(&serde_json::json!({
                    "samples": report.samples,
                    "min": report.min,
                    "max": report.max,
                    "mean": report.mean,
                    "rejected": report.rejected,
                    "elapsed_ms": u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
                }));
            } else {
                println!(
                    "probe: {} samples in {:?}: min {:.2} max {:.2} mean {:.2} ({} rejected)",
                    report.samples,
                    report.elapsed,
                    report.min,
                    report.max,
                    report.mean,
                    report.rejected,
                );
            }
        }
        Commands::Release => {
            run::run_release(&cfg)?;
            println!("released");
        }
        Commands::SelfCheck => {
            let points = setpoints()?;
            let n = points.len();
            let backend = run::self_check(&cfg, points)?;
            if cli.json {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "backend": backend,
                    "setpoints": n,
                }));
            } else {
                println!("ok ({backend}, {n} setpoints)");
            }
        }
    }
    Ok(())
}
