mod cli;
mod error_fmt;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD};
use eyre::WrapErr;
use loadcell_config::{Config, Logging};
use loadcell_core::{AcquisitionCfg, DisplayCfg, LinkState, MIN_SETTLE_SAMPLES, Monitor};
use loadcell_hardware::{SerialTransport, SimulatedTransport};
use loadcell_traits::Transport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg.logging)?;

    let result = match cli.cmd {
        Commands::Monitor {
            port,
            baud,
            duration_s,
            window_s,
            record,
            calibration,
            save_calibration,
            tare,
            simulate,
        } => run_monitor(
            &cfg,
            MonitorOpts {
                port,
                baud,
                duration_s,
                window_s,
                record,
                calibration,
                save_calibration,
                tare,
                simulate,
            },
        ),
        Commands::Ports => {
            let ports = SerialTransport::available_ports();
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for p in ports {
                println!("{p}");
            }
            Ok(())
        }
        Commands::SelfCheck => self_check(),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{}", error_fmt::humanize(&e));
            std::process::exit(error_fmt::exit_code_for_error(&e));
        }
    }
}

fn load_config(path: &Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text =
        std::fs::read_to_string(path).wrap_err_with(|| format!("read config file {path:?}"))?;
    let cfg = loadcell_config::load_toml(&text).wrap_err("parse config TOML")?;
    cfg.validate()?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: &Logging) -> eyre::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .wrap_err("invalid log level")?;

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let name = path
            .file_name()
            .map_or_else(|| "loadcell.log".into(), |n| n.to_string_lossy().into_owned());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(&dir, &name),
            Some("hourly") => tracing_appender::rolling::hourly(&dir, &name),
            _ => tracing_appender::rolling::never(&dir, &name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        if cli.json {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(writer)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .init();
        }
    } else if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

struct MonitorOpts {
    port: Option<String>,
    baud: Option<u32>,
    duration_s: Option<f64>,
    window_s: Option<f64>,
    record: Option<PathBuf>,
    calibration: Option<PathBuf>,
    save_calibration: Option<PathBuf>,
    tare: bool,
    simulate: bool,
}

fn run_monitor(cfg: &Config, opts: MonitorOpts) -> eyre::Result<()> {
    let acq_cfg: AcquisitionCfg = (&cfg.acquisition).into();
    let display: DisplayCfg = (&cfg.display).into();
    let window_s = opts.window_s.unwrap_or(display.window_s);
    let tick = Duration::from_millis((1000 / u64::from(display.tick_hz.max(1))).max(1));

    let mut monitor = Monitor::new(&acq_cfg);
    if let Some(path) = &opts.calibration {
        monitor
            .load_calibration(path)
            .wrap_err_with(|| format!("load calibration {path:?}"))?;
    }

    let transport: Box<dyn Transport + Send> = if opts.simulate {
        Box::new(SimulatedTransport::new(acq_cfg.channel_count))
    } else {
        let port = opts.port.unwrap_or_else(|| cfg.serial.port.clone());
        let baud = opts.baud.unwrap_or(cfg.serial.baud);
        let read_timeout = Duration::from_millis(acq_cfg.read_timeout_ms);
        tracing::info!(port, baud, "connecting");
        Box::new(
            SerialTransport::open(&port, baud, read_timeout)
                .wrap_err_with(|| format!("open serial port {port}"))?,
        )
    };
    monitor.connect(transport)?;
    if opts.record.is_some() {
        monitor.start_recording();
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .wrap_err("install ctrl-c handler")?;

    let started = Instant::now();
    let mut tared = !opts.tare;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("interrupted, shutting down");
            break;
        }
        if let Some(limit) = opts.duration_s
            && started.elapsed().as_secs_f64() >= limit
        {
            break;
        }
        if monitor.state() == LinkState::Disconnected {
            if let Some(err) = monitor.take_error() {
                return Err(eyre::Report::new(err)).wrap_err("acquisition stopped");
            }
            tracing::warn!("stream ended");
            break;
        }

        if !tared && monitor.sample_count(0)? >= MIN_SETTLE_SAMPLES {
            for ch in 0..monitor.channel_count() {
                monitor.tare(ch)?;
            }
            println!("tared {} channel(s)", monitor.channel_count());
            tared = true;
        }

        for ch in 0..monitor.channel_count() {
            if let Some(stats) = monitor.window_stats(ch, window_s)? {
                println!(
                    "CH{}: {:8.2} g  (min {:.2}  max {:.2}  mean {:.2}  n={})",
                    ch + 1,
                    stats.current,
                    stats.min,
                    stats.max,
                    stats.mean,
                    stats.sample_count
                );
            }
        }
        std::thread::sleep(tick);
    }

    monitor.stop_recording();
    if let Some(path) = &opts.record {
        let rows = monitor.recorded_rows().len();
        monitor
            .export_csv(path)
            .wrap_err_with(|| format!("export CSV {path:?}"))?;
        println!("saved {rows} rows to {}", path.display());
    }
    if let Some(path) = &opts.save_calibration {
        monitor
            .save_calibration(path)
            .wrap_err_with(|| format!("save calibration {path:?}"))?;
        println!("calibration saved to {}", path.display());
    }
    monitor.disconnect();
    Ok(())
}

fn self_check() -> eyre::Result<()> {
    let cfg = AcquisitionCfg::default();
    let mut monitor = Monitor::new(&cfg);
    monitor.connect(Box::new(SimulatedTransport::with_interval(
        cfg.channel_count,
        Duration::from_millis(1),
    )))?;
    std::thread::sleep(Duration::from_millis(200));
    let n = monitor.sample_count(0)?;
    monitor.disconnect();
    if n == 0 {
        eyre::bail!("self-check failed: no samples from the simulated device");
    }
    println!("self-check ok: {n} samples in 200ms");
    Ok(())
}
