// TourBox CLI
// Drives a TourBox controller over its USB serial port and injects the mapped shortcuts

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use tourbox_core::config::{resolve_profile, DEFAULT_PROFILE_NAME};
use tourbox_core::transport::{candidate_ports, PORT_PREFIXES};
use tourbox_core::{
    default_profile, find_port, monitor, unlock, CommandSpawner, DryRun, Engine, KeySink, Profile,
    ProfileHandle, RunLoop, RunnerOptions, SerialPort, ShellSpawner,
};

/// TourBox controller driver
#[derive(Parser, Debug)]
#[command(name = "tourbox")]
#[command(version)]
#[command(about = "Map TourBox controls to keyboard shortcuts", long_about = None)]
struct Args {
    /// Serial port of the controller (auto-detected when omitted)
    #[arg(short, long, value_name = "PORT")]
    port: Option<PathBuf>,

    /// Profile document (.json or .toml), or a profile name in the profiles directory
    #[arg(short = 'f', long, value_name = "PROFILE")]
    profile: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate the profile, list its mappings and exit
    #[arg(long)]
    check_profile: bool,

    /// Print the built-in profile as JSON and exit
    #[arg(long)]
    print_default_profile: bool,

    /// List candidate serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Log raw control events without acting on them
    #[arg(long)]
    monitor: bool,

    /// Log actions instead of injecting keystrokes or running commands
    #[arg(long)]
    dry_run: bool,

    /// Serial read timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    read_timeout_ms: u64,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // RUST_LOG, when set, wins over the flag
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_profile(arg: Option<&Path>) -> anyhow::Result<Profile> {
    let Some(arg) = arg else {
        log::info!("No profile given; using built-in '{}'", DEFAULT_PROFILE_NAME);
        return Ok(default_profile());
    };

    let path = resolve_profile(arg);
    Profile::from_path(&path).with_context(|| format!("invalid profile {}", path.display()))
}

fn log_mappings(profile: &Profile) {
    log::info!("Profile: {}", profile.name());
    if !profile.description().is_empty() {
        log::info!("  {}", profile.description());
    }
    for (control, mapping) in profile.mappings() {
        match &mapping.description {
            Some(description) => {
                log::info!("  {:<12} -> {} ({})", control, mapping.action, description)
            }
            None => log::info!("  {:<12} -> {}", control, mapping.action),
        }
    }
}

fn list_ports() -> anyhow::Result<()> {
    let ports = candidate_ports(Path::new("/dev"), PORT_PREFIXES).context("failed to read /dev")?;
    if ports.is_empty() {
        println!("No TourBox ports found (prefixes: {})", PORT_PREFIXES.join(", "));
    }
    for port in ports {
        println!("{}", port.display());
    }
    Ok(())
}

/// SIGINT/SIGTERM clear `running`; SIGHUP sets `reload`
fn spawn_signal_thread(running: Arc<AtomicBool>, reload: Arc<AtomicBool>) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to install signal handlers")?;

    std::thread::spawn(move || {
        for signal in &mut signals {
            match signal {
                SIGHUP => {
                    log::info!("Received SIGHUP, reloading profile");
                    reload.store(true, Ordering::SeqCst);
                }
                _ => {
                    log::info!("Received signal, shutting down gracefully...");
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    });
    Ok(())
}

fn open_port(arg: Option<PathBuf>) -> anyhow::Result<SerialPort> {
    let path = match arg {
        Some(path) => path,
        None => find_port().context("auto-detection failed; pass --port")?,
    };
    let mut port = SerialPort::open(&path).context("connection failed")?;

    let status = unlock(&mut port).context("unlock handshake failed")?;
    log::debug!("Unlock status: {:?}", status);
    Ok(port)
}

fn drive<S: KeySink, C: CommandSpawner>(
    port: SerialPort,
    engine: Engine<S, C>,
    profile: Profile,
    options: RunnerOptions,
    running: Arc<AtomicBool>,
    reload: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let mut runner = RunLoop::new(port, engine, ProfileHandle::new(profile))
        .with_options(options)
        .with_flags(running, reload);

    log::info!("tourbox is running. Press Ctrl+C to exit.");
    let stats = runner.run().context("lost connection to device")?;
    log::info!("Stopped after {} events", stats.events);
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.print_default_profile {
        println!("{}", default_profile().to_json_pretty()?);
        return Ok(());
    }
    if args.list_ports {
        return list_ports();
    }

    let profile = load_profile(args.profile.as_deref())?;
    log_mappings(&profile);
    if args.check_profile {
        println!("Profile '{}' is valid ({} mappings)", profile.name(), profile.len());
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let reload = Arc::new(AtomicBool::new(false));
    spawn_signal_thread(running.clone(), reload.clone())?;

    let mut port = open_port(args.port)?;
    let read_timeout = Duration::from_millis(args.read_timeout_ms);

    if args.monitor {
        log::info!("Monitoring events. Press Ctrl+C to exit.");
        let count =
            monitor(&mut port, &running, read_timeout).context("lost connection to device")?;
        log::info!("Saw {} events", count);
        return Ok(());
    }

    let options = RunnerOptions { read_timeout };
    if args.dry_run {
        let dry = DryRun::new();
        return drive(port, Engine::new(dry.clone(), dry), profile, options, running, reload);
    }

    #[cfg(feature = "uinput")]
    {
        let keyboard =
            tourbox_core::VirtualKeyboard::new().context("cannot create virtual keyboard")?;
        drive(port, Engine::new(keyboard, ShellSpawner::new()), profile, options, running, reload)
    }

    #[cfg(not(feature = "uinput"))]
    {
        let _ = (port, profile, options, running, reload, ShellSpawner::new());
        anyhow::bail!("built without the uinput feature; use --dry-run")
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}
