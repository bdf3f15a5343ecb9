//! # agentd
//!
//! Reads `rpc.request` envelopes from stdin, one JSON document per line,
//! and writes replies and notifications to stdout the same way. Logs go
//! to stderr.

use agentd::{builtin_registry, EventFilter, HostConfig, HostError, HostRuntime, StartupConfig};
use clap::Parser;
use ipc::MessageEnvelope;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "agentd", version, about = "Hosts compiled YANG modules over JSON lines")]
struct Cli {
    /// Host configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Startup configuration file (overrides the host configuration)
    #[arg(short, long, value_name = "FILE")]
    startup: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "agentd failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agentd=info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("agentd: logging disabled: {}", e);
    }
}

fn run(cli: Cli) -> Result<(), HostError> {
    let config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    let startup = match cli.startup.as_ref().or(config.startup_config.as_ref()) {
        Some(path) => StartupConfig::load(path)?,
        None => StartupConfig::empty(),
    };

    let mut runtime = HostRuntime::bootstrap(builtin_registry(), &config, &startup)?;
    let subscriber = runtime.subscribe(EventFilter::all());
    info!(modules = ?runtime.loaded_modules(), "agentd ready");

    let lines = spawn_stdin_reader();
    let interval = Duration::from_millis(config.poll_interval_ms);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    loop {
        match lines.recv_timeout(interval) {
            Ok(line) => handle_line(&mut runtime, &line, &mut out)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        runtime.poll_modules();
        for event in runtime.take_notifications(subscriber) {
            write_line(&mut out, &event.into_envelope()?)?;
        }
    }

    runtime.shutdown();
    for event in runtime.take_notifications(subscriber) {
        write_line(&mut out, &event.into_envelope()?)?;
    }
    info!("agentd stopped");
    Ok(())
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Cannot read stdin");
                    break;
                }
            }
        }
    });
    rx
}

fn handle_line(
    runtime: &mut HostRuntime,
    line: &str,
    out: &mut impl Write,
) -> Result<(), HostError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }
    let envelope: MessageEnvelope = match serde_json::from_str(line) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed envelope");
            return Ok(());
        }
    };
    let reply = runtime.dispatch(&envelope)?;
    write_line(out, &reply)
}

fn write_line(out: &mut impl Write, value: &impl Serialize) -> Result<(), HostError> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
