//! Host load sampling for `get-load`

use std::fs;
use std::io;
use std::path::PathBuf;

/// One reading of the host load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSample {
    pub one: String,
    pub five: String,
    pub fifteen: String,
    /// Number of processes that currently exist on the host
    pub processes: String,
    /// Most recently assigned pid
    pub last_pid: String,
}

/// Source of load readings
pub trait LoadSampler: Send {
    fn sample(&mut self) -> io::Result<LoadSample>;
}

/// Reads `/proc/loadavg`
#[derive(Debug, Clone)]
pub struct ProcLoadAvg {
    path: PathBuf,
}

impl ProcLoadAvg {
    pub fn new() -> Self {
        Self::with_path("/proc/loadavg")
    }

    /// Reads a loadavg-formatted file at `path`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcLoadAvg {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadSampler for ProcLoadAvg {
    fn sample(&mut self) -> io::Result<LoadSample> {
        let text = fs::read_to_string(&self.path)?;
        parse_loadavg(&text).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed loadavg in {}", self.path.display()),
            )
        })
    }
}

/// Parses `0.20 0.18 0.12 1/80 11206`
pub fn parse_loadavg(text: &str) -> Option<LoadSample> {
    let mut fields = text.split_whitespace();
    let one = fields.next()?;
    let five = fields.next()?;
    let fifteen = fields.next()?;
    let (_, total) = fields.next()?.split_once('/')?;
    let last_pid = fields.next()?;

    Some(LoadSample {
        one: one.to_string(),
        five: five.to_string(),
        fifteen: fifteen.to_string(),
        processes: total.to_string(),
        last_pid: last_pid.to_string(),
    })
}
