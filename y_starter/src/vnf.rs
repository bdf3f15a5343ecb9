//! VNF process tracking
//!
//! A VNF is a Click router process started on behalf of a `start-vnf`
//! request. The module keeps one [`VnfTable`] of the processes it started;
//! launching and signalling go through traits so hosts and tests can swap
//! the process backend.

use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// How a VNF process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VnfExit {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

/// A running VNF process
pub trait VnfProcess: Send {
    /// OS process id
    fn pid(&self) -> u32;

    /// Signals the process to stop
    fn terminate(&mut self) -> io::Result<()>;

    /// Waits for a signalled process to end
    fn wait(&mut self) -> io::Result<()>;

    /// Checks without blocking whether the process has exited
    fn poll_exit(&mut self) -> io::Result<Option<VnfExit>>;
}

impl VnfProcess for Child {
    fn pid(&self) -> u32 {
        self.id()
    }

    fn terminate(&mut self) -> io::Result<()> {
        if self.try_wait()?.is_none() {
            self.kill()?;
        }
        Ok(())
    }

    fn wait(&mut self) -> io::Result<()> {
        Child::wait(self).map(|_| ())
    }

    fn poll_exit(&mut self) -> io::Result<Option<VnfExit>> {
        Ok(self.try_wait()?.map(|status| VnfExit {
            code: status.code(),
        }))
    }
}

/// Starts VNF processes
pub trait VnfLauncher: Send {
    fn launch(&mut self, port: &str, click_description: &str) -> io::Result<Box<dyn VnfProcess>>;
}

/// Runs the `click` userlevel router: `click -p <port> -e <description>`
#[derive(Debug, Clone)]
pub struct ClickLauncher {
    program: PathBuf,
}

impl ClickLauncher {
    /// Launches `click` from `PATH`
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("click"),
        }
    }

    /// Launches the given executable instead
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ClickLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl VnfLauncher for ClickLauncher {
    fn launch(&mut self, port: &str, click_description: &str) -> io::Result<Box<dyn VnfProcess>> {
        let child = Command::new(&self.program)
            .arg("-p")
            .arg(port)
            .arg("-e")
            .arg(click_description)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        debug!(program = %self.program.display(), port, pid = child.id(), "Click started");
        Ok(Box::new(child))
    }
}

struct TrackedVnf {
    id: String,
    port: String,
    process: Box<dyn VnfProcess>,
}

/// The VNFs a module instance started and has not yet seen end
///
/// Ids are `vnf-1`, `vnf-2`, ... and are never reused within one table.
#[derive(Default)]
pub struct VnfTable {
    next: u64,
    entries: Vec<TrackedVnf>,
}

impl VnfTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `process`, returning its new id
    pub fn insert(&mut self, port: &str, process: Box<dyn VnfProcess>) -> String {
        self.next += 1;
        let id = format!("vnf-{}", self.next);
        self.entries.push(TrackedVnf {
            id: id.clone(),
            port: port.to_string(),
            process,
        });
        id
    }

    /// Returns the pid of a tracked VNF
    pub fn pid(&self, id: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|vnf| vnf.id == id)
            .map(|vnf| vnf.process.pid())
    }

    /// Stops and forgets the VNF `id`
    ///
    /// Returns `Ok(false)` when no such VNF is tracked. If the stop signal
    /// cannot be delivered the VNF stays tracked; once it is delivered the
    /// VNF is forgotten even if waiting for it fails.
    pub fn kill(&mut self, id: &str) -> io::Result<bool> {
        let Some(index) = self.entries.iter().position(|vnf| vnf.id == id) else {
            return Ok(false);
        };
        self.entries[index].process.terminate()?;
        let mut vnf = self.entries.remove(index);
        if let Err(e) = vnf.process.wait() {
            warn!(vnf = %vnf.id, error = %e, "VNF signalled but not reaped");
        }
        Ok(true)
    }

    /// Forgets every VNF that has exited, returning ids and exit reports
    pub fn reap(&mut self) -> Vec<(String, VnfExit)> {
        let mut exited = Vec::new();
        self.entries.retain_mut(|vnf| match vnf.process.poll_exit() {
            Ok(Some(exit)) => {
                exited.push((vnf.id.clone(), exit));
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(vnf = %vnf.id, error = %e, "Cannot poll VNF process");
                true
            }
        });
        exited
    }

    /// One `<id> <pid> <port>` line per tracked VNF, in start order
    pub fn listing(&self) -> String {
        self.entries
            .iter()
            .map(|vnf| format!("{} {} {}", vnf.id, vnf.process.pid(), vnf.port))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Stops every tracked VNF
    pub fn terminate_all(&mut self) {
        for mut vnf in self.entries.drain(..) {
            if let Err(e) = vnf.process.terminate().and_then(|()| vnf.process.wait()) {
                warn!(vnf = %vnf.id, error = %e, "Cannot stop VNF process");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for VnfTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|vnf| &vnf.id))
            .finish()
    }
}
