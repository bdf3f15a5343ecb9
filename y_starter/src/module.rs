//! Instrumentation of module `starter`

use crate::identifiers::{
    NOTIFICATIONS, N_CLICK_DESCRIPTION, N_PORT, N_STARTER_GET_LOAD, N_STARTER_GET_PROCESSES,
    N_STARTER_KILL_VNF, N_STARTER_START_VNF, N_VNF_ID, OPERATIONS,
};
use crate::load::{LoadSampler, ProcLoadAvg};
use crate::model::Starter;
use crate::notifications::{send_process_data, send_process_done};
use crate::operations::{
    GetLoad, GetLoadOutput, GetProcesses, GetProcessesOutput, KillVnf, KillVnfInput,
    KillVnfOutput, LoadEntry, StartVnf, StartVnfInput, StartVnfOutput,
};
use crate::vnf::{ClickLauncher, VnfExit, VnfLauncher, VnfTable};
use core_types::Status;
use ipc::MessagePayload;
use tracing::{info, warn};
use yang_binding::{
    invoke_operation, AgentServices, BindingError, EmptyInput, LifecycleState, ModuleCore,
    ModuleIdentity, OperationError, SchemaModule, XmlString,
};

const STATUS_KILLED: &str = "killed";
const STATUS_EXITED: &str = "exited";

/// The `starter` module: starts and stops Click VNFs on this host
pub struct StarterModule {
    core: ModuleCore<Starter>,
    launcher: Box<dyn VnfLauncher>,
    sampler: Box<dyn LoadSampler>,
    vnfs: VnfTable,
}

impl StarterModule {
    /// Creates the module with the `click` launcher and `/proc/loadavg`
    pub fn new() -> Self {
        Self {
            core: ModuleCore::new(crate::identity(), OPERATIONS, NOTIFICATIONS),
            launcher: Box::new(ClickLauncher::new()),
            sampler: Box::new(ProcLoadAvg::new()),
            vnfs: VnfTable::new(),
        }
    }

    /// Replaces the VNF launcher
    pub fn with_launcher(mut self, launcher: impl VnfLauncher + 'static) -> Self {
        self.launcher = Box::new(launcher);
        self
    }

    /// Replaces the load sampler
    pub fn with_sampler(mut self, sampler: impl LoadSampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    /// Returns the configuration root
    ///
    /// # Panics
    ///
    /// Before `init` or after `cleanup`.
    pub fn config(&self) -> &Starter {
        self.core.root()
    }

    /// Number of VNFs currently tracked
    pub fn vnf_count(&self) -> usize {
        self.vnfs.len()
    }

    fn start_vnf(
        &mut self,
        input: &StartVnfInput,
        output: &mut StartVnfOutput,
    ) -> Result<(), OperationError> {
        let port = input
            .port
            .as_ref()
            .ok_or_else(|| OperationError::missing_parameter(N_PORT))?;
        let description = input
            .click_description
            .as_ref()
            .ok_or_else(|| OperationError::missing_parameter(N_CLICK_DESCRIPTION))?;
        if let Err(e) = port.as_str().parse::<u16>() {
            return Err(OperationError::invalid_value(N_PORT, e));
        }

        let process = self
            .launcher
            .launch(port.as_str(), description.as_str())
            .map_err(|e| OperationError::failed(format!("cannot start VNF: {}", e)))?;
        let pid = process.pid();
        let id = self.vnfs.insert(port.as_str(), process);
        let id = xml(&id)?;

        info!(vnf = %id, pid, port = %port, "VNF started");
        send_process_data(
            self.core.emitter(),
            Some(&id),
            i32::try_from(pid).unwrap_or(i32::MAX),
        );
        output.vnf_id = Some(id);
        Ok(())
    }

    fn kill_vnf(
        &mut self,
        input: &KillVnfInput,
        output: &mut KillVnfOutput,
    ) -> Result<(), OperationError> {
        let id = input
            .vnf_id
            .as_ref()
            .ok_or_else(|| OperationError::missing_parameter(N_VNF_ID))?;

        let killed = self
            .vnfs
            .kill(id.as_str())
            .map_err(|e| OperationError::failed(format!("cannot stop {}: {}", id, e)))?;
        if killed {
            info!(vnf = %id, "VNF killed");
            send_process_done(self.core.emitter(), Some(&xml(STATUS_KILLED)?), Some(id));
        } else {
            warn!(vnf = %id, "kill-vnf for unknown VNF");
        }
        output.success = Some(xml(if killed { "true" } else { "false" })?);
        Ok(())
    }

    fn get_load(
        &mut self,
        _input: &EmptyInput,
        output: &mut GetLoadOutput,
    ) -> Result<(), OperationError> {
        let sample = self
            .sampler
            .sample()
            .map_err(|e| OperationError::failed(format!("cannot sample load: {}", e)))?;
        let entry = LoadEntry {
            load_one: Some(xml(&sample.one)?),
            load_five: Some(xml(&sample.five)?),
            load_fifteen: Some(xml(&sample.fifteen)?),
            processes_currently_exists: Some(xml(&sample.processes)?),
            pid: Some(xml(&sample.last_pid)?),
        };
        output.load.try_append(entry)?;
        Ok(())
    }

    fn get_processes(
        &mut self,
        _input: &EmptyInput,
        output: &mut GetProcessesOutput,
    ) -> Result<(), OperationError> {
        output.processes = Some(xml(&self.vnfs.listing())?);
        Ok(())
    }

    fn report_exit(&self, id: &str, exit: VnfExit) {
        let etc = match exit.code {
            Some(code) => format!("{} {}", id, code),
            None => format!("{} signal", id),
        };
        info!(vnf = id, etc = %etc, "VNF exited");
        match (XmlString::new(STATUS_EXITED), XmlString::new(etc)) {
            (Ok(status), Ok(etc)) => {
                send_process_done(self.core.emitter(), Some(&status), Some(&etc))
            }
            _ => warn!(vnf = id, "Cannot encode processDone"),
        }
    }
}

impl Default for StarterModule {
    fn default() -> Self {
        Self::new()
    }
}

fn xml(text: &str) -> Result<XmlString, OperationError> {
    XmlString::new(text).map_err(|e| OperationError::new(Status::Internal, e.to_string()))
}

impl SchemaModule for StarterModule {
    fn identity(&self) -> &ModuleIdentity {
        self.core.identity()
    }

    fn state(&self) -> LifecycleState {
        self.core.state()
    }

    fn init(
        &mut self,
        name: &str,
        revision: Option<&str>,
        agent: &mut dyn AgentServices,
    ) -> Result<(), BindingError> {
        self.core.init(name, revision, agent)
    }

    fn load_startup_config(&mut self, config: &MessagePayload) -> Result<(), BindingError> {
        self.core.load_startup_config(config)
    }

    fn init2(&mut self) -> Result<(), BindingError> {
        let vnfs = &mut self.vnfs;
        self.core.init2(|root| {
            *vnfs = VnfTable::new();
            info!(
                app_name = root.app_name.as_ref().map_or("", XmlString::as_str),
                capabilities = root.capabilities.len(),
                "Starter ready"
            );
            Ok(())
        })
    }

    fn invoke(
        &mut self,
        operation: &str,
        input: &MessagePayload,
    ) -> Result<MessagePayload, OperationError> {
        self.core.require_running()?;
        match operation {
            N_STARTER_START_VNF => invoke_operation::<StartVnf, _>(self, input, Self::start_vnf),
            N_STARTER_KILL_VNF => invoke_operation::<KillVnf, _>(self, input, Self::kill_vnf),
            N_STARTER_GET_LOAD => invoke_operation::<GetLoad, _>(self, input, Self::get_load),
            N_STARTER_GET_PROCESSES => {
                invoke_operation::<GetProcesses, _>(self, input, Self::get_processes)
            }
            other => Err(OperationError::unknown_operation(other)),
        }
    }

    fn poll(&mut self) {
        if self.core.state() != LifecycleState::Running {
            return;
        }
        for (id, exit) in self.vnfs.reap() {
            self.report_exit(&id, exit);
        }
    }

    fn cleanup(&mut self, agent: &mut dyn AgentServices) {
        let vnfs = &mut self.vnfs;
        self.core.cleanup(agent, |_root| vnfs.terminate_all());
    }
}
