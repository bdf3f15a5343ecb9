//! Node names of module `starter`

use yang_binding::IdentifierTable;

pub const M_STARTER: &str = "starter";
pub const R_STARTER: &str = "2013-03-13";

pub const N_APP_NAME: &str = "appName";
pub const N_APP_PARAMS: &str = "appParams";
pub const N_CAPABILITIES: &str = "capabilities";
pub const N_CLICK_DESCRIPTION: &str = "clickDescription";
pub const N_ETC: &str = "etc";
pub const N_LOAD: &str = "load";
pub const N_LOAD_FIFTEEN: &str = "loadFifteen";
pub const N_LOAD_FIVE: &str = "loadFive";
pub const N_LOAD_ONE: &str = "loadOne";
pub const N_PID: &str = "pid";
pub const N_PORT: &str = "port";
pub const N_PROCESS_DATA: &str = "processData";
pub const N_PROCESS_DONE: &str = "processDone";
pub const N_PROCESS_ID: &str = "processID";
pub const N_PROCESS_NAME: &str = "processName";
pub const N_PROCESS_STATUS: &str = "processStatus";
pub const N_PROCESSES: &str = "processes";
pub const N_PROCESSES_CURRENTLY_EXISTS: &str = "processesCurrentlyExists";
pub const N_STARTER: &str = "starter";
pub const N_STARTER_GET_LOAD: &str = "starter_get-load";
pub const N_STARTER_GET_PROCESSES: &str = "starter_get-processes";
pub const N_STARTER_KILL_VNF: &str = "starter_kill-vnf";
pub const N_STARTER_START_VNF: &str = "starter_start-vnf";
pub const N_SUCCESS: &str = "success";
pub const N_VNF_ID: &str = "vnfID";

/// Every node of the module, keyed by symbol
pub const IDENTIFIERS: IdentifierTable = IdentifierTable::new(
    M_STARTER,
    &[
        ("appName", N_APP_NAME),
        ("appParams", N_APP_PARAMS),
        ("capabilities", N_CAPABILITIES),
        ("clickDescription", N_CLICK_DESCRIPTION),
        ("etc", N_ETC),
        ("load", N_LOAD),
        ("loadFifteen", N_LOAD_FIFTEEN),
        ("loadFive", N_LOAD_FIVE),
        ("loadOne", N_LOAD_ONE),
        ("pid", N_PID),
        ("port", N_PORT),
        ("processData", N_PROCESS_DATA),
        ("processDone", N_PROCESS_DONE),
        ("processID", N_PROCESS_ID),
        ("processName", N_PROCESS_NAME),
        ("processStatus", N_PROCESS_STATUS),
        ("processes", N_PROCESSES),
        ("processesCurrentlyExists", N_PROCESSES_CURRENTLY_EXISTS),
        ("starter", N_STARTER),
        ("starter_get_load", N_STARTER_GET_LOAD),
        ("starter_get_processes", N_STARTER_GET_PROCESSES),
        ("starter_kill_vnf", N_STARTER_KILL_VNF),
        ("starter_start_vnf", N_STARTER_START_VNF),
        ("success", N_SUCCESS),
        ("vnfID", N_VNF_ID),
    ],
);

/// Operations the module registers with the agent
pub const OPERATIONS: &[&str] = &[
    N_STARTER_START_VNF,
    N_STARTER_KILL_VNF,
    N_STARTER_GET_LOAD,
    N_STARTER_GET_PROCESSES,
];

/// Notifications the module may emit
pub const NOTIFICATIONS: &[&str] = &[N_PROCESS_DATA, N_PROCESS_DONE];
