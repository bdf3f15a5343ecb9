//! RPC records of module `starter`

use crate::identifiers::{
    N_STARTER_GET_LOAD, N_STARTER_GET_PROCESSES, N_STARTER_KILL_VNF, N_STARTER_START_VNF,
};
use serde::{Deserialize, Serialize};
use yang_binding::{EmptyInput, Leaf, Operation, OrderedList, XmlString};

/// rpc /starter_start-vnf
pub struct StartVnf;

/// container /starter_start-vnf/input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StartVnfInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Leaf<XmlString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_description: Leaf<XmlString>,
}

/// container /starter_start-vnf/output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartVnfOutput {
    #[serde(rename = "vnfID", skip_serializing_if = "Option::is_none")]
    pub vnf_id: Leaf<XmlString>,
}

impl Operation for StartVnf {
    const NAME: &'static str = N_STARTER_START_VNF;
    type Input = StartVnfInput;
    type Output = StartVnfOutput;
}

/// rpc /starter_kill-vnf
pub struct KillVnf;

/// container /starter_kill-vnf/input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KillVnfInput {
    #[serde(rename = "vnfID", skip_serializing_if = "Option::is_none")]
    pub vnf_id: Leaf<XmlString>,
}

/// container /starter_kill-vnf/output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KillVnfOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Leaf<XmlString>,
}

impl Operation for KillVnf {
    const NAME: &'static str = N_STARTER_KILL_VNF;
    type Input = KillVnfInput;
    type Output = KillVnfOutput;
}

/// rpc /starter_get-load
pub struct GetLoad;

/// list /starter_get-load/output/load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_one: Leaf<XmlString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_five: Leaf<XmlString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_fifteen: Leaf<XmlString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processes_currently_exists: Leaf<XmlString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Leaf<XmlString>,
}

/// container /starter_get-load/output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetLoadOutput {
    pub load: OrderedList<LoadEntry>,
}

impl Operation for GetLoad {
    const NAME: &'static str = N_STARTER_GET_LOAD;
    type Input = EmptyInput;
    type Output = GetLoadOutput;
}

/// rpc /starter_get-processes
pub struct GetProcesses;

/// container /starter_get-processes/output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetProcessesOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processes: Leaf<XmlString>,
}

impl Operation for GetProcesses {
    const NAME: &'static str = N_STARTER_GET_PROCESSES;
    type Input = EmptyInput;
    type Output = GetProcessesOutput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_vnf_input_names() {
        let input: StartVnfInput = serde_json::from_value(json!({
            "port": "8080",
            "clickDescription": "FromDevice(eth0) -> Discard;"
        }))
        .unwrap();
        assert_eq!(input.port.as_ref().unwrap(), "8080");
        assert_eq!(
            input.click_description.as_ref().unwrap(),
            "FromDevice(eth0) -> Discard;"
        );
    }

    #[test]
    fn test_kill_vnf_uses_vnf_id_casing() {
        let input: KillVnfInput = serde_json::from_value(json!({ "vnfID": "vnf-7" })).unwrap();
        assert_eq!(input.vnf_id.as_ref().unwrap(), "vnf-7");
        assert!(serde_json::from_value::<KillVnfInput>(json!({ "vnfId": "vnf-7" })).is_err());
    }

    #[test]
    fn test_unset_output_leaves_are_omitted() {
        assert_eq!(
            serde_json::to_value(KillVnfOutput::default()).unwrap(),
            json!({})
        );
        assert_eq!(
            serde_json::to_value(GetLoadOutput::default()).unwrap(),
            json!({ "load": [] })
        );
    }

    #[test]
    fn test_load_entry_names() {
        let entry = LoadEntry {
            load_one: Some(XmlString::new("0.10").unwrap()),
            processes_currently_exists: Some(XmlString::new("80").unwrap()),
            ..LoadEntry::default()
        };
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            json!({ "loadOne": "0.10", "processesCurrentlyExists": "80" })
        );
    }
}
