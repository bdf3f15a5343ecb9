//! Configuration data of module `starter`

use serde::{Deserialize, Serialize};
use yang_binding::{Container, Dispose, Leaf, LeafList, XmlString};

/// container /starter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Starter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Leaf<XmlString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_params: Leaf<XmlString>,
    /// leaf-list /starter/capabilities
    #[serde(skip_serializing_if = "LeafList::is_empty")]
    pub capabilities: LeafList<XmlString>,
}

impl Dispose for Starter {
    fn dispose(&mut self) {
        self.app_name.dispose();
        self.app_params.dispose();
        self.capabilities.dispose();
    }
}

impl Container for Starter {
    const PATH: &'static str = "/starter";
}
