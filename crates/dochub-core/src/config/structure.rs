//! Folder structure naming configuration.

use serde::{Deserialize, Serialize};

/// Display names used when provisioning the folder hierarchy.
///
/// Structural folders are located by display name ("find-or-create by
/// name"), so these values must stay stable once folders exist; changing
/// them causes the engine to create parallel structural folders on the
/// next reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Name of the singleton system root folder.
    #[serde(default = "default_root_folder_name")]
    pub root_folder_name: String,
    /// Name of the structural folder grouping a company's leads.
    #[serde(default = "default_leads_folder_name")]
    pub leads_folder_name: String,
    /// Name of the structural folder grouping a company's deals.
    #[serde(default = "default_deals_folder_name")]
    pub deals_folder_name: String,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            root_folder_name: default_root_folder_name(),
            leads_folder_name: default_leads_folder_name(),
            deals_folder_name: default_deals_folder_name(),
        }
    }
}

fn default_root_folder_name() -> String {
    "Companies".to_string()
}

fn default_leads_folder_name() -> String {
    "01. Leads".to_string()
}

fn default_deals_folder_name() -> String {
    "02. Deals".to_string()
}
