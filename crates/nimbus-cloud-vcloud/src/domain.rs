//! vCloud Express resource documents

use serde::{Deserialize, Serialize};
use std::fmt;

/// Link to another resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceType {
    pub name: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Org {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub catalogs: Vec<ReferenceType>,
    #[serde(default)]
    pub vdcs: Vec<ReferenceType>,
    #[serde(default)]
    pub tasks_lists: Vec<ReferenceType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub catalog_items: Vec<ReferenceType>,
}

/// Catalog entry pointing at the actual template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub href: String,
    pub entity: ReferenceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vdc {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub resource_entities: Vec<ReferenceType>,
    #[serde(default)]
    pub available_networks: Vec<ReferenceType>,
}

impl Vdc {
    /// vApps, templates and media first, then networks
    pub fn entities(&self) -> impl Iterator<Item = &ReferenceType> {
        self.resource_entities
            .iter()
            .chain(self.available_networks.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VAppTemplate {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<VAppStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNetwork {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub dns: Vec<String>,
}

/// Resource status as reported by vCloud (numeric on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum VAppStatus {
    Unresolved,
    Resolved,
    Off,
    Suspended,
    On,
    Other(i32),
}

impl From<i32> for VAppStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => VAppStatus::Unresolved,
            1 => VAppStatus::Resolved,
            2 => VAppStatus::Off,
            3 => VAppStatus::Suspended,
            4 => VAppStatus::On,
            other => VAppStatus::Other(other),
        }
    }
}

impl From<VAppStatus> for i32 {
    fn from(status: VAppStatus) -> Self {
        match status {
            VAppStatus::Unresolved => 0,
            VAppStatus::Resolved => 1,
            VAppStatus::Off => 2,
            VAppStatus::Suspended => 3,
            VAppStatus::On => 4,
            VAppStatus::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VApp {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub status: Option<VAppStatus>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    /// Tasks still running against this vApp
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl VApp {
    pub fn is_on(&self) -> bool {
        self.status == Some(VAppStatus::On)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Success,
    Error,
    Cancelled,
}

impl TaskStatus {
    /// Whether the task stopped without succeeding
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskStatus::Error | TaskStatus::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
            TaskStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskError {
    pub message: String,
    #[serde(default)]
    pub major_error_code: Option<i32>,
}

/// Asynchronous operation tracked by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub href: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub owner: Option<ReferenceType>,
    #[serde(default)]
    pub error: Option<TaskError>,
}

impl Task {
    /// A task known only by its href, as returned in a `Location` header
    pub fn from_location(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            status: TaskStatus::Queued,
            operation: None,
            owner: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vapp_document() {
        let vapp: VApp = serde_json::from_value(serde_json::json!({
            "name": "web-1",
            "href": "https://vcloud.example/api/vapp/10",
            "status": 4,
            "ipAddresses": ["10.0.0.5"],
            "tasks": [{"href": "https://vcloud.example/api/task/3", "status": "running"}]
        }))
        .unwrap();
        assert!(vapp.is_on());
        assert_eq!(vapp.tasks[0].status, TaskStatus::Running);

        let odd: VApp = serde_json::from_value(serde_json::json!({
            "name": "x", "href": "h", "status": 9
        }))
        .unwrap();
        assert_eq!(odd.status, Some(VAppStatus::Other(9)));
    }

    #[test]
    fn test_task_failure_states() {
        assert!(TaskStatus::Error.is_failure());
        assert!(TaskStatus::Cancelled.is_failure());
        assert!(!TaskStatus::Running.is_failure());
        assert_eq!(Task::from_location("h").status, TaskStatus::Queued);
    }

    #[test]
    fn test_vdc_entities_order() {
        let vdc: Vdc = serde_json::from_value(serde_json::json!({
            "name": "vdc", "href": "h",
            "resourceEntities": [{"name": "web", "href": "vapp/1"}],
            "availableNetworks": [{"name": "internal", "href": "network/1"}]
        }))
        .unwrap();
        let names: Vec<&str> = vdc.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["web", "internal"]);
    }
}
