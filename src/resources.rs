//! The JSON collections served under `/api/<name>`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::models::{
    IssueStatus, KitStatus, ReceiptStatus, RequestStatus, SterilizationStatus, StockStatus,
    WorkflowStage,
};

/// One array-backed collection. The serialized name doubles as the route
/// segment and the file stem.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum Resource {
    #[strum(serialize = "requestManagementData")]
    #[serde(rename = "requestManagementData")]
    Requests,
    #[strum(serialize = "receiveItemsData")]
    #[serde(rename = "receiveItemsData")]
    ReceivedItems,
    #[strum(serialize = "issueItemData")]
    #[serde(rename = "issueItemData")]
    IssuedItems,
    #[strum(serialize = "sterilizationProcessData")]
    #[serde(rename = "sterilizationProcessData")]
    SterilizationProcesses,
    #[strum(serialize = "stockManagementData")]
    #[serde(rename = "stockManagementData")]
    StockItems,
    #[strum(serialize = "packageKitData")]
    #[serde(rename = "packageKitData")]
    PackageKits,
    #[strum(serialize = "surgeryReportFormData")]
    #[serde(rename = "surgeryReportFormData")]
    ConsumptionReports,
    #[strum(serialize = "workflowTrackingData")]
    #[serde(rename = "workflowTrackingData")]
    WorkflowEntries,
    #[strum(serialize = "dashboardData")]
    #[serde(rename = "dashboardData")]
    Dashboard,
}

impl Resource {
    pub fn all() -> impl Iterator<Item = Resource> {
        Resource::iter()
    }

    /// Route segment and file stem, e.g. `requestManagementData`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }

    /// Field holding the record's status tag.
    pub fn status_field(self) -> &'static str {
        match self {
            Resource::WorkflowEntries => "currentStatus",
            _ => "status",
        }
    }

    /// Fields matched by the `q` list filter. Empty means every top-level
    /// string field.
    pub fn search_fields(self) -> &'static [&'static str] {
        match self {
            Resource::Requests => &["id", "department", "items"],
            Resource::IssuedItems => &["id", "requestId", "department"],
            Resource::WorkflowEntries => &["id", "requestId", "kitId", "sterilizationId"],
            Resource::StockItems => &["id", "name", "category"],
            _ => &[],
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            Resource::Requests => "REQ",
            Resource::ReceivedItems => "REC",
            Resource::IssuedItems => "ISS",
            Resource::SterilizationProcesses => "STE",
            Resource::StockItems => "STK",
            Resource::PackageKits => "KIT",
            Resource::ConsumptionReports => "SURG",
            Resource::WorkflowEntries => "WF",
            Resource::Dashboard => "DSH",
        }
    }

    /// Accepted values for the status field, if the resource has a fixed
    /// vocabulary.
    pub fn status_vocabulary(self) -> Option<Vec<&'static str>> {
        fn names<E>() -> Vec<&'static str>
        where
            E: IntoEnumIterator + Into<&'static str>,
        {
            E::iter().map(Into::into).collect()
        }

        match self {
            Resource::Requests => Some(names::<RequestStatus>()),
            Resource::ReceivedItems => Some(names::<ReceiptStatus>()),
            Resource::IssuedItems => Some(names::<IssueStatus>()),
            Resource::SterilizationProcesses => Some(names::<SterilizationStatus>()),
            Resource::StockItems => Some(names::<StockStatus>()),
            Resource::PackageKits => Some(names::<KitStatus>()),
            Resource::WorkflowEntries => Some(names::<WorkflowStage>()),
            Resource::ConsumptionReports | Resource::Dashboard => None,
        }
    }
}
