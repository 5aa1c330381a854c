use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Lifecycle of a sterilization request.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// How much of a request has arrived at the CSSD.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum ReceiptStatus {
    #[strum(serialize = "Fully Received")]
    #[serde(rename = "Fully Received")]
    FullyReceived,
    #[strum(serialize = "Partially Received")]
    #[serde(rename = "Partially Received")]
    PartiallyReceived,
    #[strum(serialize = "Awaiting Receipt")]
    #[serde(rename = "Awaiting Receipt")]
    AwaitingReceipt,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum IssueStatus {
    Issued,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum KitStatus {
    Requested,
    Pending,
    Processing,
    Completed,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum StockStatus {
    #[strum(serialize = "In Stock")]
    #[serde(rename = "In Stock")]
    InStock,
    #[strum(serialize = "Low Stock")]
    #[serde(rename = "Low Stock")]
    LowStock,
    #[strum(serialize = "Out of Stock")]
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[strum(serialize = "In Sterilization")]
    #[serde(rename = "In Sterilization")]
    InSterilization,
}

impl StockStatus {
    /// Status implied by on-hand quantity against the reorder minimum.
    pub fn from_levels(quantity: i64, min_quantity: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity > min_quantity {
            StockStatus::InStock
        } else {
            StockStatus::LowStock
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum SterilizationStatus {
    #[strum(serialize = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Paused,
    Completed,
    Failed,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum ProcessType {
    Steam,
    Chemical,
    Gas,
}

/// Stages an instrument set passes through, in order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
    Serialize,
    Deserialize,
)]
pub enum WorkflowStage {
    Requested,
    Received,
    Sterilizing,
    Sterilized,
    Issued,
    Returned,
}

impl WorkflowStage {
    pub fn next(self) -> Option<WorkflowStage> {
        match self {
            WorkflowStage::Requested => Some(WorkflowStage::Received),
            WorkflowStage::Received => Some(WorkflowStage::Sterilizing),
            WorkflowStage::Sterilizing => Some(WorkflowStage::Sterilized),
            WorkflowStage::Sterilized => Some(WorkflowStage::Issued),
            WorkflowStage::Issued => Some(WorkflowStage::Returned),
            WorkflowStage::Returned => None,
        }
    }
}
