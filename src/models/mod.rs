// Record shapes
pub mod records;
// Status vocabularies
pub mod status;

pub use records::{
    CssdRequest, IssuedItem, ItemUsage, PackageKit, ReceivedItem, SterilizationProcess, StockItem,
    SurgeryReport, WorkflowEntry,
};
pub use status::{
    IssueStatus, KitStatus, Priority, ProcessType, ReceiptStatus, RequestStatus,
    SterilizationStatus, StockStatus, WorkflowStage,
};
