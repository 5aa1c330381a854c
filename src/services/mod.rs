// Collection CRUD
pub mod records;

// Listing filters and id generation
pub mod ids;
pub mod search;

// Status transitions
pub mod status;

// Aggregates and sample data
pub mod reports;
pub mod seed;

pub use records::RecordService;
pub use reports::ReportService;
pub use status::StatusService;
