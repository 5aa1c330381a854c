pub mod common;
pub mod health;
pub mod reports;
pub mod resources;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
