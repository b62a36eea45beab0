pub mod flow;
pub mod form;
pub mod login;

// Re-export main types for convenience
pub use flow::{run, LoginOutcome};
pub use form::FieldWait;
