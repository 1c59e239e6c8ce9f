// Public modules
pub mod alias;
pub mod defaults;
pub mod domain;
pub mod error;
pub mod playbook;
pub mod project;
pub mod site;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
