//! Transfer records waiting in the pending pool or committed inside a block.

pub mod types;
pub mod validation;

pub use types::*;
