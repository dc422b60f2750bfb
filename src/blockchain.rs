// Thin re-export module: implementation lives in `blockchain/core.rs`, split
// into the block/chain types and the chain validity scan.

pub mod core;
pub use core::*;
