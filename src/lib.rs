//! ledgerchain - an in-memory, append-only ledger gated by proof-of-work
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain, hashing and the validity scan
//! - [`transaction`] - Transfer records
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work predicate and nonce search
//!
//! ## Shared Access
//! - [`ledger`] - Lock-guarded handle for concurrent callers
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - CLI utilities

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Consensus
// ============================================================================
pub mod miner;

// ============================================================================
// Shared Access
// ============================================================================
pub mod ledger;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
