//! Proof-of-work search
//!
//! A proof is valid for its predecessor when the hex SHA-256 digest of the two
//! proofs written back to back in decimal (`"{last_proof}{candidate}"`) starts
//! with `difficulty` zero characters. Searches always return the smallest such
//! nonce counting up from zero, so every search strategy agrees on the result.

use crate::error::{ChainError, Result};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Leading zero hex characters required by default.
pub const DEFAULT_DIFFICULTY: usize = 4;

/// A SHA-256 hex digest is 64 characters long.
pub const MAX_DIFFICULTY: usize = 64;

/// Nonces handed to the thread pool per round of the parallel search.
const SEARCH_WINDOW: u64 = 8192;

/// Hex digest of the proof pair, the value `proof_is_valid` inspects.
pub fn proof_digest(last_proof: u64, candidate: u64) -> String {
    let guess = format!("{}{}", last_proof, candidate);
    hex::encode(Sha256::digest(guess.as_bytes()))
}

pub fn proof_is_valid(last_proof: u64, candidate: u64, difficulty: usize) -> bool {
    let digest = proof_digest(last_proof, candidate);
    difficulty <= digest.len() && digest.bytes().take(difficulty).all(|b| b == b'0')
}

/// Sequential brute-force search starting at nonce `0`.
///
/// Unbounded and CPU-bound: expected work grows sixteenfold per difficulty step.
pub fn find_proof(last_proof: u64, difficulty: usize) -> u64 {
    let mut proof = 0u64;
    while !proof_is_valid(last_proof, proof, difficulty) {
        proof += 1;
    }
    debug!(last_proof, proof, difficulty, "proof found");
    proof
}

/// Same result as [`find_proof`], spread over `threads` workers.
///
/// Nonces are scanned in consecutive windows; the first window holding a valid
/// nonce yields its lowest one. Returns `Ok(None)` once `cancel` is raised.
pub fn find_proof_parallel(
    last_proof: u64,
    difficulty: usize,
    threads: usize,
    cancel: &AtomicBool,
) -> Result<Option<u64>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| ChainError::WorkerFailed(e.to_string()))?;

    let found = pool.install(|| {
        let mut start = 0u64;
        loop {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let end = start.saturating_add(SEARCH_WINDOW);
            let hit = (start..end)
                .into_par_iter()
                .find_first(|&nonce| proof_is_valid(last_proof, nonce, difficulty));
            if hit.is_some() || end == u64::MAX {
                return hit;
            }
            start = end;
        }
    });

    match found {
        Some(proof) => debug!(last_proof, proof, difficulty, threads, "proof found"),
        None => debug!(last_proof, difficulty, "proof search stopped"),
    }
    Ok(found)
}

/// Raises the cancel flag when dropped, so an abandoned job stops searching.
#[derive(Debug)]
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// A proof search running on a blocking worker of the tokio runtime.
///
/// Cancelling or dropping the job discards its result; the search reads no
/// shared state, so there is nothing to unwind.
#[derive(Debug)]
pub struct ProofJob {
    cancel: CancelOnDrop,
    handle: JoinHandle<Result<Option<u64>>>,
}

impl ProofJob {
    /// Must be called from within a tokio runtime.
    pub fn spawn(last_proof: u64, difficulty: usize, threads: usize) -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let worker_flag = flag.clone();
        info!(last_proof, difficulty, threads, "starting proof search");
        let handle = tokio::task::spawn_blocking(move || {
            find_proof_parallel(last_proof, difficulty, threads, &worker_flag)
        });
        ProofJob {
            cancel: CancelOnDrop(flag),
            handle,
        }
    }

    pub fn cancel(&self) {
        self.cancel.0.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the nonce. Dropping this future cancels the search.
    pub async fn wait(self) -> Result<u64> {
        let ProofJob { cancel, handle } = self;
        let outcome = handle.await?;
        drop(cancel);
        outcome?.ok_or(ChainError::SearchCancelled)
    }
}
