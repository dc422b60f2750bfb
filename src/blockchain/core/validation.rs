use crate::blockchain::core::chain::{Block, Blockchain};
use crate::error::ChainError;
use crate::miner::proof_is_valid;
use tracing::warn;

/// Check that `current` correctly extends `previous`: its `previous_hash`
/// matches the recomputed hash of `previous`, and its proof is valid after
/// `previous.proof`.
pub fn verify_link(previous: &Block, current: &Block, difficulty: usize) -> Result<(), ChainError> {
    if current.previous_hash != previous.hash() {
        return Err(ChainError::InvalidBlockLinkage {
            index: current.index,
        });
    }
    if !proof_is_valid(previous.proof, current.proof, difficulty) {
        return Err(ChainError::InvalidProofOfWork {
            index: current.index,
        });
    }
    Ok(())
}

/// Scan adjacent pairs from the second block on, stopping at the first bad link.
pub fn verify_blocks(blocks: &[Block], difficulty: usize) -> Result<(), ChainError> {
    for pair in blocks.windows(2) {
        if let Err(e) = verify_link(&pair[0], &pair[1], difficulty) {
            warn!(error = %e, "chain validation failed");
            return Err(e);
        }
    }
    Ok(())
}

impl Blockchain {
    /// Like [`Blockchain::validate_chain`], but names the first block that fails.
    pub fn verify(&self) -> Result<(), ChainError> {
        verify_blocks(self.blocks(), self.difficulty())
    }

    /// True when every block links to and proves work over its predecessor.
    /// A chain holding only the genesis block is valid.
    pub fn validate_chain(&self) -> bool {
        self.verify().is_ok()
    }
}
