//! Thread-safe handle to a shared [`Blockchain`]
//!
//! The committed blocks and the pending pool sit behind one `RwLock`, so every
//! submit and commit is atomic with respect to the others and readers never
//! see a half-applied commit. Proof searches run outside the lock.

use crate::blockchain::{Block, Blockchain};
use crate::config::Config;
use crate::error::{ChainError, Result};
use crate::miner::{self, ProofJob};
use crate::transaction::Transaction;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Ledger {
    inner: Arc<RwLock<Blockchain>>,
    threads: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::from_chain(Blockchain::new(), 1)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::from_chain(
            Blockchain::with_difficulty(config.chain.difficulty),
            config.miner.threads,
        )
    }

    pub fn from_chain(chain: Blockchain, threads: usize) -> Self {
        Ledger {
            inner: Arc::new(RwLock::new(chain)),
            threads: threads.max(1),
        }
    }

    pub fn submit_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> Result<u64> {
        self.inner.write().submit_transaction(sender, recipient, amount)
    }

    pub fn submit(&self, transaction: Transaction) -> Result<u64> {
        self.inner.write().submit(transaction)
    }

    /// Unchecked commit against whatever block is the tip when the lock is taken.
    pub fn commit_block(&self, proof: u64, previous_hash: Option<String>) -> Block {
        self.inner.write().commit_block(proof, previous_hash)
    }

    /// Commit only if the tip still hashes to `expected_tip_hash`, the block the
    /// proof was searched against. Otherwise nothing changes and the pending
    /// pool stays queued.
    pub fn commit_block_extending(&self, proof: u64, expected_tip_hash: &str) -> Result<Block> {
        let mut chain = self.inner.write();
        let actual = chain.last_block().hash();
        if actual != expected_tip_hash {
            warn!(expected = expected_tip_hash, actual = %actual, "tip moved during proof search");
            return Err(ChainError::StaleTip {
                expected: expected_tip_hash.to_string(),
                actual,
            });
        }
        Ok(chain.commit_block(proof, Some(actual)))
    }

    /// Blocking search; takes no lock beyond reading the difficulty.
    pub fn find_proof(&self, last_proof: u64) -> u64 {
        let difficulty = self.difficulty();
        miner::find_proof(last_proof, difficulty)
    }

    /// Search a proof for the current tip on a background worker, then commit
    /// the pending pool on top of that same tip.
    ///
    /// Fails with [`ChainError::StaleTip`] if another commit landed first.
    pub async fn mine_block(&self) -> Result<Block> {
        let (last_proof, tip_hash, difficulty) = {
            let chain = self.inner.read();
            let tip = chain.last_block();
            (tip.proof, tip.hash(), chain.difficulty())
        };

        let proof = ProofJob::spawn(last_proof, difficulty, self.threads).wait().await?;
        let block = self.commit_block_extending(proof, &tip_hash)?;
        info!(index = block.index, proof, "mined block");
        Ok(block)
    }

    pub fn validate_chain(&self) -> bool {
        self.inner.read().validate_chain()
    }

    pub fn verify(&self) -> Result<()> {
        self.inner.read().verify()
    }

    /// Hash of a block read from this ledger. Pure; needs no lock.
    pub fn hash(block: &Block) -> String {
        block.hash()
    }

    pub fn tip_hash(&self) -> String {
        self.inner.read().last_block().hash()
    }

    pub fn last_block(&self) -> Block {
        self.inner.read().last_block().clone()
    }

    /// Consistent copy of the blocks and pending pool.
    pub fn snapshot(&self) -> Blockchain {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Always false: the genesis block is never removed.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.read().pending_transactions().len()
    }

    pub fn difficulty(&self) -> usize {
        self.inner.read().difficulty()
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.chain.difficulty = 2;
        config.miner.threads = 3;

        let ledger = Ledger::from_config(&config);
        assert_eq!(ledger.difficulty(), 2);
        assert_eq!(ledger.threads(), 3);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let ledger = Ledger::from_chain(Blockchain::with_difficulty(1), 1);
        let other = ledger.clone();
        other.submit_transaction("A", "B", 1.0).unwrap();
        assert_eq!(ledger.pending_len(), 1);
    }

    #[test]
    fn test_submit_owned_transaction() {
        let ledger = Ledger::from_chain(Blockchain::with_difficulty(1), 1);
        let tx: Transaction = "depot:unit:4".parse().unwrap();
        assert_eq!(ledger.submit(tx.clone()).unwrap(), 2);
        assert_eq!(ledger.snapshot().pending_transactions(), &[tx]);
        assert!(ledger.submit(Transaction::new("A", "B", f64::NAN)).is_err());
        assert_eq!(ledger.pending_len(), 1);
    }

    #[test]
    fn test_stale_commit_is_rejected() {
        let ledger = Ledger::from_chain(Blockchain::with_difficulty(1), 1);
        let genesis_hash = ledger.tip_hash();
        let proof = ledger.find_proof(ledger.last_block().proof);

        ledger.commit_block(proof, None);
        ledger.submit_transaction("A", "B", 1.0).unwrap();

        let err = ledger.commit_block_extending(proof, &genesis_hash).unwrap_err();
        assert!(matches!(err, ChainError::StaleTip { .. }));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.pending_len(), 1);
    }

    #[test]
    fn test_checked_commit_links_to_expected_tip() {
        let ledger = Ledger::from_chain(Blockchain::with_difficulty(1), 1);
        let tip = ledger.tip_hash();
        let proof = ledger.find_proof(ledger.last_block().proof);

        let block = ledger.commit_block_extending(proof, &tip).unwrap();
        assert_eq!(block.previous_hash, tip);
        assert!(ledger.validate_chain());
    }

    #[tokio::test]
    async fn test_mine_block() {
        let ledger = Ledger::from_chain(Blockchain::new(), 2);
        ledger.submit_transaction("A", "B", 10.0).unwrap();

        let block = ledger.mine_block().await.unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.proof, 72608);
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(ledger.pending_len(), 0);
        assert!(ledger.validate_chain());
    }
}
