use crate::error::{ChainError, Result};
use crate::miner::{self, DEFAULT_DIFFICULTY};
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// `previous_hash` of the genesis block. A sentinel, not a computed hash.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Proof carried by the genesis block; the first mined block searches against it.
pub const GENESIS_PROOF: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    /// Hex SHA-256 of the predecessor, or [`GENESIS_PREVIOUS_HASH`]
    pub previous_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Block {
            index,
            timestamp: Utc::now(),
            transactions,
            proof,
            previous_hash,
        }
    }

    pub fn genesis() -> Self {
        Block::new(1, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string())
    }

    /// Canonical encoding hashed by [`Block::hash`]: JSON with every object's
    /// keys in lexicographic order, independent of field declaration order.
    ///
    /// JSON has no encoding for non-finite numbers: a `NaN` or infinite amount
    /// is written as `null`, so such blocks are not told apart by their hash.
    /// [`Blockchain::submit`] and [`Blockchain::from_blocks`] reject them.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // serde_json::Value keeps object keys sorted.
        let value = serde_json::to_value(self).expect("Block always serializes to a JSON value");
        value.to_string().into_bytes()
    }

    /// Hex SHA-256 of the canonical encoding. Depends on block content only.
    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(self.canonical_bytes()))
    }
}

/// The committed blocks plus the pool of transactions waiting for the next one.
///
/// Mutation goes through [`Blockchain::submit_transaction`] and
/// [`Blockchain::commit_block`] only; committed blocks are never altered.
/// Share it between threads through [`crate::ledger::Ledger`].
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: usize,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a chain holding only the genesis block, at the default difficulty.
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    pub fn with_difficulty(difficulty: usize) -> Self {
        let genesis = Block::genesis();
        info!(difficulty, genesis_hash = %genesis.hash(), "created chain");
        Blockchain {
            blocks: vec![genesis],
            pending: Vec::new(),
            difficulty,
        }
    }

    /// Rebuild a chain from already committed blocks. Links and proofs are not
    /// checked, call [`Blockchain::verify`] for that; only transactions with no
    /// canonical encoding are refused.
    pub fn from_blocks(blocks: Vec<Block>, difficulty: usize) -> Result<Self> {
        if blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        for tx in blocks.iter().flat_map(|b| b.transactions.iter()) {
            tx.validate()?;
        }
        Ok(Blockchain {
            blocks,
            pending: Vec::new(),
            difficulty,
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Look up a block by its 1-based index.
    pub fn block(&self, index: u64) -> Option<&Block> {
        let position = usize::try_from(index.checked_sub(1)?).ok()?;
        self.blocks.get(position)
    }

    pub fn last_block(&self) -> &Block {
        self.blocks.last().expect("chain always holds the genesis block")
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block is never removed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Index the next committed block will get.
    pub fn next_index(&self) -> u64 {
        self.blocks.len() as u64 + 1
    }

    /// Queue a transfer for the next block and return that block's index.
    ///
    /// Any finite amount is accepted, including zero and negative ones.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> Result<u64> {
        self.submit(Transaction::new(sender, recipient, amount))
    }

    pub fn submit(&mut self, transaction: Transaction) -> Result<u64> {
        transaction.validate()?;
        debug!(%transaction, pending = self.pending.len() + 1, "queued transaction");
        self.pending.push(transaction);
        Ok(self.next_index())
    }

    /// Smallest nonce that is a valid proof after `last_proof` at this chain's difficulty.
    pub fn find_proof(&self, last_proof: u64) -> u64 {
        miner::find_proof(last_proof, self.difficulty)
    }

    pub fn proof_is_valid(&self, last_proof: u64, candidate: u64) -> bool {
        miner::proof_is_valid(last_proof, candidate, self.difficulty)
    }

    /// Seal the pending pool into a new block and append it.
    ///
    /// `previous_hash` defaults to the hash of the current last block. The
    /// proof is not checked here; [`Blockchain::validate_chain`] catches a bad one.
    pub fn commit_block(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().hash());
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(self.next_index(), transactions, proof, previous_hash);

        info!(
            index = block.index,
            proof,
            transactions = block.transactions.len(),
            "committed block"
        );
        self.blocks.push(block.clone());
        block
    }

    /// Search a proof for the last block, then commit the pending pool with it.
    pub fn mine_block(&mut self) -> Block {
        let proof = self.find_proof(self.last_block().proof);
        self.commit_block(proof, None)
    }
}
