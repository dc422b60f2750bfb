//! Integration tests for the ledger lifecycle: submit, search, commit, validate

use ledgerchain::blockchain::{Blockchain, GENESIS_PREVIOUS_HASH};
use ledgerchain::error::ChainError;
use ledgerchain::miner::{find_proof, proof_is_valid};

/// Chain with `blocks` mined blocks on top of genesis, one transfer each.
fn mined_chain(difficulty: usize, blocks: usize) -> Result<Blockchain, ChainError> {
    let mut chain = Blockchain::with_difficulty(difficulty);
    for i in 0..blocks {
        chain.submit_transaction(format!("sender-{}", i), format!("recipient-{}", i), i as f64 + 1.0)?;
        let proof = chain.find_proof(chain.last_block().proof);
        chain.commit_block(proof, None);
    }
    Ok(chain)
}

#[test]
fn test_first_block_scenario() -> Result<(), ChainError> {
    let mut chain = Blockchain::new();
    let genesis = chain.last_block().clone();
    assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);

    let index = chain.submit_transaction("A", "B", 10.0)?;
    assert_eq!(index, 2);

    let proof = chain.find_proof(genesis.proof);
    assert_eq!(proof, 72608);
    let block = chain.commit_block(proof, None);

    assert_eq!(chain.len(), 2);
    assert!(chain.validate_chain());
    assert_eq!(chain.blocks()[1].previous_hash, chain.blocks()[0].hash());
    assert_eq!(block, chain.blocks()[1]);
    Ok(())
}

#[test]
fn test_indices_are_consecutive() -> Result<(), ChainError> {
    let chain = mined_chain(2, 5)?;
    for (position, block) in chain.blocks().iter().enumerate() {
        assert_eq!(block.index, position as u64 + 1);
    }
    assert!(chain.validate_chain());
    Ok(())
}

#[test]
fn test_committed_proofs_satisfy_predicate() -> Result<(), ChainError> {
    let chain = mined_chain(3, 3)?;
    for pair in chain.blocks().windows(2) {
        assert!(proof_is_valid(pair[0].proof, pair[1].proof, 3));
        assert_eq!(pair[1].proof, find_proof(pair[0].proof, 3));
    }
    Ok(())
}

#[test]
fn test_tampering_with_a_linked_block_is_detected() -> Result<(), ChainError> {
    let chain = mined_chain(2, 3)?;
    assert!(chain.validate_chain());

    let mut blocks = chain.blocks().to_vec();
    blocks[1].transactions[0].amount = 1_000_000.0;
    let tampered = Blockchain::from_blocks(blocks, chain.difficulty())?;

    assert!(!tampered.validate_chain());
    assert_eq!(tampered.verify(), Err(ChainError::InvalidBlockLinkage { index: 3 }));
    Ok(())
}

#[test]
fn test_tampering_with_the_last_block_alone_goes_unnoticed() -> Result<(), ChainError> {
    // Only the successor's link covers a block, and the tip has no successor.
    let chain = mined_chain(2, 1)?;
    let mut blocks = chain.blocks().to_vec();
    blocks[1].transactions[0].amount = -1.0;
    let tampered = Blockchain::from_blocks(blocks, chain.difficulty())?;

    assert_ne!(tampered.blocks()[1].hash(), chain.blocks()[1].hash());
    assert!(tampered.validate_chain());
    Ok(())
}

#[test]
fn test_tampering_with_a_proof_is_detected() -> Result<(), ChainError> {
    let chain = mined_chain(2, 2)?;
    let mut blocks = chain.blocks().to_vec();
    // 130 is not a valid proof after 467 at difficulty 2
    blocks[2].proof += 1;
    let tampered = Blockchain::from_blocks(blocks, chain.difficulty())?;
    assert!(!tampered.validate_chain());
    Ok(())
}

#[test]
fn test_relinking_the_successor_hides_a_tamper() -> Result<(), ChainError> {
    let chain = mined_chain(2, 2)?;
    let mut blocks = chain.blocks().to_vec();
    blocks[1].transactions[0].recipient = "mallory".to_string();
    blocks[2].previous_hash = blocks[1].hash();
    let relinked = Blockchain::from_blocks(blocks, chain.difficulty())?;
    // Proofs chain on proofs, not on block hashes, so no search is needed.
    assert!(relinked.validate_chain());

    let mut blocks = chain.blocks().to_vec();
    blocks[0].proof = 2;
    let genesis_edit = Blockchain::from_blocks(blocks, chain.difficulty())?;
    assert!(!genesis_edit.validate_chain());
    Ok(())
}

#[test]
fn test_empty_blocks_are_allowed() -> Result<(), ChainError> {
    let mut chain = Blockchain::with_difficulty(2);
    let block = chain.mine_block();
    assert!(block.transactions.is_empty());
    assert!(chain.validate_chain());
    Ok(())
}
