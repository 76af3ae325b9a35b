mod harness;

use harness::{child_of, ChainBuilder, UNCLE_MINER};
use vision_consensus::{Block, ChainConfig, ConsensusError, EngineConfig, PowEngine};

fn setup() -> (ChainBuilder, Vec<Block>) {
    let builder = ChainBuilder::new(ChainConfig::default());
    let blocks = builder.extend_n(&builder.genesis.clone(), 3);
    (builder, blocks)
}

fn engine() -> PowEngine {
    PowEngine::new(EngineConfig::fake())
}

#[test]
fn valid_uncle_from_recent_fork_is_accepted() {
    let (builder, blocks) = setup();
    // sibling of blocks[2], child of blocks[1]
    let mut uncle = child_of(&builder.config, blocks[1].header(), 12, 0xaa);
    uncle.coinbase = UNCLE_MINER;
    let block = builder.child(&blocks[2], 0, vec![uncle]);

    assert!(engine().verify_uncles(builder.chain.as_ref(), &block).is_ok());
}

#[test]
fn three_uncles_are_too_many() {
    let (builder, blocks) = setup();
    let uncles = (0..3)
        .map(|tag| child_of(&builder.config, blocks[1].header(), 12, 0xa0 + tag))
        .collect();
    let block = builder.child(&blocks[2], 0, uncles);

    assert_eq!(
        engine().verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::TooManyUncles { count: 3, max: 2 })
    );
}

#[test]
fn sibling_of_block_is_dangling() {
    let (builder, blocks) = setup();
    // shares the block's own parent
    let uncle = child_of(&builder.config, blocks[2].header(), 12, 0xbb);
    let block = builder.child(&blocks[2], 0, vec![uncle]);

    assert_eq!(
        engine().verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::DanglingUncle)
    );
}

#[test]
fn same_uncle_twice_is_duplicate() {
    let (builder, blocks) = setup();
    let uncle = child_of(&builder.config, blocks[1].header(), 12, 0xaa);
    let block = builder.child(&blocks[2], 0, vec![uncle.clone(), uncle]);

    assert_eq!(
        engine().verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::DuplicateUncle)
    );
}

#[test]
fn uncle_already_included_by_ancestor_is_duplicate() {
    let (builder, blocks) = setup();
    let uncle = child_of(&builder.config, blocks[1].header(), 12, 0xaa);
    let with_uncle = builder.extend(&blocks[2], 0, vec![uncle.clone()]);
    let block = builder.child(&with_uncle, 0, vec![uncle]);

    assert_eq!(
        engine().verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::DuplicateUncle)
    );
}

#[test]
fn ancestor_as_uncle_is_rejected() {
    let (builder, blocks) = setup();
    let block = builder.child(&blocks[2], 0, vec![blocks[1].header().clone()]);

    assert_eq!(
        engine().verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::UncleIsAncestor)
    );
}

#[test]
fn uncle_older_than_seven_generations_is_dangling() {
    let builder = ChainBuilder::new(ChainConfig::default());
    let blocks = builder.extend_n(&builder.genesis.clone(), 9);
    // parent blocks[0] sits 9 below the new block
    let uncle = child_of(&builder.config, blocks[0].header(), 12, 0xcc);
    let block = builder.child(&blocks[8], 0, vec![uncle]);

    assert_eq!(
        engine().verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::DanglingUncle)
    );
}

#[test]
fn invalid_uncle_header_is_reported() {
    let (builder, blocks) = setup();
    let mut uncle = child_of(&builder.config, blocks[1].header(), 12, 0xaa);
    uncle.difficulty += 1u32;
    let block = builder.child(&blocks[2], 0, vec![uncle]);

    assert!(matches!(
        engine().verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::DifficultyMismatch { .. })
    ));
}

#[test]
fn uncle_seal_is_checked() {
    let (builder, blocks) = setup();
    let uncle = child_of(&builder.config, blocks[1].header(), 12, 0xaa);
    let block = builder.child(&blocks[2], 0, vec![uncle.clone()]);

    let failer = PowEngine::new(EngineConfig::fake_failer(uncle.number));
    assert_eq!(
        failer.verify_uncles(builder.chain.as_ref(), &block),
        Err(ConsensusError::InvalidPoW)
    );
}
