#![forbid(unsafe_code)]
//! Command line front-end: drives a session-scoped ledger and prints the result.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use ledgerchain::blockchain::Blockchain;
use ledgerchain::cli::{chain_table, init_logging, short_hash};
use ledgerchain::config::{load_config, Config};
use ledgerchain::error::ChainError;
use ledgerchain::ledger::Ledger;
use ledgerchain::miner::{proof_digest, ProofJob};
use ledgerchain::transaction::Transaction;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (optional)
    #[arg(long, global = true, default_value = "ledger.toml")]
    config: PathBuf,

    /// Override the configured proof-of-work difficulty
    #[arg(long, global = true)]
    difficulty: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submits transfers and mines blocks on a fresh chain
    Mine {
        /// A transfer as sender:recipient:amount, repeatable
        #[arg(short, long)]
        transfer: Vec<Transaction>,
        /// How many blocks to mine
        #[arg(short, long, default_value_t = 1)]
        blocks: u32,
        /// Give up on a proof search after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Searches the proof that follows LAST_PROOF
    Proof {
        last_proof: u64,
        /// Worker threads for the search
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Shows that altering a committed transfer breaks validation
    Tamper {
        /// A transfer as sender:recipient:amount, repeatable
        #[arg(short, long)]
        transfer: Vec<Transaction>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(difficulty) = cli.difficulty {
        config.chain.difficulty = difficulty;
    }
    config.validate()?;
    init_logging(&config);

    match cli.command {
        Commands::Mine {
            transfer,
            blocks,
            timeout,
        } => mine(&config, transfer, blocks, timeout).await?,
        Commands::Proof {
            last_proof,
            threads,
        } => proof(&config, last_proof, threads).await?,
        Commands::Tamper { transfer } => tamper(&config, transfer)?,
    }

    Ok(())
}

async fn mine(
    config: &Config,
    transfers: Vec<Transaction>,
    blocks: u32,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = Ledger::from_config(config);

    for tx in transfers {
        let line = tx.to_string();
        let index = ledger.submit(tx)?;
        println!("{} {} (block #{})", "➕ Queued".bright_cyan(), line, index);
    }

    for _ in 0..blocks {
        let started = Instant::now();
        let block = match timeout {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), ledger.mine_block())
                .await
                .map_err(|_| {
                    eprintln!("{}", format!("⏱️  No proof within {}s, giving up", secs).yellow());
                    ChainError::SearchCancelled
                })??,
            None => ledger.mine_block().await?,
        };
        println!(
            "{} #{} proof={} in {}",
            "⛏️  Mined block".bright_green(),
            block.index,
            block.proof,
            humantime::format_duration(round_millis(started.elapsed()))
        );
    }

    let snapshot = ledger.snapshot();
    println!("{}", chain_table(&snapshot));
    print_validity(&snapshot);
    Ok(())
}

async fn proof(
    config: &Config,
    last_proof: u64,
    threads: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let threads = threads.unwrap_or(config.miner.threads).max(1);
    let difficulty = config.chain.difficulty;

    let started = Instant::now();
    let nonce = ProofJob::spawn(last_proof, difficulty, threads).wait().await?;
    let elapsed = started.elapsed();
    info!(last_proof, nonce, ?elapsed, "proof search finished");

    println!("{} {}", "Proof:".bright_green().bold(), nonce);
    println!("{} {}", "Digest:".bright_white(), proof_digest(last_proof, nonce));
    println!(
        "{} {} ({} thread(s), difficulty {})",
        "Elapsed:".bright_white(),
        humantime::format_duration(round_millis(elapsed)),
        threads,
        difficulty
    );
    Ok(())
}

fn tamper(config: &Config, transfers: Vec<Transaction>) -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = Blockchain::with_difficulty(config.chain.difficulty);
    let transfers = if transfers.is_empty() {
        vec![Transaction::new("A", "B", 10.0)]
    } else {
        transfers
    };

    for tx in transfers {
        chain.submit(tx)?;
    }
    chain.mine_block();
    // A successor block is what exposes an edit to block #2.
    chain.mine_block();
    println!("{}", chain_table(&chain));
    print_validity(&chain);

    let mut blocks = chain.blocks().to_vec();
    let original = blocks[1].transactions[0].clone();
    blocks[1].transactions[0].amount += 1.0;
    let tampered = Blockchain::from_blocks(blocks, chain.difficulty())?;

    println!(
        "\n{} block #2: {} became {}",
        "✏️  Altered".bright_yellow(),
        original,
        tampered.blocks()[1].transactions[0]
    );
    println!(
        "   recomputed hash {} vs recorded link {}",
        short_hash(&tampered.blocks()[1].hash()),
        short_hash(&tampered.blocks()[2].previous_hash)
    );
    print_validity(&tampered);
    Ok(())
}

fn print_validity(chain: &Blockchain) {
    match chain.verify() {
        Ok(()) => println!("{} ({} blocks)", "✅ Chain is valid".bright_green().bold(), chain.len()),
        Err(e) => println!("{} {}", "❌ Chain is invalid:".red().bold(), e),
    }
}

fn round_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
