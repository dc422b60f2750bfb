//! Helpers shared by the command line front-end

use crate::blockchain::Blockchain;
use crate::config::Config;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// configured filter. Calling it twice is harmless.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// First and last 8 characters of a hash, or the whole thing if shorter.
///
/// Counts characters, not bytes: a caller-supplied link may be any string.
pub fn short_hash(hash: &str) -> String {
    if hash.chars().count() <= 16 {
        return hash.to_string();
    }
    let head: String = hash.chars().take(8).collect();
    let mut tail: Vec<char> = hash.chars().rev().take(8).collect();
    tail.reverse();
    format!("{}…{}", head, tail.into_iter().collect::<String>())
}

/// One row per block: index, timestamp, proof, links and transfers.
pub fn chain_table(chain: &Blockchain) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Timestamp", "Proof", "Previous", "Hash", "Transactions"]);

    for block in chain.blocks() {
        let transfers = if block.transactions.is_empty() {
            "-".to_string()
        } else {
            block
                .transactions
                .iter()
                .map(|tx| tx.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        };
        table.add_row(vec![
            Cell::new(block.index),
            Cell::new(block.timestamp.format("%Y-%m-%d %H:%M:%S%.3f")),
            Cell::new(block.proof),
            Cell::new(short_hash(&block.previous_hash)),
            Cell::new(short_hash(&block.hash())),
            Cell::new(transfers),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("0"), "0");
        let hash = "0123456789abcdef".repeat(4);
        assert_eq!(short_hash(&hash), "01234567…89abcdef");
    }

    #[test]
    fn test_short_hash_keeps_multibyte_characters_whole() {
        let link = format!("a{}", "é".repeat(20));
        assert_eq!(short_hash(&link), format!("a{}…{}", "é".repeat(7), "é".repeat(8)));
        assert_eq!(short_hash("ééé"), "ééé");
    }

    #[test]
    fn test_chain_table_renders_non_ascii_link() {
        let mut chain = Blockchain::with_difficulty(1);
        chain.commit_block(25, Some(format!("a{}", "é".repeat(10))));
        chain.commit_block(25, Some(format!("a{}", "é".repeat(20))));

        let rendered = chain_table(&chain).to_string();
        assert!(rendered.contains(&format!("a{}", "é".repeat(10))));
        assert!(rendered.contains(&format!("a{}…{}", "é".repeat(7), "é".repeat(8))));
    }

    #[test]
    fn test_chain_table_has_row_per_block() {
        let mut chain = Blockchain::with_difficulty(1);
        chain.submit_transaction("depot", "unit", 4.0).unwrap();
        chain.mine_block();

        let table = chain_table(&chain);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("depot -> unit: 4"));
    }
}
