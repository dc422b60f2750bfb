/// Transaction types for ledgerchain
use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A transfer of `amount` from `sender` to `recipient`.
///
/// Parties are free-form labels and the amount is not range checked, so zero
/// and negative transfers are recorded as given. No balances are tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.sender, self.recipient, self.amount)
    }
}

/// Parses the `sender:recipient:amount` form used on the command line.
impl FromStr for Transaction {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [sender, recipient, amount] = parts.as_slice() else {
            return Err(ChainError::InvalidTransaction(format!(
                "Expected sender:recipient:amount, got '{}'",
                s
            )));
        };

        let amount: f64 = amount.parse().map_err(|e| {
            ChainError::InvalidTransaction(format!("Amount '{}' is not a number: {}", amount, e))
        })?;

        let tx = Transaction::new(*sender, *recipient, amount);
        tx.validate()?;
        Ok(tx)
    }
}
