/// Well-formedness checks for transactions, kept apart from the type definition
use crate::error::ChainError;
use crate::transaction::types::Transaction;

impl Transaction {
    /// Rejects amounts with no canonical JSON encoding (`NaN`, `±inf`).
    ///
    /// Zero and negative amounts pass: the ledger records transfers, it does
    /// not police them.
    pub fn validate(&self) -> Result<(), ChainError> {
        if !self.amount.is_finite() {
            return Err(ChainError::InvalidTransaction(format!(
                "Amount must be a finite number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}
