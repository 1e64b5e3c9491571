use thiserror::Error;

use crate::decimal::Money;
use crate::types::{ContractId, InstallmentId, PaymentId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount} (payment {payment_id})")]
    InvalidPaymentAmount {
        payment_id: PaymentId,
        amount: Money,
    },

    #[error("duplicate installment id: {id}")]
    DuplicateInstallmentId {
        id: InstallmentId,
    },

    #[error("duplicate sequence number {sequence_number} (installment {id})")]
    DuplicateSequenceNumber {
        id: InstallmentId,
        sequence_number: u32,
    },

    #[error("payment {payment_id} targets unknown installment {installment_id}")]
    UnknownInstallment {
        payment_id: PaymentId,
        installment_id: InstallmentId,
    },

    #[error("payment {payment_id} belongs to contract {payment_contract}, snapshot covers {snapshot_contract}")]
    ContractMismatch {
        payment_id: PaymentId,
        payment_contract: ContractId,
        snapshot_contract: ContractId,
    },

    #[error("contract not found: {id}")]
    ContractNotFound {
        id: ContractId,
    },

    #[error("snapshot unavailable for contract {id}: {message}")]
    SnapshotUnavailable {
        id: ContractId,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl LedgerError {
    /// recoverable errors come from the data-fetch collaborator; the caller
    /// may retry them, unlike validation failures
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::SnapshotUnavailable { .. } | LedgerError::ContractNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
