use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{ContractId, Installment, Payment};

/// one consistent snapshot of a contract's schedule and recorded payments
///
/// The snapshot is the atomic unit of computation: allocation always runs over
/// exactly one snapshot, never over a merge of two fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub contract_id: ContractId,
    pub installments: Vec<Installment>,
    pub payments: Vec<Payment>,
}

impl ContractSnapshot {
    pub fn new(
        contract_id: ContractId,
        installments: Vec<Installment>,
        payments: Vec<Payment>,
    ) -> Self {
        Self {
            contract_id,
            installments,
            payments,
        }
    }

    /// reject bad data before any allocation runs
    ///
    /// Checks installment id and sequence uniqueness, payment amounts,
    /// payment-to-contract linkage, and targeted-payment references.
    pub fn validate(&self) -> Result<()> {
        let mut seen_ids = HashSet::new();
        let mut seen_sequences = HashSet::new();
        for installment in &self.installments {
            if !seen_ids.insert(installment.id) {
                return Err(LedgerError::DuplicateInstallmentId { id: installment.id });
            }
            if !seen_sequences.insert(installment.sequence_number) {
                return Err(LedgerError::DuplicateSequenceNumber {
                    id: installment.id,
                    sequence_number: installment.sequence_number,
                });
            }
        }

        for payment in &self.payments {
            if !payment.paid_amount.is_positive() {
                return Err(LedgerError::InvalidPaymentAmount {
                    payment_id: payment.id,
                    amount: payment.paid_amount,
                });
            }
            if payment.contract_id != self.contract_id {
                return Err(LedgerError::ContractMismatch {
                    payment_id: payment.id,
                    payment_contract: payment.contract_id,
                    snapshot_contract: self.contract_id,
                });
            }
            if let Some(installment_id) = payment.installment_id {
                if !seen_ids.contains(&installment_id) {
                    return Err(LedgerError::UnknownInstallment {
                        payment_id: payment.id,
                        installment_id,
                    });
                }
            }
        }

        Ok(())
    }

    /// installments in chronological order, ties broken by sequence number
    ///
    /// Display order from the data source is not trusted; callers always
    /// re-sort before walking the schedule.
    pub fn sorted_installments(&self) -> Vec<Installment> {
        let mut sorted = self.installments.clone();
        sorted.sort_by_key(|i| (i.due_date, i.sequence_number));
        sorted
    }

    /// sum of scheduled amounts over the whole schedule
    pub fn total_scheduled(&self) -> Money {
        self.installments.iter().map(|i| i.scheduled_amount).sum()
    }

    /// sum of all recorded payments, targeted and general
    pub fn total_payments(&self) -> Money {
        self.payments.iter().map(|p| p.paid_amount).sum()
    }

    pub fn has_installments(&self) -> bool {
        !self.installments.is_empty()
    }

    pub fn has_payments(&self) -> bool {
        !self.payments.is_empty()
    }
}
