use crate::contract::ContractSnapshot;
use crate::decimal::Money;
use crate::errors::Result;

use super::AllocationResult;

/// oldest-due-first payment allocation over an installment schedule
///
/// Targeted payments are credited to their named installment in full before
/// any general money moves; the general pool then fills remaining gaps in
/// chronological order. A payer is assumed to be settling the oldest
/// obligation first, matching arrears-collection practice.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine;

impl AllocationEngine {
    pub fn new() -> Self {
        Self
    }

    /// distribute a snapshot's payments across its installments
    ///
    /// Validates the snapshot first and fails fast on bad data. The pool walk
    /// never fills an installment beyond its scheduled amount; whatever the
    /// schedule cannot absorb is returned as `unallocated_surplus`. A targeted
    /// payment larger than its installment's gap stays credited to that
    /// installment, so conservation holds exactly:
    /// `sum(allocated) + surplus == sum(payments)`.
    pub fn allocate(&self, snapshot: &ContractSnapshot) -> Result<AllocationResult> {
        snapshot.validate()?;

        let mut result = AllocationResult::new();

        // targeted pass: full credit, accumulating per installment
        let mut pool = Money::ZERO;
        for payment in &snapshot.payments {
            match payment.installment_id {
                Some(installment_id) => result.credit(installment_id, payment.paid_amount),
                None => pool += payment.paid_amount,
            }
        }

        // pool walk: oldest due date first, ties by sequence number
        for installment in snapshot.sorted_installments() {
            if pool.is_zero() {
                break;
            }
            let gap = installment
                .scheduled_amount
                .saturating_sub(result.allocated_for(installment.id));
            let applied = gap.min(pool);
            result.credit(installment.id, applied);
            pool -= applied;
        }

        result.unallocated_surplus = pool;
        Ok(result)
    }
}
