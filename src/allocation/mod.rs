pub mod waterfall;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::InstallmentId;

pub use waterfall::AllocationEngine;

/// per-installment allocated amounts plus whatever the schedule could not absorb
///
/// Ephemeral and process-local; never persisted. Surplus is surfaced for
/// diagnostics, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationResult {
    allocated: HashMap<InstallmentId, Money>,
    pub unallocated_surplus: Money,
}

impl AllocationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// allocated amount for an installment, zero when none was applied
    pub fn allocated_for(&self, installment_id: InstallmentId) -> Money {
        self.allocated
            .get(&installment_id)
            .copied()
            .unwrap_or(Money::ZERO)
    }

    /// sum of every per-installment allocation
    pub fn total_allocated(&self) -> Money {
        self.allocated.values().copied().sum()
    }

    pub fn has_surplus(&self) -> bool {
        self.unallocated_surplus.is_positive()
    }

    pub(crate) fn credit(&mut self, installment_id: InstallmentId, amount: Money) {
        if amount.is_zero() {
            return;
        }
        *self.allocated.entry(installment_id).or_insert(Money::ZERO) += amount;
    }
}
