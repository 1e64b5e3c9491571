use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::allocation::AllocationResult;
use crate::config::{DistributionConfig, OverdueBasis};
use crate::decimal::{Money, Rate};
use crate::status::{DistributedInstallment, MonthStamp};

/// contract-level totals derived from an allocated schedule
///
/// Always recomputed from installments and payments on read, never persisted,
/// so the numbers cannot drift from the underlying records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMetrics {
    /// sum of scheduled amounts over the whole schedule
    pub total_amount: Money,
    /// sum of allocated amounts, including targeted credit beyond a row's
    /// scheduled amount
    pub total_paid: Money,
    /// sum of unpaid gaps; clamps per-row paid at scheduled, so targeted
    /// over-credit on one row never hides another row's shortfall
    pub remaining: Money,
    /// what collections can expect to chase right now
    pub overdue_now_amount: Money,
    pub paid_pct: Rate,
    pub overdue_pct: Rate,
    pub upcoming_pct: Rate,
}

impl ContractMetrics {
    /// metrics for a contract with nothing scheduled and nothing paid
    pub fn zeroed() -> Self {
        Self {
            total_amount: Money::ZERO,
            total_paid: Money::ZERO,
            remaining: Money::ZERO,
            overdue_now_amount: Money::ZERO,
            paid_pct: Rate::ONE,
            overdue_pct: Rate::ZERO,
            upcoming_pct: Rate::ZERO,
        }
    }
}

/// derives contract metrics and the dashboard roll-ups
#[derive(Debug, Clone)]
pub struct AggregateCalculator {
    config: DistributionConfig,
}

impl AggregateCalculator {
    pub fn new(config: DistributionConfig) -> Self {
        Self { config }
    }

    /// derive totals and the percent partition from distributed rows
    pub fn summarize(&self, rows: &[DistributedInstallment], today: NaiveDate) -> ContractMetrics {
        if rows.is_empty() {
            return ContractMetrics::zeroed();
        }

        let total_amount: Money = rows.iter().map(|r| r.installment.scheduled_amount).sum();
        let total_paid: Money = rows.iter().map(|r| r.allocated_paid_amount).sum();
        let remaining: Money = rows.iter().map(|r| r.remaining_amount).sum();
        let settled = total_amount - remaining;

        let overdue_now_amount = match self.config.overdue_basis {
            OverdueBasis::NetShortfall => {
                let expected_by_today: Money = rows
                    .iter()
                    .filter(|r| r.installment.due_date <= today)
                    .map(|r| r.installment.scheduled_amount)
                    .sum();
                expected_by_today.saturating_sub(total_paid)
            }
            OverdueBasis::PerInstallment => {
                let now = MonthStamp::from_date(today);
                rows.iter()
                    .filter(|r| MonthStamp::from_date(r.installment.due_date) < now)
                    .map(|r| r.remaining_amount)
                    .sum()
            }
        };

        if total_amount.is_zero() {
            // degenerate all-zero schedule: complete by definition
            return ContractMetrics {
                total_amount,
                total_paid,
                remaining,
                overdue_now_amount,
                paid_pct: Rate::ONE,
                overdue_pct: Rate::ZERO,
                upcoming_pct: Rate::ZERO,
            };
        }

        // the three shares partition 100% of the progress bar
        let paid_pct = Rate::from_ratio(settled, total_amount);
        let overdue_pct = Rate::from_ratio(overdue_now_amount, total_amount);
        let upcoming_pct = paid_pct.complement() - overdue_pct;

        ContractMetrics {
            total_amount,
            total_paid,
            remaining,
            overdue_now_amount,
            paid_pct,
            overdue_pct,
            upcoming_pct,
        }
    }

    /// cross-check the allocation against the raw payment total
    ///
    /// `total_paid` computed from rows must equal `payments - surplus`; a gap
    /// beyond epsilon means non-decimal arithmetic crept in upstream. Returns
    /// the drift when it exceeds epsilon.
    pub fn conservation_drift(
        &self,
        allocation: &AllocationResult,
        payment_total: Money,
    ) -> Option<Money> {
        let expected = payment_total - allocation.unallocated_surplus;
        let drift = (allocation.total_allocated() - expected).abs();
        if drift > self.config.epsilon {
            Some(drift)
        } else {
            None
        }
    }
}

/// one customer's position across all their contracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub contract_count: u32,
    pub total_amount: Money,
    pub total_paid: Money,
    pub remaining: Money,
    pub overdue_now_amount: Money,
}

impl CustomerSummary {
    pub fn roll_up<'a>(
        customer_id: impl Into<String>,
        metrics: impl IntoIterator<Item = &'a ContractMetrics>,
    ) -> Self {
        let mut summary = Self {
            customer_id: customer_id.into(),
            contract_count: 0,
            total_amount: Money::ZERO,
            total_paid: Money::ZERO,
            remaining: Money::ZERO,
            overdue_now_amount: Money::ZERO,
        };
        for m in metrics {
            summary.contract_count += 1;
            summary.total_amount += m.total_amount;
            summary.total_paid += m.total_paid;
            summary.remaining += m.remaining;
            summary.overdue_now_amount += m.overdue_now_amount;
        }
        summary
    }

    pub fn has_arrears(&self) -> bool {
        self.overdue_now_amount.is_positive()
    }
}

/// whole-book position across customers, for the collections dashboard header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub customer_count: u32,
    pub contract_count: u32,
    pub total_amount: Money,
    pub total_paid: Money,
    pub remaining: Money,
    pub overdue_now_amount: Money,
}

impl PortfolioSummary {
    pub fn roll_up(customers: &[CustomerSummary]) -> Self {
        let mut summary = Self {
            customer_count: customers.len() as u32,
            contract_count: 0,
            total_amount: Money::ZERO,
            total_paid: Money::ZERO,
            remaining: Money::ZERO,
            overdue_now_amount: Money::ZERO,
        };
        for c in customers {
            summary.contract_count += c.contract_count;
            summary.total_amount += c.total_amount;
            summary.total_paid += c.total_paid;
            summary.remaining += c.remaining;
            summary.overdue_now_amount += c.overdue_now_amount;
        }
        summary
    }
}
