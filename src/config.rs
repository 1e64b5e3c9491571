use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};

/// how the overdue-now amount is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverdueBasis {
    /// net cash shortfall: expected-by-today minus total paid, floored at zero;
    /// an overpaid early installment offsets a later nominal shortfall
    NetShortfall,
    /// naive per-row sum of unpaid gaps on calendar-overdue installments
    PerInstallment,
}

/// distribution engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// tolerance absorbing rounding when deciding fully-paid and drift
    pub epsilon: Money,
    pub overdue_basis: OverdueBasis,
    /// emit a warn log when a contract carries unallocated surplus
    pub warn_on_surplus: bool,
}

impl DistributionConfig {
    /// cent-tolerant configuration with net-shortfall overdue reporting
    pub fn standard() -> Self {
        Self {
            epsilon: Money::CENT,
            overdue_basis: OverdueBasis::NetShortfall,
            warn_on_surplus: true,
        }
    }

    /// per-row overdue sums for ledgers reconciled installment by installment
    pub fn per_installment_overdue() -> Self {
        Self {
            overdue_basis: OverdueBasis::PerInstallment,
            ..Self::standard()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.epsilon.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("epsilon must be non-negative, got {}", self.epsilon),
            });
        }
        Ok(())
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self::standard()
    }
}
