use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a finance contract
pub type ContractId = Uuid;

/// unique identifier for an installment
pub type InstallmentId = Uuid;

/// unique identifier for a recorded payment
pub type PaymentId = Uuid;

/// installment status as of a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// allocated amount covers the scheduled amount (within epsilon)
    Paid,
    /// some money allocated, but less than the scheduled amount
    PartiallyPaid,
    /// unpaid, due in the current month
    Due,
    /// unpaid, due month already behind the reference date
    Overdue,
    /// unpaid, due in a future month
    Pending,
}

impl InstallmentStatus {
    /// settled means no further collection action applies
    pub fn is_settled(&self) -> bool {
        matches!(self, InstallmentStatus::Paid)
    }

    /// statuses a collections follow-up list cares about
    pub fn needs_collection(&self) -> bool {
        matches!(
            self,
            InstallmentStatus::Overdue | InstallmentStatus::Due | InstallmentStatus::PartiallyPaid
        )
    }
}

/// one scheduled due amount within a contract's repayment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    /// 1-based position in the schedule; display only, ordering is by due date
    pub sequence_number: u32,
    pub due_date: NaiveDate,
    pub scheduled_amount: Money,
}

impl Installment {
    pub fn new(sequence_number: u32, due_date: NaiveDate, scheduled_amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence_number,
            due_date,
            scheduled_amount,
        }
    }
}

/// a recorded payment against a finance contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub contract_id: ContractId,
    /// None marks a general payment to be distributed by the engine
    pub installment_id: Option<InstallmentId>,
    pub paid_amount: Money,
    pub payment_date: NaiveDate,
    pub note: Option<String>,
    pub recorded_by: Option<String>,
}

impl Payment {
    /// payment not linked to any installment
    pub fn general(contract_id: ContractId, paid_amount: Money, payment_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            installment_id: None,
            paid_amount,
            payment_date,
            note: None,
            recorded_by: None,
        }
    }

    /// payment explicitly linked to one installment
    pub fn targeted(
        contract_id: ContractId,
        installment_id: InstallmentId,
        paid_amount: Money,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            installment_id: Some(installment_id),
            paid_amount,
            payment_date,
            note: None,
            recorded_by: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_recorded_by(mut self, recorded_by: impl Into<String>) -> Self {
        self.recorded_by = Some(recorded_by.into());
        self
    }

    pub fn is_targeted(&self) -> bool {
        self.installment_id.is_some()
    }

    pub fn is_general(&self) -> bool {
        self.installment_id.is_none()
    }
}
