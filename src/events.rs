use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::ContractId;

/// all events that can be emitted while distributing payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // distribution events
    DistributionComputed {
        contract_id: ContractId,
        total_paid: Money,
        unallocated_surplus: Money,
        as_of: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    DistributionFailed {
        contract_id: ContractId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // diagnostic events
    SurplusDetected {
        contract_id: ContractId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    RoundingDriftDetected {
        contract_id: ContractId,
        allocated_total: Money,
        payment_total_less_surplus: Money,
        drift: Money,
        timestamp: DateTime<Utc>,
    },

    // cache events
    CacheInvalidated {
        /// None means the whole cache was dropped
        contract_id: Option<ContractId>,
        version: u64,
        timestamp: DateTime<Utc>,
    },
    CacheRefreshed {
        contract_id: ContractId,
        version: u64,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
