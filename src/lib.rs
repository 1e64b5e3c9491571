pub mod allocation;
pub mod config;
pub mod contract;
pub mod decimal;
pub mod distribution;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod status;
pub mod types;

// re-export key types
pub use allocation::{AllocationEngine, AllocationResult};
pub use config::{DistributionConfig, OverdueBasis};
pub use contract::ContractSnapshot;
pub use decimal::{Money, Rate};
pub use distribution::{
    ContractDistribution, CustomerContracts, DashboardReport, DistributionService, LedgerSource,
    MemoryLedger,
};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use metrics::{AggregateCalculator, ContractMetrics, CustomerSummary, PortfolioSummary};
pub use status::{DistributedInstallment, MonthStamp, StatusClassifier};
pub use types::{
    ContractId, Installment, InstallmentId, InstallmentStatus, Payment, PaymentId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
