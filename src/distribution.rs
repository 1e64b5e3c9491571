use std::collections::HashMap;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::allocation::AllocationEngine;
use crate::config::DistributionConfig;
use crate::contract::ContractSnapshot;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::metrics::{AggregateCalculator, ContractMetrics, CustomerSummary, PortfolioSummary};
use crate::status::{DistributedInstallment, StatusClassifier};
use crate::types::ContractId;

/// read-only access to stored installments and payments
///
/// The engine never writes through this seam. Implementations must hand back
/// one consistent snapshot per call; the service never merges two fetches.
pub trait LedgerSource {
    fn fetch_snapshot(&self, contract_id: ContractId) -> Result<ContractSnapshot>;

    /// every contract id the source knows about, for dashboard sweeps
    fn contract_ids(&self) -> Vec<ContractId>;
}

/// in-memory ledger source for tests and demos
#[derive(Debug, Default)]
pub struct MemoryLedger {
    snapshots: HashMap<ContractId, ContractSnapshot>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: ContractSnapshot) {
        self.snapshots.insert(snapshot.contract_id, snapshot);
    }

    pub fn remove(&mut self, contract_id: ContractId) -> Option<ContractSnapshot> {
        self.snapshots.remove(&contract_id)
    }
}

impl LedgerSource for MemoryLedger {
    fn fetch_snapshot(&self, contract_id: ContractId) -> Result<ContractSnapshot> {
        self.snapshots
            .get(&contract_id)
            .cloned()
            .ok_or(LedgerError::ContractNotFound { id: contract_id })
    }

    fn contract_ids(&self) -> Vec<ContractId> {
        let mut ids: Vec<ContractId> = self.snapshots.keys().copied().collect();
        ids.sort();
        ids
    }
}

/// the computed shape UI components consume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDistribution {
    pub contract_id: ContractId,
    /// reference date the statuses were classified against
    pub as_of: NaiveDate,
    /// rows in chronological order
    pub installments: Vec<DistributedInstallment>,
    pub metrics: ContractMetrics,
    /// should be ~0 in a healthy ledger
    pub unallocated_surplus: Money,
}

impl ContractDistribution {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// contracts of one customer, as the dashboard groups them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContracts {
    pub customer_id: String,
    pub contract_ids: Vec<ContractId>,
}

/// per-item failure entry for a dashboard sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFailure {
    pub contract_id: ContractId,
    pub customer_id: String,
    pub reason: String,
}

/// collections dashboard roll-up with per-contract failure isolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub customers: Vec<CustomerSummary>,
    pub failures: Vec<ContractFailure>,
    pub portfolio: PortfolioSummary,
}

/// orchestrates fetch, allocation, classification, and aggregation
///
/// Results are cached per contract id; the cache is invalidated explicitly
/// (mutation upstream, refresh tick) rather than watched. The version counter
/// lets callers detect stale references they may be holding.
pub struct DistributionService<S: LedgerSource> {
    source: S,
    time: SafeTimeProvider,
    config: DistributionConfig,
    engine: AllocationEngine,
    classifier: StatusClassifier,
    calculator: AggregateCalculator,
    cache: HashMap<ContractId, ContractDistribution>,
    version: u64,
    events: EventStore,
}

impl<S: LedgerSource> DistributionService<S> {
    pub fn new(source: S, time: SafeTimeProvider) -> Self {
        Self::with_config(source, time, DistributionConfig::standard())
            .expect("standard configuration is valid")
    }

    pub fn with_config(
        source: S,
        time: SafeTimeProvider,
        config: DistributionConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            time,
            engine: AllocationEngine::new(),
            classifier: StatusClassifier::new(config.epsilon),
            calculator: AggregateCalculator::new(config.clone()),
            config,
            cache: HashMap::new(),
            version: 0,
            events: EventStore::new(),
        })
    }

    /// reference date derived from the injected clock
    pub fn today(&self) -> NaiveDate {
        self.time.now().date_naive()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// cached distribution for a contract, computing it on first request
    pub fn distribution(&mut self, contract_id: ContractId) -> Result<ContractDistribution> {
        if let Some(cached) = self.cache.get(&contract_id) {
            return Ok(cached.clone());
        }
        let computed = self.compute(contract_id)?;
        self.cache.insert(contract_id, computed.clone());
        Ok(computed)
    }

    /// drop the cache entry and recompute from a fresh snapshot
    pub fn refresh(&mut self, contract_id: ContractId) -> Result<ContractDistribution> {
        self.cache.remove(&contract_id);
        self.version += 1;
        let computed = self.compute(contract_id)?;
        self.cache.insert(contract_id, computed.clone());
        self.events.emit(Event::CacheRefreshed {
            contract_id,
            version: self.version,
            timestamp: self.time.now(),
        });
        Ok(computed)
    }

    /// forget one contract's cached result
    pub fn invalidate(&mut self, contract_id: ContractId) {
        if self.cache.remove(&contract_id).is_some() {
            self.version += 1;
            self.events.emit(Event::CacheInvalidated {
                contract_id: Some(contract_id),
                version: self.version,
                timestamp: self.time.now(),
            });
        }
    }

    /// drop every cached result
    pub fn invalidate_all(&mut self) {
        if !self.cache.is_empty() {
            self.cache.clear();
            self.version += 1;
            self.events.emit(Event::CacheInvalidated {
                contract_id: None,
                version: self.version,
                timestamp: self.time.now(),
            });
        }
    }

    pub fn is_cached(&self, contract_id: ContractId) -> bool {
        self.cache.contains_key(&contract_id)
    }

    /// bumped on every invalidation; stale readers compare against it
    pub fn cache_version(&self) -> u64 {
        self.version
    }

    /// drain diagnostics collected since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// distribute every contract the source knows about
    ///
    /// One contract's bad data never aborts the sweep; its error is returned
    /// in place and the remaining contracts still compute.
    pub fn distribute_all(&mut self) -> Vec<(ContractId, Result<ContractDistribution>)> {
        let ids = self.source.contract_ids();
        let mut results = Vec::with_capacity(ids.len());
        for contract_id in ids {
            let outcome = self.distribution(contract_id);
            if let Err(err) = &outcome {
                self.note_failure(contract_id, err);
            }
            results.push((contract_id, outcome));
        }
        results
    }

    /// customer and portfolio roll-ups for the collections dashboard
    pub fn collections_dashboard(&mut self, groups: &[CustomerContracts]) -> DashboardReport {
        let mut customers = Vec::with_capacity(groups.len());
        let mut failures = Vec::new();

        for group in groups {
            let mut metrics: Vec<ContractMetrics> = Vec::with_capacity(group.contract_ids.len());
            for &contract_id in &group.contract_ids {
                match self.distribution(contract_id) {
                    Ok(distribution) => metrics.push(distribution.metrics),
                    Err(err) => {
                        self.note_failure(contract_id, &err);
                        failures.push(ContractFailure {
                            contract_id,
                            customer_id: group.customer_id.clone(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
            customers.push(CustomerSummary::roll_up(
                group.customer_id.as_str(),
                metrics.iter(),
            ));
        }

        let portfolio = PortfolioSummary::roll_up(&customers);
        DashboardReport {
            customers,
            failures,
            portfolio,
        }
    }

    fn note_failure(&mut self, contract_id: ContractId, err: &LedgerError) {
        warn!(%contract_id, error = %err, "contract skipped during sweep");
        self.events.emit(Event::DistributionFailed {
            contract_id,
            reason: err.to_string(),
            timestamp: self.time.now(),
        });
    }

    fn compute(&mut self, contract_id: ContractId) -> Result<ContractDistribution> {
        let snapshot = self.source.fetch_snapshot(contract_id)?;
        let today = self.today();
        let now = self.time.now();

        let allocation = self.engine.allocate(&snapshot)?;
        let rows =
            self.classifier
                .distribute(&snapshot.sorted_installments(), &allocation, today);
        let metrics = self.calculator.summarize(&rows, today);

        if let Some(drift) = self
            .calculator
            .conservation_drift(&allocation, snapshot.total_payments())
        {
            warn!(%contract_id, %drift, "allocated total disagrees with payment records");
            self.events.emit(Event::RoundingDriftDetected {
                contract_id,
                allocated_total: allocation.total_allocated(),
                payment_total_less_surplus: snapshot.total_payments()
                    - allocation.unallocated_surplus,
                drift,
                timestamp: now,
            });
        }

        if allocation.has_surplus() {
            if self.config.warn_on_surplus {
                warn!(
                    %contract_id,
                    surplus = %allocation.unallocated_surplus,
                    "payments exceed the installment schedule"
                );
            }
            self.events.emit(Event::SurplusDetected {
                contract_id,
                amount: allocation.unallocated_surplus,
                timestamp: now,
            });
        }

        debug!(%contract_id, total_paid = %metrics.total_paid, "distribution computed");
        self.events.emit(Event::DistributionComputed {
            contract_id,
            total_paid: metrics.total_paid,
            unallocated_surplus: allocation.unallocated_surplus,
            as_of: today,
            timestamp: now,
        });

        Ok(ContractDistribution {
            contract_id,
            as_of: today,
            installments: rows,
            metrics,
            unallocated_surplus: allocation.unallocated_surplus,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Installment, InstallmentStatus, Payment};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn frozen_time(y: i32, m: u32, d: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        ))
    }

    /// installments due two months back, one month back, and later this month
    fn arrears_snapshot(contract_id: ContractId) -> ContractSnapshot {
        ContractSnapshot::new(
            contract_id,
            vec![
                Installment::new(1, date(2025, 4, 1), Money::from_major(100)),
                Installment::new(2, date(2025, 5, 1), Money::from_major(100)),
                Installment::new(3, date(2025, 6, 20), Money::from_major(100)),
            ],
            vec![Payment::general(
                contract_id,
                Money::from_major(150),
                date(2025, 5, 20),
            )],
        )
    }

    fn service_with(
        snapshots: Vec<ContractSnapshot>,
    ) -> DistributionService<MemoryLedger> {
        let mut ledger = MemoryLedger::new();
        for snapshot in snapshots {
            ledger.insert(snapshot);
        }
        DistributionService::new(ledger, frozen_time(2025, 6, 15))
    }

    #[test]
    fn test_distribution_scenario_oldest_first() {
        let contract_id = Uuid::new_v4();
        let mut service = service_with(vec![arrears_snapshot(contract_id)]);

        let distribution = service.distribution(contract_id).unwrap();

        assert_eq!(distribution.as_of, date(2025, 6, 15));
        let rows = &distribution.installments;
        assert_eq!(rows[0].status, InstallmentStatus::Paid);
        assert_eq!(rows[1].status, InstallmentStatus::PartiallyPaid);
        assert_eq!(rows[1].allocated_paid_amount, Money::from_major(50));
        assert_eq!(rows[2].status, InstallmentStatus::Due);
        // expected by the 15th is 200 (the june row falls due on the 20th),
        // against 150 paid
        assert_eq!(
            distribution.metrics.overdue_now_amount,
            Money::from_major(50)
        );
    }

    #[test]
    fn test_no_payments_single_overdue_installment() {
        let contract_id = Uuid::new_v4();
        let snapshot = ContractSnapshot::new(
            contract_id,
            vec![Installment::new(1, date(2025, 5, 10), Money::from_major(500))],
            Vec::new(),
        );
        let mut service = service_with(vec![snapshot]);

        let distribution = service.distribution(contract_id).unwrap();

        assert_eq!(
            distribution.installments[0].status,
            InstallmentStatus::Overdue
        );
        assert_eq!(
            distribution.metrics.overdue_now_amount,
            Money::from_major(500)
        );
        assert_eq!(distribution.metrics.remaining, Money::from_major(500));
    }

    #[test]
    fn test_zero_installment_contract_yields_zeroed_metrics() {
        let contract_id = Uuid::new_v4();
        let snapshot = ContractSnapshot::new(contract_id, Vec::new(), Vec::new());
        let mut service = service_with(vec![snapshot]);

        let distribution = service.distribution(contract_id).unwrap();
        assert!(distribution.installments.is_empty());
        assert_eq!(distribution.metrics, ContractMetrics::zeroed());
    }

    #[test]
    fn test_cache_hit_skips_refetch_until_invalidated() {
        let contract_id = Uuid::new_v4();
        let mut service = service_with(vec![arrears_snapshot(contract_id)]);

        let first = service.distribution(contract_id).unwrap();
        assert!(service.is_cached(contract_id));

        // mutate the stored ledger behind the cache
        let mut updated = arrears_snapshot(contract_id);
        updated.payments.push(Payment::general(
            contract_id,
            Money::from_major(150),
            date(2025, 6, 10),
        ));
        service.source_mut().insert(updated);

        // cached result still served
        let cached = service.distribution(contract_id).unwrap();
        assert_eq!(cached, first);

        // refresh recomputes from the new snapshot
        let version_before = service.cache_version();
        let refreshed = service.refresh(contract_id).unwrap();
        assert!(service.cache_version() > version_before);
        assert_eq!(refreshed.metrics.total_paid, Money::from_major(300));
        assert_eq!(refreshed.metrics.overdue_now_amount, Money::ZERO);
    }

    #[test]
    fn test_invalidate_all_bumps_version_once() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut service = service_with(vec![arrears_snapshot(a), arrears_snapshot(b)]);
        service.distribution(a).unwrap();
        service.distribution(b).unwrap();

        service.invalidate_all();
        assert!(!service.is_cached(a));
        assert!(!service.is_cached(b));
        assert_eq!(service.cache_version(), 1);

        // empty cache: nothing to invalidate, version stays
        service.invalidate_all();
        assert_eq!(service.cache_version(), 1);
    }

    #[test]
    fn test_sweep_isolates_bad_contract() {
        let good = Uuid::new_v4();
        let bad = Uuid::new_v4();
        let mut bad_snapshot = arrears_snapshot(bad);
        bad_snapshot.payments[0].paid_amount = Money::ZERO; // invalid record

        let mut service = service_with(vec![arrears_snapshot(good), bad_snapshot]);
        let results = service.distribute_all();

        assert_eq!(results.len(), 2);
        let (_, good_result) = results.iter().find(|(id, _)| *id == good).unwrap();
        let (_, bad_result) = results.iter().find(|(id, _)| *id == bad).unwrap();
        assert!(good_result.is_ok());
        assert!(matches!(
            bad_result,
            Err(LedgerError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_dashboard_rolls_up_customers_and_portfolio() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let mut service = service_with(vec![arrears_snapshot(c1), arrears_snapshot(c2)]);

        let groups = vec![
            CustomerContracts {
                customer_id: "ACC-1".to_string(),
                contract_ids: vec![c1],
            },
            CustomerContracts {
                customer_id: "ACC-2".to_string(),
                contract_ids: vec![c2, missing],
            },
        ];

        let report = service.collections_dashboard(&groups);

        assert_eq!(report.customers.len(), 2);
        assert_eq!(report.customers[0].contract_count, 1);
        // the missing contract fails without sinking ACC-2's good contract
        assert_eq!(report.customers[1].contract_count, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].contract_id, missing);

        assert_eq!(report.portfolio.customer_count, 2);
        assert_eq!(report.portfolio.contract_count, 2);
        assert_eq!(report.portfolio.total_amount, Money::from_major(600));
        assert_eq!(
            report.portfolio.overdue_now_amount,
            Money::from_major(100)
        );
    }

    #[test]
    fn test_surplus_and_computation_events() {
        let contract_id = Uuid::new_v4();
        let snapshot = ContractSnapshot::new(
            contract_id,
            vec![Installment::new(1, date(2025, 5, 1), Money::from_major(100))],
            vec![Payment::general(
                contract_id,
                Money::from_major(160),
                date(2025, 5, 2),
            )],
        );
        let mut service = service_with(vec![snapshot]);

        let distribution = service.distribution(contract_id).unwrap();
        assert_eq!(distribution.unallocated_surplus, Money::from_major(60));

        let events = service.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SurplusDetected { amount, .. } if *amount == Money::from_major(60)
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::DistributionComputed { .. })));
        assert!(service.take_events().is_empty());
    }

    #[test]
    fn test_distribution_json_round_trip() {
        let contract_id = Uuid::new_v4();
        let mut service = service_with(vec![arrears_snapshot(contract_id)]);
        let distribution = service.distribution(contract_id).unwrap();

        let json = distribution.to_json().unwrap();
        let restored = ContractDistribution::from_json(&json).unwrap();
        assert_eq!(restored, distribution);
    }

    #[test]
    fn test_unknown_contract_is_recoverable() {
        let mut service = service_with(Vec::new());
        let err = service.distribution(Uuid::new_v4()).unwrap_err();
        assert!(err.is_recoverable());
    }
}
