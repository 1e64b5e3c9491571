/// collections dashboard - roll many contracts up to customer and portfolio totals
use chrono::{NaiveDate, TimeZone, Utc};
use installment_ledger_rs::{
    ContractSnapshot, CustomerContracts, DistributionService, Installment, MemoryLedger, Money,
    Payment, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== collections dashboard example ===\n");

    let mut ledger = MemoryLedger::new();

    // customer ACC-1: one contract, fully current
    let current = seed_contract(&mut ledger, 3, Money::from_major(200), 600);

    // customer ACC-2: one contract two installments behind, one never stored
    let behind = seed_contract(&mut ledger, 4, Money::from_major(150), 150);
    let missing = Uuid::new_v4();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 6, 20, 8, 0, 0).unwrap(),
    ));
    let mut service = DistributionService::new(ledger, time);

    let groups = vec![
        CustomerContracts {
            customer_id: "ACC-1".to_string(),
            contract_ids: vec![current],
        },
        CustomerContracts {
            customer_id: "ACC-2".to_string(),
            contract_ids: vec![behind, missing],
        },
    ];

    let report = service.collections_dashboard(&groups);

    for customer in &report.customers {
        println!(
            "{}: {} contract(s), ${} outstanding, ${} overdue now",
            customer.customer_id,
            customer.contract_count,
            customer.remaining,
            customer.overdue_now_amount,
        );
    }

    for failure in &report.failures {
        println!(
            "skipped {} for {}: {}",
            failure.contract_id, failure.customer_id, failure.reason
        );
    }

    let p = &report.portfolio;
    println!(
        "\nportfolio: {} customers, {} contracts, ${} overdue now of ${} total",
        p.customer_count, p.contract_count, p.overdue_now_amount, p.total_amount
    );

    Ok(())
}

/// seed a contract starting april 2025 with `count` monthly installments and
/// one general payment of `paid` dollars
fn seed_contract(
    ledger: &mut MemoryLedger,
    count: u32,
    amount: Money,
    paid: i64,
) -> Uuid {
    let contract_id = Uuid::new_v4();
    let installments: Vec<Installment> = (0..count)
        .map(|i| {
            let due = NaiveDate::from_ymd_opt(2025, 4, 1)
                .unwrap()
                .checked_add_months(chrono::Months::new(i))
                .unwrap();
            Installment::new(i + 1, due, amount)
        })
        .collect();

    let payments = vec![Payment::general(
        contract_id,
        Money::from_major(paid),
        NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
    )];

    ledger.insert(ContractSnapshot::new(contract_id, installments, payments));
    contract_id
}
