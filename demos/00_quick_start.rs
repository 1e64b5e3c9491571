/// quick start - distribute payments over a three-installment contract
use chrono::{NaiveDate, TimeZone, Utc};
use installment_ledger_rs::{
    ContractSnapshot, DistributionService, Installment, MemoryLedger, Money, Payment,
    SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let contract_id = Uuid::new_v4();

    // three monthly installments of $100
    let installments = vec![
        Installment::new(1, date(2025, 4, 1), Money::from_major(100)),
        Installment::new(2, date(2025, 5, 1), Money::from_major(100)),
        Installment::new(3, date(2025, 6, 20), Money::from_major(100)),
    ];

    // one general payment of $150, recorded mid-May
    let payments = vec![Payment::general(
        contract_id,
        Money::from_major(150),
        date(2025, 5, 20),
    )];

    let mut ledger = MemoryLedger::new();
    ledger.insert(ContractSnapshot::new(contract_id, installments, payments));

    // fixed "today" so the walkthrough is reproducible
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(),
    ));

    let mut service = DistributionService::new(ledger, time);
    let distribution = service.distribution(contract_id)?;

    println!("contract {} as of {}\n", contract_id, distribution.as_of);
    for row in &distribution.installments {
        println!(
            "  #{} due {}  scheduled ${}  paid ${}  {:?}",
            row.installment.sequence_number,
            row.installment.due_date,
            row.installment.scheduled_amount,
            row.allocated_paid_amount,
            row.status,
        );
    }

    let m = &distribution.metrics;
    println!("\ntotal ${}  paid ${}  remaining ${}", m.total_amount, m.total_paid, m.remaining);
    println!("overdue right now: ${}", m.overdue_now_amount);
    println!(
        "progress: {} paid / {} overdue / {} upcoming",
        m.paid_pct, m.overdue_pct, m.upcoming_pct
    );

    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
