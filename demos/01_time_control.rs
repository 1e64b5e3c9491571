/// time control - watch statuses roll from pending to overdue as months pass
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use installment_ledger_rs::{
    ContractSnapshot, DistributionService, Installment, MemoryLedger, Money, Payment,
    SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    let contract_id = Uuid::new_v4();
    let installments = vec![
        Installment::new(1, date(2025, 2, 1), Money::from_major(250)),
        Installment::new(2, date(2025, 3, 1), Money::from_major(250)),
        Installment::new(3, date(2025, 4, 1), Money::from_major(250)),
    ];
    let payments = vec![Payment::general(
        contract_id,
        Money::from_major(250),
        date(2025, 2, 10),
    )];

    let mut ledger = MemoryLedger::new();
    ledger.insert(ContractSnapshot::new(contract_id, installments, payments));

    // start in january, before anything is due
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let mut service = DistributionService::new(ledger, time);

    print_statuses(&mut service, contract_id)?;

    // advance two months: first installment paid, second now due
    controller.advance(Duration::days(60));
    service.refresh(contract_id)?;
    print_statuses(&mut service, contract_id)?;

    // advance two more months: the unpaid rows are behind the calendar
    controller.advance(Duration::days(60));
    service.refresh(contract_id)?;
    print_statuses(&mut service, contract_id)?;

    // the cache only moves when told to
    println!("cache version after two refreshes: {}", service.cache_version());

    Ok(())
}

fn print_statuses(
    service: &mut DistributionService<MemoryLedger>,
    contract_id: installment_ledger_rs::ContractId,
) -> Result<(), Box<dyn std::error::Error>> {
    let distribution = service.distribution(contract_id)?;
    println!("as of {}:", distribution.as_of);
    for row in &distribution.installments {
        println!(
            "  #{} due {}  {:?}",
            row.installment.sequence_number, row.installment.due_date, row.status
        );
    }
    println!(
        "  overdue now: ${}\n",
        distribution.metrics.overdue_now_amount
    );
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
