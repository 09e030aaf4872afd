// ==========================================
// 员工台账 / 工资汇总 集成测试
// ==========================================

mod helpers;

use fish_farm_client::engine::{aggregate_totals, LedgerBuilder, LedgerEntryType};
use helpers::{create_test_payroll_line, create_test_payroll_run, date};

#[test]
fn test_salary_minus_pf_closing_balance() {
    let runs = vec![create_test_payroll_run(
        1,
        date(2026, 1, 31),
        vec![create_test_payroll_line(10, 1000.0, 50.0)],
    )];

    let ledger = LedgerBuilder::new().build(10, &runs);
    assert_eq!(ledger.closing_balance, 950.0);
    assert_eq!(ledger.entries.len(), 2);
    assert!(ledger.entries.iter().all(|e| e.reference == "PR-1"));
    assert!(ledger
        .entries
        .iter()
        .any(|e| e.entry_type == LedgerEntryType::Deduction && e.credit == 50.0));
}

#[test]
fn test_running_balance_across_runs_displayed_newest_first() {
    let runs = vec![
        create_test_payroll_run(2, date(2026, 2, 28), vec![create_test_payroll_line(10, 1200.0, 0.0)]),
        create_test_payroll_run(1, date(2026, 1, 31), vec![create_test_payroll_line(10, 1000.0, 0.0)]),
        create_test_payroll_run(3, date(2026, 3, 31), vec![create_test_payroll_line(11, 900.0, 0.0)]),
    ];

    let ledger = LedgerBuilder::new().build(10, &runs);
    assert_eq!(ledger.entries.len(), 2);
    assert_eq!(ledger.entries[0].date, Some(date(2026, 2, 28)));
    assert_eq!(ledger.entries[0].balance, 2200.0);
    assert_eq!(ledger.entries[1].balance, 1000.0);
    assert_eq!(ledger.closing_balance, 2200.0);
}

#[test]
fn test_unknown_employee_has_empty_ledger() {
    let runs = vec![create_test_payroll_run(
        1,
        date(2026, 1, 31),
        vec![create_test_payroll_line(10, 1000.0, 0.0)],
    )];
    let ledger = LedgerBuilder::new().build(99, &runs);
    assert!(ledger.entries.is_empty());
    assert_eq!(ledger.closing_balance, 0.0);
}

#[test]
fn test_aggregate_totals_from_lines() {
    let runs = vec![
        create_test_payroll_run(1, date(2026, 1, 31), vec![create_test_payroll_line(10, 1000.0, 50.0)]),
        create_test_payroll_run(2, date(2026, 2, 28), vec![create_test_payroll_line(11, 800.0, 0.0)]),
    ];
    let totals = aggregate_totals(&runs);
    assert_eq!(totals.gross, 1800.0);
    assert_eq!(totals.deductions, 50.0);
    assert_eq!(totals.net, 1750.0);
}
