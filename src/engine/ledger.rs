// ==========================================
// 渔场管理系统 - 员工台账引擎
// ==========================================
// 职责: 由工资单合成员工台账（仅展示，不持久化）
// 输入: 全部工资单 + 员工 ID
// 输出: 按日期倒序的台账条目 + 期末余额
// ==========================================
// 借方: 工资 / 加班 / 收获奖励 / 节日奖金 / 绩效奖金
// 贷方: 缺勤扣款 / 借款扣回 / 公积金 / 个税
// 余额 = Σ(借方 − 贷方)，按日期正序累计
// ==========================================

use crate::domain::payroll::{PayrollLine, PayrollRun};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

/// 台账条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    Payroll,
    Bonus,
    Deduction,
    Other,
}

/// 工资构成项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayComponent {
    Salary,
    Overtime,
    HarvestIncentive,
    FestivalBonus,
    PerformanceBonus,
    AbsentDeduction,
    LoanAdvance,
    ProvidentFund,
    Tax,
}

impl PayComponent {
    /// 合成条目 ID 前缀
    fn prefix(&self) -> &'static str {
        match self {
            PayComponent::Salary => "salary",
            PayComponent::Overtime => "overtime",
            PayComponent::HarvestIncentive => "harvest",
            PayComponent::FestivalBonus => "festival",
            PayComponent::PerformanceBonus => "performance",
            PayComponent::AbsentDeduction => "absent",
            PayComponent::LoanAdvance => "loan",
            PayComponent::ProvidentFund => "pf",
            PayComponent::Tax => "tax",
        }
    }

    fn entry_type(&self) -> LedgerEntryType {
        match self {
            PayComponent::Salary | PayComponent::Overtime => LedgerEntryType::Payroll,
            PayComponent::HarvestIncentive
            | PayComponent::FestivalBonus
            | PayComponent::PerformanceBonus => LedgerEntryType::Bonus,
            _ => LedgerEntryType::Deduction,
        }
    }

    fn is_credit(&self) -> bool {
        self.entry_type() == LedgerEntryType::Deduction
    }
}

/// 台账事件（一条工资行拆出的一项）
#[derive(Debug, Clone, PartialEq)]
struct LedgerEvent {
    component: PayComponent,
    run_id: i64,
    date: Option<NaiveDate>,
    description: String,
    amount: f64,
}

/// 台账条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub reference: String,
    pub debit: f64,
    pub credit: f64,
    pub balance: f64,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
}

/// 员工台账
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeeLedger {
    /// 日期倒序
    pub entries: Vec<LedgerEntry>,
    pub closing_balance: f64,
}

// ==========================================
// LedgerBuilder - 台账合成器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct LedgerBuilder;

impl LedgerBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 合成员工台账
    ///
    /// # 参数
    /// - employee_id: 员工 ID
    /// - runs: 全部工资单（仅含该员工工资行的工资单参与）
    ///
    /// # 返回
    /// - 条目按日期倒序（同日保持生成顺序），期末余额为正序累计的最终值
    #[instrument(skip(self, runs), fields(runs = runs.len()))]
    pub fn build(&self, employee_id: i64, runs: &[PayrollRun]) -> EmployeeLedger {
        let mut events: Vec<LedgerEvent> = runs
            .iter()
            .filter_map(|run| run.line_for(employee_id).map(|line| (run, line)))
            .flat_map(|(run, line)| self.events_for(run, line))
            .collect();

        // 缺失日期视为最早
        events.sort_by_key(|e| e.date);

        let mut balance = 0.0;
        let mut entries: Vec<LedgerEntry> = events
            .into_iter()
            .map(|event| {
                let (debit, credit) = if event.component.is_credit() {
                    (0.0, event.amount)
                } else {
                    (event.amount, 0.0)
                };
                balance += debit - credit;
                LedgerEntry {
                    id: format!("{}-{}", event.component.prefix(), event.run_id),
                    date: event.date,
                    description: event.description,
                    reference: format!("PR-{}", event.run_id),
                    debit,
                    credit,
                    balance,
                    entry_type: event.component.entry_type(),
                }
            })
            .collect();

        let closing_balance = balance;
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        EmployeeLedger {
            entries,
            closing_balance,
        }
    }

    /// 拆分一条工资行（仅保留 > 0 的项）
    fn events_for(&self, run: &PayrollRun, line: &PayrollLine) -> Vec<LedgerEvent> {
        let period = format!(
            "Salary - {} to {}",
            fmt_date(run.period_start),
            fmt_date(run.period_end)
        );
        let components = [
            (PayComponent::Salary, line.full_salary, period),
            (
                PayComponent::Overtime,
                line.overtime_pay,
                format!("Overtime Pay ({}h)", line.overtime_hours),
            ),
            (
                PayComponent::HarvestIncentive,
                line.harvest_incentive,
                "Harvest Incentive".to_string(),
            ),
            (
                PayComponent::FestivalBonus,
                line.festival_bonus,
                "Festival Bonus".to_string(),
            ),
            (
                PayComponent::PerformanceBonus,
                line.performance_bonus,
                "Performance Bonus".to_string(),
            ),
            (
                PayComponent::AbsentDeduction,
                line.absent_deduction,
                format!("Absent Deduction ({} days)", line.absent_days),
            ),
            (
                PayComponent::LoanAdvance,
                line.loan_advance,
                "Loan/Advance Deduction".to_string(),
            ),
            (
                PayComponent::ProvidentFund,
                line.pf_employee,
                "Provident Fund (Employee)".to_string(),
            ),
            (PayComponent::Tax, line.tax_paye, "Tax (PAYE)".to_string()),
        ];

        components
            .into_iter()
            .filter(|(_, amount, _)| *amount > 0.0)
            .map(|(component, amount, description)| LedgerEvent {
                component,
                run_id: run.payroll_run_id,
                date: run.pay_date,
                description,
                amount,
            })
            .collect()
    }
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: i64, day: u32, line: PayrollLine) -> PayrollRun {
        PayrollRun {
            payroll_run_id: id,
            pay_date: NaiveDate::from_ymd_opt(2026, 3, day),
            period_start: NaiveDate::from_ymd_opt(2026, 2, 1),
            period_end: NaiveDate::from_ymd_opt(2026, 2, 28),
            lines: vec![line],
            ..Default::default()
        }
    }

    #[test]
    fn test_salary_minus_pf() {
        let line = PayrollLine {
            employee: 5,
            full_salary: 1000.0,
            pf_employee: 50.0,
            ..Default::default()
        };
        let ledger = LedgerBuilder::new().build(5, &[run(1, 1, line)]);
        assert_eq!(ledger.closing_balance, 950.0);
        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.entries[0].id, "salary-1");
        assert_eq!(ledger.entries[0].description, "Salary - 2026-02-01 to 2026-02-28");
        assert_eq!(ledger.entries[0].reference, "PR-1");
        assert_eq!(ledger.entries[1].id, "pf-1");
        assert_eq!(ledger.entries[1].credit, 50.0);
        assert_eq!(ledger.entries[1].balance, 950.0);
    }

    #[test]
    fn test_other_employees_ignored_and_descending_order() {
        let mine = |salary| PayrollLine {
            employee: 5,
            full_salary: salary,
            ..Default::default()
        };
        let other = PayrollLine {
            employee: 9,
            full_salary: 777.0,
            ..Default::default()
        };
        let runs = vec![run(2, 20, mine(300.0)), run(1, 5, mine(200.0)), run(3, 10, other)];
        let ledger = LedgerBuilder::new().build(5, &runs);

        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.entries[0].id, "salary-2");
        assert_eq!(ledger.entries[0].balance, 500.0);
        assert_eq!(ledger.entries[1].balance, 200.0);
        assert_eq!(ledger.closing_balance, 500.0);
    }

    #[test]
    fn test_zero_components_skipped() {
        let line = PayrollLine {
            employee: 1,
            overtime_pay: 120.0,
            overtime_hours: 6.0,
            absent_deduction: 40.0,
            absent_days: 2.0,
            ..Default::default()
        };
        let ledger = LedgerBuilder::new().build(1, &[run(4, 1, line)]);
        let ids: Vec<_> = ledger.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["overtime-4", "absent-4"]);
        assert_eq!(ledger.entries[0].description, "Overtime Pay (6h)");
        assert_eq!(ledger.entries[1].description, "Absent Deduction (2 days)");
        assert_eq!(ledger.entries[1].entry_type, LedgerEntryType::Deduction);
        assert_eq!(ledger.closing_balance, 80.0);
    }

    #[test]
    fn test_no_runs_yields_empty_ledger() {
        let ledger = LedgerBuilder::new().build(1, &[]);
        assert!(ledger.entries.is_empty());
        assert_eq!(ledger.closing_balance, 0.0);
    }
}
