// ==========================================
// 渔场管理系统 - 工资单合计
// ==========================================
// 有工资行时由行汇总，否则取工资单自身合计
// ==========================================

use crate::domain::payroll::PayrollRun;
use serde::Serialize;

/// 工资单合计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PayrollTotals {
    pub gross: f64,
    pub deductions: f64,
    pub net: f64,
}

impl std::ops::Add for PayrollTotals {
    type Output = PayrollTotals;

    fn add(self, rhs: PayrollTotals) -> PayrollTotals {
        PayrollTotals {
            gross: self.gross + rhs.gross,
            deductions: self.deductions + rhs.deductions,
            net: self.net + rhs.net,
        }
    }
}

/// 单个工资单的合计
pub fn run_totals(run: &PayrollRun) -> PayrollTotals {
    if run.lines.is_empty() {
        return PayrollTotals {
            gross: run.total_gross,
            deductions: run.total_deductions,
            net: run.total_net,
        };
    }
    run.lines.iter().fold(PayrollTotals::default(), |acc, line| {
        acc + PayrollTotals {
            gross: line.total_earnings,
            deductions: line.total_deductions,
            net: line.net_pay,
        }
    })
}

/// 多个工资单的合计
pub fn aggregate_totals<'a, I>(runs: I) -> PayrollTotals
where
    I: IntoIterator<Item = &'a PayrollRun>,
{
    runs.into_iter()
        .map(run_totals)
        .fold(PayrollTotals::default(), |acc, t| acc + t)
}
