// ==========================================
// 渔场管理系统 - 员工与工资单
// ==========================================
// 工资单字段别名: run_date → pay_date,
// pay_period_start/end → period_start/end
// ==========================================

use crate::domain::dates;
use crate::domain::numeric::lenient;
use crate::domain::types::PayrollStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 员工状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    Terminated,
    #[serde(other)]
    Unknown,
}

/// 员工
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, alias = "id")]
    pub employee_id: i64,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "dates::opt_date")]
    pub hire_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub salary: f64,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// 工资单行（每名员工一行）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollLine {
    #[serde(default, alias = "id")]
    pub payroll_line_id: i64,
    #[serde(default)]
    pub employee: i64,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub full_salary: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub overtime_hours: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub overtime_pay: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub harvest_incentive: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub festival_bonus: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub performance_bonus: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub absent_days: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub absent_deduction: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub loan_advance: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pf_employee: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub tax_paye: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pf_employer: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub gratuity: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub insurance_welfare: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_earnings: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_deductions: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub net_pay: f64,
}

/// 工资单
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollRun {
    #[serde(default, alias = "id")]
    pub payroll_run_id: i64,
    #[serde(default, alias = "run_date", deserialize_with = "dates::opt_date")]
    pub pay_date: Option<NaiveDate>,
    #[serde(default, alias = "pay_period_start", deserialize_with = "dates::opt_date")]
    pub period_start: Option<NaiveDate>,
    #[serde(default, alias = "pay_period_end", deserialize_with = "dates::opt_date")]
    pub period_end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_gross: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_deductions: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_net: f64,
    #[serde(default)]
    pub status: PayrollStatus,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub lines: Vec<PayrollLine>,
}

impl PayrollRun {
    /// 指定员工在本期的工资行（取第一条）
    pub fn line_for(&self, employee_id: i64) -> Option<&PayrollLine> {
        self.lines.iter().find(|l| l.employee == employee_id)
    }
}
