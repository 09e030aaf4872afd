// ==========================================
// 渔场管理系统 - 报表聚合引擎
// ==========================================
// 职责: 对账单/发票/收付款/存款/工资单做纯归约
// 输入: ReportData + ReportFilter（日期闭区间 + 可选池塘）
// 输出: FarmReport（收入/费用/损益/现金流/往来/生产指标/分类汇总）
// ==========================================
// 记录过滤:
// - 日期缺失的记录不参与
// - 指定池塘时，没有池塘引用的记录不参与
// 口径:
// - 总收入 = 鱼类销售额（不重复计入发票合计）
// - 净利润 = 损益表净利润
// - 净现金流 = 现金流量表净额
// - 金额/重量合计求和后保留两位小数（与记录顺序无关）
// ==========================================

use crate::domain::bill::Bill;
use crate::domain::farm::Pond;
use crate::domain::invoice::Invoice;
use crate::domain::numeric::round2;
use crate::domain::payment::{BillPayment, CashRecord, CustomerPayment, Deposit};
use crate::domain::payroll::PayrollRun;
use crate::domain::types::ItemCategory;
use crate::engine::payroll_totals::run_totals;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

/// 1 英亩 = 100 分地（decimal）
const DECIMALS_PER_ACRE: f64 = 100.0;

// ==========================================
// 报表类型与过滤条件
// ==========================================

/// 报表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Summary,
    Detail,
    Revenue,
    Expense,
    Pnl,
    Cashflow,
    Balancesheet,
    Harvest,
    Comparative,
}

/// 导出模式（除 Summary 外均按明细导出）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    Summary,
    Detail,
}

impl ReportType {
    pub fn export_mode(&self) -> ExportMode {
        match self {
            ReportType::Summary => ExportMode::Summary,
            _ => ExportMode::Detail,
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportMode::Summary => write!(f, "Summary"),
            ExportMode::Detail => write!(f, "Detail"),
        }
    }
}

/// 报表过滤条件
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// None = 全部池塘
    pub pond: Option<i64>,
    pub report_type: ReportType,
}

impl ReportFilter {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            pond: None,
            report_type: ReportType::Summary,
        }
    }

    pub fn with_pond(mut self, pond: Option<i64>) -> Self {
        self.pond = pond;
        self
    }

    pub fn with_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    /// 日期闭区间判定（缺失日期不匹配）
    pub fn date_matches(&self, date: Option<NaiveDate>) -> bool {
        matches!(date, Some(d) if d >= self.start && d <= self.end)
    }

    /// 池塘判定（未指定池塘时全部匹配）
    pub fn pond_matches<I: IntoIterator<Item = i64>>(&self, ponds: I) -> bool {
        match self.pond {
            None => true,
            Some(target) => ponds.into_iter().any(|p| p == target),
        }
    }
}

/// 报表输入数据
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub bills: Vec<Bill>,
    pub invoices: Vec<Invoice>,
    pub bill_payments: Vec<BillPayment>,
    pub customer_payments: Vec<CustomerPayment>,
    pub deposits: Vec<Deposit>,
    pub payroll_runs: Vec<PayrollRun>,
    pub ponds: Vec<Pond>,
}

// ==========================================
// 报表结果
// ==========================================

/// 分组销售（按鱼种/按客户）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesBreakdown {
    pub name: String,
    pub weight: f64,
    pub value: f64,
    pub count: f64,
}

/// 收入（鱼类销售）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub fish_invoice_count: usize,
    pub total_fish_weight: f64,
    pub total_fish_value: f64,
    pub total_fish_count: f64,
    pub average_price_per_kg: f64,
    pub by_species: Vec<SalesBreakdown>,
    pub by_customer: Vec<SalesBreakdown>,
}

/// 费用
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub feed_cost: f64,
    pub feed_quantity: f64,
    pub medicine_cost: f64,
    pub labor_cost: f64,
    pub other_expenses: f64,
    pub total_expenses: f64,
}

/// 损益
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfitAndLoss {
    pub revenue: f64,
    pub direct_costs: f64,
    pub gross_profit: f64,
    pub other_expenses: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub pond_area_decimal: f64,
    pub profit_per_decimal: f64,
    pub profit_per_acre: f64,
}

/// 现金流
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CashFlow {
    pub fish_sales_inflow: f64,
    pub customer_payments_inflow: f64,
    pub deposits_inflow: f64,
    pub total_inflow: f64,
    pub bill_payments_outflow: f64,
    pub payroll_outflow: f64,
    pub other_outflow: f64,
    pub total_outflow: f64,
    pub net_cash_flow: f64,
}

/// 往来汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountingSummary {
    pub total_bills: f64,
    pub total_invoices: f64,
    pub total_bill_payments: f64,
    pub total_customer_payments: f64,
    pub total_deposits: f64,
    pub total_payroll: f64,
    pub accounts_payable: f64,
    pub accounts_receivable: f64,
}

/// 生产指标
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionMetrics {
    pub total_stocked: f64,
    pub total_harvested_kg: f64,
    pub total_feed_used_kg: f64,
    /// 饵料系数 = 投喂量 ÷ 收获量
    pub fcr: f64,
    pub avg_feed_cost_per_kg: f64,
    pub daily_feed_consumption: f64,
    pub avg_feeding_rate: f64,
}

/// 类别汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub count: usize,
}

/// 池塘经营状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PondStatus {
    Profitable,
    Loss,
}

impl fmt::Display for PondStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PondStatus::Profitable => write!(f, "Profitable"),
            PondStatus::Loss => write!(f, "Loss"),
        }
    }
}

/// 单池塘经营对比行
///
/// 收入 = 客户归属该池塘的鱼类发票合计；
/// 费用 = 任一行落在该池塘的账单合计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PondPerformance {
    pub pond_id: i64,
    pub name: String,
    pub area_decimal: f64,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
    pub profit_per_decimal: f64,
    pub status: PondStatus,
}

/// 报表
#[derive(Debug, Clone, Serialize)]
pub struct FarmReport {
    #[serde(skip)]
    pub filter: ReportFilter,
    pub pond_name: Option<String>,
    pub revenue: RevenueSummary,
    pub expenses: ExpenseSummary,
    pub pnl: ProfitAndLoss,
    pub cash_flow: CashFlow,
    pub accounting: AccountingSummary,
    pub production: ProductionMetrics,
    pub expenses_by_type: Vec<CategoryTotal>,
    pub incomes_by_type: Vec<CategoryTotal>,
    /// 各池塘对比（仅按日期过滤，不受池塘条件影响）
    pub pond_comparison: Vec<PondPerformance>,
    /// 明细导出用：过滤后的记录
    #[serde(skip)]
    pub bills: Vec<Bill>,
    #[serde(skip)]
    pub invoices: Vec<Invoice>,
    #[serde(skip)]
    pub payroll_runs: Vec<PayrollRun>,
}

impl FarmReport {
    /// 总收入（鱼类销售额）
    pub fn total_revenue(&self) -> f64 {
        self.revenue.total_fish_value
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.total_expenses
    }

    pub fn net_profit(&self) -> f64 {
        self.pnl.net_profit
    }

    pub fn profit_margin(&self) -> f64 {
        self.pnl.profit_margin
    }

    pub fn net_cash_flow(&self) -> f64 {
        self.cash_flow.net_cash_flow
    }
}

// ==========================================
// ReportAggregator - 报表聚合器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportAggregator;

impl ReportAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 生成报表
    #[instrument(skip(self, data), fields(
        start = %filter.start,
        end = %filter.end,
        pond = ?filter.pond,
        bills = data.bills.len(),
        invoices = data.invoices.len()
    ))]
    pub fn build(&self, data: &ReportData, filter: &ReportFilter) -> FarmReport {
        let bills: Vec<Bill> = data
            .bills
            .iter()
            .filter(|b| filter.date_matches(b.bill_date) && filter.pond_matches(b.ponds()))
            .cloned()
            .collect();
        let invoices: Vec<Invoice> = data
            .invoices
            .iter()
            .filter(|i| {
                filter.date_matches(i.invoice_date) && filter.pond_matches(i.customer_pond())
            })
            .cloned()
            .collect();
        let payroll_runs: Vec<PayrollRun> = data
            .payroll_runs
            .iter()
            .filter(|r| filter.date_matches(r.pay_date) && filter.pond_matches(None::<i64>))
            .cloned()
            .collect();
        let bill_payments = filter_cash(&data.bill_payments, filter);
        let customer_payments = filter_cash(&data.customer_payments, filter);
        let deposits = filter_cash(&data.deposits, filter);

        let revenue = self.revenue(&invoices);
        let expenses = self.expenses(&bills, &payroll_runs);
        let pond = filter
            .pond
            .and_then(|id| data.ponds.iter().find(|p| p.key() == Some(id)));
        let pnl = self.profit_and_loss(&revenue, &expenses, pond);
        let cash_flow = self.cash_flow(&revenue, &expenses, &bill_payments, &customer_payments, &deposits);
        let accounting = self.accounting(
            &bills,
            &invoices,
            &bill_payments,
            &customer_payments,
            &deposits,
            &payroll_runs,
        );
        let production = self.production(&bills, &revenue, &expenses, filter);
        let pond_comparison = self.pond_comparison(data, filter);
        let expenses_by_type = group_by_category(
            bills
                .iter()
                .flat_map(|b| b.lines.iter())
                .map(|l| (l.category_label(), l.effective_amount())),
        );
        let incomes_by_type = group_by_category(
            invoices
                .iter()
                .flat_map(|i| i.lines.iter())
                .map(|l| (l.category_label(), l.amount.or_zero())),
        );

        debug!(
            revenue = revenue.total_fish_value,
            expenses = expenses.total_expenses,
            net_profit = pnl.net_profit,
            "报表聚合完成"
        );

        FarmReport {
            filter: filter.clone(),
            pond_name: pond.map(|p| p.name.clone()),
            revenue,
            expenses,
            pnl,
            cash_flow,
            accounting,
            production,
            expenses_by_type,
            incomes_by_type,
            pond_comparison,
            bills,
            invoices,
            payroll_runs,
        }
    }

    // ==========================================
    // 分项计算
    // ==========================================

    /// 鱼类销售收入（仅含鱼类行的发票）
    pub fn revenue(&self, invoices: &[Invoice]) -> RevenueSummary {
        let mut summary = RevenueSummary::default();

        for invoice in invoices.iter().filter(|i| i.has_fish_line()) {
            summary.fish_invoice_count += 1;
            let customer = invoice.customer_label().unwrap_or_else(|| "Unknown".to_string());

            for line in invoice.lines.iter().filter(|l| l.is_fish()) {
                let weight = line.sold_weight();
                let value = line.amount.or_zero();
                let count = line.fish_count.or_zero();

                summary.total_fish_weight += weight;
                summary.total_fish_value += value;
                summary.total_fish_count += count;

                let species = line.species_label().unwrap_or_else(|| "Unknown".to_string());
                add_sale(&mut summary.by_species, species, weight, value, count);
                add_sale(&mut summary.by_customer, customer.clone(), weight, value, count);
            }
        }

        summary.total_fish_weight = round2(summary.total_fish_weight);
        summary.total_fish_value = round2(summary.total_fish_value);
        for group in summary.by_species.iter_mut().chain(summary.by_customer.iter_mut()) {
            group.weight = round2(group.weight);
            group.value = round2(group.value);
        }
        summary.average_price_per_kg = ratio(summary.total_fish_value, summary.total_fish_weight);
        summary
    }

    /// 费用（账单行 + 工资）
    pub fn expenses(&self, bills: &[Bill], payroll_runs: &[PayrollRun]) -> ExpenseSummary {
        let mut summary = ExpenseSummary::default();

        for line in bills.iter().flat_map(|b| b.lines.iter()) {
            if line.item.is_some() {
                let amount = line.effective_amount();
                match line.category() {
                    Some(ItemCategory::Feed) => {
                        summary.feed_cost += amount;
                        summary.feed_quantity += line.qty.or_zero();
                    }
                    Some(ItemCategory::Medicine) => summary.medicine_cost += amount,
                    _ => summary.other_expenses += amount,
                }
            } else {
                summary.other_expenses += line.amount.or_zero();
            }
        }

        summary.feed_cost = round2(summary.feed_cost);
        summary.feed_quantity = round2(summary.feed_quantity);
        summary.medicine_cost = round2(summary.medicine_cost);
        summary.other_expenses = round2(summary.other_expenses);
        summary.labor_cost = round2(payroll_runs.iter().map(|r| run_totals(r).net).sum());
        summary.total_expenses = round2(
            summary.feed_cost + summary.medicine_cost + summary.labor_cost + summary.other_expenses,
        );
        summary
    }

    /// 损益
    ///
    /// 直接成本 = 饲料 + 药品 + 人工；毛利 = 收入 − 直接成本；净利 = 毛利 − 其他费用
    pub fn profit_and_loss(
        &self,
        revenue: &RevenueSummary,
        expenses: &ExpenseSummary,
        pond: Option<&Pond>,
    ) -> ProfitAndLoss {
        let direct_costs = expenses.feed_cost + expenses.medicine_cost + expenses.labor_cost;
        let gross_profit = revenue.total_fish_value - direct_costs;
        let net_profit = gross_profit - expenses.other_expenses;
        let area = pond.map(|p| p.area_decimal).unwrap_or(0.0);
        let profit_per_decimal = ratio(net_profit, area);

        ProfitAndLoss {
            revenue: revenue.total_fish_value,
            direct_costs,
            gross_profit,
            other_expenses: expenses.other_expenses,
            net_profit,
            profit_margin: ratio(net_profit, revenue.total_fish_value) * 100.0,
            pond_area_decimal: area,
            profit_per_decimal,
            profit_per_acre: profit_per_decimal * DECIMALS_PER_ACRE,
        }
    }

    /// 现金流
    pub fn cash_flow(
        &self,
        revenue: &RevenueSummary,
        expenses: &ExpenseSummary,
        bill_payments: &[&BillPayment],
        customer_payments: &[&CustomerPayment],
        deposits: &[&Deposit],
    ) -> CashFlow {
        let fish_sales_inflow = revenue.total_fish_value;
        let customer_payments_inflow = sum_cash(customer_payments);
        let deposits_inflow = sum_cash(deposits);
        let total_inflow = fish_sales_inflow + customer_payments_inflow + deposits_inflow;

        let bill_payments_outflow = sum_cash(bill_payments);
        let payroll_outflow = expenses.labor_cost;
        let other_outflow = expenses.feed_cost + expenses.medicine_cost + expenses.other_expenses;
        let total_outflow = bill_payments_outflow + payroll_outflow + other_outflow;

        CashFlow {
            fish_sales_inflow,
            customer_payments_inflow,
            deposits_inflow,
            total_inflow,
            bill_payments_outflow,
            payroll_outflow,
            other_outflow,
            total_outflow,
            net_cash_flow: total_inflow - total_outflow,
        }
    }

    /// 往来汇总（应付 = Σ 账单余额，应收 = Σ 发票余额）
    pub fn accounting(
        &self,
        bills: &[Bill],
        invoices: &[Invoice],
        bill_payments: &[&BillPayment],
        customer_payments: &[&CustomerPayment],
        deposits: &[&Deposit],
        payroll_runs: &[PayrollRun],
    ) -> AccountingSummary {
        AccountingSummary {
            total_bills: round2(bills.iter().map(|b| b.total_amount).sum()),
            total_invoices: round2(invoices.iter().map(|i| i.total_amount).sum()),
            total_bill_payments: sum_cash(bill_payments),
            total_customer_payments: sum_cash(customer_payments),
            total_deposits: sum_cash(deposits),
            total_payroll: round2(payroll_runs.iter().map(|r| run_totals(r).net).sum()),
            accounts_payable: round2(bills.iter().map(Bill::balance).sum()),
            accounts_receivable: round2(invoices.iter().map(Invoice::balance).sum()),
        }
    }

    /// 生产指标
    pub fn production(
        &self,
        bills: &[Bill],
        revenue: &RevenueSummary,
        expenses: &ExpenseSummary,
        filter: &ReportFilter,
    ) -> ProductionMetrics {
        let days = ((filter.end - filter.start).num_days() + 1).max(1) as f64;

        let total_stocked = bills
            .iter()
            .flat_map(|b| b.lines.iter())
            .filter(|l| l.is_fish())
            .map(|l| {
                l.fish_count
                    .value()
                    .filter(|v| *v != 0.0)
                    .or_else(|| l.qty.value())
                    .unwrap_or(0.0)
            })
            .sum();

        ProductionMetrics {
            total_stocked,
            total_harvested_kg: revenue.total_fish_weight,
            total_feed_used_kg: expenses.feed_quantity,
            fcr: ratio(expenses.feed_quantity, revenue.total_fish_weight),
            avg_feed_cost_per_kg: ratio(expenses.feed_cost, expenses.feed_quantity),
            daily_feed_consumption: expenses.feed_quantity / days,
            // 需要投喂事件与存塘生物量，当前数据集不含，固定为 0
            avg_feeding_rate: 0.0,
        }
    }

    /// 各池塘经营对比（按 data.ponds 顺序）
    pub fn pond_comparison(&self, data: &ReportData, filter: &ReportFilter) -> Vec<PondPerformance> {
        data.ponds
            .iter()
            .filter_map(|pond| {
                let pond_id = pond.key()?;
                let revenue = round2(
                    data.invoices
                        .iter()
                        .filter(|i| filter.date_matches(i.invoice_date) && i.has_fish_line())
                        .filter(|i| i.customer_pond() == Some(pond_id))
                        .map(|i| i.total_amount)
                        .sum(),
                );
                let expenses = round2(
                    data.bills
                        .iter()
                        .filter(|b| filter.date_matches(b.bill_date))
                        .filter(|b| b.ponds().any(|p| p == pond_id))
                        .map(|b| b.total_amount)
                        .sum(),
                );
                let profit = round2(revenue - expenses);
                Some(PondPerformance {
                    pond_id,
                    name: pond.name.clone(),
                    area_decimal: pond.area_decimal,
                    revenue,
                    expenses,
                    profit,
                    profit_per_decimal: ratio(profit, pond.area_decimal),
                    status: if profit >= 0.0 {
                        PondStatus::Profitable
                    } else {
                        PondStatus::Loss
                    },
                })
            })
            .collect()
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 分母 ≤ 0 时返回 0
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn filter_cash<'a, T: CashRecord>(records: &'a [T], filter: &ReportFilter) -> Vec<&'a T> {
    records
        .iter()
        .filter(|r| filter.date_matches(r.record_date()) && filter.pond_matches(r.pond()))
        .collect()
}

fn sum_cash<T: CashRecord>(records: &[&T]) -> f64 {
    round2(records.iter().map(|r| r.amount()).sum())
}

fn add_sale(groups: &mut Vec<SalesBreakdown>, name: String, weight: f64, value: f64, count: f64) {
    match groups.iter_mut().find(|g| g.name == name) {
        Some(g) => {
            g.weight += weight;
            g.value += value;
            g.count += count;
        }
        None => groups.push(SalesBreakdown {
            name,
            weight,
            value,
            count,
        }),
    }
}

/// 按类别文本分组（无类别 → "Other"），保持首次出现顺序
fn group_by_category<I>(rows: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = (Option<String>, f64)>,
{
    let mut groups: Vec<CategoryTotal> = Vec::new();
    for (label, amount) in rows {
        let category = label.unwrap_or_else(|| "Other".to_string());
        match groups.iter_mut().find(|g| g.category == category) {
            Some(g) => {
                g.amount += amount;
                g.count += 1;
            }
            None => groups.push(CategoryTotal {
                category,
                amount,
                count: 1,
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_guards_zero() {
        assert_eq!(ratio(10.0, 0.0), 0.0);
        assert_eq!(ratio(10.0, 4.0), 2.5);
    }

    #[test]
    fn test_filter_inclusive_bounds() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let f = ReportFilter::new(start, end);
        assert!(f.date_matches(Some(start)));
        assert!(f.date_matches(Some(end)));
        assert!(!f.date_matches(NaiveDate::from_ymd_opt(2026, 2, 1)));
        assert!(!f.date_matches(None));
        assert!(f.pond_matches(None::<i64>));
        let f = f.with_pond(Some(3));
        assert!(!f.pond_matches(None::<i64>));
        assert!(f.pond_matches(vec![1, 3]));
    }

    #[test]
    fn test_export_mode() {
        assert_eq!(ReportType::Summary.export_mode(), ExportMode::Summary);
        assert_eq!(ReportType::Pnl.export_mode(), ExportMode::Detail);
        assert_eq!(ReportType::Harvest.export_mode().to_string(), "Detail");
    }

    #[test]
    fn test_group_by_category_order_and_other() {
        let groups = group_by_category(vec![
            (Some("feed".to_string()), 10.0),
            (None, 5.0),
            (Some("feed".to_string()), 2.5),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "feed");
        assert_eq!(groups[0].amount, 12.5);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].category, "Other");
    }
}
