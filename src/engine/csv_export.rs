// ==========================================
// 渔场管理系统 - 损益报表 CSV 导出
// ==========================================
// 职责: 将 FarmReport 渲染为 CSV 文本并写入文件
// 版式:
// - 表头 5 行（标题/报表类型/池塘/日期区间/生成时间）+ 空行
// - Summary 模式: 财务/饲料/分类/往来/生产 各节
// - Detail 模式: 账单/发票/收获/投苗/饲料/工资 明细各节
// 金额保留两位小数，日期 YYYY-MM-DD
// 明细中的文本列（往来单位/类别/描述/鱼种/单号/状态/备注）始终加引号，
// 数值与日期列仅在必要时加引号
// ==========================================

use crate::engine::payroll_totals::run_totals;
use crate::engine::report::{CategoryTotal, ExportMode, FarmReport};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

/// 导出错误
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV内容编码错误: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// 导出结果
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: usize,
}

// ==========================================
// CsvReportExporter
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportExporter;

impl CsvReportExporter {
    pub fn new() -> Self {
        Self
    }

    /// 报表中显示的池塘名称
    pub fn pond_label(&self, report: &FarmReport) -> String {
        match (&report.pond_name, report.filter.pond) {
            (Some(name), _) => name.clone(),
            (None, Some(_)) => "Unknown Pond".to_string(),
            (None, None) => "All Ponds".to_string(),
        }
    }

    /// 导出文件名（已清理非法字符）
    pub fn file_name(&self, report: &FarmReport) -> String {
        let pond = self
            .pond_label(report)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        let raw = format!(
            "P&L_Report_{}_{}_to_{}_{}.csv",
            pond,
            fmt_date(Some(report.filter.start)),
            fmt_date(Some(report.filter.end)),
            report.filter.report_type.export_mode()
        );
        sanitize_file_name(&raw)
    }

    /// 渲染 CSV 文本
    ///
    /// # 参数
    /// - report: 已聚合的报表
    /// - generated_at: 生成时间文本（由调用方注入）
    pub fn render(&self, report: &FarmReport, generated_at: &str) -> Result<String, ExportError> {
        let mode = report.filter.report_type.export_mode();
        let mut out = String::new();

        out.push_str("Profit & Loss Report\n");
        out.push_str(&format!("Report Type: {}\n", mode));
        out.push_str(&format!("Pond: {}\n", self.pond_label(report)));
        out.push_str(&format!(
            "Date Range: {} to {}\n",
            fmt_date(Some(report.filter.start)),
            fmt_date(Some(report.filter.end))
        ));
        out.push_str(&format!("Generated: {}\n\n", generated_at));

        match mode {
            ExportMode::Summary => self.render_summary(report, &mut out)?,
            ExportMode::Detail => self.render_detail(report, &mut out)?,
        }
        Ok(out)
    }

    /// 渲染并写入目录，返回写入结果
    #[instrument(skip(self, report, generated_at), fields(dir = %dir.as_ref().display()))]
    pub fn export_to_dir<P: AsRef<Path>>(
        &self,
        report: &FarmReport,
        dir: P,
        generated_at: &str,
    ) -> Result<ExportedReport, ExportError> {
        let content = self.render(report, generated_at)?;
        let file_name = self.file_name(report);
        let path = dir.as_ref().join(&file_name);
        std::fs::write(&path, content.as_bytes())?;

        info!(file = %file_name, bytes = content.len(), "CSV报表已导出");
        Ok(ExportedReport {
            file_name,
            path,
            bytes: content.len(),
        })
    }

    // ==========================================
    // Summary 模式
    // ==========================================

    fn render_summary(&self, report: &FarmReport, out: &mut String) -> Result<(), ExportError> {
        let acc = &report.accounting;
        let production = &report.production;
        out.push_str("SUMMARY REPORT\n\n");

        section(
            out,
            "FINANCIAL SUMMARY",
            &["Metric", "Value"],
            vec![
                metric("Total Revenue", money(report.total_revenue())),
                metric("Total Expenses", money(report.total_expenses())),
                metric("Net Profit/Loss", money(report.net_profit())),
                metric("Profit Margin", format!("{:.1}%", report.profit_margin())),
                metric("Accounts Payable", money(acc.accounts_payable)),
                metric("Accounts Receivable", money(acc.accounts_receivable)),
                metric("Net Cash Flow", money(report.net_cash_flow())),
                metric("Total Payroll", money(acc.total_payroll)),
            ],
        )?;

        section(
            out,
            "FEED CONSUMPTION SUMMARY",
            &["Metric", "Value"],
            vec![
                metric("Feed Conversion Ratio", format!("{:.4}", production.fcr)),
                metric("Total Feed Cost", money(report.expenses.feed_cost)),
                metric("Average Feed Cost per KG", money(production.avg_feed_cost_per_kg)),
                metric(
                    "Daily Feed Consumption",
                    format!("{:.1} kg", production.daily_feed_consumption),
                ),
                metric(
                    "Average Feeding Rate",
                    format!("{:.1}%", production.avg_feeding_rate),
                ),
            ],
        )?;

        section(
            out,
            "EXPENSES BY TYPE",
            &["Type", "Amount", "Transaction Count"],
            category_rows(&report.expenses_by_type),
        )?;
        section(
            out,
            "INCOME BY TYPE",
            &["Type", "Amount", "Transaction Count"],
            category_rows(&report.incomes_by_type),
        )?;

        section(
            out,
            "ACCOUNTING SUMMARY",
            &["Metric", "Value"],
            vec![
                metric("Total Bills", money(acc.total_bills)),
                metric("Total Invoices", money(acc.total_invoices)),
                metric("Bill Payments", money(acc.total_bill_payments)),
                metric("Customer Payments", money(acc.total_customer_payments)),
                metric("Deposits", money(acc.total_deposits)),
                metric("Accounts Payable", money(acc.accounts_payable)),
                metric("Accounts Receivable", money(acc.accounts_receivable)),
                metric("Net Cash Flow", money(report.net_cash_flow())),
                metric("Total Payroll", money(acc.total_payroll)),
            ],
        )?;

        out.push_str("PRODUCTION METRICS\n");
        out.push_str(&table(
            &["Metric", "Value"],
            vec![
                metric(
                    "Total Stocked",
                    format!("{} fish", number(production.total_stocked)),
                ),
                metric(
                    "Total Harvested",
                    format!("{:.1} kg", production.total_harvested_kg),
                ),
                metric(
                    "Total Feed Used",
                    format!("{:.1} kg", production.total_feed_used_kg),
                ),
                metric("Feed Conversion Ratio", format!("{:.4}", production.fcr)),
            ],
        )?);
        Ok(())
    }

    // ==========================================
    // Detail 模式
    // ==========================================

    fn render_detail(&self, report: &FarmReport, out: &mut String) -> Result<(), ExportError> {
        out.push_str("DETAILED REPORT\n\n");

        let bill_lines = || {
            report
                .bills
                .iter()
                .flat_map(|b| b.lines.iter().map(move |l| (b, l)))
        };
        let invoice_lines = || {
            report
                .invoices
                .iter()
                .flat_map(|i| i.lines.iter().map(move |l| (i, l)))
        };

        section(
            out,
            "DETAILED EXPENSES (FROM BILLS)",
            &["Date", "Vendor", "Item Category", "Description", "Quantity", "Amount"],
            bill_lines()
                .map(|(bill, line)| {
                    vec![
                        plain(fmt_date(bill.bill_date)),
                        text(or_unknown(bill.vendor_name.clone())),
                        text(
                            line.category_label()
                                .unwrap_or_else(|| "Direct Expense".to_string()),
                        ),
                        text(
                            line.item_label()
                                .or_else(|| line.description.clone().filter(|d| !d.is_empty()))
                                .unwrap_or_else(|| "No description".to_string()),
                        ),
                        plain(number(line.qty.or_zero())),
                        plain(money(line.effective_amount())),
                    ]
                })
                .collect(),
        )?;

        section(
            out,
            "DETAILED INCOME (FROM INVOICES)",
            &["Date", "Customer", "Item Category", "Description", "Quantity", "Amount"],
            invoice_lines()
                .map(|(invoice, line)| {
                    vec![
                        plain(fmt_date(invoice.invoice_date)),
                        text(or_unknown(invoice.customer_label())),
                        text(line.category_label().unwrap_or_else(|| "Service".to_string())),
                        text(
                            line.item_label()
                                .or_else(|| line.description.clone().filter(|d| !d.is_empty()))
                                .unwrap_or_else(|| "No description".to_string()),
                        ),
                        plain(number(line.qty.or_zero())),
                        plain(money(line.amount.or_zero())),
                    ]
                })
                .collect(),
        )?;

        section(
            out,
            "HARVEST DETAILS (FROM INVOICES)",
            &[
                "Date",
                "Customer",
                "Species",
                "Weight (kg)",
                "Count",
                "Price per kg",
                "Total Revenue",
            ],
            invoice_lines()
                .filter(|(_, line)| line.is_fish())
                .map(|(invoice, line)| {
                    let weight = line.sold_weight();
                    let amount = line.amount.or_zero();
                    let price = if weight > 0.0 { amount / weight } else { 0.0 };
                    vec![
                        plain(fmt_date(invoice.invoice_date)),
                        text(or_unknown(invoice.customer_label())),
                        text(or_unknown(line.species_label())),
                        plain(format!("{:.1}", weight)),
                        plain(number(line.fish_count.or_zero())),
                        plain(money(price)),
                        plain(money(amount)),
                    ]
                })
                .collect(),
        )?;

        section(
            out,
            "STOCKING DETAILS (FROM BILLS)",
            &["Date", "Vendor", "Species", "Pieces", "Weight (kg)", "Total Cost"],
            bill_lines()
                .filter(|(_, line)| line.is_fish())
                .map(|(bill, line)| {
                    let pieces = line
                        .fish_count
                        .value()
                        .filter(|v| *v != 0.0)
                        .unwrap_or_else(|| line.qty.or_zero());
                    vec![
                        plain(fmt_date(bill.bill_date)),
                        text(or_unknown(bill.vendor_name.clone())),
                        text(or_unknown(line.species_label())),
                        plain(number(pieces)),
                        plain(format!("{:.1}", line.total_weight.or_zero())),
                        plain(money(line.effective_amount())),
                    ]
                })
                .collect(),
        )?;

        section(
            out,
            "FEED DETAILS (FROM BILLS)",
            &[
                "Date",
                "Vendor",
                "Feed Type",
                "Quantity",
                "Unit",
                "Cost per Unit",
                "Total Cost",
            ],
            bill_lines()
                .filter(|(_, line)| line.category() == Some(crate::domain::ItemCategory::Feed))
                .map(|(bill, line)| {
                    vec![
                        plain(fmt_date(bill.bill_date)),
                        text(or_unknown(bill.vendor_name.clone())),
                        text(or_unknown(line.item_label())),
                        plain(number(line.qty.or_zero())),
                        plain(
                            line.unit
                                .clone()
                                .filter(|u| !u.is_empty())
                                .unwrap_or_else(|| "kg".to_string()),
                        ),
                        plain(money(line.cost.or_zero())),
                        plain(money(line.effective_amount())),
                    ]
                })
                .collect(),
        )?;

        section(
            out,
            "DETAILED BILLS",
            &[
                "Date",
                "Vendor",
                "Bill Number",
                "Total Amount",
                "Paid Amount",
                "Balance Due",
                "Status",
                "Memo",
            ],
            report
                .bills
                .iter()
                .map(|bill| {
                    vec![
                        plain(fmt_date(bill.bill_date)),
                        text(or_unknown(bill.vendor_name.clone())),
                        text(bill.bill_no.clone()),
                        plain(money(bill.total_amount)),
                        plain(money(bill.paid_amount)),
                        plain(money(bill.balance())),
                        text(bill.status.to_string()),
                        text(memo(&bill.memo)),
                    ]
                })
                .collect(),
        )?;

        section(
            out,
            "DETAILED INVOICES",
            &[
                "Date",
                "Customer",
                "Invoice Number",
                "Total Amount",
                "Paid Amount",
                "Balance Due",
                "Status",
                "Memo",
            ],
            report
                .invoices
                .iter()
                .map(|invoice| {
                    vec![
                        plain(fmt_date(invoice.invoice_date)),
                        text(or_unknown(invoice.customer_label())),
                        text(invoice.invoice_no.clone()),
                        plain(money(invoice.total_amount)),
                        plain(money(invoice.paid_amount)),
                        plain(money(invoice.balance())),
                        text(invoice.status.to_string()),
                        text(memo(&invoice.memo)),
                    ]
                })
                .collect(),
        )?;

        out.push_str("PAYROLL DETAILS\n");
        out.push_str(&table(
            &[
                "Date",
                "Period Start",
                "Period End",
                "Total Gross",
                "Total Deductions",
                "Total Net",
                "Status",
            ],
            report
                .payroll_runs
                .iter()
                .map(|run| {
                    let totals = run_totals(run);
                    vec![
                        plain(fmt_date(run.pay_date)),
                        plain(fmt_date(run.period_start)),
                        plain(fmt_date(run.period_end)),
                        plain(money(totals.gross)),
                        plain(money(totals.deductions)),
                        plain(money(totals.net)),
                        text(run.status.to_string()),
                    ]
                })
                .collect(),
        )?);
        Ok(())
    }
}

// ==========================================
// 渲染辅助
// ==========================================

/// 单元格
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    /// 文本列，始终加引号
    Text(String),
    /// 数值/日期列，必要时加引号
    Plain(String),
}

impl Cell {
    fn quote_style(&self) -> csv::QuoteStyle {
        match self {
            Cell::Text(_) => csv::QuoteStyle::Always,
            Cell::Plain(_) => csv::QuoteStyle::Necessary,
        }
    }

    fn value(&self) -> &str {
        match self {
            Cell::Text(v) | Cell::Plain(v) => v,
        }
    }

    /// 按本列的引号规则编码
    fn encode(&self) -> Result<String, ExportError> {
        // 单个空字段的记录会被 csv 写成 ""，空数值列保持留空
        if let Cell::Plain(v) = self {
            if v.is_empty() {
                return Ok(String::new());
            }
        }
        let mut line = write_records(self.quote_style(), &[vec![self.value()]])?;
        line.pop();
        Ok(line)
    }
}

fn text(v: String) -> Cell {
    Cell::Text(v)
}

fn plain(v: String) -> Cell {
    Cell::Plain(v)
}

fn write_records(style: csv::QuoteStyle, records: &[Vec<&str>]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(style)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        wtr.write_record(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// 渲染一张表（表头 + 数据行）
fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> Result<String, ExportError> {
    let mut out = write_records(csv::QuoteStyle::Necessary, &[headers.to_vec()])?;
    for row in &rows {
        let cells = row.iter().map(Cell::encode).collect::<Result<Vec<_>, _>>()?;
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    Ok(out)
}

/// 标题 + 表 + 空行
fn section(
    out: &mut String,
    title: &str,
    headers: &[&str],
    rows: Vec<Vec<Cell>>,
) -> Result<(), ExportError> {
    out.push_str(title);
    out.push('\n');
    out.push_str(&table(headers, rows)?);
    out.push('\n');
    Ok(())
}

fn metric(name: &str, value: String) -> Vec<Cell> {
    vec![Cell::Plain(name.to_string()), Cell::Plain(value)]
}

fn category_rows(groups: &[CategoryTotal]) -> Vec<Vec<Cell>> {
    groups
        .iter()
        .map(|g| {
            vec![
                Cell::Text(g.category.clone()),
                Cell::Plain(money(g.amount)),
                Cell::Plain(g.count.to_string()),
            ]
        })
        .collect()
}

fn money(v: f64) -> String {
    format!("{:.2}", v)
}

/// 整数不带小数位，其余按原值输出
fn number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn or_unknown(v: Option<String>) -> String {
    v.filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn memo(v: &Option<String>) -> String {
    v.clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "No memo".to_string())
}

/// 文件名清理: `<>:"/\|?*` 与控制字符替换为 `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
