// ==========================================
// 渔场管理系统 - 报表工作流
// ==========================================
// 职责: 并发加载报表数据 → 聚合 → 导出 CSV
// ==========================================

use crate::api::{ApiResult, FarmApiClient};
use crate::app::notify::Notifier;
use crate::engine::csv_export::{CsvReportExporter, ExportedReport};
use crate::engine::report::{FarmReport, ReportAggregator, ReportData, ReportFilter};
use crate::i18n::{t, t_with_args};
use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct ReportService {
    client: FarmApiClient,
    notifier: Arc<dyn Notifier>,
    aggregator: ReportAggregator,
    exporter: CsvReportExporter,
}

impl ReportService {
    pub fn new(client: FarmApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            aggregator: ReportAggregator::new(),
            exporter: CsvReportExporter::new(),
        }
    }

    /// 并发加载全部报表数据（任一失败即整体失败）
    #[instrument(skip(self))]
    pub async fn load(&self) -> ApiResult<ReportData> {
        let result = futures::try_join!(
            self.client.bills(),
            self.client.invoices(),
            self.client.bill_payments(),
            self.client.customer_payments(),
            self.client.deposits(),
            self.client.payroll_runs(),
            self.client.ponds(),
        );

        match result {
            Ok((bills, invoices, bill_payments, customer_payments, deposits, payroll_runs, ponds)) => {
                info!(
                    bills = bills.len(),
                    invoices = invoices.len(),
                    payroll_runs = payroll_runs.len(),
                    "报表数据已加载"
                );
                Ok(ReportData {
                    bills,
                    invoices,
                    bill_payments,
                    customer_payments,
                    deposits,
                    payroll_runs,
                    ponds,
                })
            }
            Err(e) => {
                warn!(error = %e, "报表数据加载失败");
                self.notifier.error(&t("report.toast.load_failed"));
                Err(e)
            }
        }
    }

    /// 加载并聚合
    pub async fn build(&self, filter: &ReportFilter) -> ApiResult<FarmReport> {
        let data = self.load().await?;
        Ok(self.aggregator.build(&data, filter))
    }

    /// 导出 CSV 到目录
    ///
    /// # 返回
    /// - Ok(ExportedReport): 文件名/路径/字节数（已发出成功通知）
    pub async fn export_csv<P: AsRef<Path>>(
        &self,
        filter: &ReportFilter,
        dir: P,
    ) -> ApiResult<ExportedReport> {
        let report = self.build(filter).await?;
        self.export_report(&report, dir)
    }

    /// 导出已聚合的报表
    pub fn export_report<P: AsRef<Path>>(
        &self,
        report: &FarmReport,
        dir: P,
    ) -> ApiResult<ExportedReport> {
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        match self.exporter.export_to_dir(report, dir, &generated_at) {
            Ok(exported) => {
                self.notifier.success(&t_with_args(
                    "report.toast.exported",
                    &[("file", exported.file_name.as_str())],
                ));
                Ok(exported)
            }
            Err(e) => {
                warn!(error = %e, "CSV导出失败");
                self.notifier.error(&t("report.toast.export_failed"));
                Err(e.into())
            }
        }
    }
}
