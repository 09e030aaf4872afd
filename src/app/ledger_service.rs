// ==========================================
// 渔场管理系统 - 员工台账工作流
// ==========================================

use crate::api::{ApiResult, FarmApiClient};
use crate::app::notify::Notifier;
use crate::engine::ledger::{EmployeeLedger, LedgerBuilder};
use crate::engine::payroll_totals::{aggregate_totals, PayrollTotals};
use crate::i18n::t;
use std::sync::Arc;
use tracing::warn;

pub struct LedgerService {
    client: FarmApiClient,
    notifier: Arc<dyn Notifier>,
    builder: LedgerBuilder,
}

impl LedgerService {
    pub fn new(client: FarmApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            builder: LedgerBuilder::new(),
        }
    }

    /// 员工台账（由全部工资单合成）
    pub async fn employee_ledger(&self, employee_id: i64) -> ApiResult<EmployeeLedger> {
        match self.client.payroll_runs().await {
            Ok(runs) => Ok(self.builder.build(employee_id, &runs)),
            Err(e) => {
                warn!(employee_id, error = %e, "台账加载失败");
                self.notifier.error(&t("ledger.toast.load_failed"));
                Err(e)
            }
        }
    }

    /// 全部工资单合计
    pub async fn payroll_totals(&self) -> ApiResult<PayrollTotals> {
        let runs = self.client.payroll_runs().await?;
        Ok(aggregate_totals(&runs))
    }
}
