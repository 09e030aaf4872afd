// ==========================================
// 渔场管理系统 - 账单工作流
// ==========================================
// 职责: 账单新建/编辑的提交流程
// 新建: 校验 → POST 账单头 → 逐行 POST
// 编辑: 校验 → PUT 账单头 → 删除全部旧行 → 逐行 POST
// 删除: DELETE 账单（行由后端级联删除）
// 行写入非事务性，中途失败会留下部分行
// ==========================================

use crate::api::{ApiError, ApiResult, FarmApiClient};
use crate::app::notify::Notifier;
use crate::domain::bill::{Bill, BillDraft, BillLineDraft};
use crate::domain::types::ItemCategory;
use crate::engine::BillLineCalculator;
use crate::i18n::{t, t_with_args};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct BillService {
    client: FarmApiClient,
    notifier: Arc<dyn Notifier>,
    calculator: BillLineCalculator,
}

impl BillService {
    pub fn new(client: FarmApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            calculator: BillLineCalculator::new(),
        }
    }

    pub fn calculator(&self) -> &BillLineCalculator {
        &self.calculator
    }

    /// 保存账单（新建或编辑）
    ///
    /// # 返回
    /// - Ok(Bill): 后端返回的账单头
    /// - Err: 校验失败/网络失败（已发出失败通知）
    #[instrument(skip(self, draft), fields(bill_id = ?draft.bill_id, lines = draft.lines.len()))]
    pub async fn save(&self, draft: &BillDraft) -> ApiResult<Bill> {
        if let Err(e) = self.calculator.validate(draft) {
            let message = e.localized();
            self.notifier.error(&message);
            return Err(ApiError::Validation(message));
        }

        match self.persist(draft).await {
            Ok(bill) => {
                let key = if draft.bill_id.is_some() {
                    "bill.toast.updated"
                } else {
                    "bill.toast.created"
                };
                self.notifier.success(&t(key));
                info!(bill_id = bill.bill_id, "账单已保存");
                Ok(bill)
            }
            Err(e) => {
                warn!(error = %e, "账单保存失败");
                if e.is_duplicate() {
                    self.notifier.error(&t_with_args(
                        "bill.toast.duplicate",
                        &[("bill_no", draft.bill_no.as_str())],
                    ));
                } else {
                    self.notifier.error(&t("bill.toast.save_failed"));
                }
                Err(e)
            }
        }
    }

    async fn persist(&self, draft: &BillDraft) -> ApiResult<Bill> {
        let payload = self.calculator.bill_payload(draft);

        let bill = match draft.bill_id {
            Some(bill_id) => {
                let mut bill = self.client.update_bill(bill_id, &payload).await?;
                if bill.bill_id == 0 {
                    bill.bill_id = bill_id;
                }
                for old in self.client.bill_lines(bill_id).await? {
                    self.client.delete_bill_line(old.bill_line_id).await?;
                }
                bill
            }
            None => self.client.create_bill(&payload).await?,
        };

        for line in &draft.lines {
            let line_payload = self.calculator.line_payload(bill.bill_id, line);
            self.client.create_bill_line(&line_payload).await?;
        }
        Ok(bill)
    }

    /// 载入已有账单为编辑草稿
    ///
    /// 物料类别优先取行内嵌物料，其次查物料表
    pub async fn load_draft(&self, bill_id: i64) -> ApiResult<BillDraft> {
        let (bill, lines, items) = futures::try_join!(
            self.client.bill(bill_id),
            self.client.bill_lines(bill_id),
            self.client.items()
        )?;
        let categories: HashMap<i64, ItemCategory> = items
            .iter()
            .map(|i| (i.item_id, i.category_kind()))
            .collect();

        let lines = lines
            .iter()
            .map(|line| {
                let category = line
                    .category()
                    .or_else(|| {
                        line.item
                            .as_ref()
                            .and_then(|r| r.id())
                            .and_then(|id| categories.get(&id).copied())
                    });
                BillLineDraft::from_record(line, category)
            })
            .collect();

        Ok(BillDraft {
            bill_id: Some(bill_id),
            vendor: bill.vendor,
            bill_no: bill.bill_no,
            bill_date: bill.bill_date,
            due_date: bill.due_date,
            status: bill.status,
            memo: bill.memo.unwrap_or_default(),
            terms: bill.terms,
            lines,
        })
    }

    /// 删除账单
    pub async fn delete(&self, bill_id: i64) -> ApiResult<()> {
        match self.client.delete_bill(bill_id).await {
            Ok(()) => {
                self.notifier.success(&t("bill.toast.deleted"));
                info!(bill_id, "账单已删除");
                Ok(())
            }
            Err(e) => {
                warn!(bill_id, error = %e, "账单删除失败");
                self.notifier.error(&t("bill.toast.delete_failed"));
                Err(e)
            }
        }
    }

    /// 下一个可用账单号
    pub async fn next_bill_number(&self) -> ApiResult<String> {
        self.client.next_bill_number().await.map_err(|e| {
            warn!(error = %e, "获取账单号失败");
            self.notifier.error(&t("bill.toast.next_number_failed"));
            e
        })
    }
}
