// ==========================================
// 渔场管理系统 - 发票工作流
// ==========================================
// 职责: 发票新建/编辑/删除
// 保存: 补齐鱼类行 → 校验 → 非鱼类行库存检查 → 写发票头 → 重建发票行
// 编辑时先删除全部旧行；行写入非事务性
// ==========================================

use crate::api::{ApiError, ApiResult, FarmApiClient};
use crate::app::notify::Notifier;
use crate::domain::invoice::{Invoice, InvoiceDraft, InvoiceLineDraft};
use crate::domain::types::ItemCategory;
use crate::engine::stock::check_availability;
use crate::engine::InvoiceCalculator;
use crate::i18n::{t, t_with_args};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct InvoiceService {
    client: FarmApiClient,
    notifier: Arc<dyn Notifier>,
    calculator: InvoiceCalculator,
}

impl InvoiceService {
    pub fn new(client: FarmApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            calculator: InvoiceCalculator::new(),
        }
    }

    pub fn calculator(&self) -> &InvoiceCalculator {
        &self.calculator
    }

    /// 保存发票（新建或编辑）
    ///
    /// # 返回
    /// - Ok(Invoice): 后端返回的发票头
    /// - Err: 校验失败/库存不足/网络失败（已发出失败通知）
    #[instrument(skip(self, draft), fields(invoice_id = ?draft.invoice_id, lines = draft.lines.len()))]
    pub async fn save(&self, draft: &InvoiceDraft) -> ApiResult<Invoice> {
        let mut draft = self.calculator.complete(draft);
        if draft.invoice_no.trim().is_empty() {
            draft.invoice_no = format!("INV-{}", Utc::now().timestamp_millis());
        }

        if let Err(e) = self.calculator.validate(&draft) {
            let message = e.localized();
            self.notifier.error(&message);
            return Err(ApiError::Validation(message));
        }

        if let Err(e) = self.check_stock(&draft).await {
            if let ApiError::Validation(message) = &e {
                self.notifier.error(message);
            } else {
                self.notifier.error(&t("invoice.toast.save_failed"));
            }
            return Err(e);
        }

        match self.persist(&draft).await {
            Ok(invoice) => {
                let key = if draft.invoice_id.is_some() {
                    "invoice.toast.updated"
                } else {
                    "invoice.toast.created"
                };
                self.notifier.success(&t(key));
                info!(invoice_id = invoice.invoice_id, "发票已保存");
                Ok(invoice)
            }
            Err(e) => {
                warn!(error = %e, "发票保存失败");
                if e.is_duplicate() {
                    self.notifier.error(&t_with_args(
                        "invoice.toast.duplicate",
                        &[("invoice_no", draft.invoice_no.as_str())],
                    ));
                } else {
                    self.notifier.error(&t("invoice.toast.save_failed"));
                }
                Err(e)
            }
        }
    }

    /// 非鱼类行的库存检查，首个不足的行返回 Validation 错误
    async fn check_stock(&self, draft: &InvoiceDraft) -> ApiResult<()> {
        let stocked: Vec<&InvoiceLineDraft> = draft
            .lines
            .iter()
            .filter(|l| !l.is_fish() && l.qty.is_positive())
            .collect();
        if stocked.is_empty() {
            return Ok(());
        }

        let items = self.client.items().await?;
        for line in stocked {
            let item = items.iter().find(|i| Some(i.item_id) == line.item);
            let check = check_availability(
                item,
                line.qty.or_zero(),
                line.unit,
                line.packet_size.or_zero(),
            );
            if !check.available {
                return Err(ApiError::Validation(check.message));
            }
        }
        Ok(())
    }

    async fn persist(&self, draft: &InvoiceDraft) -> ApiResult<Invoice> {
        let payload = self.calculator.invoice_payload(draft);

        let invoice = match draft.invoice_id {
            Some(invoice_id) => {
                let mut invoice = self.client.update_invoice(invoice_id, &payload).await?;
                if invoice.invoice_id == 0 {
                    invoice.invoice_id = invoice_id;
                }
                for old in self.client.invoice_lines(invoice_id).await? {
                    self.client.delete_invoice_line(old.invoice_line_id).await?;
                }
                invoice
            }
            None => self.client.create_invoice(&payload).await?,
        };

        for line in &draft.lines {
            let line_payload = self.calculator.line_payload(invoice.invoice_id, line);
            self.client.create_invoice_line(&line_payload).await?;
        }
        Ok(invoice)
    }

    /// 载入已有发票为编辑草稿
    ///
    /// 发票自带行时直接使用，否则单独查询行
    pub async fn load_draft(&self, invoice_id: i64) -> ApiResult<InvoiceDraft> {
        let (invoice, items) =
            futures::try_join!(self.client.invoice(invoice_id), self.client.items())?;
        let lines = if invoice.lines.is_empty() {
            self.client.invoice_lines(invoice_id).await?
        } else {
            invoice.lines.clone()
        };

        let categories: HashMap<i64, ItemCategory> = items
            .iter()
            .map(|i| (i.item_id, i.category_kind()))
            .collect();
        let lines = lines
            .iter()
            .map(|line| {
                let category = line
                    .category_label()
                    .map(|c| ItemCategory::from_label(Some(c.as_str())))
                    .or_else(|| {
                        line.item
                            .as_ref()
                            .and_then(|r| r.id())
                            .and_then(|id| categories.get(&id).copied())
                    });
                InvoiceLineDraft::from_record(line, category)
            })
            .collect();

        Ok(InvoiceDraft {
            invoice_id: Some(invoice_id),
            customer: invoice.customer.as_ref().and_then(|c| c.id()),
            invoice_no: invoice.invoice_no,
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            status: invoice.status,
            memo: invoice.memo.unwrap_or_default(),
            lines,
        })
    }

    /// 删除发票
    pub async fn delete(&self, invoice_id: i64) -> ApiResult<()> {
        match self.client.delete_invoice(invoice_id).await {
            Ok(()) => {
                self.notifier.success(&t("invoice.toast.deleted"));
                Ok(())
            }
            Err(e) => {
                warn!(invoice_id, error = %e, "发票删除失败");
                self.notifier.error(&t("invoice.toast.delete_failed"));
                Err(e)
            }
        }
    }
}
