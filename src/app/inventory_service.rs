// ==========================================
// 渔场管理系统 - 库存工作流
// ==========================================
// 职责: 开票前库存检查、池塘库存视图
// ==========================================

use crate::api::{ApiResult, FarmApiClient};
use crate::app::notify::Notifier;
use crate::domain::inventory::CustomerStock;
use crate::domain::types::{ItemCategory, StockStatus, Unit};
use crate::engine::stock::{check_availability, classify, fish_rollup, FishRollup, StockCheck};
use crate::i18n::t;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// 池塘库存行
#[derive(Debug, Clone, Serialize)]
pub struct PondStockRow {
    pub stock: CustomerStock,
    pub status: StockStatus,
    /// 仅鱼类物料
    pub fish: Option<FishRollup>,
}

pub struct InventoryService {
    client: FarmApiClient,
    notifier: Arc<dyn Notifier>,
}

impl InventoryService {
    pub fn new(client: FarmApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    /// 检查物料库存是否满足需求
    pub async fn check_stock(
        &self,
        item_id: i64,
        quantity: f64,
        unit: Unit,
        packet_size: f64,
    ) -> ApiResult<StockCheck> {
        let items = self.client.items().await?;
        let item = items.iter().find(|i| i.item_id == item_id);
        Ok(check_availability(item, quantity, unit, packet_size))
    }

    /// 池塘库存（后端状态缺失时按上下限分级）
    pub async fn pond_stock(&self, pond_id: i64) -> ApiResult<Vec<PondStockRow>> {
        let stocks = match self.client.customer_stocks(pond_id).await {
            Ok(s) => s,
            Err(e) => {
                warn!(pond_id, error = %e, "库存加载失败");
                self.notifier.error(&t("inventory.toast.load_failed"));
                return Err(e);
            }
        };

        Ok(stocks
            .into_iter()
            .map(|stock| {
                let status = stock.stock_status.unwrap_or_else(|| {
                    classify(
                        stock.current_stock,
                        stock.min_stock_level.or_zero(),
                        stock.max_stock_level.or_zero(),
                    )
                });
                let fish = (stock.category_kind() == ItemCategory::Fish).then(|| fish_rollup(&stock));
                PondStockRow {
                    stock,
                    status,
                    fish,
                }
            })
            .collect())
    }
}
