// ==========================================
// 渔场管理系统 - 分类选项
// ==========================================
// 职责: 将自引用分类（费用类型/收入类型/鱼种/会计科目）整理为带缩进的选项
// ==========================================

use crate::api::{ApiResult, FarmApiClient};
use crate::domain::taxonomy::TreeNode;
use crate::engine::taxonomy::Taxonomy;
use serde::Serialize;

/// 下拉选项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyOption {
    pub id: i64,
    pub label: String,
    pub depth: usize,
}

pub struct CatalogService {
    client: FarmApiClient,
}

impl CatalogService {
    pub fn new(client: FarmApiClient) -> Self {
        Self { client }
    }

    pub async fn expense_type_options(&self) -> ApiResult<Vec<TaxonomyOption>> {
        Ok(options(&self.client.expense_types().await?))
    }

    pub async fn income_type_options(&self) -> ApiResult<Vec<TaxonomyOption>> {
        Ok(options(&self.client.income_types().await?))
    }

    pub async fn species_options(&self) -> ApiResult<Vec<TaxonomyOption>> {
        Ok(options(&self.client.species().await?))
    }

    pub async fn account_options(&self) -> ApiResult<Vec<TaxonomyOption>> {
        let accounts: Vec<_> = self
            .client
            .accounts()
            .await?
            .into_iter()
            .filter(|a| a.active)
            .collect();
        Ok(options(&accounts))
    }
}

/// 深度优先展平为选项（按层级缩进）
pub fn options<T: TreeNode>(nodes: &[T]) -> Vec<TaxonomyOption> {
    Taxonomy::new(nodes)
        .flatten()
        .into_iter()
        .map(|flat| TaxonomyOption {
            id: flat.node.node_id(),
            label: format!("{}{}", "  ".repeat(flat.depth), flat.node.label()),
            depth: flat.depth,
        })
        .collect()
}
