// ==========================================
// 渔场管理系统 - 分类树实体
// ==========================================
// 费用类型 / 收入类型 / 鱼种 / 会计科目
// 均通过 parent 指针自引用
// ==========================================

use serde::{Deserialize, Serialize};

/// 自引用树节点
pub trait TreeNode {
    fn node_id(&self) -> i64;
    fn parent_id(&self) -> Option<i64>;
    fn label(&self) -> &str;
}

/// 费用类型
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseType {
    #[serde(default, alias = "expense_type_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
}

/// 收入类型
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeType {
    #[serde(default, alias = "income_type_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
}

/// 鱼种
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Species {
    #[serde(default, alias = "species_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
}

/// 会计科目
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, alias = "id")]
    pub account_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

macro_rules! impl_tree_node {
    ($ty:ty, $id:ident) => {
        impl TreeNode for $ty {
            fn node_id(&self) -> i64 {
                self.$id
            }

            fn parent_id(&self) -> Option<i64> {
                self.parent
            }

            fn label(&self) -> &str {
                &self.name
            }
        }
    };
}

impl_tree_node!(ExpenseType, id);
impl_tree_node!(IncomeType, id);
impl_tree_node!(Species, id);
impl_tree_node!(Account, account_id);
