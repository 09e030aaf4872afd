// ==========================================
// 渔场管理系统 - 分类树
// ==========================================
// 职责: 将 parent 指针列表整理为
// - 深度优先展平列表（带层级，用于下拉选择）
// - 嵌套树（用于折叠展示）
// - 子孙节点列表
// 兄弟节点按名称排序；父节点缺失视为根；环在首次重访处断开
// ==========================================

use crate::domain::taxonomy::TreeNode;
use std::collections::{HashMap, HashSet};

/// 展平后的节点
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode<'a, T> {
    pub node: &'a T,
    pub depth: usize,
}

/// 嵌套树分支
#[derive(Debug, Clone, PartialEq)]
pub struct TreeBranch<'a, T> {
    pub node: &'a T,
    pub children: Vec<TreeBranch<'a, T>>,
}

/// 分类树索引
#[derive(Debug)]
pub struct Taxonomy<'a, T: TreeNode> {
    nodes: &'a [T],
    /// parent → 已排序的子节点下标
    children: HashMap<i64, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a, T: TreeNode> Taxonomy<'a, T> {
    pub fn new(nodes: &'a [T]) -> Self {
        let ids: HashSet<i64> = nodes.iter().map(|n| n.node_id()).collect();
        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();

        for (idx, node) in nodes.iter().enumerate() {
            match node.parent_id() {
                Some(p) if p != node.node_id() && ids.contains(&p) => {
                    children.entry(p).or_default().push(idx)
                }
                _ => roots.push(idx),
            }
        }

        let by_label = |a: &usize, b: &usize| nodes[*a].label().cmp(nodes[*b].label());
        roots.sort_by(by_label);
        for list in children.values_mut() {
            list.sort_by(by_label);
        }

        Self {
            nodes,
            children,
            roots,
        }
    }

    /// 深度优先展平
    pub fn flatten(&self) -> Vec<FlatNode<'a, T>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut visited = HashSet::new();
        for &root in &self.roots {
            self.walk(root, 0, &mut visited, &mut out);
        }
        // 环上的节点无法从根到达，按名称顺序补为根
        for idx in self.sorted_indices() {
            if !visited.contains(&idx) {
                self.walk(idx, 0, &mut visited, &mut out);
            }
        }
        out
    }

    fn walk(
        &self,
        idx: usize,
        depth: usize,
        visited: &mut HashSet<usize>,
        out: &mut Vec<FlatNode<'a, T>>,
    ) {
        if !visited.insert(idx) {
            return;
        }
        out.push(FlatNode {
            node: &self.nodes[idx],
            depth,
        });
        if let Some(kids) = self.children.get(&self.nodes[idx].node_id()) {
            for &kid in kids {
                self.walk(kid, depth + 1, visited, out);
            }
        }
    }

    /// 嵌套树
    pub fn tree(&self) -> Vec<TreeBranch<'a, T>> {
        let mut visited = HashSet::new();
        let mut out: Vec<TreeBranch<'a, T>> = self
            .roots
            .iter()
            .filter_map(|&root| self.branch(root, &mut visited))
            .collect();
        for idx in self.sorted_indices() {
            if let Some(b) = self.branch(idx, &mut visited) {
                out.push(b);
            }
        }
        out
    }

    fn branch(&self, idx: usize, visited: &mut HashSet<usize>) -> Option<TreeBranch<'a, T>> {
        if !visited.insert(idx) {
            return None;
        }
        let children = self
            .children
            .get(&self.nodes[idx].node_id())
            .map(|kids| {
                kids.iter()
                    .filter_map(|&kid| self.branch(kid, visited))
                    .collect()
            })
            .unwrap_or_default();
        Some(TreeBranch {
            node: &self.nodes[idx],
            children,
        })
    }

    /// 子孙节点 ID（不含自身，深度优先）
    pub fn descendants(&self, id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut stack: Vec<usize> = self
            .children
            .get(&id)
            .map(|kids| kids.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(idx) = stack.pop() {
            let node_id = self.nodes[idx].node_id();
            if !seen.insert(node_id) {
                continue;
            }
            out.push(node_id);
            if let Some(kids) = self.children.get(&node_id) {
                stack.extend(kids.iter().rev().copied());
            }
        }
        out
    }

    fn sorted_indices(&self) -> Vec<usize> {
        let mut all: Vec<usize> = (0..self.nodes.len()).collect();
        all.sort_by(|a, b| self.nodes[*a].label().cmp(self.nodes[*b].label()));
        all
    }
}
