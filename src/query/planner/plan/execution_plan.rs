//! 执行计划结构定义
//!
//! 执行计划是以节点 ID 为索引的 arena：每个条目保存节点本身、
//! 依赖列表（数据来源，位于下方）与父节点列表（消费者，位于上方）。
//! 图结构只能通过这里的修改原语改变，两个方向的列表始终保持一致

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{as_object, get_array};
use crate::core::{CostEstimate, VariableId};
use crate::storage::Catalog;

use super::core::nodes::{NodeDecoder, NodeId, NodeKind, PlanNodeEnum};
use super::core::PlanContext;

#[derive(Debug, Clone, PartialEq)]
struct PlanEntry {
    node: PlanNodeEnum,
    dependencies: Vec<NodeId>,
    parents: Vec<NodeId>,
}

/// 执行计划
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionPlan {
    nodes: BTreeMap<NodeId, PlanEntry>,
    /// 汇点（通常为 ReturnNode）
    root: Option<NodeId>,
    excluded_from_scatter_gather: BTreeSet<NodeId>,
    applied_rules: Vec<String>,
}

impl ExecutionPlan {
    /// 创建空的执行计划
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 查询 ====================

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&PlanNodeEnum> {
        self.nodes.get(&id).map(|entry| &entry.node)
    }

    pub fn get_node(&self, id: NodeId) -> PlanResult<&PlanNodeEnum> {
        self.node(id).ok_or(PlanError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut PlanNodeEnum> {
        self.nodes.get_mut(&id).map(|entry| &mut entry.node)
    }

    /// 节点的依赖（数据来源），节点不存在时为空
    pub fn dependencies(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|entry| entry.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// 节点的父节点（消费者），节点不存在时为空
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|entry| entry.parents.as_slice())
            .unwrap_or(&[])
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) -> PlanResult<()> {
        self.entry(id)?;
        self.root = Some(id);
        Ok(())
    }

    /// 按 ID 顺序查找指定类型的节点
    pub fn find_nodes(&self, kind: NodeKind) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, entry)| entry.node.kind() == kind)
            .map(|(&id, _)| id)
            .collect()
    }

    /// 写入给定变量的节点
    pub fn variable_definition(&self, var_id: VariableId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, entry)| entry.node.sets_variable(var_id))
            .map(|(&id, _)| id)
    }

    pub fn applied_rules(&self) -> &[String] {
        &self.applied_rules
    }

    pub fn add_applied_rule(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.applied_rules.contains(&name) {
            self.applied_rules.push(name);
        }
    }

    /// 标记节点不参与通用的分片 scatter/gather 包装
    pub fn mark_excluded_from_scatter_gather(&mut self, id: NodeId) -> PlanResult<()> {
        self.entry(id)?;
        self.excluded_from_scatter_gather.insert(id);
        Ok(())
    }

    pub fn is_excluded_from_scatter_gather(&self, id: NodeId) -> bool {
        self.excluded_from_scatter_gather.contains(&id)
    }

    fn entry(&self, id: NodeId) -> PlanResult<&PlanEntry> {
        self.nodes.get(&id).ok_or(PlanError::NodeNotFound(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> PlanResult<&mut PlanEntry> {
        self.nodes.get_mut(&id).ok_or(PlanError::NodeNotFound(id))
    }

    // ==================== 构建与修改原语 ====================

    /// 注册一个尚未连接的节点
    pub fn register_node(&mut self, node: impl Into<PlanNodeEnum>) -> PlanResult<NodeId> {
        let node = node.into();
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(PlanError::DuplicateNode(id));
        }
        self.nodes.insert(
            id,
            PlanEntry {
                node,
                dependencies: Vec::new(),
                parents: Vec::new(),
            },
        );
        Ok(id)
    }

    /// 添加边：`dependency` 成为 `node` 的数据来源
    pub fn add_dependency(&mut self, node: NodeId, dependency: NodeId) -> PlanResult<()> {
        self.entry(dependency)?;
        self.entry_mut(node)?.dependencies.push(dependency);
        self.entry_mut(dependency)?.parents.push(node);
        Ok(())
    }

    /// 用新节点替换旧节点，新节点继承旧节点的所有边与根节点身份
    pub fn replace_node(&mut self, old: NodeId, new_node: impl Into<PlanNodeEnum>) -> PlanResult<NodeId> {
        let new_node = new_node.into();
        let new_id = new_node.id();
        if self.nodes.contains_key(&new_id) {
            return Err(PlanError::DuplicateNode(new_id));
        }
        let old_entry = self.nodes.remove(&old).ok_or(PlanError::NodeNotFound(old))?;

        for &dep in &old_entry.dependencies {
            if let Some(entry) = self.nodes.get_mut(&dep) {
                replace_id(&mut entry.parents, old, new_id);
            }
        }
        for &parent in &old_entry.parents {
            if let Some(entry) = self.nodes.get_mut(&parent) {
                replace_id(&mut entry.dependencies, old, new_id);
            }
        }
        if self.root == Some(old) {
            self.root = Some(new_id);
        }
        self.excluded_from_scatter_gather.remove(&old);
        self.nodes.insert(
            new_id,
            PlanEntry {
                node: new_node,
                dependencies: old_entry.dependencies,
                parents: old_entry.parents,
            },
        );
        Ok(new_id)
    }

    /// 在 `anchor` 之前（执行顺序上）插入新节点：
    /// 新节点接管 `anchor` 唯一的依赖，并成为 `anchor` 的依赖
    pub fn insert_before(&mut self, anchor: NodeId, new_node: impl Into<PlanNodeEnum>) -> PlanResult<NodeId> {
        let dependency = match self.entry(anchor)?.dependencies.as_slice() {
            [dep] => *dep,
            deps => {
                return Err(PlanError::invalid_structure(format!(
                    "只能在恰好有一个依赖的节点之前插入，节点 {} 有 {} 个依赖",
                    anchor,
                    deps.len()
                )))
            }
        };
        let new_id = self.register_node(new_node)?;

        self.entry_mut(anchor)?.dependencies = vec![new_id];
        replace_id(&mut self.entry_mut(dependency)?.parents, anchor, new_id);
        let entry = self.entry_mut(new_id)?;
        entry.dependencies = vec![dependency];
        entry.parents = vec![anchor];
        Ok(new_id)
    }

    /// 在 `anchor` 之后（执行顺序上）插入新节点：
    /// 新节点接管 `anchor` 的所有父节点，并成为 `anchor` 唯一的父节点
    pub fn insert_after(&mut self, anchor: NodeId, new_node: impl Into<PlanNodeEnum>) -> PlanResult<NodeId> {
        self.entry(anchor)?;
        let new_id = self.register_node(new_node)?;

        let parents = std::mem::replace(&mut self.entry_mut(anchor)?.parents, vec![new_id]);
        for &parent in &parents {
            replace_id(&mut self.entry_mut(parent)?.dependencies, anchor, new_id);
        }
        let entry = self.entry_mut(new_id)?;
        entry.dependencies = vec![anchor];
        entry.parents = parents;
        if self.root == Some(anchor) {
            self.root = Some(new_id);
        }
        Ok(new_id)
    }

    /// 从计划中移除节点，其父节点改为直接依赖它唯一的依赖
    pub fn unlink_node(&mut self, id: NodeId) -> PlanResult<PlanNodeEnum> {
        let dependency = match self.entry(id)?.dependencies.as_slice() {
            [dep] => *dep,
            deps => {
                return Err(PlanError::invalid_structure(format!(
                    "只能移除恰好有一个依赖的节点，节点 {} 有 {} 个依赖",
                    id,
                    deps.len()
                )))
            }
        };
        let entry = self.nodes.remove(&id).ok_or(PlanError::NodeNotFound(id))?;

        for &parent in &entry.parents {
            replace_id(&mut self.entry_mut(parent)?.dependencies, id, dependency);
        }
        let dep_entry = self.entry_mut(dependency)?;
        dep_entry.parents.retain(|&p| p != id);
        dep_entry.parents.extend(entry.parents.iter().copied());

        if self.root == Some(id) {
            self.root = Some(dependency);
        }
        self.excluded_from_scatter_gather.remove(&id);
        Ok(entry.node)
    }

    // ==================== 代价估算 ====================

    /// 递归估算节点代价（沿第一个依赖向下）
    pub fn estimate_cost(&self, id: NodeId) -> PlanResult<CostEstimate> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if !visited.insert(node_id) {
                return Err(PlanError::invalid_structure(format!(
                    "节点 {} 处存在环",
                    node_id
                )));
            }
            let entry = self.entry(node_id)?;
            chain.push(node_id);
            current = entry.dependencies.first().copied();
        }

        let mut estimate: Option<CostEstimate> = None;
        for node_id in chain.into_iter().rev() {
            let node = &self.entry(node_id)?.node;
            estimate = Some(node.estimate_cost(estimate.as_ref()));
        }
        estimate.ok_or(PlanError::NodeNotFound(id))
    }

    /// 整个计划（根节点）的代价
    pub fn total_cost(&self) -> PlanResult<CostEstimate> {
        let root = self
            .root
            .ok_or_else(|| PlanError::invalid_structure("计划没有根节点"))?;
        self.estimate_cost(root)
    }

    // ==================== 克隆 ====================

    /// 把节点克隆到另一个计划中，节点 ID 保持不变
    ///
    /// `with_dependencies` 为真时递归克隆整个子树，并把副本的依赖连接到克隆出的节点；
    /// 目标计划中已存在的节点（共享子树）直接复用
    pub fn clone_into(
        &self,
        id: NodeId,
        target: &mut ExecutionPlan,
        with_dependencies: bool,
    ) -> PlanResult<NodeId> {
        let entry = self.entry(id)?;
        if target.contains(id) {
            if with_dependencies {
                return Ok(id);
            }
            return Err(PlanError::DuplicateNode(id));
        }
        target.register_node(entry.node.clone())?;
        if self.is_excluded_from_scatter_gather(id) {
            target.excluded_from_scatter_gather.insert(id);
        }
        if with_dependencies {
            for &dep in &entry.dependencies {
                let cloned = self.clone_into(dep, target, true)?;
                target.add_dependency(id, cloned)?;
            }
        }
        Ok(id)
    }

    // ==================== 校验 ====================

    /// 按依赖顺序（数据来源在前）排列的节点
    pub fn topological_order(&self) -> PlanResult<Vec<NodeId>> {
        let mut remaining: BTreeMap<NodeId, usize> = self
            .nodes
            .iter()
            .map(|(&id, entry)| (id, entry.dependencies.len()))
            .collect();
        let mut ready: BTreeSet<NodeId> = remaining
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.pop_first() {
            order.push(id);
            for &parent in self.parents(id) {
                if let Some(count) = remaining.get_mut(&parent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(parent);
                    }
                }
            }
        }
        if order.len() != self.nodes.len() {
            return Err(PlanError::invalid_structure("计划中存在环"));
        }
        Ok(order)
    }

    /// 校验计划结构
    ///
    /// - 所有边指向存在的节点，依赖与父节点列表互相一致
    /// - 恰好一个 SingletonNode，且只有它没有依赖，其余节点的依赖数符合其类型
    /// - 无环，根节点存在且没有父节点
    pub fn validate(&self) -> PlanResult<()> {
        for (&id, entry) in &self.nodes {
            if entry.node.id() != id {
                return Err(PlanError::invalid_structure(format!(
                    "节点 {} 以 ID {} 注册",
                    entry.node.id(),
                    id
                )));
            }
            for &dep in &entry.dependencies {
                let dep_entry = self.entry(dep)?;
                if count_of(&dep_entry.parents, id) != count_of(&entry.dependencies, dep) {
                    return Err(PlanError::invalid_structure(format!(
                        "边 {} -> {} 的两端不一致",
                        id, dep
                    )));
                }
            }
            for &parent in &entry.parents {
                let parent_entry = self.entry(parent)?;
                if count_of(&parent_entry.dependencies, id) != count_of(&entry.parents, parent) {
                    return Err(PlanError::invalid_structure(format!(
                        "边 {} -> {} 的两端不一致",
                        parent, id
                    )));
                }
            }
            let arity = entry.node.kind().input_arity();
            if !arity.accepts(entry.dependencies.len()) {
                return Err(PlanError::invalid_structure(format!(
                    "{} {} 的依赖数量 {} 无效",
                    entry.node.name(),
                    id,
                    entry.dependencies.len()
                )));
            }
        }

        let singletons = self.find_nodes(NodeKind::Singleton);
        if singletons.len() != 1 {
            return Err(PlanError::invalid_structure(format!(
                "计划必须恰好包含一个 SingletonNode，实际为 {}",
                singletons.len()
            )));
        }

        self.topological_order()?;

        let root = self
            .root
            .ok_or_else(|| PlanError::invalid_structure("计划没有根节点"))?;
        if !self.entry(root)?.parents.is_empty() {
            return Err(PlanError::invalid_structure(format!(
                "根节点 {} 不能有父节点",
                root
            )));
        }
        for &id in &self.excluded_from_scatter_gather {
            self.entry(id)?;
        }
        Ok(())
    }

    // ==================== 序列化 ====================

    pub fn to_json(&self) -> PlanResult<Value> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for id in self.topological_order()? {
            let entry = self.entry(id)?;
            let estimate = self.estimate_cost(id)?;
            nodes.push(entry.node.to_json(&entry.dependencies, &estimate));
        }
        let total = match self.root {
            Some(root) => self.estimate_cost(root)?,
            None => CostEstimate::empty(),
        };
        Ok(json!({
            "nodes": nodes,
            "root": self.root,
            "rules": self.applied_rules,
            "excludedFromScatterGather": self.excluded_from_scatter_gather,
            "estimatedCost": total.estimated_cost,
            "estimatedNrItems": total.estimated_nr_items,
        }))
    }

    /// 从序列化形式重建计划
    ///
    /// 变量注册到 `ctx` 的变量表，集合与索引通过 `catalog` 解析；
    /// 引用不存在的集合或索引说明序列化计划已过期，返回错误
    pub fn from_json(value: &Value, ctx: &mut PlanContext, catalog: &dyn Catalog) -> PlanResult<Self> {
        let obj = as_object(value, "plan")?;
        let mut plan = ExecutionPlan::new();
        let mut edges = Vec::new();
        {
            let mut decoder = NodeDecoder::new(ctx.variables_mut(), catalog);
            for node_json in get_array(obj, "nodes")? {
                let (node, dependencies) = PlanNodeEnum::from_json(node_json, &mut decoder)?;
                let id = plan.register_node(node)?;
                edges.push((id, dependencies));
            }
        }
        for (id, dependencies) in edges {
            ctx.observe_node_id(id);
            for dep in dependencies {
                plan.add_dependency(id, dep)?;
            }
        }

        plan.root = match obj.get("root") {
            Some(Value::Null) | None => None,
            Some(root) => Some(
                root.as_u64()
                    .ok_or_else(|| PlanError::invalid_field("root", "应为节点 id"))?,
            ),
        };
        if let Some(root) = plan.root {
            plan.entry(root)?;
        }
        if let Some(rules) = obj.get("rules").and_then(Value::as_array) {
            for rule in rules {
                let name = rule
                    .as_str()
                    .ok_or_else(|| PlanError::invalid_field("rules", "应为字符串数组"))?;
                plan.add_applied_rule(name);
            }
        }
        if let Some(excluded) = obj.get("excludedFromScatterGather").and_then(Value::as_array) {
            for id in excluded {
                let id = id.as_u64().ok_or_else(|| {
                    PlanError::invalid_field("excludedFromScatterGather", "应为节点 id 数组")
                })?;
                plan.mark_excluded_from_scatter_gather(id)?;
            }
        }
        plan.validate()?;
        Ok(plan)
    }

    /// 类似 EXPLAIN 的文本描述，按执行顺序列出节点与估算
    pub fn describe(&self) -> PlanResult<String> {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>4}  {:<26}{:>10}{:>14}",
            "Id", "NodeType", "Est.", "Cost"
        );
        for id in self.topological_order()? {
            let node = self.get_node(id)?;
            let estimate = self.estimate_cost(id)?;
            let marker = if self.is_excluded_from_scatter_gather(id) {
                " [no scatter/gather]"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "{:>4}  {:<26}{:>10}{:>14.2}{}",
                id,
                node.name(),
                estimate.estimated_nr_items,
                estimate.estimated_cost,
                marker
            );
        }
        if !self.applied_rules.is_empty() {
            let _ = writeln!(out, "Optimization rules applied: {}", self.applied_rules.join(", "));
        }
        Ok(out)
    }
}

fn replace_id(ids: &mut [NodeId], old: NodeId, new: NodeId) {
    for id in ids.iter_mut() {
        if *id == old {
            *id = new;
        }
    }
}

fn count_of(ids: &[NodeId], id: NodeId) -> usize {
    ids.iter().filter(|&&x| x == id).count()
}
