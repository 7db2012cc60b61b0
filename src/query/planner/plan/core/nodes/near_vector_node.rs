//! 向量近邻扫描节点实现
//!
//! EnumerateNearVectorNode 只由优化规则创建，替换全表扫描。
//! 它读取 `inVariable` 中的查询向量，通过向量索引取回前 `offset + limit` 个候选，
//! 按索引的自然顺序输出文档主键（`documentOutVariable`）与距离（`distanceOutVariable`）。
//! 完整文档由下游的 MaterializeNode 读取

use serde_json::Value;

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{field, get_u64, JsonObject};
use crate::core::types::variable::replace_variable;
use crate::core::{CostEstimate, VarSet, VariableRef, VariableReplacements};
use crate::define_plan_node;
use crate::index::{IndexHandle, SearchParameters, VectorIndexDefinition};

use super::collection_binding::CollectionBinding;
use super::plan_node_kind::NodeKind;
use super::plan_node_traits::{NodeDecoder, PlanNode};
use super::NodeId;

/// 近邻扫描节点的变量
#[derive(Debug, Clone, PartialEq)]
pub struct NearVectorVariables {
    /// 查询向量
    pub in_variable: VariableRef,
    /// 改写前全表扫描的文档变量
    pub old_document_variable: VariableRef,
    /// 输出的文档主键
    pub document_out_variable: VariableRef,
    /// 输出的距离或相似度
    pub distance_out_variable: VariableRef,
}

define_plan_node! {
    pub struct EnumerateNearVectorNode {
        in_variable: VariableRef,
        old_document_variable: VariableRef,
        document_out_variable: VariableRef,
        distance_out_variable: VariableRef,
        limit: u64,
        offset: u64,
        search_parameters: SearchParameters,
        binding: CollectionBinding,
    }
    enum: EnumerateNearVectors
}

impl EnumerateNearVectorNode {
    /// 创建近邻扫描节点，绑定必须带有向量索引
    pub fn new(
        id: NodeId,
        variables: NearVectorVariables,
        limit: u64,
        offset: u64,
        search_parameters: SearchParameters,
        binding: CollectionBinding,
    ) -> PlanResult<Self> {
        match binding.index() {
            Some(index) if index.is_vector() => {}
            _ => {
                return Err(PlanError::invalid_structure(format!(
                    "近邻扫描节点 {} 必须绑定集合 {} 上的向量索引",
                    id,
                    binding.collection_name()
                )))
            }
        }
        Ok(Self {
            id,
            in_variable: variables.in_variable,
            old_document_variable: variables.old_document_variable,
            document_out_variable: variables.document_out_variable,
            distance_out_variable: variables.distance_out_variable,
            limit,
            offset,
            search_parameters,
            binding,
        })
    }

    pub fn in_variable(&self) -> &VariableRef {
        &self.in_variable
    }

    pub fn old_document_variable(&self) -> &VariableRef {
        &self.old_document_variable
    }

    pub fn document_out_variable(&self) -> &VariableRef {
        &self.document_out_variable
    }

    pub fn distance_out_variable(&self) -> &VariableRef {
        &self.distance_out_variable
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn search_parameters(&self) -> &SearchParameters {
        &self.search_parameters
    }

    pub fn binding(&self) -> &CollectionBinding {
        &self.binding
    }

    /// 构造时已保证索引存在
    pub fn index(&self) -> Option<&IndexHandle> {
        self.binding.index()
    }

    pub fn definition(&self) -> Option<&VectorIndexDefinition> {
        self.binding.index().and_then(|index| index.vector_definition())
    }

    /// 输出顺序：L2 为距离升序，Cosine 为相似度降序
    pub fn ascending(&self) -> bool {
        self.definition()
            .map(|definition| definition.metric.ascending())
            .unwrap_or(true)
    }

    /// 向索引请求的候选数量
    pub fn top_k(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }

    pub fn from_json(id: NodeId, obj: &JsonObject, decoder: &mut NodeDecoder) -> PlanResult<Self> {
        let variables = NearVectorVariables {
            in_variable: decoder.variable(obj, "inVariable")?,
            old_document_variable: decoder.variable(obj, "oldDocumentVariable")?,
            document_out_variable: decoder.variable(obj, "documentOutVariable")?,
            distance_out_variable: decoder.variable(obj, "distanceOutVariable")?,
        };
        let search_parameters = SearchParameters::from_json(field(obj, "searchParameters")?)?;
        Self::new(
            id,
            variables,
            get_u64(obj, "limit")?,
            get_u64(obj, "offset")?,
            search_parameters,
            decoder.binding(obj)?,
        )
    }
}

impl PlanNode for EnumerateNearVectorNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::EnumerateNearVectors
    }

    /// 输出行数以 limit 为上界，与集合大小无关
    fn estimate_cost(&self, dependency: Option<&CostEstimate>) -> CostEstimate {
        let dep = dependency.copied().unwrap_or_default();
        let count = self.binding.collection().count();
        let candidates = self.top_k().min(count);
        let per_input = self.limit.min(count.saturating_sub(self.offset));
        CostEstimate::new(
            dep.estimated_nr_items.saturating_mul(per_input),
            dep.estimated_cost + dep.estimated_nr_items as f64 * (1.0 + candidates as f64),
        )
    }

    fn variables_used_here(&self, vars: &mut VarSet) {
        vars.insert(self.in_variable.id);
    }

    fn variables_set_here(&self) -> Vec<VariableRef> {
        vec![
            self.document_out_variable.clone(),
            self.distance_out_variable.clone(),
        ]
    }

    fn replace_variables(&mut self, replacements: &VariableReplacements) {
        replace_variable(&mut self.in_variable, replacements);
    }

    fn serialize_fields(&self, obj: &mut JsonObject) {
        obj.insert("inVariable".to_string(), self.in_variable.to_json());
        obj.insert(
            "oldDocumentVariable".to_string(),
            self.old_document_variable.to_json(),
        );
        obj.insert(
            "documentOutVariable".to_string(),
            self.document_out_variable.to_json(),
        );
        obj.insert(
            "distanceOutVariable".to_string(),
            self.distance_out_variable.to_json(),
        );
        obj.insert("limit".to_string(), Value::from(self.limit));
        obj.insert("offset".to_string(), Value::from(self.offset));
        obj.insert(
            "searchParameters".to_string(),
            self.search_parameters.to_json(),
        );
        self.binding.serialize_fields(obj);
    }
}
