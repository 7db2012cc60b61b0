//! 向量索引定义与搜索参数
//!
//! `VectorIndexDefinition` 是构建期参数，随索引持久化；
//! `SearchParameters` 是查询期参数，来自 `APPROX_NEAR_*` 的第三个参数，二者独立解析

use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, PlanResult};

/// 向量距离度量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorMetric {
    /// 欧氏距离，越小越近
    L2,
    /// 余弦相似度，越大越近
    Cosine,
}

impl VectorMetric {
    /// 索引的自然输出顺序是否为升序
    pub fn ascending(&self) -> bool {
        matches!(self, VectorMetric::L2)
    }

    /// 与该度量对应的近似近邻函数名
    pub fn function_name(&self) -> &'static str {
        match self {
            VectorMetric::L2 => "APPROX_NEAR_L2",
            VectorMetric::Cosine => "APPROX_NEAR_COSINE",
        }
    }

    pub fn from_function_name(name: &str) -> Option<Self> {
        match name {
            "APPROX_NEAR_L2" => Some(VectorMetric::L2),
            "APPROX_NEAR_COSINE" => Some(VectorMetric::Cosine),
            _ => None,
        }
    }

    /// 计算两个向量的距离（L2）或相似度（Cosine）
    ///
    /// 维度不同，或余弦度量下任一向量为零向量时返回 `None`
    pub fn score(&self, a: &[f64], b: &[f64]) -> Option<f64> {
        if a.len() != b.len() {
            return None;
        }
        match self {
            VectorMetric::L2 => Some(
                a.iter()
                    .zip(b)
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f64>()
                    .sqrt(),
            ),
            VectorMetric::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
                let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    None
                } else {
                    Some(dot / (norm_a * norm_b))
                }
            }
        }
    }
}

impl std::fmt::Display for VectorMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorMetric::L2 => write!(f, "l2"),
            VectorMetric::Cosine => write!(f, "cosine"),
        }
    }
}

fn default_training_iterations() -> u64 {
    25
}

/// 向量索引的构建期定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorIndexDefinition {
    pub dimension: usize,
    pub metric: VectorMetric,
    pub n_lists: u64,
    #[serde(default = "default_training_iterations")]
    pub training_iterations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_n_probe: Option<u64>,
}

impl VectorIndexDefinition {
    pub fn new(dimension: usize, metric: VectorMetric, n_lists: u64) -> PlanResult<Self> {
        let definition = Self {
            dimension,
            metric,
            n_lists,
            training_iterations: default_training_iterations(),
            default_n_probe: None,
        };
        definition.validate()?;
        Ok(definition)
    }

    pub fn with_default_n_probe(mut self, n_probe: u64) -> PlanResult<Self> {
        self.default_n_probe = Some(n_probe);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.dimension < 1 {
            return Err(PlanError::InvalidIndexDefinition(
                "dimension 必须大于等于 1".to_string(),
            ));
        }
        if self.n_lists < 1 {
            return Err(PlanError::InvalidIndexDefinition(
                "nLists 必须大于等于 1".to_string(),
            ));
        }
        if self.default_n_probe == Some(0) {
            return Err(PlanError::InvalidIndexDefinition(
                "defaultNProbe 必须大于等于 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(value: &serde_json::Value) -> PlanResult<Self> {
        let definition: Self = serde_json::from_value(value.clone())
            .map_err(|e| PlanError::InvalidIndexDefinition(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// 查询期搜索参数
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_probe: Option<u64>,
}

impl SearchParameters {
    pub fn with_n_probe(n_probe: u64) -> Self {
        Self {
            n_probe: Some(n_probe),
        }
    }

    pub fn from_json(value: &serde_json::Value) -> PlanResult<Self> {
        let params: Self = serde_json::from_value(value.clone())
            .map_err(|e| PlanError::InvalidSearchParameters(e.to_string()))?;
        if params.n_probe == Some(0) {
            return Err(PlanError::InvalidSearchParameters(
                "nProbe 必须大于等于 1".to_string(),
            ));
        }
        Ok(params)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self.n_probe {
            Some(n_probe) => serde_json::json!({ "nProbe": n_probe }),
            None => serde_json::json!({}),
        }
    }

    /// 实际使用的 nProbe：查询参数优先，其次是索引默认值，最后为 1
    pub fn effective_n_probe(&self, definition: &VectorIndexDefinition) -> u64 {
        self.n_probe.or(definition.default_n_probe).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_order_and_function_names() {
        assert!(VectorMetric::L2.ascending());
        assert!(!VectorMetric::Cosine.ascending());
        for metric in [VectorMetric::L2, VectorMetric::Cosine] {
            assert_eq!(
                VectorMetric::from_function_name(metric.function_name()),
                Some(metric)
            );
        }
        assert_eq!(VectorMetric::from_function_name("APPROX_NEAR_IP"), None);
    }

    #[test]
    fn test_scores() {
        let l2 = VectorMetric::L2.score(&[0.0, 0.0], &[3.0, 4.0]);
        assert_eq!(l2, Some(5.0));

        let cos = VectorMetric::Cosine
            .score(&[1.0, 0.0], &[2.0, 0.0])
            .expect("non-zero vectors");
        assert!((cos - 1.0).abs() < 1e-12);

        assert_eq!(VectorMetric::Cosine.score(&[0.0, 0.0], &[1.0, 0.0]), None);
        assert_eq!(VectorMetric::L2.score(&[1.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn test_definition_defaults_and_validation() {
        let definition = VectorIndexDefinition::from_json(&json!({
            "dimension": 128,
            "metric": "l2",
            "nLists": 100
        }))
        .expect("valid definition");
        assert_eq!(definition.training_iterations, 25);
        assert_eq!(definition.default_n_probe, None);

        let err = VectorIndexDefinition::from_json(&json!({
            "dimension": 0,
            "metric": "cosine",
            "nLists": 1
        }));
        assert!(matches!(err, Err(PlanError::InvalidIndexDefinition(_))));

        assert!(VectorIndexDefinition::new(4, VectorMetric::L2, 0).is_err());
        assert!(VectorIndexDefinition::from_json(&json!({
            "dimension": 4,
            "metric": "manhattan",
            "nLists": 1
        }))
        .is_err());
    }

    #[test]
    fn test_definition_json_round_trip() {
        let definition = VectorIndexDefinition::new(3, VectorMetric::Cosine, 10)
            .and_then(|d| d.with_default_n_probe(4))
            .expect("valid definition");
        let json = definition.to_json();
        assert_eq!(json["nLists"], 10);
        assert_eq!(json["defaultNProbe"], 4);
        assert_eq!(
            VectorIndexDefinition::from_json(&json).expect("round trip"),
            definition
        );
    }

    #[test]
    fn test_search_parameters() {
        assert_eq!(
            SearchParameters::from_json(&json!({})).expect("empty object"),
            SearchParameters::default()
        );
        assert_eq!(
            SearchParameters::from_json(&json!({"nProbe": 8})).expect("nProbe"),
            SearchParameters::with_n_probe(8)
        );
        assert!(SearchParameters::from_json(&json!({"nProbe": 0})).is_err());
        assert!(SearchParameters::from_json(&json!({"nProbe": "x"})).is_err());
        assert!(SearchParameters::from_json(&json!({"probes": 3})).is_err());
        assert!(SearchParameters::from_json(&json!([1])).is_err());
    }

    #[test]
    fn test_effective_n_probe() {
        let definition = VectorIndexDefinition::new(2, VectorMetric::L2, 4).expect("valid");
        assert_eq!(SearchParameters::default().effective_n_probe(&definition), 1);

        let definition = definition.with_default_n_probe(3).expect("valid");
        assert_eq!(SearchParameters::default().effective_n_probe(&definition), 3);
        assert_eq!(
            SearchParameters::with_n_probe(7).effective_n_probe(&definition),
            7
        );
        assert_eq!(SearchParameters::with_n_probe(7).to_json(), json!({"nProbe": 7}));
        assert_eq!(SearchParameters::default().to_json(), json!({}));
    }
}
