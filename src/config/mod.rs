use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{DBError, DBResult};

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "docdb".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

/// 优化器配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 被禁用的规则名称（如 "UseVectorIndexRule"）
    pub disabled_rules: Vec<String>,
    /// 重写器最多执行的轮数
    pub max_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            max_passes: 4,
        }
    }
}

impl OptimizerConfig {
    /// 检查规则是否启用
    pub fn is_rule_enabled(&self, name: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub optimizer: OptimizerConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> DBResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DBError::Config(format!("无法读取配置文件: {}", e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> DBResult<Self> {
        toml::from_str(content).map_err(|e| DBError::Config(e.to_string()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> DBResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DBError::Config(e.to_string()))?;
        fs::write(path.as_ref(), content)
            .map_err(|e| DBError::Config(format!("无法写入配置文件: {}", e)))?;
        Ok(())
    }
}
