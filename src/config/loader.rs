//! 配置文件加载
//!
//! 从 YAML 文档中取出目标芯片和全部 `bresser_5in1` 声明，其他顶层键属于别的组件，直接忽略。

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;

use super::pins::{render_key, TargetPlatform};

pub const CONF_PLATFORM: &str = "platform";
pub const CONF_BRESSER_5IN1: &str = "bresser_5in1";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("读取配置文件 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML 解析失败: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("配置文档结构错误: {0}")]
    InvalidDocument(String),

    #[error("{0}")]
    UnknownPlatform(String),
}

/// 一次构建的输入
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    pub platform: TargetPlatform,
    /// 未经校验的声明，按文档顺序排列
    pub declarations: Vec<Value>,
}

impl BuildConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("加载配置文件: {}", path.display());
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: Value = serde_yaml::from_str(text)?;
        Self::from_document(document)
    }

    pub fn from_document(document: Value) -> Result<Self, LoadError> {
        let root = match document {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(root) => root,
            _ => {
                return Err(LoadError::InvalidDocument(
                    "顶层必须是键值映射".to_string(),
                ))
            }
        };

        let mut config = BuildConfig::default();
        for (key, value) in root {
            match key.as_str() {
                Some(CONF_PLATFORM) => {
                    let name = value.as_str().ok_or_else(|| {
                        LoadError::InvalidDocument(format!("`{CONF_PLATFORM}` 必须是字符串"))
                    })?;
                    config.platform = name.parse().map_err(LoadError::UnknownPlatform)?;
                }
                Some(CONF_BRESSER_5IN1) => {
                    config.declarations = match value {
                        Value::Null => Vec::new(),
                        Value::Sequence(items) => items,
                        block @ Value::Mapping(_) => vec![block],
                        _ => {
                            return Err(LoadError::InvalidDocument(format!(
                                "`{CONF_BRESSER_5IN1}` 必须是配置块或配置块列表"
                            )))
                        }
                    };
                }
                _ => log::debug!("忽略顶层配置 `{}`", render_key(&key)),
            }
        }

        log::debug!(
            "目标芯片 {}，共 {} 个 bresser_5in1 声明",
            config.platform,
            config.declarations.len()
        );
        Ok(config)
    }

    /// 覆盖文档中的目标芯片
    pub fn with_platform(mut self, platform: TargetPlatform) -> Self {
        self.platform = platform;
        self
    }
}
