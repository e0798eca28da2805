//! 配置校验错误
//!
//! 单个声明内的错误会全部收集，整个构建的错误汇总成 [`ValidationReport`] 一次性报告。

use core::fmt;
use thiserror::Error;

/// 校验阶段的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("缺少必填字段 `{0}`")]
    MissingRequiredField(String),

    #[error("字段 `{field}` 的引脚 `{value}` 无效: {reason}")]
    InvalidPinReference {
        field: String,
        value: String,
        reason: String,
    },

    #[error("未知字段 `{0}`")]
    UnknownField(String),

    #[error("标识 `{0}` 已被使用")]
    DuplicateIdentity(String),

    #[error("标识 `{0}` 不合法: 只能包含字母、数字和下划线，且不能以数字开头")]
    InvalidIdentity(String),

    #[error("字段 `{field}` 类型错误，应为{expected}")]
    InvalidType { field: String, expected: &'static str },

    #[error("字段 `{field}` 的引脚 GPIO{pin} 已被 `{owner}` 占用")]
    PinConflict { field: String, pin: u8, owner: String },
}

/// 单个声明的全部校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationErrors {
    /// 声明在配置中的位置，从 0 开始
    pub index: usize,
    /// 声明中显式给出的标识（若有）
    pub id: Option<String>,
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for DeclarationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match &self.id {
                Some(id) => write!(f, "bresser_5in1[{}] ({id}): {error}", self.index)?,
                None => write!(f, "bresser_5in1[{}]: {error}", self.index)?,
            }
        }
        Ok(())
    }
}

/// 一次构建中所有失败声明的汇总
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub declarations: Vec<DeclarationErrors>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// 错误总数
    pub fn error_count(&self) -> usize {
        self.declarations.iter().map(|d| d.errors.len()).sum()
    }

    /// 按声明顺序遍历全部错误
    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.declarations.iter().flat_map(|d| d.errors.iter())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "配置校验失败，共 {} 处错误", self.error_count())?;
        for declaration in &self.declarations {
            write!(f, "\n{declaration}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lists_every_error() {
        let report = ValidationReport {
            declarations: vec![
                DeclarationErrors {
                    index: 0,
                    id: None,
                    errors: vec![
                        ValidationError::MissingRequiredField("gd2_pin".to_string()),
                        ValidationError::UnknownField("pressure".to_string()),
                    ],
                },
                DeclarationErrors {
                    index: 2,
                    id: Some("station".to_string()),
                    errors: vec![ValidationError::DuplicateIdentity("station".to_string())],
                },
            ],
        };

        assert_eq!(report.error_count(), 3);
        let text = report.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("bresser_5in1[0]: 缺少必填字段 `gd2_pin`"));
        assert!(text.contains("bresser_5in1[0]: 未知字段 `pressure`"));
        assert!(text.contains("bresser_5in1[2] (station): 标识 `station` 已被使用"));
    }
}
