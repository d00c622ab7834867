//! # Error 模块
//!
//! 定义 inout-core 中使用的错误类型。
//!
//! 注意：取消与被新动画取代都不是错误，它们通过 `RunCompletion` 的标志位表达。

use thiserror::Error;

/// 动画引擎错误
///
/// 引擎层故障只会体现为 `TransitionCompleted` 的 `success = false`，
/// 不会从 `arrange` 同步抛出。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 目标对象不支持该属性
    #[error("目标对象不支持属性 '{property}'")]
    UnknownProperty { property: String },

    /// 关键帧定义无效
    #[error("无效的关键帧: {message}")]
    InvalidKeyframes { message: String },

    /// 动画任务在报告完成前被丢弃
    #[error("动画任务在完成前被丢弃")]
    Abandoned,
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读写失败
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析或序列化失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
