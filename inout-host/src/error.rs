//! # Error 模块
//!
//! 定义 inout-host 中使用的错误类型。

use std::path::PathBuf;

use inout_core::ConfigError;
use thiserror::Error;

/// 导航脚本解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// 未知指令
    #[error("第 {line} 行：未知指令 '{command}'")]
    UnknownCommand { line: usize, command: String },

    /// 缺少必需参数
    #[error("第 {line} 行：指令 '{command}' 缺少参数 '{param}'")]
    MissingParameter {
        line: usize,
        command: String,
        param: String,
    },

    /// 无效的参数值
    #[error("第 {line} 行：参数 '{param}' 的值无效 - {message}")]
    InvalidParameter {
        line: usize,
        param: String,
        message: String,
    },

    /// 多余的参数
    #[error("第 {line} 行：指令 '{command}' 有多余的参数 '{extra}'")]
    UnexpectedArgument {
        line: usize,
        command: String,
        extra: String,
    },
}

/// 导航错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    /// 导航栈为空，无法返回
    #[error("没有可以返回的页面")]
    EmptyHistory,

    /// 页面未注册
    #[error("页面 '{label}' 未注册")]
    UnknownPage { label: String },
}

/// 宿主配置错误
#[derive(Error, Debug)]
pub enum HostConfigError {
    /// 过渡配置无效
    #[error(transparent)]
    Transition(#[from] ConfigError),

    /// 无效的日志级别
    #[error("无效的日志级别: {value}")]
    InvalidLogLevel { value: String },

    /// 脚本文件不存在
    #[error("脚本文件不存在: {}", path.display())]
    ScriptNotFound { path: PathBuf },
}
