//! # Config 模块
//!
//! 宿主配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use inout_core::{ConfigError, TransitionConfig};
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, warn};

use crate::error::HostConfigError;

/// 宿主配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 导航脚本路径
    ///
    /// 未配置时运行内置演示脚本。
    #[serde(default)]
    pub script_path: Option<PathBuf>,

    /// 过渡动画配置
    #[serde(default)]
    pub transition: TransitionConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            script_path: None,
            transition: TransitionConfig::default(),
        }
    }
}

impl HostConfig {
    /// 从文件读取并解析配置，不做回退
    ///
    /// 宿主在日志系统初始化之后再用 `or_default` 处理失败，回退原因才能被输出。
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 读取失败时回退到默认配置，并输出回退原因
    pub fn or_default(path: &Path, loaded: Result<Self, ConfigError>) -> Self {
        match loaded {
            Ok(config) => {
                debug!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "配置文件不存在，使用默认配置");
                Self::default()
            }
            Err(ConfigError::Parse(e)) => {
                warn!(path = %path.display(), error = %e, "配置文件解析失败，使用默认配置");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 日志级别
    pub fn max_level(&self) -> Result<Level, HostConfigError> {
        Level::from_str(&self.log_level).map_err(|_| HostConfigError::InvalidLogLevel {
            value: self.log_level.clone(),
        })
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), HostConfigError> {
        self.max_level()?;
        self.transition.validate()?;

        if let Some(path) = &self.script_path
            && !path.exists()
        {
            return Err(HostConfigError::ScriptNotFound { path: path.clone() });
        }

        Ok(())
    }
}
