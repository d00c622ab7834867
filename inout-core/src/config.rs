//! # Config 模块
//!
//! 过渡动画配置。
//!
//! 所有字段都有默认值，JSON 中缺省的字段使用默认值填充。

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::EasingFunction;
use crate::error::ConfigError;

/// 单次动画时长上限（毫秒）
const MAX_DURATION_MS: u64 = 60_000;

/// 布局驱动方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// 内容变化后由控件自行在 UI 上下文中安排一次 arrange
    #[default]
    Deferred,
    /// 由宿主的布局系统显式调用 `arrange()`
    Manual,
}

/// 过渡动画配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionConfig {
    /// 进入/退出动画时长（毫秒）
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// 引擎帧间隔（毫秒）
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// 放大倍数
    ///
    /// 首次进入动画从该缩放收缩到 1.0，退出动画从当前缩放放大到该值。
    #[serde(default = "default_zoom_scale")]
    pub zoom_scale: f32,

    /// 缓动函数
    #[serde(default)]
    pub easing: EasingFunction,

    /// 布局驱动方式
    #[serde(default)]
    pub layout: LayoutMode,
}

fn default_duration_ms() -> u64 {
    400
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_zoom_scale() -> f32 {
    6.0
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            zoom_scale: default_zoom_scale(),
            easing: EasingFunction::default(),
            layout: LayoutMode::default(),
        }
    }
}

impl TransitionConfig {
    /// 动画时长
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// 帧间隔
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// 从 JSON 文件读取
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存到 JSON 文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "frame_interval_ms 必须大于 0".to_string(),
            ));
        }

        if self.duration_ms > MAX_DURATION_MS {
            return Err(ConfigError::Validation(format!(
                "duration_ms 不能超过 {MAX_DURATION_MS}"
            )));
        }

        if !(self.zoom_scale.is_finite() && self.zoom_scale > 0.0) {
            return Err(ConfigError::Validation(
                "zoom_scale 必须是正数".to_string(),
            ));
        }

        Ok(())
    }
}
