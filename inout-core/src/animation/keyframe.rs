//! # Keyframe 模块
//!
//! 声明式关键帧动画：一组 (属性, 目标值, 时间点) 加上时长、缓动和填充模式。
//!
//! 动画本身不持有目标对象，也不关心时间源，只负责在给定进度下采样。

use std::time::Duration;

use super::EasingFunction;
use crate::error::{EngineError, EngineResult};

/// 填充模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// 动画结束后保持最后一帧的值
    #[default]
    Forward,
    /// 动画结束后恢复动画开始前的值
    None,
}

/// 单个属性的设定值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setter {
    /// 属性名
    pub property: &'static str,
    /// 目标值
    pub value: f32,
}

/// 关键帧
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrame {
    /// 时间点（0.0 - 1.0，相对于动画时长）
    pub cue: f32,
    /// 该时间点上的属性值
    pub setters: Vec<Setter>,
}

impl KeyFrame {
    /// 创建关键帧
    pub fn at(cue: f32) -> Self {
        Self {
            cue,
            setters: Vec::new(),
        }
    }

    /// 追加属性设定
    pub fn set(mut self, property: &'static str, value: f32) -> Self {
        self.setters.push(Setter { property, value });
        self
    }

    fn value_of(&self, property: &str) -> Option<f32> {
        self.setters
            .iter()
            .find(|s| s.property == property)
            .map(|s| s.value)
    }
}

/// 关键帧动画
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeAnimation {
    /// 关键帧（按 cue 升序）
    pub keyframes: Vec<KeyFrame>,
    /// 动画时长
    pub duration: Duration,
    /// 缓动函数（作用于整段动画）
    pub easing: EasingFunction,
    /// 填充模式
    pub fill: FillMode,
}

impl KeyframeAnimation {
    /// 创建空动画
    pub fn new(duration: Duration) -> Self {
        Self {
            keyframes: Vec::new(),
            duration,
            easing: EasingFunction::default(),
            fill: FillMode::default(),
        }
    }

    /// 追加关键帧，保持 cue 升序
    pub fn with_keyframe(mut self, keyframe: KeyFrame) -> Self {
        let index = self
            .keyframes
            .partition_point(|k| k.cue <= keyframe.cue);
        self.keyframes.insert(index, keyframe);
        self
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// 设置填充模式
    pub fn with_fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    /// 动画涉及的所有属性（去重，按首次出现顺序）
    pub fn properties(&self) -> Vec<&'static str> {
        let mut props: Vec<&'static str> = Vec::new();
        for setter in self.keyframes.iter().flat_map(|k| &k.setters) {
            if !props.contains(&setter.property) {
                props.push(setter.property);
            }
        }
        props
    }

    /// 检查关键帧定义
    pub fn validate(&self) -> EngineResult<()> {
        if self.keyframes.is_empty() {
            return Err(EngineError::InvalidKeyframes {
                message: "至少需要一个关键帧".to_string(),
            });
        }
        for keyframe in &self.keyframes {
            if !(0.0..=1.0).contains(&keyframe.cue) {
                return Err(EngineError::InvalidKeyframes {
                    message: format!("cue {} 超出 0.0 - 1.0", keyframe.cue),
                });
            }
            if keyframe.setters.iter().any(|s| !s.value.is_finite()) {
                return Err(EngineError::InvalidKeyframes {
                    message: format!("cue {} 含有非有限值", keyframe.cue),
                });
            }
        }
        Ok(())
    }

    /// 在给定的原始进度（0.0 - 1.0，未缓动）下采样所有属性
    pub fn sample(&self, raw_progress: f32) -> Vec<Setter> {
        let t = self.easing.apply(raw_progress);
        self.properties()
            .into_iter()
            .filter_map(|property| {
                self.sample_property(property, t)
                    .map(|value| Setter { property, value })
            })
            .collect()
    }

    /// 采样单个属性（`t` 已缓动）
    fn sample_property(&self, property: &str, t: f32) -> Option<f32> {
        let mut before: Option<(f32, f32)> = None;
        let mut after: Option<(f32, f32)> = None;

        for keyframe in &self.keyframes {
            let Some(value) = keyframe.value_of(property) else {
                continue;
            };
            if keyframe.cue <= t {
                before = Some((keyframe.cue, value));
            } else if after.is_none() {
                after = Some((keyframe.cue, value));
            }
        }

        match (before, after) {
            (Some((c0, v0)), Some((c1, v1))) => {
                let local = (t - c0) / (c1 - c0);
                Some(v0 + (v1 - v0) * local)
            }
            (Some((_, v)), None) | (None, Some((_, v))) => Some(v),
            (None, None) => None,
        }
    }
}
