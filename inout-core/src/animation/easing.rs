//! # Easing 模块
//!
//! 缓动函数库，作用于整段关键帧动画的归一化时间。

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速），与常见 UI 框架的默认缓动一致
    #[default]
    Linear,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    EaseInOutCubic,
    /// 正弦缓入缓出
    EaseInOutSine,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// 输入会被钳制到 0.0 - 1.0；两个端点总是精确映射到自身，
    /// 保证 `FillMode::Forward` 停留在最后一帧的目标值上。
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingFunction; 7] = [
        EasingFunction::Linear,
        EasingFunction::EaseInQuad,
        EasingFunction::EaseOutQuad,
        EasingFunction::EaseInOutQuad,
        EasingFunction::EaseOutCubic,
        EasingFunction::EaseInOutCubic,
        EasingFunction::EaseInOutSine,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(EasingFunction::EaseOutQuad.apply(-0.5), 0.0);
        assert_eq!(EasingFunction::EaseOutQuad.apply(1.5), 1.0);
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut last = 0.0;
            for i in 1..=20 {
                let v = easing.apply(i as f32 / 20.0);
                assert!(v >= last - 1e-6, "{easing:?} 在 {i} 处回退");
                last = v;
            }
        }
    }

    #[test]
    fn test_ease_in_out_midpoint() {
        assert!((EasingFunction::EaseInOutQuad.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((EasingFunction::EaseInOutSine.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&EasingFunction::EaseInOutQuad).unwrap();
        assert_eq!(json, "\"ease_in_out_quad\"");
        let parsed: EasingFunction = serde_json::from_str("\"linear\"").unwrap();
        assert_eq!(parsed, EasingFunction::Linear);
    }
}
