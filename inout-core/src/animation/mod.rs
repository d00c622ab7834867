//! # Animation 模块
//!
//! 属性插值层。对协调器来说这一层是不透明的"动画引擎"。
//!
//! ## 核心概念
//!
//! - `Animatable`: 按属性名读写 f32 值的目标对象
//! - `KeyframeAnimation`: 声明式关键帧（属性、目标值、时间点）+ 时长 + 填充模式
//! - `AnimationEngine`: 执行关键帧动画，支持协作式取消
//! - `EasingFunction`: 缓动函数
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let target = Rc::new(VisualState::new());
//! let anim = KeyframeAnimation::new(Duration::from_millis(400))
//!     .with_keyframe(KeyFrame::at(0.0).set(OPACITY, 0.0))
//!     .with_keyframe(KeyFrame::at(1.0).set(OPACITY, 1.0));
//!
//! let outcome = FrameClockEngine::default()
//!     .run(target, anim, CancelHandle::new())
//!     .await?;
//! ```

mod easing;
mod engine;
mod keyframe;
mod traits;

pub use easing::EasingFunction;
pub use engine::{AnimationEngine, FrameClockEngine, RunOutcome};
pub use keyframe::{FillMode, KeyFrame, KeyframeAnimation, Setter};
pub use traits::{Animatable, OPACITY, SCALE_X, SCALE_Y, VisualData, VisualState};
