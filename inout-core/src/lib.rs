//! # inout-core
//!
//! 内容切换过渡的核心库：旧内容退出、新内容进入，两路动画结束后报告一次完成。
//!
//! ## 架构概述
//!
//! 本 crate 是纯逻辑核心，不依赖任何渲染或布局系统。
//! 宿主负责提供内容、驱动布局，并在 UI 调度上下文（tokio `LocalSet`）中运行：
//!
//! ```text
//! Host                               InOutContentControl
//!   │                                        │
//!   │──── set_content(new) ─────────────────►│ current → previous, Pending
//!   │──── arrange() ────────────────────────►│ 派发 out / in 两路动画
//!   │                                        │      │
//!   │                      AnimationRunner ◄─┘      │ 取消旧运行、签发序号
//!   │                             │                 │
//!   │                      AnimationEngine          │ 帧时钟插值
//!   │                             │                 │
//!   │◄─── TransitionCompleted ── join ◄─────────────┘
//! ```
//!
//! ## 核心类型
//!
//! - [`InOutContentControl`]：过渡协调器
//! - [`InOutAnimation`]：内容可选实现的进入/退出动画能力
//! - [`AnimationRunner`]：单方向运行记录（序号、取消句柄、运行标志）
//! - [`AnimatedView`]：带淡入缩放动画的参考内容
//! - [`TransitionCompleted`]：每次内容变化恰好一个的完成事件
//!
//! ## 模块结构
//!
//! - [`animation`]：属性插值与关键帧引擎
//! - [`cancel`]：协作式取消句柄
//! - [`dispatcher`]：UI 调度上下文
//! - [`runner`]：动画运行器
//! - [`capability`]：动画能力与内容引用
//! - [`view`]：参考内容视图
//! - [`control`]：过渡协调器
//! - [`config`]：配置
//! - [`error`]：错误类型

pub mod animation;
pub mod cancel;
pub mod capability;
pub mod config;
pub mod control;
pub mod dispatcher;
pub mod error;
pub mod runner;
pub mod view;

// 重导出核心类型
pub use animation::{
    Animatable, AnimationEngine, EasingFunction, FillMode, FrameClockEngine, KeyFrame,
    KeyframeAnimation, RunOutcome, VisualState,
};
pub use cancel::CancelHandle;
pub use capability::{Capability, ContentId, ContentRef, InOutAnimation};
pub use config::{LayoutMode, TransitionConfig};
pub use control::{ContentSlot, ControlPhase, InOutContentControl, TransitionCompleted};
pub use dispatcher::{LocalDispatcher, UiDispatcher};
pub use error::{ConfigError, EngineError, EngineResult};
pub use runner::{AnimationRunner, Direction, RunCompletion, RunHandle};
pub use view::AnimatedView;
