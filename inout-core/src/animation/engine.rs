//! # Engine 模块
//!
//! 动画引擎：把关键帧动画按时间应用到目标对象上。
//!
//! 对协调器而言引擎是不透明的。它只需要：
//! - 执行插值并在结束时完成返回的 future
//! - 在取消句柄被触发时提前结束

use std::rc::Rc;
use std::time::Duration;

use futures::future::{self, LocalBoxFuture};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::{Animatable, FillMode, KeyframeAnimation, Setter};
use crate::cancel::CancelHandle;
use crate::error::{EngineError, EngineResult};

/// 一次执行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 正常播放到结束
    Completed,
    /// 因取消而提前结束
    Canceled,
}

/// 动画引擎接口
pub trait AnimationEngine {
    /// 在目标上执行关键帧动画
    ///
    /// 实现应在返回前同步应用起始帧，避免在第一次轮询前出现一帧旧值。
    fn run(
        &self,
        target: Rc<dyn Animatable>,
        animation: KeyframeAnimation,
        cancel: CancelHandle,
    ) -> LocalBoxFuture<'static, EngineResult<RunOutcome>>;
}

/// 帧时钟引擎
///
/// 以固定帧间隔（tokio interval）推进动画，每帧检查取消句柄。
#[derive(Debug, Clone)]
pub struct FrameClockEngine {
    frame_interval: Duration,
}

impl Default for FrameClockEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

impl FrameClockEngine {
    /// 创建引擎
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval: frame_interval.max(Duration::from_millis(1)),
        }
    }

    /// 帧间隔
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

fn apply(target: &dyn Animatable, samples: &[Setter]) -> EngineResult<()> {
    for setter in samples {
        if !target.set_property(setter.property, setter.value) {
            return Err(EngineError::UnknownProperty {
                property: setter.property.to_string(),
            });
        }
    }
    Ok(())
}

impl AnimationEngine for FrameClockEngine {
    fn run(
        &self,
        target: Rc<dyn Animatable>,
        animation: KeyframeAnimation,
        cancel: CancelHandle,
    ) -> LocalBoxFuture<'static, EngineResult<RunOutcome>> {
        if let Err(e) = animation.validate() {
            return Box::pin(future::ready(Err(e)));
        }

        // 记录起始值（FillMode::None 结束后恢复），同时验证属性存在
        let supported = target.property_list();
        let mut initial = Vec::new();
        for property in animation.properties() {
            let value = supported
                .contains(&property)
                .then(|| target.get_property(property))
                .flatten();
            match value {
                Some(value) => initial.push(Setter { property, value }),
                None => {
                    return Box::pin(future::ready(Err(EngineError::UnknownProperty {
                        property: property.to_string(),
                    })));
                }
            }
        }

        if let Err(e) = apply(target.as_ref(), &animation.sample(0.0)) {
            return Box::pin(future::ready(Err(e)));
        }

        let frame_interval = self.frame_interval;
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Ok(RunOutcome::Canceled);
            }

            let started = Instant::now();
            let duration = animation.duration;
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!(elapsed = ?started.elapsed(), "动画被取消");
                        return Ok(RunOutcome::Canceled);
                    }
                    _ = ticker.tick() => {}
                }

                let progress = if duration.is_zero() {
                    1.0
                } else {
                    (started.elapsed().as_secs_f32() / duration.as_secs_f32()).min(1.0)
                };
                apply(target.as_ref(), &animation.sample(progress))?;

                if progress >= 1.0 {
                    break;
                }
            }

            if animation.fill == FillMode::None {
                apply(target.as_ref(), &initial)?;
            }
            Ok(RunOutcome::Completed)
        })
    }
}
