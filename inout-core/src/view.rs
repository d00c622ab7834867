//! # View 模块
//!
//! 带进入/退出动画的参考内容视图。
//!
//! ## 动画定义
//!
//! - 进入：透明度 → 1.0，缩放 → 1.0
//! - 退出：透明度 → 0.0，缩放 → `zoom_scale`
//!
//! 起始值：实例上从未运行过任何动画时使用中性基线
//! （进入从全透明 + 放大开始，退出从不透明 + 单位缩放开始），
//! 否则从当前实时值开始，避免中途打断时画面跳变。

use std::rc::Rc;

use crate::animation::{
    Animatable, AnimationEngine, FillMode, KeyFrame, KeyframeAnimation, OPACITY, SCALE_X,
    SCALE_Y, VisualState,
};
use crate::cancel::CancelHandle;
use crate::capability::{ContentRef, InOutAnimation};
use crate::config::TransitionConfig;
use crate::dispatcher::UiDispatcher;
use crate::runner::{AnimationRunner, RunHandle};

/// 带进入/退出动画的内容视图
pub struct AnimatedView {
    name: String,
    visual: Rc<VisualState>,
    in_runner: AnimationRunner,
    out_runner: AnimationRunner,
    engine: Rc<dyn AnimationEngine>,
    dispatcher: Rc<dyn UiDispatcher>,
    config: TransitionConfig,
}

impl AnimatedView {
    /// 创建视图
    pub fn new(
        name: impl Into<String>,
        engine: Rc<dyn AnimationEngine>,
        dispatcher: Rc<dyn UiDispatcher>,
        config: TransitionConfig,
    ) -> Self {
        let (in_runner, out_runner) = AnimationRunner::pair();
        Self {
            name: name.into(),
            visual: Rc::new(VisualState::new()),
            in_runner,
            out_runner,
            engine,
            dispatcher,
            config,
        }
    }

    /// 包装为内容引用
    pub fn content_ref(view: &Rc<Self>) -> ContentRef {
        ContentRef::animated(view.name.as_str(), view.clone())
    }

    /// 视图名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 实时可视状态
    pub fn visual(&self) -> &Rc<VisualState> {
        &self.visual
    }

    /// 当前透明度
    pub fn opacity(&self) -> f32 {
        self.visual.opacity()
    }

    /// 当前缩放 (x, y)
    pub fn scale(&self) -> (f32, f32) {
        self.visual.scale()
    }

    /// 进入动画是否在运行
    pub fn is_in_running(&self) -> bool {
        self.in_runner.is_running()
    }

    /// 退出动画是否在运行
    pub fn is_out_running(&self) -> bool {
        self.out_runner.is_running()
    }

    /// 进入动画的最新序号
    pub fn in_sequence(&self) -> u64 {
        self.in_runner.sequence_id()
    }

    /// 退出动画的最新序号
    pub fn out_sequence(&self) -> u64 {
        self.out_runner.sequence_id()
    }

    fn is_first_run(&self) -> bool {
        self.in_runner.sequence_id() == 0 && self.out_runner.sequence_id() == 0
    }

    fn in_animation(&self) -> KeyframeAnimation {
        let zoom = self.config.zoom_scale;
        let start = if self.is_first_run() {
            KeyFrame::at(0.0)
                .set(OPACITY, 0.0)
                .set(SCALE_X, zoom)
                .set(SCALE_Y, zoom)
        } else {
            self.current_frame()
        };

        KeyframeAnimation::new(self.config.duration())
            .with_keyframe(start)
            .with_keyframe(
                KeyFrame::at(1.0)
                    .set(OPACITY, 1.0)
                    .set(SCALE_X, 1.0)
                    .set(SCALE_Y, 1.0),
            )
            .with_easing(self.config.easing)
            .with_fill(FillMode::Forward)
    }

    fn out_animation(&self) -> KeyframeAnimation {
        let zoom = self.config.zoom_scale;
        let start = if self.is_first_run() {
            KeyFrame::at(0.0)
                .set(OPACITY, 1.0)
                .set(SCALE_X, 1.0)
                .set(SCALE_Y, 1.0)
        } else {
            self.current_frame()
        };

        KeyframeAnimation::new(self.config.duration())
            .with_keyframe(start)
            .with_keyframe(
                KeyFrame::at(1.0)
                    .set(OPACITY, 0.0)
                    .set(SCALE_X, zoom)
                    .set(SCALE_Y, zoom),
            )
            .with_easing(self.config.easing)
            .with_fill(FillMode::Forward)
    }

    fn current_frame(&self) -> KeyFrame {
        let data = self.visual.snapshot();
        KeyFrame::at(0.0)
            .set(OPACITY, data.opacity)
            .set(SCALE_X, data.scale_x)
            .set(SCALE_Y, data.scale_y)
    }

    fn target(&self) -> Rc<dyn Animatable> {
        self.visual.clone()
    }
}

impl InOutAnimation for AnimatedView {
    fn in_cancellation(&self) -> Option<CancelHandle> {
        self.in_runner.cancellation()
    }

    fn run_in_animation(&self) -> Option<RunHandle> {
        // 关键帧必须在取消之前采样，起始值取打断时的实时值
        let animation = self.in_animation();
        self.cancel_all();
        Some(self.in_runner.run(
            self.engine.as_ref(),
            self.dispatcher.as_ref(),
            self.target(),
            animation,
        ))
    }

    fn out_cancellation(&self) -> Option<CancelHandle> {
        self.out_runner.cancellation()
    }

    fn run_out_animation(&self) -> Option<RunHandle> {
        let animation = self.out_animation();
        self.cancel_all();
        Some(self.out_runner.run(
            self.engine.as_ref(),
            self.dispatcher.as_ref(),
            self.target(),
            animation,
        ))
    }
}

impl std::fmt::Debug for AnimatedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedView")
            .field("name", &self.name)
            .field("visual", &self.visual.snapshot())
            .field("is_in_running", &self.is_in_running())
            .field("is_out_running", &self.is_out_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameClockEngine;
    use crate::dispatcher::LocalDispatcher;
    use std::time::Duration;
    use tokio::task::LocalSet;

    fn view(name: &str) -> Rc<AnimatedView> {
        Rc::new(AnimatedView::new(
            name,
            Rc::new(FrameClockEngine::default()),
            Rc::new(LocalDispatcher),
            TransitionConfig::default(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_in_run_starts_from_baseline() {
        LocalSet::new()
            .run_until(async {
                let v = view("a");
                assert_eq!(v.opacity(), 1.0);

                let handle = v.run_in_animation().unwrap();
                // 起始帧同步应用：全透明 + 放大
                assert_eq!(v.opacity(), 0.0);
                assert_eq!(v.scale(), (6.0, 6.0));
                assert!(v.is_in_running());

                let completion = handle.await;
                assert!(!completion.was_canceled);
                assert_eq!(v.opacity(), 1.0);
                assert_eq!(v.scale(), (1.0, 1.0));
                assert!(!v.is_in_running());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_run_interrupting_in_run_starts_from_live_values() {
        LocalSet::new()
            .run_until(async {
                let v = view("a");
                let entering = v.run_in_animation().unwrap();
                tokio::time::sleep(Duration::from_millis(200)).await;

                let mid_opacity = v.opacity();
                assert!(mid_opacity > 0.0 && mid_opacity < 1.0);

                let leaving = v.run_out_animation().unwrap();
                // 没有跳回不透明
                assert_eq!(v.opacity(), mid_opacity);

                let entered = entering.await;
                assert!(entered.was_canceled);
                assert!(entered.newer_run_active);

                let left = leaving.await;
                assert!(!left.was_canceled);
                assert_eq!(v.opacity(), 0.0);
                assert_eq!(v.scale(), (6.0, 6.0));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_out_run_starts_opaque() {
        LocalSet::new()
            .run_until(async {
                let v = view("a");
                let handle = v.run_out_animation().unwrap();
                assert_eq!(v.opacity(), 1.0);
                assert_eq!(v.scale(), (1.0, 1.0));
                handle.await;
                assert_eq!(v.opacity(), 0.0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarting_in_run_reports_superseded() {
        LocalSet::new()
            .run_until(async {
                let v = view("a");
                let first = v.run_in_animation().unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
                let second = v.run_in_animation().unwrap();
                assert_eq!(v.in_sequence(), 2);

                let first = first.await;
                assert!(first.newer_run_active);
                assert!(v.is_in_running());

                let second = second.await;
                assert!(!second.newer_run_active);
                assert!(!v.is_in_running());
            })
            .await;
    }
}
