//! # Control 模块
//!
//! 内容切换控件：协调旧内容的退出动画与新内容的进入动画。
//!
//! ## 状态流转
//!
//! ```text
//!            set_content                 arrange
//!   Idle ─────────────────► Pending ─────────────────► Animating
//!    ▲                        │  ▲                         │
//!    │                        │  └──── set_content ◄───────┤
//!    │   attach（无过渡）       │                            │
//!    ◄────────────────────────┘                            │
//!    └──────────────── 所有动画结束（join）◄─────────────────┘
//! ```
//!
//! ## 两个槽位
//!
//! - current: 新内容，始终可见
//! - previous: 被替换的旧内容，退出动画结束后隐藏并清空
//!
//! 每次内容变化恰好产生一个 `TransitionCompleted`。被新变化取代的过渡仍然报告
//! 自己的 (old, new)，并带上 `superseded = true`。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::{LocalBoxFuture, join_all};
use tokio::sync::mpsc;
use tracing::debug;

use crate::capability::ContentRef;
use crate::config::LayoutMode;
use crate::dispatcher::{UiDispatcher, spawn_on};
use crate::runner::RunHandle;

/// 控件阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlPhase {
    /// 空闲
    #[default]
    Idle,
    /// 内容已变化，等待下一次 arrange
    PendingAnimation,
    /// 动画已派发，等待全部完成
    Animating,
}

impl std::fmt::Display for ControlPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlPhase::Idle => write!(f, "idle"),
            ControlPhase::PendingAnimation => write!(f, "pending"),
            ControlPhase::Animating => write!(f, "animating"),
        }
    }
}

/// 内容槽位
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSlot {
    /// 槽位中的内容
    pub content: Option<ContentRef>,
    /// 是否可见
    pub visible: bool,
}

impl ContentSlot {
    fn clear(&mut self) -> Option<ContentRef> {
        self.visible = false;
        self.content.take()
    }

    /// 槽位是否持有指定内容
    pub fn holds(&self, content: &ContentRef) -> bool {
        self.content.as_ref() == Some(content)
    }
}

/// 过渡完成事件
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionCompleted {
    /// 被替换的内容
    pub old: Option<ContentRef>,
    /// 新内容
    pub new: Option<ContentRef>,
    /// 所有动画是否都在没有引擎故障的情况下结束
    pub success: bool,
    /// 完成前是否已有更新的内容变化
    pub superseded: bool,
}

/// 已记录、尚未完成的过渡
#[derive(Debug)]
struct TransitionRecord {
    old: Option<ContentRef>,
    new: Option<ContentRef>,
    generation: u64,
}

#[derive(Default)]
struct ControlState {
    /// Content 属性
    content: Option<ContentRef>,
    current: ContentSlot,
    previous: ContentSlot,
    phase: ControlPhase,
    attached: bool,
    arrange_invalid: bool,
    /// 每次内容进入槽位时递增
    generation: u64,
    pending: Option<TransitionRecord>,
    subscribers: Vec<mpsc::UnboundedSender<TransitionCompleted>>,
}

struct ControlInner {
    state: RefCell<ControlState>,
    dispatcher: Rc<dyn UiDispatcher>,
    layout: LayoutMode,
}

/// 带进入/退出过渡的内容控件
///
/// 克隆得到的是同一个控件的另一个句柄。
#[derive(Clone)]
pub struct InOutContentControl {
    inner: Rc<ControlInner>,
}

/// 控件的弱引用，供异步任务回到控件时使用
#[derive(Clone)]
struct WeakControl(Weak<ControlInner>);

impl WeakControl {
    fn upgrade(&self) -> Option<InOutContentControl> {
        self.0.upgrade().map(|inner| InOutContentControl { inner })
    }
}

impl InOutContentControl {
    /// 创建控件
    ///
    /// `dispatcher` 是控件所在的 UI 调度上下文。
    pub fn new(dispatcher: Rc<dyn UiDispatcher>, layout: LayoutMode) -> Self {
        Self {
            inner: Rc::new(ControlInner {
                state: RefCell::new(ControlState::default()),
                dispatcher,
                layout,
            }),
        }
    }

    fn downgrade(&self) -> WeakControl {
        WeakControl(Rc::downgrade(&self.inner))
    }

    // ========== 查询 ==========

    /// 当前阶段
    pub fn phase(&self) -> ControlPhase {
        self.inner.state.borrow().phase
    }

    /// Content 属性
    pub fn content(&self) -> Option<ContentRef> {
        self.inner.state.borrow().content.clone()
    }

    /// current 槽位快照
    pub fn current_slot(&self) -> ContentSlot {
        self.inner.state.borrow().current.clone()
    }

    /// previous 槽位快照
    pub fn previous_slot(&self) -> ContentSlot {
        self.inner.state.borrow().previous.clone()
    }

    /// 是否已挂载到可视系统
    pub fn is_attached(&self) -> bool {
        self.inner.state.borrow().attached
    }

    /// 是否等待一次 arrange
    pub fn needs_arrange(&self) -> bool {
        self.inner.state.borrow().arrange_invalid
    }

    /// 布局驱动方式
    pub fn layout_mode(&self) -> LayoutMode {
        self.inner.layout
    }

    /// 订阅过渡完成事件
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TransitionCompleted> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.state.borrow_mut().subscribers.push(tx);
        rx
    }

    // ========== 外部通知 ==========

    /// 挂载到可视系统
    ///
    /// 以无过渡方式放置当前内容，并同步发出一次完成事件。
    pub fn attach(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.attached {
                return;
            }
            state.attached = true;
        }
        self.update_content(false);
    }

    /// 从可视系统卸载
    ///
    /// 之后的内容赋值只会被记录，arrange 也不再派发动画，直到再次挂载。
    pub fn detach(&self) {
        self.inner.state.borrow_mut().attached = false;
    }

    /// 设置 Content 属性
    ///
    /// 与当前内容相同（同一引用）时不做任何事。
    pub fn set_content(&self, content: Option<ContentRef>) {
        let attached = {
            let mut state = self.inner.state.borrow_mut();
            if state.content == content {
                debug!("内容未变化，跳过过渡");
                return;
            }
            state.content = content;
            state.attached
        };

        if attached {
            self.update_content(true);
        }
    }

    /// 布局系统的 arrange 回调
    ///
    /// 只在已挂载且处于 `PendingAnimation` 阶段时派发动画，其余情况调用无副作用。
    pub fn arrange(&self) {
        let (record, previous, current) = {
            let mut state = self.inner.state.borrow_mut();
            state.arrange_invalid = false;
            // 卸载期间不参与布局；挂起的记录留给 attach 处理
            if !state.attached || state.phase != ControlPhase::PendingAnimation {
                return;
            }
            let Some(record) = state.pending.take() else {
                state.phase = ControlPhase::Idle;
                return;
            };
            state.phase = ControlPhase::Animating;
            (
                record,
                state.previous.content.clone(),
                state.current.content.clone(),
            )
        };
        debug!(
            generation = record.generation,
            old = ?record.old.as_ref().map(ContentRef::label),
            new = ?record.new.as_ref().map(ContentRef::label),
            "开始执行过渡动画"
        );

        let mut legs: Vec<LocalBoxFuture<'static, bool>> = Vec::new();

        if let Some(previous) = previous {
            if current.as_ref() == Some(&previous) {
                // 同一内容不能同时出现在两个槽位
                self.hide_previous_if(&previous);
            } else {
                match previous.as_in_out() {
                    Some(animation) => {
                        // 旧内容可能仍在播放之前的进入动画
                        animation.cancel_all();
                        match animation.run_out_animation() {
                            Some(handle) => legs.push(self.out_leg(previous.clone(), handle)),
                            None => self.hide_previous_if(&previous),
                        }
                    }
                    None => {
                        debug!(content = %previous, "旧内容没有退出动画，直接隐藏");
                        self.hide_previous_if(&previous);
                    }
                }
            }
        }

        if let Some(animation) = current.as_ref().and_then(ContentRef::as_in_out) {
            animation.cancel_all();
            if let Some(handle) = animation.run_in_animation() {
                legs.push(Box::pin(async move { handle.await.succeeded() }));
            }
        }

        if legs.is_empty() {
            self.finish(record, true);
            return;
        }

        let control = self.downgrade();
        spawn_on(self.inner.dispatcher.as_ref(), async move {
            let results = join_all(legs).await;
            let success = results.into_iter().all(|ok| ok);
            if let Some(control) = control.upgrade() {
                control.finish(record, success);
            }
        });
    }

    // ========== 内部 ==========

    fn update_content(&self, with_transition: bool) {
        let mut evicted = None;
        let mut released = None;

        let (old, new, coalesced) = {
            let mut state = self.inner.state.borrow_mut();
            let old = state.current.content.take();
            let new = state.content.clone();

            if let Some(old_content) = &old {
                if let Some(displaced) = state.previous.content.replace(old_content.clone())
                    && displaced != *old_content
                    && new.as_ref() != Some(&displaced)
                {
                    evicted = Some(displaced);
                }
                state.previous.visible = true;
            }

            state.current.content = new.clone();
            state.current.visible = true;
            state.generation += 1;
            let generation = state.generation;

            let coalesced = state.pending.take();
            if with_transition {
                state.pending = Some(TransitionRecord {
                    old: old.clone(),
                    new: new.clone(),
                    generation,
                });
                state.phase = ControlPhase::PendingAnimation;
            } else {
                if let Some(cleared) = state.previous.clear()
                    && new.as_ref() != Some(&cleared)
                {
                    released = Some(cleared);
                }
                state.phase = ControlPhase::Idle;
            }

            (old, new, coalesced)
        };

        for content in evicted.iter().chain(released.iter()) {
            if let Some(animation) = content.as_in_out() {
                debug!(content = %content, "旧内容被移出槽位，取消其动画");
                animation.cancel_all();
            }
        }

        if let Some(record) = coalesced {
            // 尚未派发就被新的变化取代
            self.emit(TransitionCompleted {
                old: record.old,
                new: record.new,
                success: true,
                superseded: true,
            });
        }

        if with_transition {
            self.invalidate_arrange();
        } else {
            self.emit(TransitionCompleted {
                old,
                new,
                success: true,
                superseded: false,
            });
        }
    }

    fn invalidate_arrange(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.arrange_invalid {
                return;
            }
            state.arrange_invalid = true;
        }

        if self.inner.layout == LayoutMode::Deferred {
            let control = self.downgrade();
            self.inner.dispatcher.post(Box::new(move || {
                if let Some(control) = control.upgrade() {
                    control.arrange();
                }
            }));
        }
    }

    /// 退出动画一路：结束后若没有更新的动画接管，隐藏旧内容
    fn out_leg(&self, content: ContentRef, handle: RunHandle) -> LocalBoxFuture<'static, bool> {
        let control = self.downgrade();
        Box::pin(async move {
            let completion = handle.await;
            if !completion.newer_run_active
                && let Some(control) = control.upgrade()
            {
                control.hide_previous_if(&content);
            }
            completion.succeeded()
        })
    }

    /// previous 槽位仍持有该内容时隐藏并清空
    fn hide_previous_if(&self, content: &ContentRef) {
        let mut state = self.inner.state.borrow_mut();
        if state.previous.holds(content) {
            state.previous.clear();
            debug!(content = %content, "隐藏旧内容");
        }
    }

    fn finish(&self, record: TransitionRecord, success: bool) {
        let superseded = {
            let mut state = self.inner.state.borrow_mut();
            let superseded = state.generation != record.generation;
            if !superseded && state.phase == ControlPhase::Animating {
                state.phase = ControlPhase::Idle;
            }
            superseded
        };

        self.emit(TransitionCompleted {
            old: record.old,
            new: record.new,
            success,
            superseded,
        });
    }

    fn emit(&self, event: TransitionCompleted) {
        debug!(
            old = ?event.old.as_ref().map(ContentRef::label),
            new = ?event.new.as_ref().map(ContentRef::label),
            success = event.success,
            superseded = event.superseded,
            "过渡完成"
        );
        self.inner
            .state
            .borrow_mut()
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl std::fmt::Debug for InOutContentControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("InOutContentControl")
            .field("phase", &state.phase)
            .field("current", &state.current)
            .field("previous", &state.previous)
            .field("attached", &state.attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::LocalDispatcher;
    use tokio::task::LocalSet;

    struct Page;

    fn page(label: &str) -> ContentRef {
        ContentRef::opaque(label, Rc::new(Page))
    }

    fn manual_control() -> InOutContentControl {
        InOutContentControl::new(Rc::new(LocalDispatcher), LayoutMode::Manual)
    }

    #[test]
    fn test_detached_assignment_is_only_recorded() {
        let control = manual_control();
        let mut events = control.subscribe();

        let a = page("a");
        control.set_content(Some(a.clone()));

        assert_eq!(control.content(), Some(a));
        assert_eq!(control.current_slot(), ContentSlot::default());
        assert_eq!(control.phase(), ControlPhase::Idle);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_attach_places_content_without_transition() {
        let control = manual_control();
        let mut events = control.subscribe();
        let a = page("a");
        control.set_content(Some(a.clone()));

        control.attach();

        let slot = control.current_slot();
        assert_eq!(slot.content, Some(a.clone()));
        assert!(slot.visible);
        assert!(!control.previous_slot().visible);
        assert_eq!(control.phase(), ControlPhase::Idle);
        assert!(!control.needs_arrange());

        let event = events.try_recv().unwrap();
        assert_eq!(event.old, None);
        assert_eq!(event.new, Some(a));
        assert!(event.success);
        assert!(!event.superseded);

        // 重复挂载不产生事件
        control.attach();
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_content_change_marks_pending() {
        let control = manual_control();
        control.attach();
        let a = page("a");
        control.set_content(Some(a.clone()));

        assert_eq!(control.phase(), ControlPhase::PendingAnimation);
        assert!(control.needs_arrange());
        assert_eq!(control.current_slot().content, Some(a));
    }

    #[test]
    fn test_same_content_is_noop() {
        let control = manual_control();
        control.attach();
        let a = page("a");
        control.set_content(Some(a.clone()));
        control.arrange();
        let mut events = control.subscribe();

        control.set_content(Some(a));
        assert_eq!(control.phase(), ControlPhase::Idle);
        assert!(!control.needs_arrange());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_opaque_swap_completes_inside_arrange() {
        let control = manual_control();
        let a = page("a");
        let b = page("b");
        control.set_content(Some(a.clone()));
        control.attach();
        let mut events = control.subscribe();

        control.set_content(Some(b.clone()));
        let previous = control.previous_slot();
        assert_eq!(previous.content, Some(a.clone()));
        assert!(previous.visible);

        control.arrange();

        assert_eq!(control.previous_slot(), ContentSlot::default());
        assert_eq!(control.phase(), ControlPhase::Idle);
        let event = events.try_recv().unwrap();
        assert_eq!((event.old, event.new), (Some(a), Some(b)));
        assert!(event.success);
    }

    #[test]
    fn test_arrange_when_idle_is_noop() {
        let control = manual_control();
        control.attach();
        let mut events = control.subscribe();
        control.arrange();
        control.arrange();
        assert_eq!(control.phase(), ControlPhase::Idle);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_arrange_while_detached_keeps_pending() {
        let control = manual_control();
        let a = page("a");
        let b = page("b");
        control.set_content(Some(a.clone()));
        control.attach();
        let mut events = control.subscribe();

        control.set_content(Some(b.clone()));
        control.detach();
        control.arrange();

        assert_eq!(control.phase(), ControlPhase::PendingAnimation);
        assert_eq!(control.previous_slot().content, Some(a.clone()));
        assert!(events.try_recv().is_err());

        // 挂载时以无过渡方式收尾，挂起的过渡报告为已取代
        control.attach();
        let pending = events.try_recv().unwrap();
        assert_eq!((pending.old, pending.new), (Some(a), Some(b.clone())));
        assert!(pending.superseded);
        let placed = events.try_recv().unwrap();
        assert_eq!(placed.new, Some(b));
        assert!(!placed.superseded);
        assert_eq!(control.previous_slot(), ContentSlot::default());
        assert_eq!(control.phase(), ControlPhase::Idle);
    }

    #[test]
    fn test_coalesced_change_reports_superseded() {
        let control = manual_control();
        control.attach();
        let mut events = control.subscribe();
        let a = page("a");
        let b = page("b");

        control.set_content(Some(a.clone()));
        control.set_content(Some(b.clone()));

        let first = events.try_recv().unwrap();
        assert_eq!((first.old, first.new), (None, Some(a.clone())));
        assert!(first.superseded);
        assert!(first.success);

        control.arrange();
        let second = events.try_recv().unwrap();
        assert_eq!((second.old, second.new), (Some(a), Some(b)));
        assert!(!second.superseded);
    }

    #[test]
    fn test_clearing_content() {
        let control = manual_control();
        let a = page("a");
        control.set_content(Some(a.clone()));
        control.attach();
        let mut events = control.subscribe();

        control.set_content(None);
        control.arrange();

        assert_eq!(control.current_slot().content, None);
        assert_eq!(control.previous_slot().content, None);
        let event = events.try_recv().unwrap();
        assert_eq!((event.old, event.new), (Some(a), None));
    }

    #[tokio::test]
    async fn test_deferred_layout_arranges_once() {
        LocalSet::new()
            .run_until(async {
                let control =
                    InOutContentControl::new(Rc::new(LocalDispatcher), LayoutMode::Deferred);
                control.attach();
                let mut events = control.subscribe();

                control.set_content(Some(page("a")));
                control.set_content(Some(page("b")));
                assert_eq!(control.phase(), ControlPhase::PendingAnimation);

                let coalesced = events.recv().await.unwrap();
                assert!(coalesced.superseded);
                let event = events.recv().await.unwrap();
                assert_eq!(event.new.as_ref().map(ContentRef::label), Some("b"));
                assert!(!event.superseded);
                assert_eq!(control.phase(), ControlPhase::Idle);
                assert!(!control.needs_arrange());
            })
            .await;
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let control = manual_control();
        let events = control.subscribe();
        drop(events);
        control.attach();
        assert!(control.inner.state.borrow().subscribers.is_empty());
    }
}
