//! # Runner 模块
//!
//! 单个内容实例、单个方向（进入/退出）的动画运行记录。
//!
//! 每次 `run()`：
//! 1. 序号自增并记下本次序号
//! 2. 取消上一次运行，分配新的取消句柄
//! 3. 标记 `is_running`
//! 4. 启动引擎执行
//! 5. 完成时比较序号：只有仍是最新的那次运行可以清除 `is_running`
//! 6. 通过一次性通道报告 `RunCompletion`
//!
//! 被取代的运行依旧会报告完成，但 `newer_run_active = true`，且不会触碰运行标志。

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::debug;

use crate::animation::{Animatable, AnimationEngine, KeyframeAnimation, RunOutcome};
use crate::cancel::CancelHandle;
use crate::dispatcher::{UiDispatcher, spawn_on};
use crate::error::EngineError;

/// 动画方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// 进入动画（新内容）
    In,
    /// 退出动画（旧内容）
    Out,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

/// 实例级运行纪元
///
/// 同一内容实例的两个方向共享一个纪元计数器，用于判断
/// "此后是否有任一方向的新运行开始"。
#[derive(Debug, Clone, Default)]
pub struct RunEpoch(Rc<Cell<u64>>);

impl RunEpoch {
    fn advance(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }

    fn current(&self) -> u64 {
        self.0.get()
    }
}

/// 运行记录
#[derive(Debug, Default)]
struct RunRecord {
    sequence_id: u64,
    is_running: bool,
    cancellation: Option<CancelHandle>,
}

/// 一次运行的完成报告
#[derive(Debug, Clone, PartialEq)]
pub struct RunCompletion {
    /// 方向
    pub direction: Direction,
    /// 本次运行的序号
    pub sequence_id: u64,
    /// 是否被取消
    pub was_canceled: bool,
    /// 完成时是否已有更新的运行在同一实例上开始
    pub newer_run_active: bool,
    /// 引擎故障（`None` 表示引擎正常结束，包括取消）
    pub fault: Option<EngineError>,
}

impl RunCompletion {
    /// 引擎是否正常结束
    pub fn succeeded(&self) -> bool {
        self.fault.is_none()
    }
}

/// 运行完成句柄
///
/// 一次性 future，解析为该次运行的 `RunCompletion`。
/// 丢弃句柄不会影响动画本身。
#[derive(Debug)]
pub struct RunHandle {
    direction: Direction,
    sequence_id: u64,
    receiver: oneshot::Receiver<RunCompletion>,
}

impl RunHandle {
    /// 本次运行的序号
    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }
}

impl Future for RunHandle {
    type Output = RunCompletion;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let direction = self.direction;
        let sequence_id = self.sequence_id;
        Pin::new(&mut self.receiver).poll(cx).map(|result| {
            result.unwrap_or(RunCompletion {
                direction,
                sequence_id,
                was_canceled: false,
                newer_run_active: false,
                fault: Some(EngineError::Abandoned),
            })
        })
    }
}

/// 单方向动画运行器
#[derive(Debug)]
pub struct AnimationRunner {
    direction: Direction,
    record: Rc<RefCell<RunRecord>>,
    epoch: RunEpoch,
}

impl AnimationRunner {
    /// 创建独立的运行器
    pub fn new(direction: Direction) -> Self {
        Self::with_epoch(direction, RunEpoch::default())
    }

    /// 创建共享纪元的运行器
    pub fn with_epoch(direction: Direction, epoch: RunEpoch) -> Self {
        Self {
            direction,
            record: Rc::new(RefCell::new(RunRecord::default())),
            epoch,
        }
    }

    /// 创建一对共享纪元的 (进入, 退出) 运行器
    pub fn pair() -> (Self, Self) {
        let epoch = RunEpoch::default();
        (
            Self::with_epoch(Direction::In, epoch.clone()),
            Self::with_epoch(Direction::Out, epoch),
        )
    }

    /// 方向
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// 最近一次签发的序号（从未运行为 0）
    pub fn sequence_id(&self) -> u64 {
        self.record.borrow().sequence_id
    }

    /// 是否有运行持有运行标志
    pub fn is_running(&self) -> bool {
        self.record.borrow().is_running
    }

    /// 当前运行的取消句柄
    pub fn cancellation(&self) -> Option<CancelHandle> {
        self.record.borrow().cancellation.clone()
    }

    /// 请求取消当前运行
    pub fn cancel(&self) {
        if let Some(cancel) = self.cancellation() {
            cancel.cancel();
        }
    }

    /// 启动一次运行
    ///
    /// 上一次运行（若仍在执行）会先被取消。
    pub fn run(
        &self,
        engine: &dyn AnimationEngine,
        dispatcher: &dyn UiDispatcher,
        target: Rc<dyn Animatable>,
        animation: KeyframeAnimation,
    ) -> RunHandle {
        let (my_id, cancel) = {
            let mut record = self.record.borrow_mut();
            if let Some(previous) = record.cancellation.take() {
                previous.cancel();
            }
            record.sequence_id += 1;
            let cancel = CancelHandle::new();
            record.cancellation = Some(cancel.clone());
            record.is_running = true;
            (record.sequence_id, cancel)
        };
        let my_epoch = self.epoch.advance();
        let direction = self.direction;
        debug!(direction = %direction, sequence_id = my_id, "动画开始");

        let execution = engine.run(target, animation, cancel.clone());
        let (tx, rx) = oneshot::channel();
        let record = Rc::clone(&self.record);
        let epoch = self.epoch.clone();

        spawn_on(dispatcher, async move {
            let result = execution.await;
            let was_canceled = cancel.is_cancelled() || result == Ok(RunOutcome::Canceled);

            let superseded = {
                let mut record = record.borrow_mut();
                let superseded = record.sequence_id != my_id;
                if !superseded {
                    record.is_running = false;
                }
                superseded
            };
            let newer_run_active = superseded || epoch.current() != my_epoch;

            debug!(
                direction = %direction,
                sequence_id = my_id,
                was_canceled,
                newer_run_active,
                "动画结束"
            );

            // 没有人等待时接收端已被丢弃，忽略即可
            let _ = tx.send(RunCompletion {
                direction,
                sequence_id: my_id,
                was_canceled,
                newer_run_active,
                fault: result.err(),
            });
        });

        RunHandle {
            direction,
            sequence_id: my_id,
            receiver: rx,
        }
    }
}
