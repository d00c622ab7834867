//! # Cancel 模块
//!
//! 协作式取消句柄。
//!
//! 句柄只是一个请求：引擎在每一帧检查它，或在 `cancelled()` 上等待，
//! 自行提前结束。协调器从不强制终止动画。

use std::cell::Cell;
use std::rc::Rc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: Cell<bool>,
    notify: Notify,
}

/// 取消句柄
///
/// 克隆共享同一个取消状态。只在 UI 调度上下文中使用（`!Send`）。
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Rc<CancelInner>,
}

impl CancelHandle {
    /// 创建未取消的句柄
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消（幂等）
    pub fn cancel(&self) {
        if !self.inner.cancelled.replace(true) {
            self.inner.notify.notify_waiters();
        }
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    /// 等待取消请求
    pub async fn cancelled(&self) {
        loop {
            // 先登记等待者再检查标志，避免错过 notify_waiters
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
