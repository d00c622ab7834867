//! # Dispatcher 模块
//!
//! UI 调度上下文。
//!
//! 所有槽位修改、内容能力调用以及动画完成回调都在同一个单线程协作式上下文中执行。
//! 调度器在构造时显式传给协调器和视图，而不是进程级单例。

use std::future::Future;

use futures::future::LocalBoxFuture;

/// UI 调度上下文
pub trait UiDispatcher {
    /// 在 UI 上下文中启动一个任务
    ///
    /// 任务在当前调用栈让出之后才会被首次轮询。
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    /// 在 UI 上下文中执行一个回调
    fn post(&self, callback: Box<dyn FnOnce()>) {
        self.spawn(Box::pin(async move { callback() }));
    }
}

/// 基于 tokio `LocalSet` 的调度器
///
/// 必须在 `LocalSet` 内使用（`LocalSet::run_until` 或 `block_on`）。
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDispatcher;

impl LocalDispatcher {
    /// 创建调度器
    pub fn new() -> Self {
        Self
    }
}

impl UiDispatcher for LocalDispatcher {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        // 任务句柄不需要保留：结果通过各自的一次性通道送达
        drop(tokio::task::spawn_local(task));
    }
}

/// 便捷函数：把任意 `'static` future 装箱后交给调度器
pub fn spawn_on<F>(dispatcher: &dyn UiDispatcher, future: F)
where
    F: Future<Output = ()> + 'static,
{
    dispatcher.spawn(Box::pin(future));
}
