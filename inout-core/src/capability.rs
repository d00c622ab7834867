//! # Capability 模块
//!
//! 内容可选实现的"进入/退出动画"能力，以及槽位中保存的内容引用。
//!
//! 内容要么是可动画的（实现 `InOutAnimation`），要么是不透明直通的。
//! 能力在构造 `ContentRef` 时确定，之后协调器只做一次枚举匹配。

use std::any::Any;
use std::rc::Rc;

use crate::cancel::CancelHandle;
use crate::runner::RunHandle;

/// 进入/退出动画能力
///
/// 实现方必须允许在同一实例上一次运行尚未结束时再次调用 `run_*`：
/// 调用时先取消该实例上仍在执行的进入和退出动画。
pub trait InOutAnimation {
    /// 当前进入动画的取消句柄
    fn in_cancellation(&self) -> Option<CancelHandle>;

    /// 启动（或重启）进入动画
    ///
    /// 返回 `None` 表示动画为空操作。
    fn run_in_animation(&self) -> Option<RunHandle>;

    /// 当前退出动画的取消句柄
    fn out_cancellation(&self) -> Option<CancelHandle>;

    /// 启动（或重启）退出动画
    fn run_out_animation(&self) -> Option<RunHandle>;

    /// 请求取消两个方向上的当前动画
    fn cancel_all(&self) {
        if let Some(cancel) = self.out_cancellation() {
            cancel.cancel();
        }
        if let Some(cancel) = self.in_cancellation() {
            cancel.cancel();
        }
    }
}

/// 内容标识（基于引用地址）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(usize);

/// 内容能力
#[derive(Clone)]
pub enum Capability {
    /// 支持进入/退出动画
    Animated(Rc<dyn InOutAnimation>),
    /// 不支持动画，直接显示/隐藏
    Opaque,
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Animated(_) => write!(f, "Animated"),
            Capability::Opaque => write!(f, "Opaque"),
        }
    }
}

/// 内容引用
///
/// 协调器不拥有内容的生命周期，只持有一个共享引用。
/// 相等性基于引用标识，而不是内容值。
#[derive(Clone)]
pub struct ContentRef {
    object: Rc<dyn Any>,
    capability: Capability,
    label: Rc<str>,
}

impl ContentRef {
    /// 包装一个可动画内容
    pub fn animated<T: InOutAnimation + 'static>(label: impl Into<Rc<str>>, content: Rc<T>) -> Self {
        Self {
            capability: Capability::Animated(content.clone()),
            object: content,
            label: label.into(),
        }
    }

    /// 包装一个不透明内容
    pub fn opaque<T: 'static>(label: impl Into<Rc<str>>, content: Rc<T>) -> Self {
        Self {
            object: content,
            capability: Capability::Opaque,
            label: label.into(),
        }
    }

    /// 内容标识
    pub fn id(&self) -> ContentId {
        ContentId(Rc::as_ptr(&self.object) as *const () as usize)
    }

    /// 显示名称（仅用于日志与调试）
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 内容能力
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// 动画能力（不透明内容返回 `None`）
    pub fn as_in_out(&self) -> Option<&Rc<dyn InOutAnimation>> {
        match &self.capability {
            Capability::Animated(animation) => Some(animation),
            Capability::Opaque => None,
        }
    }

    /// 是否可动画
    pub fn is_animated(&self) -> bool {
        matches!(self.capability, Capability::Animated(_))
    }

    /// 取回具体类型
    pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
        self.object.clone().downcast::<T>().ok()
    }
}

impl PartialEq for ContentRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ContentRef {}

impl std::fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRef")
            .field("label", &self.label)
            .field("capability", &self.capability)
            .finish()
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page;

    struct NoopAnimation;

    impl InOutAnimation for NoopAnimation {
        fn in_cancellation(&self) -> Option<CancelHandle> {
            None
        }
        fn run_in_animation(&self) -> Option<RunHandle> {
            None
        }
        fn out_cancellation(&self) -> Option<CancelHandle> {
            None
        }
        fn run_out_animation(&self) -> Option<RunHandle> {
            None
        }
    }

    #[test]
    fn test_identity_equality() {
        let page = Rc::new(Page);
        let a = ContentRef::opaque("a", page.clone());
        let a_again = ContentRef::opaque("renamed", page);
        let b = ContentRef::opaque("a", Rc::new(Page));

        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_eq!(a.id(), a_again.id());
    }

    #[test]
    fn test_capability_resolution() {
        let opaque = ContentRef::opaque("page", Rc::new(Page));
        assert!(!opaque.is_animated());
        assert!(opaque.as_in_out().is_none());

        let animated = ContentRef::animated("view", Rc::new(NoopAnimation));
        assert!(animated.is_animated());
        assert!(animated.as_in_out().is_some());
        assert_eq!(animated.label(), "view");
        assert_eq!(format!("{:?}", animated.capability()), "Animated");
    }

    #[test]
    fn test_downcast() {
        let view = Rc::new(NoopAnimation);
        let content = ContentRef::animated("view", view.clone());
        let back = content.downcast::<NoopAnimation>().unwrap();
        assert!(Rc::ptr_eq(&back, &view));
        assert!(content.downcast::<Page>().is_none());
    }

    #[test]
    fn test_zero_sized_contents_are_distinct() {
        // 零大小类型的 Rc 仍然各自分配，标识不会碰撞
        let a = ContentRef::opaque("a", Rc::new(Page));
        let b = ContentRef::opaque("b", Rc::new(Page));
        assert_ne!(a.id(), b.id());
    }
}
