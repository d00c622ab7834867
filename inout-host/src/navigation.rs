//! # 导航
//!
//! 区域导航：页面按标签注册，导航时把页面赋给过渡控件。

use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use inout_core::{
    AnimatedView, AnimationEngine, ContentRef, InOutContentControl, TransitionConfig,
    UiDispatcher,
};
use tracing::{info, warn};

use crate::error::NavigationError;

/// 导航栈管理器
///
/// 用于管理页面的返回逻辑，例如：
/// - 从 home 打开 settings，返回时回到 home
/// - switch 到新页面时清空历史
#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
    stack: Vec<String>,
    current: Option<String>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前页面
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// 导航到新页面（将当前页面压入栈）
    ///
    /// 已经在该页面时返回 false。
    pub fn navigate_to(&mut self, label: &str) -> bool {
        if self.current.as_deref() == Some(label) {
            return false;
        }
        if let Some(current) = self.current.replace(label.to_string()) {
            self.stack.push(current);
        }
        true
    }

    /// 直接切换页面（不压栈，并清空历史）
    pub fn switch_to(&mut self, label: &str) {
        self.stack.clear();
        self.current = Some(label.to_string());
    }

    /// 返回上一个页面
    pub fn go_back(&mut self) -> Option<&str> {
        let previous = self.stack.pop()?;
        self.current = Some(previous);
        self.current.as_deref()
    }

    /// 清空历史与当前页面
    pub fn reset(&mut self) {
        self.stack.clear();
        self.current = None;
    }

    /// 检查是否可以返回
    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty()
    }

    /// 获取栈深度
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// 页面类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageKind {
    /// 带进入/退出动画
    #[default]
    Animated,
    /// 没有动画能力，直接切换
    Opaque,
}

impl FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animated" => Ok(PageKind::Animated),
            "opaque" => Ok(PageKind::Opaque),
            other => Err(format!("未知页面类型 '{other}'，可选 animated / opaque")),
        }
    }
}

/// 没有动画能力的静态页面
#[derive(Debug)]
pub struct StaticPage;

struct Page {
    kind: PageKind,
    content: ContentRef,
}

/// 导航区域
///
/// 持有一个过渡控件，页面首次被引用时按类型创建并缓存，
/// 之后同一标签总是得到同一个内容引用。
pub struct NavigationRegion {
    control: InOutContentControl,
    stack: NavigationStack,
    pages: HashMap<String, Page>,
    engine: Rc<dyn AnimationEngine>,
    dispatcher: Rc<dyn UiDispatcher>,
    config: TransitionConfig,
}

impl NavigationRegion {
    pub fn new(
        control: InOutContentControl,
        engine: Rc<dyn AnimationEngine>,
        dispatcher: Rc<dyn UiDispatcher>,
        config: TransitionConfig,
    ) -> Self {
        Self {
            control,
            stack: NavigationStack::new(),
            pages: HashMap::new(),
            engine,
            dispatcher,
            config,
        }
    }

    /// 过渡控件
    pub fn control(&self) -> &InOutContentControl {
        &self.control
    }

    /// 导航栈
    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// 获取或创建页面
    ///
    /// 已注册的页面保持原类型。
    pub fn page(&mut self, label: &str, kind: PageKind) -> ContentRef {
        if let Some(page) = self.pages.get(label) {
            if page.kind != kind {
                warn!(label, registered = ?page.kind, requested = ?kind, "页面已按其他类型注册");
            }
            return page.content.clone();
        }

        let content = match kind {
            PageKind::Animated => {
                let view = Rc::new(AnimatedView::new(
                    label,
                    self.engine.clone(),
                    self.dispatcher.clone(),
                    self.config.clone(),
                ));
                AnimatedView::content_ref(&view)
            }
            PageKind::Opaque => ContentRef::opaque(label, Rc::new(StaticPage)),
        };
        self.pages.insert(
            label.to_string(),
            Page {
                kind,
                content: content.clone(),
            },
        );
        content
    }

    /// 已注册页面的动画视图
    pub fn view(&self, label: &str) -> Option<Rc<AnimatedView>> {
        self.pages.get(label)?.content.downcast::<AnimatedView>()
    }

    /// 导航到页面
    pub fn navigate(&mut self, label: &str, kind: PageKind) {
        let page = self.page(label, kind);
        if !self.stack.navigate_to(label) {
            info!(label, "已经在该页面");
            return;
        }
        info!(label, depth = self.stack.depth(), "导航");
        self.control.set_content(Some(page));
    }

    /// 切换到页面并清空历史
    pub fn switch(&mut self, label: &str, kind: PageKind) {
        let page = self.page(label, kind);
        self.stack.switch_to(label);
        info!(label, "切换页面");
        self.control.set_content(Some(page));
    }

    /// 返回上一个页面
    pub fn back(&mut self) -> Result<(), NavigationError> {
        let label = self
            .stack
            .go_back()
            .ok_or(NavigationError::EmptyHistory)?
            .to_string();
        let page = self
            .pages
            .get(&label)
            .map(|page| page.content.clone())
            .ok_or_else(|| NavigationError::UnknownPage {
                label: label.clone(),
            })?;
        info!(label = %label, depth = self.stack.depth(), "返回");
        self.control.set_content(Some(page));
        Ok(())
    }

    /// 清空区域内容
    pub fn clear(&mut self) {
        self.stack.reset();
        info!("清空页面");
        self.control.set_content(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_stack() {
        let mut nav = NavigationStack::new();
        assert_eq!(nav.current(), None);

        assert!(nav.navigate_to("home"));
        assert_eq!(nav.depth(), 0);
        assert!(nav.navigate_to("settings"));
        assert_eq!(nav.current(), Some("settings"));
        assert_eq!(nav.depth(), 1);
        assert!(nav.can_go_back());

        assert_eq!(nav.go_back(), Some("home"));
        assert!(!nav.can_go_back());
        assert_eq!(nav.go_back(), None);
        assert_eq!(nav.current(), Some("home"));
    }

    #[test]
    fn test_no_duplicate_push() {
        let mut nav = NavigationStack::new();
        nav.navigate_to("home");
        assert!(!nav.navigate_to("home"));
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_switch_clears_history() {
        let mut nav = NavigationStack::new();
        nav.navigate_to("home");
        nav.navigate_to("settings");
        nav.switch_to("game");
        assert_eq!(nav.current(), Some("game"));
        assert!(!nav.can_go_back());

        nav.reset();
        assert_eq!(nav.current(), None);
    }

    #[test]
    fn test_page_kind_from_str() {
        assert_eq!("animated".parse::<PageKind>(), Ok(PageKind::Animated));
        assert_eq!("opaque".parse::<PageKind>(), Ok(PageKind::Opaque));
        assert!("fancy".parse::<PageKind>().is_err());
    }
}
