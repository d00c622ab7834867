//! # Traits 模块
//!
//! 属性级动画目标接口，以及内容视图使用的可视状态。
//!
//! - `Animatable`: 引擎通过属性名读写 f32 值
//! - `VisualState`: 透明度 + 缩放变换，使用 `RefCell` 实现内部可变性

use std::cell::RefCell;

/// 透明度属性名
pub const OPACITY: &str = "opacity";
/// X 缩放属性名
pub const SCALE_X: &str = "scale_x";
/// Y 缩放属性名
pub const SCALE_Y: &str = "scale_y";

/// 可动画对象接口
///
/// 对象通过实现此 trait 声明自己有哪些属性可以被动画引擎驱动。
/// 引擎只认识属性名和 f32 值，不假设对象类型。
pub trait Animatable: 'static {
    /// 获取属性的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在，返回当前值
    /// - `None`: 属性不存在
    fn get_property(&self, property_id: &str) -> Option<f32>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 属性不存在或设置失败
    fn set_property(&self, property_id: &str, value: f32) -> bool;

    /// 获取所有可动画属性的列表
    fn property_list(&self) -> &'static [&'static str];
}

/// 可视状态的内部数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualData {
    /// 透明度 (0.0 - 1.0)
    pub opacity: f32,
    /// X 缩放
    pub scale_x: f32,
    /// Y 缩放
    pub scale_y: f32,
}

impl Default for VisualData {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// 内容的实时可视状态
///
/// 初始为完全不透明、单位缩放，即不经动画直接显示时的样子。
#[derive(Debug, Default)]
pub struct VisualState {
    inner: RefCell<VisualData>,
}

impl VisualState {
    /// 支持的属性列表
    pub const PROPERTIES: &'static [&'static str] = &[OPACITY, SCALE_X, SCALE_Y];

    /// 创建默认可视状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前快照
    pub fn snapshot(&self) -> VisualData {
        *self.inner.borrow()
    }

    /// 获取当前透明度
    pub fn opacity(&self) -> f32 {
        self.inner.borrow().opacity
    }

    /// 获取当前缩放 (x, y)
    pub fn scale(&self) -> (f32, f32) {
        let data = self.inner.borrow();
        (data.scale_x, data.scale_y)
    }
}

impl Animatable for VisualState {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        let data = self.inner.borrow();
        match property_id {
            OPACITY => Some(data.opacity),
            SCALE_X => Some(data.scale_x),
            SCALE_Y => Some(data.scale_y),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        let mut data = self.inner.borrow_mut();
        match property_id {
            OPACITY => {
                data.opacity = value.clamp(0.0, 1.0);
                true
            }
            SCALE_X => {
                data.scale_x = value;
                true
            }
            SCALE_Y => {
                data.scale_y = value;
                true
            }
            _ => false,
        }
    }

    fn property_list(&self) -> &'static [&'static str] {
        Self::PROPERTIES
    }
}
