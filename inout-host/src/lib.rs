//! # inout-host
//!
//! 无界面宿主：读取配置，按导航脚本驱动过渡控件，并输出每个完成事件。

pub mod config;
pub mod error;
pub mod navigation;
pub mod script;

pub use config::HostConfig;
pub use error::{HostConfigError, NavigationError, ScriptError};
pub use navigation::{NavigationRegion, NavigationStack, PageKind, StaticPage};
pub use script::{Command, Script};

/// 内置演示脚本
pub const DEMO_SCRIPT: &str = include_str!("../assets/demo.nav");
