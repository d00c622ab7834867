//! # 导航脚本
//!
//! 每行一条指令，`#` 开头为注释：
//!
//! ```text
//! navigate <label> [animated|opaque]   导航到页面（默认 animated）
//! switch <label> [animated|opaque]     切换页面并清空历史
//! back                                 返回上一页
//! clear                                清空内容
//! wait <ms>                            等待
//! detach / attach                      从可视系统卸载 / 挂载
//! ```

use std::time::Duration;

use inout_core::{ControlPhase, LayoutMode};
use tracing::{debug, info};

use crate::error::{NavigationError, ScriptError};
use crate::navigation::{NavigationRegion, PageKind};

/// 脚本指令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate { label: String, kind: PageKind },
    Switch { label: String, kind: PageKind },
    Back,
    Clear,
    Wait(Duration),
    Detach,
    Attach,
}

/// 解析后的脚本
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    /// (行号, 指令)
    pub commands: Vec<(usize, Command)>,
}

impl Script {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// 解析脚本文本
pub fn parse(source: &str) -> Result<Script, ScriptError> {
    let mut commands = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut words = text.split_whitespace();
        let Some(name) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        let command = match name {
            "navigate" | "switch" => {
                expect_at_most(line, name, &args, 2)?;
                let label = required(line, name, &args, 0, "label")?.to_string();
                let kind = match args.get(1) {
                    Some(value) => {
                        value
                            .parse::<PageKind>()
                            .map_err(|message| ScriptError::InvalidParameter {
                                line,
                                param: "kind".to_string(),
                                message,
                            })?
                    }
                    None => PageKind::default(),
                };
                if name == "navigate" {
                    Command::Navigate { label, kind }
                } else {
                    Command::Switch { label, kind }
                }
            }
            "wait" => {
                expect_at_most(line, name, &args, 1)?;
                let value = required(line, name, &args, 0, "ms")?;
                let ms = value
                    .parse::<u64>()
                    .map_err(|e| ScriptError::InvalidParameter {
                        line,
                        param: "ms".to_string(),
                        message: e.to_string(),
                    })?;
                Command::Wait(Duration::from_millis(ms))
            }
            "back" | "clear" | "detach" | "attach" => {
                expect_at_most(line, name, &args, 0)?;
                match name {
                    "back" => Command::Back,
                    "clear" => Command::Clear,
                    "detach" => Command::Detach,
                    _ => Command::Attach,
                }
            }
            other => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    command: other.to_string(),
                });
            }
        };
        commands.push((line, command));
    }

    Ok(Script { commands })
}

fn required<'a>(
    line: usize,
    command: &str,
    args: &[&'a str],
    index: usize,
    param: &str,
) -> Result<&'a str, ScriptError> {
    args.get(index)
        .copied()
        .ok_or_else(|| ScriptError::MissingParameter {
            line,
            command: command.to_string(),
            param: param.to_string(),
        })
}

fn expect_at_most(line: usize, command: &str, args: &[&str], max: usize) -> Result<(), ScriptError> {
    match args.get(max) {
        Some(extra) => Err(ScriptError::UnexpectedArgument {
            line,
            command: command.to_string(),
            extra: extra.to_string(),
        }),
        None => Ok(()),
    }
}

/// 执行脚本
///
/// `Manual` 布局下每条指令之后模拟一次布局遍历。
pub async fn execute(script: &Script, region: &mut NavigationRegion) -> Result<(), NavigationError> {
    for (line, command) in &script.commands {
        debug!(line, command = ?command, "执行指令");
        match command {
            Command::Navigate { label, kind } => region.navigate(label, *kind),
            Command::Switch { label, kind } => region.switch(label, *kind),
            Command::Back => region.back()?,
            Command::Clear => region.clear(),
            Command::Wait(duration) => tokio::time::sleep(*duration).await,
            Command::Detach => {
                info!("卸载控件");
                region.control().detach();
            }
            Command::Attach => {
                info!("挂载控件");
                region.control().attach();
            }
        }
        layout_pass(region);
    }
    Ok(())
}

/// 等待控件回到空闲
///
/// 控件已卸载时立即返回：挂起的过渡要等到再次挂载才会处理。
pub async fn settle(region: &NavigationRegion, poll: Duration) {
    loop {
        layout_pass(region);
        let control = region.control();
        if !control.is_attached()
            || (control.phase() == ControlPhase::Idle && !control.needs_arrange())
        {
            return;
        }
        tokio::time::sleep(poll).await;
    }
}

fn layout_pass(region: &NavigationRegion) {
    let control = region.control();
    if control.layout_mode() == LayoutMode::Manual
        && control.is_attached()
        && control.needs_arrange()
    {
        control.arrange();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let script = parse(
            "# 演示\n\
             navigate home\n\
             navigate about opaque\n\
             \n\
             wait 250\n\
             back\n\
             switch game animated\n\
             detach\n\
             clear\n\
             attach\n",
        )
        .unwrap();

        assert_eq!(script.len(), 8);
        assert_eq!(
            script.commands[0],
            (
                2,
                Command::Navigate {
                    label: "home".to_string(),
                    kind: PageKind::Animated
                }
            )
        );
        assert_eq!(
            script.commands[1].1,
            Command::Navigate {
                label: "about".to_string(),
                kind: PageKind::Opaque
            }
        );
        assert_eq!(script.commands[2], (5, Command::Wait(Duration::from_millis(250))));
        assert_eq!(script.commands[3].1, Command::Back);
        assert_eq!(script.commands[7].1, Command::Attach);
    }

    #[test]
    fn test_unknown_command() {
        let err = parse("navigate home\njump away").unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownCommand {
                line: 2,
                command: "jump".to_string()
            }
        );
    }

    #[test]
    fn test_missing_and_invalid_parameters() {
        assert!(matches!(
            parse("navigate"),
            Err(ScriptError::MissingParameter { line: 1, .. })
        ));
        assert!(matches!(
            parse("wait soon"),
            Err(ScriptError::InvalidParameter { line: 1, .. })
        ));
        assert!(matches!(
            parse("navigate home fancy"),
            Err(ScriptError::InvalidParameter { .. })
        ));
        assert!(matches!(
            parse("back now"),
            Err(ScriptError::UnexpectedArgument { .. })
        ));
    }

    #[test]
    fn test_error_message_has_line() {
        let err = parse("\n\nwait").unwrap_err();
        assert_eq!(err.to_string(), "第 3 行：指令 'wait' 缺少参数 'ms'");
    }
}
