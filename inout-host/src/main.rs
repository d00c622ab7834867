//! # inout-host
//!
//! 按导航脚本驱动内容过渡控件，并在日志中输出每个过渡完成事件。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p inout-host
//! cargo run -p inout-host -- --script demo.nav --verbose
//! cargo run -p inout-host -- --config config.json
//! ```

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use inout_core::{FrameClockEngine, InOutContentControl, LocalDispatcher};
use inout_host::{DEMO_SCRIPT, HostConfig, NavigationRegion, Script, script};
use tokio::task::LocalSet;
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "inout-host")]
#[command(about = "内容进入/退出过渡演示")]
#[command(version)]
struct Cli {
    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 导航脚本（覆盖配置文件）
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// 输出 debug 日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 先读取配置以确定日志级别，回退原因在日志初始化之后再输出
    let loaded = HostConfig::try_load(&cli.config);
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        loaded
            .as_ref()
            .ok()
            .and_then(|config| config.max_level().ok())
            .unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = HostConfig::or_default(&cli.config, loaded);
    if let Some(path) = cli.script {
        config.script_path = Some(path);
    }
    config.validate()?;

    let source = match &config.script_path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("读取脚本失败: {}", path.display()))?,
        None => DEMO_SCRIPT.to_string(),
    };
    let script = script::parse(&source)?;
    info!(commands = script.len(), "脚本解析完成");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    LocalSet::new().block_on(&runtime, play(config, script))
}

async fn play(config: HostConfig, script: Script) -> anyhow::Result<()> {
    let transition = config.transition;
    let dispatcher = Rc::new(LocalDispatcher::new());
    let engine = Rc::new(FrameClockEngine::new(transition.frame_interval()));
    let control = InOutContentControl::new(dispatcher.clone(), transition.layout);
    let mut events = control.subscribe();

    let logger = tokio::task::spawn_local(async move {
        let mut count = 0usize;
        while let Some(event) = events.recv().await {
            count += 1;
            info!(
                old = event.old.as_ref().map(|c| c.label()).unwrap_or("-"),
                new = event.new.as_ref().map(|c| c.label()).unwrap_or("-"),
                success = event.success,
                superseded = event.superseded,
                "过渡完成"
            );
        }
        count
    });

    let poll = transition.frame_interval();
    let mut region = NavigationRegion::new(control, engine, dispatcher, transition);
    region.control().attach();

    script::execute(&script, &mut region).await?;
    script::settle(&region, poll).await;

    // 控件释放后订阅通道关闭，日志任务随之结束
    drop(region);
    let count = logger.await?;
    info!(events = count, "演示结束");
    Ok(())
}
