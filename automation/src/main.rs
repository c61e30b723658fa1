mod actions;
mod ai;
mod cancel;
mod config;
mod input;
mod pipeline;
mod window;

use crate::ai::GeminiClassifier;
use crate::cancel::{CancelToken, SystemClock};
use crate::config::RunConfig;
use crate::input::EnigoInput;
use crate::window::GameWindow;
use anyhow::{Result, bail};
use clap::Parser;
use gemini::GeminiConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// SWGOH 日常流程执行器。
#[derive(Parser, Debug)]
#[command(name = "swgoh", version, about)]
struct Cli {
    /// 流程名称：morning、evening、fleet-first、fleet-second
    routine: String,

    /// 要执行的步骤编号（从 1 开始），省略时按顺序执行全部步骤
    steps: Vec<usize>,

    /// 配置文件路径，默认读取当前目录下的 automation.json（如存在）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 只列出流程中的步骤，不执行
    #[arg(long)]
    list: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

const USAGE: &str = "用法：swgoh <morning|evening|fleet-first|fleet-second> [步骤编号...] [--config PATH] [--list]";

/// CLI 入口：解析参数、加载配置、运行前检查，然后倒计时并执行选中的步骤。
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("错误：{err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "swgoh=debug,vision=debug,gemini=debug"
    } else {
        "swgoh=info,vision=info,gemini=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let config = RunConfig::load(cli.config.as_deref())?;
    let issues = config.validate();
    if !issues.is_empty() {
        bail!("配置无效：\n  - {}", issues.join("\n  - "));
    }

    let routine = match pipeline::resolve_routine(&cli.routine, &config) {
        Ok(routine) => routine,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            return Ok(2);
        }
    };
    if cli.list {
        println!("{}", routine.describe());
        return Ok(0);
    }

    let selection = match routine.select(&cli.steps) {
        Ok(selection) => selection,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            println!("{}", routine.describe());
            return Ok(2);
        }
    };

    let api_key = config::api_key(|name| std::env::var(name).ok());
    for warning in pipeline::preflight(&routine, &selection, &config, api_key.as_deref())? {
        tracing::warn!("{warning}");
    }

    let classifier = match api_key {
        Some(key) if config.ai_enabled && routine.uses_ai(&selection) => {
            Some(GeminiClassifier::new(
                GeminiConfig::new(key)
                    .with_model(config.gemini_model.as_str())
                    .with_timeout(config.ai_timeout()),
            ))
        }
        _ => None,
    };

    let cancel = CancelToken::new();
    cancel.install_ctrlc()?;

    let mut screen = GameWindow::new(config.window.clone());
    let mut input = EnigoInput::new()?;
    let mut clock = SystemClock;

    let start = Instant::now();
    let mut ctx = pipeline::RunCtx::new(
        &config,
        &mut screen,
        &mut input,
        &mut clock,
        cancel.clone(),
    );
    if let Some(classifier) = &classifier {
        ctx = ctx.with_classifier(classifier);
    }

    let report = routine.execute(&selection, &mut ctx)?;
    println!("{report}");
    println!("总耗时: {:?}", start.elapsed());

    Ok(u8::try_from(report.exit_code()).unwrap_or(1))
}
