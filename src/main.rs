//! Stringflow 命令行入口
//!
//! 子命令对应库的几条主要路径：整模块翻译、单条目添加、
//! 文件夹列表、排除规则诊断和示例配置生成。

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stringflow::config::constants;
use stringflow::orchestrator::{ProgressSink, RunStage};
use stringflow::{
    AndroidModule, ConfigManager, ResourceFilter, Settings, TranslateError, TranslateResult,
    TranslationOrchestrator,
};

#[derive(Parser)]
#[command(
    name = "stringflow",
    version,
    about = "批量翻译 Android 字符串资源的命令行工具"
)]
struct Cli {
    /// 指定配置文件路径（默认按搜索路径查找）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 把模块的源字符串翻译到多个目标语言
    Translate {
        /// 资源根目录（res/）
        #[arg(long)]
        res_dir: PathBuf,

        /// 目标语言代码，逗号分隔（如 vi,ja,ko）
        #[arg(long, value_delimiter = ',', required = true)]
        languages: Vec<String>,

        /// 模块名，仅用于日志展示
        #[arg(long, default_value = "app")]
        module: String,
    },

    /// 向多个 values 文件夹添加或更新单个字符串
    Add {
        #[arg(long)]
        res_dir: PathBuf,

        /// 条目名
        #[arg(long)]
        name: String,

        /// 源语言文本
        #[arg(long)]
        text: String,

        /// 目标文件夹，逗号分隔（如 values,values-vi）；
        /// 省略时使用模块里通过过滤的全部文件夹
        #[arg(long, value_delimiter = ',')]
        folders: Vec<String>,
    },

    /// 列出通过限定符过滤的 values 文件夹
    Folders {
        #[arg(long)]
        res_dir: PathBuf,
    },

    /// 诊断某个名字是否会被排除规则过滤
    Check {
        name: String,

        /// 按文件夹名检查（默认按字符串名检查）
        #[arg(long)]
        folder: bool,
    },

    /// 生成示例配置文件
    InitConfig {
        #[arg(long, default_value = "stringflow.toml")]
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if e.is_cancelled() {
            eprintln!("翻译任务已取消");
            std::process::exit(130);
        }
        eprintln!("错误: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> TranslateResult<()> {
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Translate {
            res_dir,
            languages,
            module,
        } => translate_module(&settings, &res_dir, &module, &languages),
        Command::Add {
            res_dir,
            name,
            text,
            folders,
        } => add_string(&settings, &res_dir, &name, &text, folders),
        Command::Folders { res_dir } => list_folders(&res_dir),
        Command::Check { name, folder } => check_exclusion(&name, folder),
        Command::InitConfig { path } => init_config(&path),
    }
}

fn load_settings(config: Option<&std::path::Path>) -> TranslateResult<Settings> {
    let manager = match config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.settings().clone())
}

fn translate_module(
    settings: &Settings,
    res_dir: &std::path::Path,
    module_name: &str,
    languages: &[String],
) -> TranslateResult<()> {
    let filter = ResourceFilter::new();
    let module = AndroidModule::from_res_dir(module_name, res_dir, &filter)?;

    let (sink, events) = ProgressSink::channel();
    let orchestrator =
        TranslationOrchestrator::from_settings(settings)?.with_progress(sink);

    // 进度消费线程：把结构化事件渲染成日志行
    let printer = std::thread::spawn(move || {
        for event in events {
            let language = event.language.as_deref().unwrap_or("-");
            match event.stage {
                RunStage::Partitioning => {
                    tracing::info!("[{}] 划分批次", language);
                }
                RunStage::Dispatching => {
                    if let Some(index) = event.batch_index {
                        tracing::debug!("[{}] 批次 {} 分发", language, index + 1);
                    }
                }
                RunStage::Collecting => {
                    if let Some(index) = event.batch_index {
                        tracing::info!(
                            "[{}] 批次 {} 完成 ({:.0}%)",
                            language,
                            index + 1,
                            event.percent
                        );
                    }
                }
                RunStage::Merging => tracing::info!("[{}] 合并写入", language),
                RunStage::Done => tracing::info!("[{}] 完成", language),
                RunStage::Cancelled => tracing::warn!("运行被取消"),
            }
        }
    });

    let report = orchestrator.translate_module(&module, languages);
    drop(orchestrator);
    let _ = printer.join();

    let report = report?;

    let failed = report.failed();
    if !failed.is_empty() {
        for (language, error) in &failed {
            eprintln!("语言 {language} 失败: {error}");
        }
        let succeeded = report.succeeded();
        if !succeeded.is_empty() {
            eprintln!("已完成的语言: {}", succeeded.join(", "));
        }
        return Err(TranslateError::Config(format!(
            "{} 个语言翻译失败",
            failed.len()
        )));
    }

    println!("全部 {} 个语言翻译完成", report.succeeded().len());
    Ok(())
}

fn add_string(
    settings: &Settings,
    res_dir: &std::path::Path,
    name: &str,
    text: &str,
    folders: Vec<String>,
) -> TranslateResult<()> {
    let filter = ResourceFilter::new();
    let module = AndroidModule::from_res_dir("app", res_dir, &filter)?;

    let folders = if folders.is_empty() {
        module.value_folders.clone()
    } else {
        folders
    };

    let orchestrator = TranslationOrchestrator::from_settings(settings)?;
    orchestrator.add_string(&module, name, text, &folders)?;

    println!("条目 {name} 已写入 {} 个文件夹", folders.len());
    Ok(())
}

fn list_folders(res_dir: &std::path::Path) -> TranslateResult<()> {
    let filter = ResourceFilter::new();
    let folders = filter.filtered_values_folders(res_dir)?;

    if folders.is_empty() {
        println!("没有通过过滤的 values 文件夹");
        return Ok(());
    }

    for folder in folders {
        println!("{folder}");
    }
    Ok(())
}

fn check_exclusion(name: &str, is_folder: bool) -> TranslateResult<()> {
    let filter = ResourceFilter::new();
    let check = filter.test_exclusion(name, is_folder);

    if check.excluded {
        println!("{name} 会被排除，命中的模式:");
        for pattern in check.matched_patterns {
            println!("  {pattern}");
        }
    } else {
        println!("{name} 不会被排除（共 {} 条规则）", filter.pattern_count());
    }
    Ok(())
}

fn init_config(path: &std::path::Path) -> TranslateResult<()> {
    ConfigManager::generate_example_config(&path.to_string_lossy())?;
    println!("已生成示例配置文件: {}", path.display());
    println!("提示: 在 api_keys 中填入凭证，或设置环境变量 {}", constants::CREDENTIAL_ENV_VARS[0]);
    Ok(())
}
