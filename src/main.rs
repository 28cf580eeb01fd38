//! 命令行入口

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pinyin_tool::config::{ConfigManager, ToolConfig};
use pinyin_tool::env::{core::LogLevel, generate_env_docs, EnvVar};
use pinyin_tool::toggle::{BackgroundRouter, MemoryStore, TransportTranslator};
use pinyin_tool::translation::GoogleTranslateClient;
use pinyin_tool::{process_document, ToneStyle, ToolOptions, ToolResult, TranslateLang};

#[derive(Parser, Debug)]
#[command(
    name = "pinyin-tool",
    version,
    about = "为 HTML 文档中的中文添加拼音注音和译文"
)]
struct Cli {
    /// 输入 HTML 文件，`-` 表示标准输入
    #[arg(required_unless_present_any = ["init_config", "env_docs"])]
    input: Option<String>,

    /// 添加拼音注音
    #[arg(long)]
    pinyin: bool,

    /// 插入译文
    #[arg(long)]
    translate: bool,

    /// 目标语言: ja, en
    #[arg(long)]
    lang: Option<TranslateLang>,

    /// 声调样式: marks, numbers, plain
    #[arg(long)]
    tone: Option<ToneStyle>,

    /// 从状态文件读取开关，忽略 --pinyin/--translate/--lang；省略路径时使用配置中的文件
    #[arg(long, value_name = "FILE")]
    state: Option<Option<PathBuf>>,

    /// 先移除已有的注音和译文
    #[arg(long)]
    strip: bool,

    /// 输入文档的字符编码
    #[arg(short, long)]
    encoding: Option<String>,

    /// 配置文件路径
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 生成示例配置文件后退出
    #[arg(long, value_name = "FILE")]
    init_config: Option<PathBuf>,

    /// 列出支持的环境变量后退出
    #[arg(long)]
    env_docs: bool,

    /// 输出文件，默认写到标准输出
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let level = LogLevel::get().unwrap_or_else(|e| {
        eprintln!("{}，使用 info", e);
        "info".to_string()
    });

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .init();
}

fn run(cli: Cli) -> ToolResult<()> {
    if let Some(path) = &cli.init_config {
        return ConfigManager::generate_example_config(path);
    }
    if cli.env_docs {
        print!("{}", generate_env_docs());
        return Ok(());
    }

    let config = ConfigManager::load(cli.config.as_deref())?.into_config();
    let options = build_options(&cli, &config);
    let input = read_input(cli.input.as_deref().unwrap_or("-"))?;

    let client = GoogleTranslateClient::new(
        &config.translation.api_url,
        &config.translation.source_lang,
    )?;
    let router =
        BackgroundRouter::with_cache_size(MemoryStore::default(), client, config.translation.cache_size);
    let translator = TransportTranslator::new(&router);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (output, report) = runtime.block_on(process_document(&input, &options, &translator))?;

    for line in report.state.status_lines() {
        tracing::info!("{}", line);
    }
    if let Some(translation) = report.translation {
        tracing::info!(
            "翻译: 插入 {}，整块 {}，失败 {}",
            translation.inserted,
            translation.fallback,
            translation.failed
        );
    }

    match &cli.output {
        Some(path) => fs::write(path, output)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&output)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn build_options(cli: &Cli, config: &ToolConfig) -> ToolOptions {
    let mut options = ToolOptions::from_config(config);
    options.pinyin = cli.pinyin;
    options.translate = cli.translate;
    options.strip = cli.strip;
    options.encoding = cli.encoding.clone();
    options.state_file = cli
        .state
        .as_ref()
        .map(|path| path.clone().unwrap_or_else(|| config.state.state_path()));

    if let Some(lang) = cli.lang {
        options.lang = lang;
    }
    if let Some(tone) = cli.tone {
        options.tone_style = tone;
    }
    options
}

fn read_input(target: &str) -> ToolResult<Vec<u8>> {
    if target == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(fs::read(target)?)
}
