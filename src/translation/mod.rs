//! 段落翻译模块
//!
//! 采用按职责拆分的结构：
//! - **collector**: 找出可翻译的块并提取干净文本
//! - **splitter**: 按句末标点切分句子并对齐返回的译文
//! - **inserter**: 把译文插回块内，管理加载占位
//! - **job**: 并发请求、校验占位、逐块插入
//! - **service**: 翻译服务接口与远程客户端
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use pinyin_tool::parsers::html::{get_body_node, html_to_dom};
//! use pinyin_tool::toggle::TranslateLang;
//! use pinyin_tool::translation::{InFlight, TranslationBlockCollector, TranslationJob};
//! # use pinyin_tool::translation::ParagraphTranslator;
//!
//! # async fn example<T: ParagraphTranslator>(translator: T) -> Result<(), Box<dyn std::error::Error>> {
//! let dom = html_to_dom("<p>我爱北京。天气很好！</p>".as_bytes(), "utf-8")?;
//! let body = get_body_node(&dom).ok_or("缺少 body")?;
//!
//! let blocks = TranslationBlockCollector::default().collect(&body);
//! let job = TranslationJob::start(blocks, TranslateLang::En, &InFlight::default());
//! let report = job.run(&translator).await;
//! println!("插入 {} 段", report.inserted);
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod error;
pub mod inserter;
pub mod job;
pub mod service;
pub mod splitter;

pub use collector::{clean_text, CollectorConfig, TranslationBlock, TranslationBlockCollector};
pub use error::{TranslationError, TranslationResult};
pub use inserter::{insert, insert_fallback, remove_all, InsertOutcome, LoadingMarker};
pub use job::{InFlight, JobReport, PendingTranslation, ResolveOutcome, TranslationJob};
pub use service::{
    parse_gtx_response, ParagraphTranslator, RemoteTranslator, SentencePair,
    TranslateParagraphResponse,
};
#[cfg(feature = "remote")]
pub use service::GoogleTranslateClient;
pub use splitter::{align, Alignment};
