//! # Pinyin Tool Library
//!
//! 为 HTML 文档中的中文添加拼音注音，并可在句末插入译文。两种变换都可以完整撤销。
//!
//! ## 模块组织
//!
//! - `annotation` - 汉字识别、切分与 ruby 注音
//! - `translation` - 段落收集、断句、译文插入与远程翻译
//! - `toggle` - 开关状态、消息与控制器
//! - `parsers` - HTML 解析、DOM 操作与序列化
//! - `config` - 配置文件与常量
//! - `env` - 环境变量
//! - `core` - 文档处理入口与错误类型

pub mod annotation;
pub mod config;
pub mod core;
pub mod env;
pub mod parsers;
pub mod toggle;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::core::{parse_document, process_document, ProcessReport, ToolError, ToolOptions, ToolResult};
pub use annotation::{AnnotationEngine, PinyinPhoneticizer, ToneStyle};
pub use toggle::{ToggleController, ToggleState, TranslateLang};
