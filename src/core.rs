//! 文档处理核心
//!
//! 解析 HTML，按期望状态驱动开关控制器执行注音和翻译，再序列化输出。

use std::path::PathBuf;

use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;
use thiserror::Error;

use crate::annotation::{AnnotationEngine, PinyinPhoneticizer, ToneStyle};
use crate::config::{constants, ToolConfig};
use crate::env::EnvError;
use crate::parsers::html::{get_body_node, get_charset, html_to_dom, serialize_document};
use crate::toggle::controller::ToggleController;
use crate::toggle::state::{
    JsonFileStore, MemoryStore, StateError, StateStore, ToggleState, TranslateLang,
};
use crate::translation::collector::TranslationBlockCollector;
use crate::translation::error::TranslationError;
use crate::translation::inserter::remove_all;
use crate::translation::job::JobReport;
use crate::translation::service::ParagraphTranslator;

/// 工具错误类型
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("环境变量错误: {0}")]
    Env(#[from] EnvError),

    #[error("文档错误: {0}")]
    Document(String),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    State(#[from] StateError),
}

impl From<toml::de::Error> for ToolError {
    fn from(error: toml::de::Error) -> Self {
        ToolError::Config(format!("解析TOML配置失败: {}", error))
    }
}

impl From<toml::ser::Error> for ToolError {
    fn from(error: toml::ser::Error) -> Self {
        ToolError::Config(format!("序列化配置失败: {}", error))
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// 文档处理选项
#[derive(Debug, Clone)]
pub struct ToolOptions {
    pub pinyin: bool,
    pub translate: bool,
    pub lang: TranslateLang,
    pub tone_style: ToneStyle,
    pub min_target_chars: usize,
    /// 先移除文档里已有的注音和译文
    pub strip: bool,
    /// 未指定时使用文档声明的字符集，否则按 UTF-8
    pub encoding: Option<String>,
    /// 设置后从该文件读取开关状态，忽略 `pinyin`/`translate`/`lang`
    pub state_file: Option<PathBuf>,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            pinyin: false,
            translate: false,
            lang: TranslateLang::default(),
            tone_style: ToneStyle::default(),
            min_target_chars: constants::DEFAULT_MIN_TARGET_CHARS,
            strip: false,
            encoding: None,
            state_file: None,
        }
    }
}

impl ToolOptions {
    /// 以配置文件为基础的选项
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            lang: config.translation.target_lang,
            tone_style: config.annotation.tone_style,
            min_target_chars: config.translation.min_target_chars,
            ..Self::default()
        }
    }

    fn requested_state(&self) -> ToggleState {
        ToggleState {
            pinyin_enabled: self.pinyin,
            translate_enabled: self.translate,
            translate_lang: self.lang,
        }
    }
}

/// 处理结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub state: ToggleState,
    pub markers_stripped: usize,
    pub translation: Option<JobReport>,
    pub encoding: String,
}

/// 解析文档，优先使用显式指定的编码，其次是文档声明的字符集
pub fn parse_document(input: &[u8], encoding: Option<&str>) -> ToolResult<(RcDom, String)> {
    if let Some(label) = encoding {
        if Encoding::for_label_no_replacement(label.as_bytes()).is_none() {
            return Err(ToolError::Document(format!("未知的字符编码: {}", label)));
        }
        return Ok((html_to_dom(input, label)?, label.to_string()));
    }

    let mut document_encoding = "utf-8".to_string();
    let mut dom = html_to_dom(input, &document_encoding)?;

    if let Some(charset) = get_charset(&dom.document) {
        if let Some(encoding) = Encoding::for_label_no_replacement(charset.as_bytes()) {
            if encoding != encoding_rs::UTF_8 {
                tracing::debug!("按文档声明的字符集重新解析: {}", encoding.name());
                document_encoding = encoding.name().to_string();
                dom = html_to_dom(input, &document_encoding)?;
            }
        }
    }

    Ok((dom, document_encoding))
}

/// 处理一个 HTML 文档
pub async fn process_document<T: ParagraphTranslator>(
    input: &[u8],
    options: &ToolOptions,
    translator: &T,
) -> ToolResult<(Vec<u8>, ProcessReport)> {
    let (dom, encoding) = parse_document(input, options.encoding.as_deref())?;
    let body = get_body_node(&dom)
        .ok_or_else(|| ToolError::Document("文档缺少 body 元素".to_string()))?;

    let engine = AnnotationEngine::new(PinyinPhoneticizer::new(options.tone_style));
    let mut report = ProcessReport {
        encoding: encoding.clone(),
        ..ProcessReport::default()
    };

    if options.strip {
        report.markers_stripped = engine.disable(&body) + remove_all(&body);
    }

    let collector = TranslationBlockCollector::with_min_chars(options.min_target_chars);
    let (state, translation) = match &options.state_file {
        Some(path) => {
            let store = JsonFileStore::new(path);
            let controller = ToggleController::new(body, engine, store).with_collector(collector);
            apply_state(controller, translator).await
        }
        None => {
            let store = MemoryStore::new(options.requested_state().to_stored());
            let controller = ToggleController::new(body, engine, store).with_collector(collector);
            apply_state(controller, translator).await
        }
    };
    report.state = state;
    report.translation = translation;

    let output = serialize_document(&dom, &encoding)?;
    Ok((output, report))
}

async fn apply_state<P, S, T>(
    mut controller: ToggleController<P, S>,
    translator: &T,
) -> (ToggleState, Option<JobReport>)
where
    P: crate::annotation::Phoneticizer,
    S: StateStore,
    T: ParagraphTranslator,
{
    let job = controller.init();
    let translation = match job {
        Some(job) => Some(job.run(translator).await),
        None => None,
    };
    (controller.state(), translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::service::{SentencePair, TranslateParagraphResponse};

    struct Upper;

    impl ParagraphTranslator for Upper {
        async fn translate_paragraph(
            &self,
            text: &str,
            _lang: TranslateLang,
        ) -> TranslateParagraphResponse {
            TranslateParagraphResponse::success(
                text.split('\n')
                    .enumerate()
                    .map(|(i, s)| SentencePair {
                        original: s.to_string(),
                        translated: format!("S{}\n", i + 1),
                    })
                    .collect(),
            )
        }
    }

    #[tokio::test]
    async fn test_process_with_flags() {
        let options = ToolOptions {
            pinyin: true,
            translate: true,
            ..ToolOptions::default()
        };

        let (output, report) = process_document(
            "<p>我爱北京。天气很好！</p>".as_bytes(),
            &options,
            &Upper,
        )
        .await
        .unwrap();
        let html = String::from_utf8(output).unwrap();

        assert!(html.contains("<rt>wǒ</rt>"));
        assert!(html.contains(">S1</span>"));
        assert!(html.contains(">S2</span>"));
        assert_eq!(report.translation.map(|r| r.inserted), Some(1));
        assert!(report.state.pinyin_enabled);
    }

    #[tokio::test]
    async fn test_strip_removes_previous_output() {
        let options = ToolOptions {
            pinyin: true,
            ..ToolOptions::default()
        };
        let (annotated, _) = process_document("<p>你好</p>".as_bytes(), &options, &Upper)
            .await
            .unwrap();

        let strip = ToolOptions {
            strip: true,
            ..ToolOptions::default()
        };
        let (stripped, report) = process_document(&annotated, &strip, &Upper).await.unwrap();

        assert_eq!(report.markers_stripped, 2);
        assert!(String::from_utf8(stripped).unwrap().contains("<p>你好</p>"));
    }

    #[test]
    fn test_declared_charset_is_used() {
        let (encoded, _, _) =
            encoding_rs::GBK.encode("<html><head><meta charset=\"gbk\"></head><body><p>你好</p></body></html>");

        let (dom, encoding) = parse_document(&encoded, None).unwrap();
        let body = get_body_node(&dom).unwrap();

        assert_eq!(encoding, "GBK");
        assert_eq!(crate::parsers::html::text_content(&body), "你好");
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        assert!(matches!(
            parse_document(b"<p>x</p>", Some("no-such-charset")),
            Err(ToolError::Document(_))
        ));
    }
}
