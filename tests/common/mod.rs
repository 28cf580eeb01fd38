// 集成测试公共模块
//
// 提供 HTML 样例、DOM 辅助函数和测试用的翻译器与存储

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use markup5ever_rcdom::{Handle, RcDom};
use tokio::sync::Semaphore;

use pinyin_tool::annotation::{AnnotationError, PhoneticUnit};
use pinyin_tool::parsers::html::{
    find_elements, get_body_node, get_node_attr, has_node_attr, html_to_dom, serialize_children,
    text_content, ANNOTATION_ATTR, TRANSLATION_ATTR,
};
use pinyin_tool::toggle::{StateError, StateStore, StoredState, TranslateLang};
use pinyin_tool::translation::{
    ParagraphTranslator, RemoteTranslator, SentencePair, TranslateParagraphResponse,
    TranslationError, TranslationResult,
};

/// 混合了注音排除区域、页面自带 ruby 和多种块的样例文档
pub const MIXED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>测试页面</title><style>.x { content: "汉字"; }</style></head>
<body>
<h1>中文标题测试内容</h1>
<p>我爱北京。天气很好！</p>
<p>Hello 你好 World, 这是<b>混合</b>内容。</p>
<ul><li>列表里的中文句子。</li><li>short</li></ul>
<p><ruby>漢<rt>hàn</rt></ruby>字已经有注音了。</p>
<textarea>输入框里的文字</textarea>
<script>var s = "脚本里的汉字";</script>
<div><p>嵌套段落中的文字。</p></div>
</body>
</html>"#;

/// DOM 辅助函数
pub struct Dom;

impl Dom {
    pub fn parse(html: &str) -> (RcDom, Handle) {
        let dom = html_to_dom(html.as_bytes(), "utf-8").expect("解析测试 HTML");
        let body = get_body_node(&dom).expect("测试 HTML 缺少 body");
        (dom, body)
    }

    pub fn html(root: &Handle) -> String {
        serialize_children(root).expect("序列化")
    }

    pub fn text(root: &Handle) -> String {
        text_content(root)
    }

    pub fn annotation_regions(root: &Handle) -> usize {
        find_elements(root, |n| has_node_attr(n, ANNOTATION_ATTR)).len()
    }

    pub fn translation_markers(root: &Handle) -> usize {
        find_elements(root, |n| has_node_attr(n, TRANSLATION_ATTR)).len()
    }

    pub fn markers_of_kind(root: &Handle, kind: &str) -> usize {
        find_elements(root, |n| get_node_attr(n, TRANSLATION_ATTR).as_deref() == Some(kind)).len()
    }
}

/// 每个字给出固定读音的注音器
pub fn fixed_reader(text: &str) -> Result<Vec<PhoneticUnit>, AnnotationError> {
    Ok(text.chars().map(|c| PhoneticUnit::new(c, "pin")).collect())
}

/// 总是失败的注音器
pub fn broken_reader(text: &str) -> Result<Vec<PhoneticUnit>, AnnotationError> {
    Err(AnnotationError::LookupFailed(text.to_string()))
}

pub type Reader = fn(&str) -> Result<Vec<PhoneticUnit>, AnnotationError>;

/// 按句返回编号译文的翻译器
#[derive(Default)]
pub struct NumberingTranslator {
    pub calls: Cell<usize>,
}

impl ParagraphTranslator for NumberingTranslator {
    async fn translate_paragraph(&self, text: &str, lang: TranslateLang) -> TranslateParagraphResponse {
        self.calls.set(self.calls.get() + 1);
        TranslateParagraphResponse::success(numbered_pairs(text, lang))
    }
}

pub fn numbered_pairs(text: &str, lang: TranslateLang) -> Vec<SentencePair> {
    let parts: Vec<&str> = text.split('\n').collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, original)| SentencePair {
            original: original.to_string(),
            translated: if i == last {
                format!("{}-{}", lang, i + 1)
            } else {
                format!("{}-{}\n", lang, i + 1)
            },
        })
        .collect()
}

/// 固定返回给定句子的翻译器
pub struct FixedTranslator {
    pub sentences: Vec<&'static str>,
}

impl ParagraphTranslator for FixedTranslator {
    async fn translate_paragraph(&self, text: &str, _lang: TranslateLang) -> TranslateParagraphResponse {
        TranslateParagraphResponse::success(vec![SentencePair {
            original: text.to_string(),
            translated: self.sentences.join("\n"),
        }])
    }
}

/// 在放行之前一直挂起的翻译器，用来模拟迟到的结果
pub struct GatedTranslator {
    gate: Semaphore,
}

impl GatedTranslator {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
        }
    }

    pub fn open(&self, requests: usize) {
        self.gate.add_permits(requests);
    }
}

impl ParagraphTranslator for GatedTranslator {
    async fn translate_paragraph(&self, text: &str, lang: TranslateLang) -> TranslateParagraphResponse {
        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return TranslateParagraphResponse::failure("gate closed"),
        }
        TranslateParagraphResponse::success(numbered_pairs(text, lang))
    }
}

/// 后台使用的远程翻译替身
#[derive(Default)]
pub struct StubRemote {
    pub calls: Cell<usize>,
    pub failures: RefCell<HashMap<String, String>>,
}

impl StubRemote {
    pub fn fail_on(self, text: &str, error: &str) -> Self {
        self.failures
            .borrow_mut()
            .insert(text.to_string(), error.to_string());
        self
    }
}

impl RemoteTranslator for StubRemote {
    async fn translate(&self, text: &str, lang: TranslateLang) -> TranslationResult<Vec<SentencePair>> {
        self.calls.set(self.calls.get() + 1);
        if let Some(error) = self.failures.borrow().get(text) {
            return Err(TranslationError::NetworkError(error.clone()));
        }
        Ok(numbered_pairs(text, lang))
    }
}

/// 读写都失败的存储
pub struct BrokenStore;

impl StateStore for BrokenStore {
    fn load(&self) -> Result<StoredState, StateError> {
        Err(StateError::Unavailable("磁盘不可用".to_string()))
    }

    fn save(&self, _patch: &StoredState) -> Result<(), StateError> {
        Err(StateError::Unavailable("磁盘不可用".to_string()))
    }
}
