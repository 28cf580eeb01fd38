//! 翻译块收集器
//!
//! 按文档顺序找出可翻译的块级元素，并计算去掉拼音读音和已有译文之后的干净文本。
//! 含有嵌套块的容器只计算嵌套块之外的文本，嵌套块各自成为候选。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

use super::splitter;
use crate::annotation::classifier::count_target_chars;
use crate::config::constants;
use crate::parsers::html::utils::{is_tag_in, BLOCK_TAGS, NON_CONTENT_TAGS};
use crate::parsers::html::{
    closest, find_elements, get_node_name, get_parent_node, has_node_attr, ANNOTATION_ATTR,
    TRANSLATION_ATTR,
};

/// 一个待翻译的块
#[derive(Debug, Clone)]
pub struct TranslationBlock {
    /// 块元素
    pub container: Handle,
    /// 去掉读音和译文后的文本
    pub clean_text: String,
    /// 切分后的句子
    pub sentence_parts: Vec<String>,
    /// 嵌套的块元素，不属于本块的文本
    pub nested: Vec<Handle>,
}

impl TranslationBlock {
    /// 本块自身的可见文本节点
    pub fn text_nodes(&self) -> Vec<Handle> {
        visible_text_nodes(&self.container, &self.nested)
    }

    /// 发送给翻译服务的文本
    pub fn request_text(&self) -> String {
        splitter::join(&self.sentence_parts)
    }
}

/// 收集器配置
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 最少汉字数
    pub min_target_chars: usize,
    /// 块级标签
    pub block_tags: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            min_target_chars: constants::DEFAULT_MIN_TARGET_CHARS,
            block_tags: BLOCK_TAGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 翻译块收集器
#[derive(Debug, Clone, Default)]
pub struct TranslationBlockCollector {
    config: CollectorConfig,
}

impl TranslationBlockCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn with_min_chars(min_target_chars: usize) -> Self {
        Self::new(CollectorConfig {
            min_target_chars,
            ..CollectorConfig::default()
        })
    }

    /// 收集 `root` 下的翻译块
    pub fn collect(&self, root: &Handle) -> Vec<TranslationBlock> {
        let candidates = find_elements(root, |node| self.is_block(node));
        let total = candidates.len();

        let blocks: Vec<TranslationBlock> = candidates
            .into_iter()
            .filter(|element| self.is_candidate(element))
            .filter_map(|container| {
                let nested = find_elements(&container, |n| {
                    !Rc::ptr_eq(n, &container) && self.is_block(n)
                });
                if has_own_marker(&container, &nested) {
                    return None;
                }

                let clean_text = clean_text(&container, &nested);
                if count_target_chars(&clean_text) < self.config.min_target_chars {
                    return None;
                }
                let sentence_parts = splitter::split(&clean_text);
                Some(TranslationBlock {
                    container,
                    clean_text,
                    sentence_parts,
                    nested,
                })
            })
            .collect();

        tracing::debug!("翻译块收集: {} 个候选，{} 个合格", total, blocks.len());
        blocks
    }

    fn is_block(&self, node: &Handle) -> bool {
        get_node_name(node).is_some_and(|tag| {
            self.config
                .block_tags
                .iter()
                .any(|block| block.eq_ignore_ascii_case(tag))
        })
    }

    fn is_candidate(&self, element: &Handle) -> bool {
        // 自身或祖先是译文区域
        if closest(element, |n| has_node_attr(n, TRANSLATION_ATTR)).is_some() {
            return false;
        }

        // 位于 script/style/noscript 之内
        closest(element, |n| {
            get_node_name(n).is_some_and(|tag| is_tag_in(tag, NON_CONTENT_TAGS))
        })
        .is_none()
    }
}

/// 嵌套块之外是否已有译文或加载占位
fn has_own_marker(container: &Handle, nested: &[Handle]) -> bool {
    find_elements(container, |n| has_node_attr(n, TRANSLATION_ATTR))
        .iter()
        .any(|marker| !within_any(marker, nested))
}

fn within_any(node: &Handle, roots: &[Handle]) -> bool {
    roots
        .iter()
        .any(|root| closest(node, |n| Rc::ptr_eq(n, root)).is_some())
}

/// 块内可见文本节点：跳过拼音读音、译文区域、非内容元素和 `nested` 子树
pub fn visible_text_nodes(container: &Handle, nested: &[Handle]) -> Vec<Handle> {
    let mut nodes = Vec::new();
    let mut stack = vec![container.clone()];

    while let Some(node) = stack.pop() {
        match node.data {
            NodeData::Text { .. } => nodes.push(node.clone()),
            NodeData::Element { ref name, .. } => {
                let tag = name.local.as_ref();
                if has_node_attr(&node, TRANSLATION_ATTR)
                    || is_tag_in(tag, NON_CONTENT_TAGS)
                    || nested.iter().any(|block| Rc::ptr_eq(block, &node))
                    || (tag == "rt" && is_reading(&node))
                {
                    continue;
                }
                for child in node.children.borrow().iter().rev() {
                    stack.push(child.clone());
                }
            }
            _ => {}
        }
    }

    nodes
}

/// 块的干净文本
pub fn clean_text(container: &Handle, nested: &[Handle]) -> String {
    visible_text_nodes(container, nested)
        .iter()
        .filter_map(crate::parsers::html::get_text)
        .collect()
}

/// `rt` 是否为本工具生成的读音
fn is_reading(rt: &Handle) -> bool {
    get_parent_node(rt).is_some_and(|parent| has_node_attr(&parent, ANNOTATION_ATTR))
}
