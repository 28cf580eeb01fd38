//! 译文插入
//!
//! 把译文按句末标点的位置插回块内。句子数量不一致时，在块末尾追加一个合并译文。
//! 插入位置在调用时根据当前 DOM 决定，之后不再校验。

use std::cell::Cell;

use markup5ever_rcdom::Handle;

use super::collector::TranslationBlock;
use super::splitter::{combine, is_terminal};
use crate::parsers::html::utils::{
    LOADING_CLASS, TRANSLATION_BLOCK, TRANSLATION_CLASS, TRANSLATION_INLINE, TRANSLATION_LOADING,
};
use crate::parsers::html::{
    append_child, closest, create_element, create_text, detach, find_elements, get_text,
    has_node_attr, insert_after, is_attached, normalize, set_text, ANNOTATION_ATTR,
    TRANSLATION_ATTR,
};

/// 一次插入的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// 按标点位置插入 `placed` 条，剩余 `appended` 条追加在块末尾
    Inline { placed: usize, appended: usize },
    /// 数量不一致，追加了一个合并译文
    Fallback,
}

/// 把译文插入块中
pub fn insert(block: &TranslationBlock, translated: &[String]) -> InsertOutcome {
    if translated.len() != block.sentence_parts.len() {
        tracing::debug!(
            "句子数不一致（原文 {}，译文 {}），整块追加译文",
            block.sentence_parts.len(),
            translated.len()
        );
        return insert_fallback(block, &combine(translated));
    }

    let mut remaining = translated.iter();
    let mut placed = 0;

    // 先收集文本节点，插入过程中拆出的尾部节点在循环内继续处理
    'nodes: for node in block.text_nodes() {
        let mut current = node;

        loop {
            let Some(text) = get_text(&current) else {
                break;
            };
            let Some((index, mark)) = text.char_indices().find(|&(_, c)| is_terminal(c)) else {
                break;
            };
            let Some(translation) = remaining.next() else {
                break 'nodes;
            };

            let marker = create_marker(TRANSLATION_INLINE, translation);
            placed += 1;

            // 译文不能进入注音区域内部
            if let Some(region) = closest(&current, |n| has_node_attr(n, ANNOTATION_ATTR)) {
                insert_after(&region, marker);
                break;
            }

            let split_at = index + mark.len_utf8();
            if split_at == text.len() {
                insert_after(&current, marker);
                break;
            }

            let tail = create_text(&text[split_at..]);
            set_text(&current, &text[..split_at]);
            insert_after(&current, tail.clone());
            insert_after(&current, marker);
            current = tail;
        }
    }

    let mut appended = 0;
    for translation in remaining {
        append_child(
            &block.container,
            create_marker(TRANSLATION_INLINE, translation),
        );
        appended += 1;
    }

    InsertOutcome::Inline { placed, appended }
}

/// 在块末尾追加一个合并译文
pub fn insert_fallback(block: &TranslationBlock, combined: &str) -> InsertOutcome {
    append_child(
        &block.container,
        create_marker(TRANSLATION_BLOCK, combined),
    );
    InsertOutcome::Fallback
}

/// 构造译文节点
fn create_marker(kind: &str, text: &str) -> Handle {
    let attrs: &[(&str, &str)] = if kind == TRANSLATION_BLOCK {
        &[
            (TRANSLATION_ATTR, TRANSLATION_BLOCK),
            ("class", TRANSLATION_CLASS),
            ("style", "display:block"),
        ]
    } else {
        &[(TRANSLATION_ATTR, kind), ("class", TRANSLATION_CLASS)]
    };

    let span = create_element("span", attrs);
    append_child(&span, create_text(text));
    span
}

/// 移除 `root` 下所有译文和加载占位，返回移除数量
pub fn remove_all(root: &Handle) -> usize {
    let markers = find_elements(root, |node| has_node_attr(node, TRANSLATION_ATTR));
    let removed = markers.iter().filter(|marker| detach(marker)).count();
    normalize(root);

    tracing::info!("已移除 {} 个译文区域", removed);
    removed
}

/// 翻译进行中的占位节点
///
/// 占位节点是否仍在文档中决定了迟到的结果能否插入；无论成功还是失败，
/// 占位节点都只会被移除一次，`Drop` 时兜底移除。
#[derive(Debug)]
pub struct LoadingMarker {
    node: Handle,
    released: Cell<bool>,
}

impl LoadingMarker {
    /// 在块末尾追加占位节点
    pub fn attach(container: &Handle) -> Self {
        let node = create_element(
            "span",
            &[(TRANSLATION_ATTR, TRANSLATION_LOADING), ("class", LOADING_CLASS)],
        );
        append_child(&node, create_text("…"));
        append_child(container, node.clone());

        Self {
            node,
            released: Cell::new(false),
        }
    }

    /// 占位节点是否仍挂在文档上
    pub fn is_attached(&self) -> bool {
        !self.released.get() && is_attached(&self.node)
    }

    /// 移除占位节点，多次调用只生效一次
    pub fn release(&self) -> bool {
        if self.released.replace(true) {
            return false;
        }
        detach(&self.node)
    }

    pub fn node(&self) -> &Handle {
        &self.node
    }
}

impl Drop for LoadingMarker {
    fn drop(&mut self) {
        self.release();
    }
}
