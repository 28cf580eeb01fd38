//! DOM 文本节点扫描器
//!
//! `TreeScanner` 是惰性的单次迭代器，按文档顺序产出通过排除策略的文本节点。
//! 迭代过程中不能修改 DOM：所有会修改 DOM 的调用方都先用 [`scan`] 把候选
//! 节点收集成列表，再逐个处理。

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::utils::SKIP_PARENT_TAGS;
use crate::parsers::html::{get_node_name, get_parent_node, has_node_attr};
use crate::parsers::html::{ANNOTATION_ATTR, TRANSLATION_ATTR};

/// 文本节点的排除策略
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    /// 父元素为这些标签时跳过
    pub skip_parent_tags: Vec<String>,
    /// 任一祖先带有这些属性时跳过
    pub marker_attrs: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            skip_parent_tags: SKIP_PARENT_TAGS.iter().map(|s| s.to_string()).collect(),
            marker_attrs: vec![ANNOTATION_ATTR.to_string(), TRANSLATION_ATTR.to_string()],
        }
    }
}

impl ExclusionPolicy {
    /// 判断文本节点是否应被排除
    pub fn rejects(&self, text_node: &Handle) -> bool {
        let Some(parent) = get_parent_node(text_node) else {
            return true;
        };

        if get_node_name(&parent).is_some_and(|tag| self.skips_tag(tag)) {
            return true;
        }

        let mut current = Some(parent);
        while let Some(node) = current {
            if self.marker_attrs.iter().any(|attr| has_node_attr(&node, attr)) {
                return true;
            }
            current = get_parent_node(&node);
        }

        false
    }

    fn skips_tag(&self, tag: &str) -> bool {
        self.skip_parent_tags
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(tag))
    }
}

/// 惰性文本节点迭代器
pub struct TreeScanner<'a> {
    stack: Vec<Handle>,
    policy: &'a ExclusionPolicy,
}

impl<'a> TreeScanner<'a> {
    pub fn new(root: &Handle, policy: &'a ExclusionPolicy) -> Self {
        Self {
            stack: vec![root.clone()],
            policy,
        }
    }
}

impl Iterator for TreeScanner<'_> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        while let Some(node) = self.stack.pop() {
            match node.data {
                NodeData::Text { .. } => {
                    if !self.policy.rejects(&node) {
                        return Some(node);
                    }
                }
                NodeData::Element { ref name, .. } => {
                    // 被跳过标签或标记属性覆盖的子树里不会有合格节点
                    if self.policy.skips_tag(name.local.as_ref())
                        || self
                            .policy
                            .marker_attrs
                            .iter()
                            .any(|attr| has_node_attr(&node, attr))
                    {
                        continue;
                    }
                    for child in node.children.borrow().iter().rev() {
                        self.stack.push(child.clone());
                    }
                }
                _ => {
                    for child in node.children.borrow().iter().rev() {
                        self.stack.push(child.clone());
                    }
                }
            }
        }
        None
    }
}

/// 收集全部候选文本节点
pub fn scan(root: &Handle, policy: &ExclusionPolicy) -> Vec<Handle> {
    TreeScanner::new(root, policy).collect()
}
