use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::core::ToolResult;

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> ToolResult<RcDom> {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.to_string()
        }
        None => String::from_utf8_lossy(data).to_string(),
    };

    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())?;

    Ok(dom)
}

/// 查找 `<html><body>` 节点
pub fn get_body_node(dom: &RcDom) -> Option<Handle> {
    let html = get_child_node_by_name(&dom.document, "html")?;
    get_child_node_by_name(&html, "body")
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 按文档顺序查找满足条件的元素
pub fn find_elements<F>(root: &Handle, predicate: F) -> Vec<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut found = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if matches!(node.data, NodeData::Element { .. }) && predicate(&node) {
            found.push(node.clone());
        }
        for child in node.children.borrow().iter().rev() {
            stack.push(child.clone());
        }
    }

    found
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 判断节点是否带有指定属性
pub fn has_node_attr(node: &Handle, attr_name: &str) -> bool {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .any(|attr| &*attr.name.local == attr_name),
        _ => false,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// rcdom 把父指针存放在 `Cell` 里，读取后必须放回去。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 创建一个游离的 HTML 元素节点
pub fn create_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: StrTendril::from_slice(value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建一个游离的文本节点
pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 文本节点的内容；非文本节点返回 `None`
pub fn get_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 覆盖文本节点的内容
pub fn set_text(node: &Handle, text: &str) {
    if let NodeData::Text { contents } = &node.data {
        *contents.borrow_mut() = StrTendril::from_slice(text);
    }
}

/// 子树内所有文本节点内容按文档顺序拼接
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

/// 子节点在父节点中的位置
pub fn child_index(parent: &Handle, child: &Handle) -> Option<usize> {
    parent
        .children
        .borrow()
        .iter()
        .position(|node| Rc::ptr_eq(node, child))
}

/// 追加子节点
pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 把 `new_node` 插到 `reference` 之后，`reference` 没有父节点时返回 `false`
pub fn insert_after(reference: &Handle, new_node: Handle) -> bool {
    detach(&new_node);
    let Some(parent) = get_parent_node(reference) else {
        return false;
    };
    let Some(index) = child_index(&parent, reference) else {
        return false;
    };

    new_node.parent.set(Some(Rc::downgrade(&parent)));
    parent.children.borrow_mut().insert(index + 1, new_node);
    true
}

/// 用一组节点替换 `old`，保持原有位置
pub fn replace_node(old: &Handle, replacements: Vec<Handle>) -> bool {
    let Some(parent) = get_parent_node(old) else {
        return false;
    };
    let Some(index) = child_index(&parent, old) else {
        return false;
    };

    for node in &replacements {
        detach(node);
        node.parent.set(Some(Rc::downgrade(&parent)));
    }

    let removed: Vec<Handle> = parent
        .children
        .borrow_mut()
        .splice(index..index + 1, replacements)
        .collect();
    for node in removed {
        node.parent.set(None);
    }
    true
}

/// 把节点从父节点上摘下
pub fn detach(node: &Handle) -> bool {
    let Some(parent) = get_parent_node(node) else {
        return false;
    };
    node.parent.set(None);

    let mut children = parent.children.borrow_mut();
    match children.iter().position(|child| Rc::ptr_eq(child, node)) {
        Some(index) => {
            children.remove(index);
            true
        }
        None => false,
    }
}

/// 从节点自身开始向上查找第一个满足条件的元素
pub fn closest<F>(node: &Handle, predicate: F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if matches!(candidate.data, NodeData::Element { .. }) && predicate(&candidate) {
            return Some(candidate);
        }
        current = get_parent_node(&candidate);
    }
    None
}

/// 节点是否仍然挂在某个文档上
pub fn is_attached(node: &Handle) -> bool {
    let mut current = node.clone();
    loop {
        if matches!(current.data, NodeData::Document) {
            return true;
        }
        match get_parent_node(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// 合并相邻文本节点并删除空文本节点，效果等同于 DOM 的 `normalize()`
pub fn normalize(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow().clone();
    let mut merged: Vec<Handle> = Vec::with_capacity(children.len());

    for child in children {
        if let NodeData::Text { ref contents } = child.data {
            if contents.borrow().is_empty() {
                child.parent.set(None);
                continue;
            }
            if let Some(previous) = merged.last() {
                if let NodeData::Text {
                    contents: ref previous_contents,
                } = previous.data
                {
                    previous_contents.borrow_mut().push_slice(&contents.borrow());
                    child.parent.set(None);
                    continue;
                }
            }
        } else {
            normalize(&child);
        }
        merged.push(child);
    }

    *node.children.borrow_mut() = merged;
}

/// 读取 `<meta charset>` 或 `<meta http-equiv="content-type">` 声明的字符集
pub fn get_charset(document: &Handle) -> Option<String> {
    let head = get_child_node_by_name(document, "html")
        .and_then(|html| get_child_node_by_name(&html, "head"))?;

    for meta in find_elements(&head, |node| get_node_name(node) == Some("meta")) {
        if let Some(charset) = get_node_attr(&meta, "charset") {
            return Some(charset.trim().to_string());
        }

        let is_content_type = get_node_attr(&meta, "http-equiv")
            .is_some_and(|value| value.eq_ignore_ascii_case("content-type"));
        if !is_content_type {
            continue;
        }
        if let Some(content) = get_node_attr(&meta, "content") {
            let charset = content.split(';').find_map(|param| {
                let (key, value) = param.split_once('=')?;
                key.trim()
                    .eq_ignore_ascii_case("charset")
                    .then(|| value.trim().trim_matches('"').to_string())
            });
            if charset.is_some() {
                return charset;
            }
        }
    }

    None
}
