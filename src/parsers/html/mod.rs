//! HTML解析和处理模块
//!
//! - `utils`: 标记属性、标签列表等常量
//! - `dom`: 基础DOM操作（查找、插入、替换、规范化）
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;
pub mod utils;

pub use dom::{
    append_child, child_index, closest, create_element, create_text, detach, find_elements,
    get_body_node, get_charset, get_child_node_by_name, get_node_attr, get_node_name, get_parent_node,
    get_text, has_node_attr, html_to_dom, insert_after, is_attached, normalize, replace_node,
    set_text, text_content,
};
pub use serializer::{serialize_children, serialize_document};
pub use utils::{ANNOTATION_ATTR, TRANSLATION_ATTR};
