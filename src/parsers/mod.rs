//! # 解析器模块
//!
//! 负责 HTML 文档的解析、DOM 操作和序列化。
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM节点操作、序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{get_body_node, html_to_dom, serialize_document};
