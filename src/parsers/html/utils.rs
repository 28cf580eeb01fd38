/// 拼音注音区域的标记属性
pub const ANNOTATION_ATTR: &str = "data-pinyin-added";

/// 翻译区域的标记属性（行内译文、整块译文和加载占位共用）
pub const TRANSLATION_ATTR: &str = "data-pinyin-translation";

/// 翻译标记属性的取值
pub const TRANSLATION_INLINE: &str = "inline";
pub const TRANSLATION_BLOCK: &str = "block";
pub const TRANSLATION_LOADING: &str = "loading";

/// 译文节点和加载占位使用的 class
pub const TRANSLATION_CLASS: &str = "pinyin-tool-translation";
pub const LOADING_CLASS: &str = "pinyin-tool-loading";

/// 文本不会被扫描的父元素
pub const SKIP_PARENT_TAGS: &[&str] = &["script", "style", "noscript", "textarea", "input"];

/// 翻译收集时整棵子树跳过的元素
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript"];

/// 可以作为翻译单位的块级元素
pub const BLOCK_TAGS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "td", "th", "dd", "dt", "blockquote",
    "figcaption", "caption", "div", "article", "section",
];

/// 标签是否属于跳过列表（大小写不敏感）
pub fn is_tag_in(tag: &str, list: &[&str]) -> bool {
    list.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
}
