//! 汉字判定
//!
//! 目标文字为 CJK 统一表意文字及其扩展区：基本区、扩展 A、扩展 B、扩展 C/D。

/// 目标文字的码位区间（闭区间）
pub const TARGET_RANGES: &[(u32, u32)] = &[
    (0x4E00, 0x9FFF),
    (0x3400, 0x4DBF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B73F),
];

/// 单个字符是否属于目标文字
pub fn is_target_char(c: char) -> bool {
    let code = c as u32;
    TARGET_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code))
}

/// 文本中是否含有目标文字
pub fn contains_target_script(text: &str) -> bool {
    text.chars().any(is_target_char)
}

/// 文本是否非空且全部由目标文字组成
pub fn is_target_script(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_target_char)
}

/// 目标文字字符数
pub fn count_target_chars(text: &str) -> usize {
    text.chars().filter(|&c| is_target_char(c)).count()
}
