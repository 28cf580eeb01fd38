//! 句子切分
//!
//! 在句末标点（`。！？`）之后断句，发送给翻译服务时用换行连接，服务端按位置保留
//! 换行，返回后再按换行拆开。这种对齐只是尽力而为，调用方必须先比较句子数量。

use std::sync::OnceLock;

use regex::Regex;

use super::service::SentencePair;

/// 句末标点
pub const TERMINAL_PUNCTUATION: &[char] = &['。', '！', '？'];

/// 发送请求时连接句子的分隔符
pub const SENTENCE_DELIMITER: &str = "\n";

static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn sentence_regex() -> &'static Regex {
    SENTENCE_RE.get_or_init(|| Regex::new(r"[^。！？]*[。！？]").expect("sentence regex"))
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// 字符是否为句末标点
pub fn is_terminal(c: char) -> bool {
    TERMINAL_PUNCTUATION.contains(&c)
}

/// 把空白压缩成单个空格并去掉首尾空白，保证句子内部不含分隔符
fn squash(text: &str) -> String {
    whitespace_regex().replace_all(text, " ").trim().to_string()
}

/// 把干净文本切成句子
///
/// 少于两句时整段作为一个单位返回。
pub fn split(clean_text: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut last = 0;

    for m in sentence_regex().find_iter(clean_text) {
        parts.push(squash(m.as_str()));
        last = m.end();
    }
    parts.push(squash(&clean_text[last..]));
    parts.retain(|part| !part.is_empty());

    if parts.len() < 2 {
        let whole = squash(clean_text);
        return if whole.is_empty() { Vec::new() } else { vec![whole] };
    }

    parts
}

/// 用分隔符连接句子，作为一次请求的文本
pub fn join(sentences: &[String]) -> String {
    sentences.join(SENTENCE_DELIMITER)
}

/// 按分隔符拆开译文，去掉空片段
pub fn split_response(text: &str) -> Vec<String> {
    text.split(SENTENCE_DELIMITER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// 把服务返回的句对还原为与请求对应的译文列表
///
/// 先拼接全部译文再按分隔符拆开；数量不符但服务返回的句对本身与请求一一对应时，
/// 直接使用句对。两者都不符时原样返回拆分结果，由插入方走整块回退。
pub fn sentences_from_response(pairs: &[SentencePair], expected: usize) -> Vec<String> {
    let combined: String = pairs.iter().map(|pair| pair.translated.as_str()).collect();
    let pieces = split_response(&combined);

    if pieces.len() == expected {
        return pieces;
    }

    if pairs.len() == expected {
        let aligned: Vec<String> = pairs
            .iter()
            .map(|pair| squash(&pair.translated))
            .collect();
        if aligned.iter().all(|text| !text.is_empty()) {
            return aligned;
        }
    }

    tracing::debug!(
        "译文句子数 {} 与请求句子数 {} 不一致",
        pieces.len(),
        expected
    );
    pieces
}

/// 译文与请求句子的对齐结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alignment {
    /// 每个请求句子对应一条译文
    Aligned(Vec<String>),
    /// 数量不一致，携带去掉分隔符后的合并译文
    Mismatch(String),
}

/// 按请求句子数对齐服务返回的句对
pub fn align(expected: usize, pairs: &[SentencePair]) -> Alignment {
    let translated = sentences_from_response(pairs, expected);
    if translated.len() == expected {
        Alignment::Aligned(translated)
    } else {
        Alignment::Mismatch(combine(&translated))
    }
}

/// 合并译文用于整块回退，去掉分隔符
pub fn combine(translated: &[String]) -> String {
    translated
        .iter()
        .map(|text| squash(&text.replace(SENTENCE_DELIMITER, " ")))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
