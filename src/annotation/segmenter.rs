//! 文本切分与注音
//!
//! 把文本切成汉字段和非汉字段，再把汉字段交给注音器转换为 (字, 读音) 序列。

use std::fmt;
use std::str::FromStr;

use pinyin::ToPinyin;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classifier::is_target_char;

/// 注音错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// 注音库查不到读音或内部出错
    #[error("注音失败: {0}")]
    LookupFailed(String),

    /// 注音库返回空结果
    #[error("注音结果为空")]
    EmptyResult,
}

/// 连续同类字符组成的片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    pub text: String,
    pub is_target_script: bool,
}

/// 一个字及其读音
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneticUnit {
    pub glyph: String,
    pub reading: String,
}

impl PhoneticUnit {
    pub fn new(glyph: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            reading: reading.into(),
        }
    }
}

/// 按字符类别切分文本
///
/// 片段按原顺序拼接即得到原文。
pub fn split_runs(text: &str) -> Vec<ScriptRun> {
    let mut runs: Vec<ScriptRun> = Vec::new();

    for c in text.chars() {
        let target = is_target_char(c);
        match runs.last_mut() {
            Some(run) if run.is_target_script == target => run.text.push(c),
            _ => runs.push(ScriptRun {
                text: c.to_string(),
                is_target_script: target,
            }),
        }
    }

    runs
}

/// 注音器接口：字符串 → 有序的 (字, 读音) 序列
pub trait Phoneticizer {
    fn phoneticize(&self, text: &str) -> Result<Vec<PhoneticUnit>, AnnotationError>;
}

impl<F> Phoneticizer for F
where
    F: Fn(&str) -> Result<Vec<PhoneticUnit>, AnnotationError>,
{
    fn phoneticize(&self, text: &str) -> Result<Vec<PhoneticUnit>, AnnotationError> {
        self(text)
    }
}

/// 调用注音器，失败或结果为空时返回 `None`，调用方应把该片段保留为纯文本
pub fn phoneticize<P: Phoneticizer + ?Sized>(
    phoneticizer: &P,
    run_text: &str,
) -> Option<Vec<PhoneticUnit>> {
    match phoneticizer.phoneticize(run_text) {
        Ok(units) if !units.is_empty() => Some(units),
        Ok(_) => {
            tracing::debug!("注音结果为空，保留原文: {}", run_text);
            None
        }
        Err(e) => {
            tracing::debug!("注音失败，保留原文 {}: {}", run_text, e);
            None
        }
    }
}

/// 声调的表示方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneStyle {
    /// 声调符号，如 `nǐ`
    #[default]
    Marks,
    /// 数字声调，如 `ni3`
    Numbers,
    /// 不带声调，如 `ni`
    Plain,
}

impl FromStr for ToneStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "marks" | "mark" | "tone" => Ok(ToneStyle::Marks),
            "numbers" | "number" | "num" => Ok(ToneStyle::Numbers),
            "plain" | "none" => Ok(ToneStyle::Plain),
            _ => Err(format!(
                "无效的声调样式 '{}'，可选: marks, numbers, plain",
                s
            )),
        }
    }
}

impl fmt::Display for ToneStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToneStyle::Marks => "marks",
            ToneStyle::Numbers => "numbers",
            ToneStyle::Plain => "plain",
        };
        write!(f, "{}", name)
    }
}

/// 基于 `pinyin` crate 的注音器，每个字一个单位
///
/// 查不到读音的字给出空读音，由调用方输出为纯文本。
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinPhoneticizer {
    tone_style: ToneStyle,
}

impl PinyinPhoneticizer {
    pub fn new(tone_style: ToneStyle) -> Self {
        Self { tone_style }
    }
}

impl Phoneticizer for PinyinPhoneticizer {
    fn phoneticize(&self, text: &str) -> Result<Vec<PhoneticUnit>, AnnotationError> {
        if text.is_empty() {
            return Err(AnnotationError::EmptyResult);
        }

        let units = text
            .chars()
            .map(|c| {
                let reading = match c.to_pinyin() {
                    Some(p) => match self.tone_style {
                        ToneStyle::Marks => p.with_tone(),
                        ToneStyle::Numbers => p.with_tone_num_end(),
                        ToneStyle::Plain => p.plain(),
                    },
                    None => "",
                };
                PhoneticUnit::new(c.to_string(), reading)
            })
            .collect();

        Ok(units)
    }
}
