//! 开关状态与持久化
//!
//! 持久化记录是一个扁平的 JSON 对象 `{pinyinEnabled, translateEnabled, translateLang}`。
//! 读取时只有缺失的键才使用默认值，写入时按键合并。

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// 状态读写错误
#[derive(Error, Debug)]
pub enum StateError {
    #[error("状态文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("状态文件格式错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("不支持的目标语言: {0}")]
    UnsupportedLang(String),

    #[error("状态存储不可用: {0}")]
    Unavailable(String),
}

pub type StateResult<T> = Result<T, StateError>;

/// 翻译目标语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslateLang {
    #[default]
    Ja,
    En,
}

impl TranslateLang {
    /// 请求翻译服务时使用的语言代码
    pub fn code(&self) -> &'static str {
        match self {
            TranslateLang::Ja => "ja",
            TranslateLang::En => "en",
        }
    }

    /// 状态摘要里显示的名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TranslateLang::Ja => "日本語",
            TranslateLang::En => "English",
        }
    }
}

impl fmt::Display for TranslateLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TranslateLang {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ja" => Ok(TranslateLang::Ja),
            "en" => Ok(TranslateLang::En),
            other => Err(StateError::UnsupportedLang(other.to_string())),
        }
    }
}

/// 持久化记录，每个键都可能缺失
///
/// 无法识别的值按缺失处理，不影响其他键。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pinyin_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub translate_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub translate_lang: Option<TranslateLang>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(value) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!("忽略无法识别的状态值 {}: {}", value, e);
            Ok(None)
        }
    }
}

impl StoredState {
    /// 只为缺失的键补默认值
    pub fn apply_defaults(&self) -> ToggleState {
        let defaults = ToggleState::default();
        ToggleState {
            pinyin_enabled: self.pinyin_enabled.unwrap_or(defaults.pinyin_enabled),
            translate_enabled: self.translate_enabled.unwrap_or(defaults.translate_enabled),
            translate_lang: self.translate_lang.unwrap_or(defaults.translate_lang),
        }
    }

    /// 用 `patch` 中存在的键覆盖当前记录
    pub fn merge(&mut self, patch: &StoredState) {
        if patch.pinyin_enabled.is_some() {
            self.pinyin_enabled = patch.pinyin_enabled;
        }
        if patch.translate_enabled.is_some() {
            self.translate_enabled = patch.translate_enabled;
        }
        if patch.translate_lang.is_some() {
            self.translate_lang = patch.translate_lang;
        }
    }

    pub fn pinyin(enabled: bool) -> Self {
        Self {
            pinyin_enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn translation(enabled: bool, lang: TranslateLang) -> Self {
        Self {
            translate_enabled: Some(enabled),
            translate_lang: Some(lang),
            ..Self::default()
        }
    }
}

/// 进程内的开关状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleState {
    pub pinyin_enabled: bool,
    pub translate_enabled: bool,
    pub translate_lang: TranslateLang,
}

impl ToggleState {
    /// 完整记录，用于首次安装时写入默认值
    pub fn to_stored(&self) -> StoredState {
        StoredState {
            pinyin_enabled: Some(self.pinyin_enabled),
            translate_enabled: Some(self.translate_enabled),
            translate_lang: Some(self.translate_lang),
        }
    }

    /// 面向用户的状态摘要
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.pinyin_enabled {
            lines.push("拼音: 表示中".to_string());
        }
        if self.translate_enabled {
            lines.push(format!("翻訳: 表示中（{}）", self.translate_lang.display_name()));
        }
        if lines.is_empty() {
            lines.push("すべて無効".to_string());
        }
        lines
    }
}

/// 偏好存储
pub trait StateStore {
    /// 读取原始记录
    fn load(&self) -> StateResult<StoredState>;

    /// 按键合并写入
    fn save(&self, patch: &StoredState) -> StateResult<()>;

    /// 读取并补全默认值
    fn load_state(&self) -> StateResult<ToggleState> {
        Ok(self.load()?.apply_defaults())
    }
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn load(&self) -> StateResult<StoredState> {
        (**self).load()
    }

    fn save(&self, patch: &StoredState) -> StateResult<()> {
        (**self).save(patch)
    }
}

/// 基于 JSON 文件的存储
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> StateResult<StoredState> {
        if !self.path.exists() {
            tracing::debug!("状态文件不存在，使用默认状态: {}", self.path.display());
            return Ok(StoredState::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoredState::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, patch: &StoredState) -> StateResult<()> {
        let mut stored = self.load()?;
        stored.merge(patch);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;

        tracing::debug!("状态已保存: {}", self.path.display());
        Ok(())
    }
}

/// 内存存储，主要用于测试
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: RefCell<StoredState>,
}

impl MemoryStore {
    pub fn new(stored: StoredState) -> Self {
        Self {
            stored: RefCell::new(stored),
        }
    }

    pub fn snapshot(&self) -> StoredState {
        self.stored.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> StateResult<StoredState> {
        Ok(self.stored.borrow().clone())
    }

    fn save(&self, patch: &StoredState) -> StateResult<()> {
        self.stored.borrow_mut().merge(patch);
        Ok(())
    }
}
