//! 配置管理器
//!
//! 加载顺序：`.env` 文件、配置文件（TOML 或 JSON）、环境变量覆盖，最后校验

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::constants;
use crate::annotation::ToneStyle;
use crate::core::{ToolError, ToolResult};
use crate::toggle::state::TranslateLang;

/// 注音配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnotationSettings {
    pub tone_style: ToneStyle,
}

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub api_url: String,
    pub source_lang: String,
    pub target_lang: TranslateLang,
    pub min_target_chars: usize,
    pub cache_size: usize,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            target_lang: TranslateLang::default(),
            min_target_chars: constants::DEFAULT_MIN_TARGET_CHARS,
            cache_size: constants::DEFAULT_CACHE_SIZE,
        }
    }
}

/// 状态存储配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StateSettings {
    pub state_file: String,
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            state_file: constants::DEFAULT_STATE_FILE.to_string(),
        }
    }
}

impl StateSettings {
    /// 展开 `~` 后的状态文件路径
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_file).as_ref())
    }
}

/// 工具配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    pub annotation: AnnotationSettings,
    pub translation: TranslationSettings,
    pub state: StateSettings,
}

impl ToolConfig {
    /// 验证配置
    pub fn validate(&self) -> ToolResult<()> {
        let api_url = self.translation.api_url.trim();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ToolError::Config(format!(
                "API 地址必须以 http:// 或 https:// 开头: {}",
                api_url
            )));
        }

        if self.translation.source_lang.trim().is_empty() {
            return Err(ToolError::Config("源语言不能为空".to_string()));
        }

        if self.translation.min_target_chars == 0 {
            return Err(ToolError::Config("最少汉字数不能为0".to_string()));
        }

        if self.translation.cache_size == 0 {
            return Err(ToolError::Config("缓存大小不能为0".to_string()));
        }

        if self.state.state_file.trim().is_empty() {
            return Err(ToolError::Config("状态文件路径不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖，只处理已设置的变量
    pub fn apply_env_overrides(&mut self) -> ToolResult<()> {
        use crate::env::{annotation, state, translation, EnvVar};

        if let Some(tone_style) = annotation::ToneStyle::lookup() {
            self.annotation.tone_style = tone_style?;
        }

        if let Some(api_url) = translation::ApiUrl::lookup() {
            self.translation.api_url = api_url?;
            tracing::info!("环境变量覆盖 API URL: {}", self.translation.api_url);
        }

        if let Some(source_lang) = translation::SourceLang::lookup() {
            self.translation.source_lang = source_lang?;
        }

        if let Some(target_lang) = translation::TargetLang::lookup() {
            self.translation.target_lang = target_lang?;
        }

        if let Some(min_chars) = translation::MinTargetChars::lookup() {
            self.translation.min_target_chars = min_chars?;
        }

        if let Some(cache_size) = translation::CacheSize::lookup() {
            self.translation.cache_size = cache_size?;
        }

        if let Some(state_file) = state::StateFile::lookup() {
            self.state.state_file = state_file?;
        }

        Ok(())
    }
}

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ToolConfig,
}

impl ConfigManager {
    /// 从指定文件或默认位置加载配置
    pub fn load(path: Option<&Path>) -> ToolResult<Self> {
        Self::load_dotenv();

        let source = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ToolError::Config(format!(
                        "配置文件不存在: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => Self::find_config_file(),
        };

        let mut config = match &source {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                tracing::debug!("未找到配置文件，使用默认配置");
                ToolConfig::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(Self { config })
    }

    pub fn into_config(self) -> ToolConfig {
        self.config
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &Path) -> ToolResult<ToolConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ToolError::Config(format!("读取配置文件失败: {}", e)))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| ToolError::Config(format!("解析JSON配置失败: {}", e)))
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> ToolResult<()> {
        let content = toml::to_string_pretty(&ToolConfig::default())?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| ToolError::Config(format!("写入配置文件失败: {}", e)))?;

        tracing::info!("已生成示例配置: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ToolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.translation.min_target_chars, 5);
        assert_eq!(config.translation.target_lang, TranslateLang::Ja);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ToolConfig = toml::from_str(
            r#"
            [annotation]
            tone_style = "numbers"

            [translation]
            min_target_chars = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.annotation.tone_style, ToneStyle::Numbers);
        assert_eq!(config.translation.min_target_chars, 3);
        assert_eq!(config.translation.api_url, constants::DEFAULT_API_URL);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ToolConfig::default();
        config.translation.api_url = "translate.example.com".to_string();
        assert!(matches!(config.validate(), Err(ToolError::Config(_))));

        let mut config = ToolConfig::default();
        config.translation.cache_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pinyin-tool.toml");

        ConfigManager::generate_example_config(&path).unwrap();
        let loaded = ConfigManager::load_from_file(&path).unwrap();

        assert_eq!(loaded, ToolConfig::default());
    }

    #[test]
    fn test_json_config_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"translation": {"target_lang": "en"}}"#).unwrap();

        let loaded = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.translation.target_lang, TranslateLang::En);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let error = ConfigManager::load(Some(Path::new("/nonexistent/pinyin-tool.toml")))
            .unwrap_err();
        assert!(matches!(error, ToolError::Config(_)));
    }
}
