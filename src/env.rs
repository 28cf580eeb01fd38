//! 统一的环境变量管理
//!
//! 提供类型安全、可验证的环境变量访问，所有变量以 `PINYIN_TOOL_` 开头

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::DEFAULT.ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Required environment variable not set".to_string(),
            }),
        }
    }

    /// 只有设置了变量时才返回结果，用于覆盖配置文件中的值
    fn lookup() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PINYIN_TOOL_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 注音相关环境变量
pub mod annotation {
    use super::*;
    use crate::annotation::ToneStyle as Style;

    /// 声调样式
    pub struct ToneStyle;
    impl EnvVar<Style> for ToneStyle {
        const NAME: &'static str = "PINYIN_TOOL_TONE_STYLE";
        const DEFAULT: Option<Style> = Some(Style::Marks);
        const DESCRIPTION: &'static str = "Tone style of readings: marks, numbers, plain";

        fn parse(value: &str) -> EnvResult<Style> {
            value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid tone style '{}'. Use: marks, numbers, plain", value),
            })
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;
    use crate::toggle::state::TranslateLang;

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "PINYIN_TOOL_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::config::constants::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "PINYIN_TOOL_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language code sent to the translation API";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::config::constants::DEFAULT_SOURCE_LANG.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            if lang.is_empty() || lang.contains(char::is_whitespace) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must be a non-empty token".to_string(),
                });
            }
            Ok(lang.to_string())
        }
    }

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<TranslateLang> for TargetLang {
        const NAME: &'static str = "PINYIN_TOOL_TARGET_LANG";
        const DEFAULT: Option<TranslateLang> = Some(TranslateLang::Ja);
        const DESCRIPTION: &'static str = "Translation target language: ja, en";

        fn parse(value: &str) -> EnvResult<TranslateLang> {
            value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Unsupported language '{}'. Use: ja, en", value),
            })
        }
    }

    /// 参与翻译的最少汉字数
    pub struct MinTargetChars;
    impl EnvVar<usize> for MinTargetChars {
        const NAME: &'static str = "PINYIN_TOOL_MIN_TARGET_CHARS";
        const DEFAULT: Option<usize> = Some(crate::config::constants::DEFAULT_MIN_TARGET_CHARS);
        const DESCRIPTION: &'static str = "Minimum Chinese characters for a block to be translated";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1000)
        }
    }

    /// 翻译缓存大小
    pub struct CacheSize;
    impl EnvVar<usize> for CacheSize {
        const NAME: &'static str = "PINYIN_TOOL_CACHE_SIZE";
        const DEFAULT: Option<usize> = Some(crate::config::constants::DEFAULT_CACHE_SIZE);
        const DESCRIPTION: &'static str = "Translation cache size (number of entries)";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100000)
        }
    }
}

/// 状态相关环境变量
pub mod state {
    use super::*;

    /// 状态文件路径
    pub struct StateFile;
    impl EnvVar<String> for StateFile {
        const NAME: &'static str = "PINYIN_TOOL_STATE_FILE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path of the persisted toggle state file";

        fn parse(value: &str) -> EnvResult<String> {
            let path = value.trim();
            if path.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Path cannot be empty".to_string(),
                });
            }
            Ok(shellexpand::tilde(path).into_owned())
        }
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量文档
pub fn generate_env_docs() -> String {
    let entries = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (annotation::ToneStyle::NAME, annotation::ToneStyle::DESCRIPTION),
        (translation::ApiUrl::NAME, translation::ApiUrl::DESCRIPTION),
        (translation::SourceLang::NAME, translation::SourceLang::DESCRIPTION),
        (translation::TargetLang::NAME, translation::TargetLang::DESCRIPTION),
        (translation::MinTargetChars::NAME, translation::MinTargetChars::DESCRIPTION),
        (translation::CacheSize::NAME, translation::CacheSize::DESCRIPTION),
        (state::StateFile::NAME, state::StateFile::DESCRIPTION),
    ];

    let mut docs = String::from("# Environment Variables\n\n");
    for (name, description) in entries {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }
    docs
}
