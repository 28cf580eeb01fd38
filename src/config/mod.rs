//! 配置管理模块
//!
//! 支持配置文件、`.env` 文件、环境变量和默认值，命令行参数最后覆盖

pub mod manager;

pub use manager::{AnnotationSettings, ConfigManager, StateSettings, ToolConfig, TranslationSettings};

/// 配置常量
pub mod constants {
    // 翻译块
    pub const DEFAULT_MIN_TARGET_CHARS: usize = 5;

    // 远程翻译
    pub const DEFAULT_API_URL: &str = "https://translate.googleapis.com/translate_a/single";
    pub const DEFAULT_SOURCE_LANG: &str = "zh-CN";

    // 后台翻译缓存条目数
    pub const DEFAULT_CACHE_SIZE: usize = 500;

    // 状态文件
    pub const DEFAULT_STATE_FILE: &str = "~/.config/pinyin-tool/state.json";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "pinyin-tool.toml",
        ".pinyin-tool.toml",
        "pinyin-tool.json",
        "~/.config/pinyin-tool/config.toml",
        "/etc/pinyin-tool/config.toml",
    ];

    // 按顺序尝试加载的 .env 文件
    pub const ENV_FILES: &[&str] = &[".env.local", ".env"];
}
