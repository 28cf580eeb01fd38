//! 拼音注音模块
//!
//! - **classifier**: 汉字码位判定
//! - **segmenter**: 汉字/非汉字切分与注音器接口
//! - **scanner**: 带排除策略的文本节点扫描
//! - **engine**: 可逆的 ruby 注音变换

pub mod classifier;
pub mod engine;
pub mod scanner;
pub mod segmenter;

pub use classifier::{contains_target_script, count_target_chars, is_target_char, is_target_script};
pub use engine::{AnnotationEngine, AnnotationReport};
pub use scanner::{scan, ExclusionPolicy, TreeScanner};
pub use segmenter::{
    phoneticize, split_runs, AnnotationError, PhoneticUnit, Phoneticizer, PinyinPhoneticizer,
    ScriptRun, ToneStyle,
};
