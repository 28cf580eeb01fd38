//! 开关控制器
//!
//! 根据外部状态变化驱动拼音和翻译的开启与关闭。状态只在初始化时从存储读取一次，
//! 之后只随显式的切换事件改变，每次改变都写回存储。

use markup5ever_rcdom::Handle;

use super::messaging::{Message, Response};
use super::state::{StateStore, StoredState, ToggleState, TranslateLang};
use crate::annotation::{AnnotationEngine, Phoneticizer};
use crate::translation::collector::TranslationBlockCollector;
use crate::translation::inserter::remove_all;
use crate::translation::job::{InFlight, TranslationJob};

/// 单个功能的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureState {
    #[default]
    Disabled,
    Enabling,
    Enabled,
    Disabling,
}

/// 开关控制器
pub struct ToggleController<P, S> {
    root: Handle,
    engine: AnnotationEngine<P>,
    collector: TranslationBlockCollector,
    store: S,
    state: ToggleState,
    pinyin: FeatureState,
    translation: FeatureState,
    in_flight: InFlight,
}

impl<P: Phoneticizer, S: StateStore> ToggleController<P, S> {
    pub fn new(root: Handle, engine: AnnotationEngine<P>, store: S) -> Self {
        Self {
            root,
            engine,
            collector: TranslationBlockCollector::default(),
            store,
            state: ToggleState::default(),
            pinyin: FeatureState::Disabled,
            translation: FeatureState::Disabled,
            in_flight: InFlight::default(),
        }
    }

    pub fn with_collector(mut self, collector: TranslationBlockCollector) -> Self {
        self.collector = collector;
        self
    }

    /// 读取已保存的状态并应用
    ///
    /// 存储不可用时按默认状态处理。翻译开启时返回需要执行的任务。
    pub fn init(&mut self) -> Option<TranslationJob> {
        self.state = match self.store.load_state() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("读取保存的状态失败，使用默认状态: {}", e);
                ToggleState::default()
            }
        };
        tracing::debug!("初始状态: {:?}", self.state);

        if self.state.pinyin_enabled {
            self.apply_pinyin(true);
        }
        if self.state.translate_enabled {
            return self.start_translation(self.state.translate_lang);
        }
        None
    }

    /// 切换拼音
    pub fn set_pinyin(&mut self, enabled: bool) {
        self.state.pinyin_enabled = enabled;
        self.persist(&StoredState::pinyin(enabled));
        self.apply_pinyin(enabled);
    }

    /// 切换翻译，开启时返回需要执行的任务
    ///
    /// 已开启时换成另一种语言等同于 [`change_language`](Self::change_language)。
    pub fn set_translation(&mut self, enabled: bool, lang: TranslateLang) -> Option<TranslationJob> {
        if enabled && self.state.translate_enabled && lang != self.state.translate_lang {
            return self.change_language(lang);
        }

        self.state.translate_enabled = enabled;
        self.state.translate_lang = lang;
        self.persist(&StoredState::translation(enabled, lang));

        if enabled {
            self.start_translation(lang)
        } else {
            self.stop_translation();
            None
        }
    }

    /// 切换目标语言
    ///
    /// 翻译开启时先同步关闭再重新开启，旧请求的结果会因占位已移除而被丢弃。
    pub fn change_language(&mut self, lang: TranslateLang) -> Option<TranslationJob> {
        if !self.state.translate_enabled {
            self.state.translate_lang = lang;
            self.persist(&StoredState {
                translate_lang: Some(lang),
                ..StoredState::default()
            });
            return None;
        }

        self.set_translation(false, lang);
        self.set_translation(true, lang)
    }

    /// 处理后台转发的消息
    pub fn handle_message(&mut self, message: Message) -> (Response, Option<TranslationJob>) {
        match message {
            Message::TogglePinyin { enabled } => {
                self.set_pinyin(enabled);
                (Response::ack(), None)
            }
            Message::ToggleTranslation { enabled, lang } => {
                let job = self.set_translation(enabled, lang);
                (Response::ack(), job)
            }
            other => {
                tracing::warn!("页面不处理消息: {}", other.kind());
                (Response::rejected(), None)
            }
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn pinyin_state(&self) -> FeatureState {
        self.pinyin
    }

    /// 翻译状态，仍有请求未返回时为 `Enabling`
    pub fn translation_state(&self) -> FeatureState {
        if self.translation == FeatureState::Enabled && self.in_flight.count() > 0 {
            FeatureState::Enabling
        } else {
            self.translation
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn apply_pinyin(&mut self, enabled: bool) {
        if enabled {
            self.pinyin = FeatureState::Enabling;
            self.engine.enable(&self.root);
            self.pinyin = FeatureState::Enabled;
        } else {
            self.pinyin = FeatureState::Disabling;
            self.engine.disable(&self.root);
            self.pinyin = FeatureState::Disabled;
        }
    }

    fn start_translation(&mut self, lang: TranslateLang) -> Option<TranslationJob> {
        self.translation = FeatureState::Enabling;
        let blocks = self.collector.collect(&self.root);
        self.translation = FeatureState::Enabled;

        if blocks.is_empty() {
            tracing::info!("没有需要翻译的段落");
            return None;
        }
        Some(TranslationJob::start(blocks, lang, &self.in_flight))
    }

    fn stop_translation(&mut self) {
        self.translation = FeatureState::Disabling;
        remove_all(&self.root);
        self.translation = FeatureState::Disabled;
    }

    fn persist(&self, patch: &StoredState) {
        if let Err(e) = self.store.save(patch) {
            tracing::warn!("保存状态失败: {}", e);
        }
    }
}
