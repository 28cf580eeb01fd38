//! 后台路由
//!
//! 保存设置界面发来的开关状态并转发给页面；代页面请求远程翻译，结果按
//! `(语言, 文本)` 缓存。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

use lru::LruCache;

use super::messaging::{Message, Response, Transport, TransportError};
use super::state::{StateStore, StoredState, ToggleState, TranslateLang};
use crate::config::constants;
use crate::translation::service::{RemoteTranslator, SentencePair, TranslateParagraphResponse};

type CacheKey = (TranslateLang, String);

/// 后台消息路由
pub struct BackgroundRouter<S, R> {
    store: S,
    remote: R,
    cache: RefCell<LruCache<CacheKey, Vec<SentencePair>>>,
    outbox: RefCell<VecDeque<Message>>,
}

impl<S: StateStore, R: RemoteTranslator> BackgroundRouter<S, R> {
    pub fn new(store: S, remote: R) -> Self {
        Self::with_cache_size(store, remote, constants::DEFAULT_CACHE_SIZE)
    }

    pub fn with_cache_size(store: S, remote: R, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size)
            .or(NonZeroUsize::new(constants::DEFAULT_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            store,
            remote,
            cache: RefCell::new(LruCache::new(capacity)),
            outbox: RefCell::new(VecDeque::new()),
        }
    }

    /// 首次安装：写入完整的默认状态
    pub fn on_installed(&self) {
        if let Err(e) = self.store.save(&ToggleState::default().to_stored()) {
            tracing::warn!("写入默认状态失败: {}", e);
        }
    }

    /// 处理一条消息，返回响应以及需要转发给页面的消息
    pub async fn dispatch(&self, message: Message) -> Result<(Response, Option<Message>), TransportError> {
        match message {
            Message::SetState { enabled } => {
                self.persist(&StoredState::pinyin(enabled));
                Ok((Response::ack(), Some(Message::TogglePinyin { enabled })))
            }
            Message::SetTranslateState { enabled, lang } => {
                self.persist(&StoredState::translation(enabled, lang));
                Ok((
                    Response::ack(),
                    Some(Message::ToggleTranslation { enabled, lang }),
                ))
            }
            Message::TranslateParagraph { text, lang } => {
                let response = self.translate(text, lang).await;
                Ok((Response::Translation(response), None))
            }
            other => Err(TransportError::Unhandled(other.kind().to_string())),
        }
    }

    /// 取出待转发给页面的消息
    pub fn drain_outbox(&self) -> Vec<Message> {
        self.outbox.borrow_mut().drain(..).collect()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    fn persist(&self, patch: &StoredState) {
        if let Err(e) = self.store.save(patch) {
            tracing::warn!("保存状态失败: {}", e);
        }
    }

    async fn translate(&self, text: String, lang: TranslateLang) -> TranslateParagraphResponse {
        let key = (lang, text);
        if let Some(sentences) = self.cache.borrow_mut().get(&key) {
            tracing::debug!("翻译缓存命中: {} 字符", key.1.chars().count());
            return TranslateParagraphResponse::success(sentences.clone());
        }

        match self.remote.translate(&key.1, lang).await {
            Ok(sentences) => {
                self.cache.borrow_mut().put(key, sentences.clone());
                TranslateParagraphResponse::success(sentences)
            }
            Err(e) => {
                tracing::error!("翻译请求失败: {}", e);
                TranslateParagraphResponse::failure(e)
            }
        }
    }
}

impl<S: StateStore, R: RemoteTranslator> Transport for BackgroundRouter<S, R> {
    async fn send(&self, message: Message) -> Result<Response, TransportError> {
        let (response, forward) = self.dispatch(message).await?;
        if let Some(forward) = forward {
            self.outbox.borrow_mut().push_back(forward);
        }
        Ok(response)
    }
}
