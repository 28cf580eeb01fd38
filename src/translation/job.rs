//! 翻译任务
//!
//! 每个块在发出请求前挂上加载占位，结果返回后先确认占位仍在文档中再插入。
//! 各块的请求在当前线程上并发执行，互不影响。

use std::cell::Cell;
use std::rc::Rc;

use futures::future::join_all;

use super::collector::TranslationBlock;
use super::inserter::{insert, insert_fallback, InsertOutcome, LoadingMarker};
use super::service::{ParagraphTranslator, TranslateParagraphResponse};
use super::splitter::{align, Alignment};
use crate::toggle::state::TranslateLang;

/// 单个块的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// 按句插入
    Inserted,
    /// 整块追加
    Fallback,
    /// 服务返回错误
    Failed,
    /// 占位已被移除，结果丢弃
    Discarded,
}

/// 任务统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    pub inserted: usize,
    pub fallback: usize,
    pub failed: usize,
    pub discarded: usize,
}

impl JobReport {
    fn record(&mut self, outcome: ResolveOutcome) {
        match outcome {
            ResolveOutcome::Inserted => self.inserted += 1,
            ResolveOutcome::Fallback => self.fallback += 1,
            ResolveOutcome::Failed => self.failed += 1,
            ResolveOutcome::Discarded => self.discarded += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.fallback + self.failed + self.discarded
    }
}

/// 进行中的请求计数
#[derive(Debug, Clone, Default)]
pub struct InFlight(Rc<Cell<usize>>);

impl InFlight {
    pub fn count(&self) -> usize {
        self.0.get()
    }

    fn acquire(&self) -> InFlightGuard {
        self.0.set(self.0.get() + 1);
        InFlightGuard(self.0.clone())
    }
}

#[derive(Debug)]
struct InFlightGuard(Rc<Cell<usize>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// 一个已挂上加载占位、等待结果的块
#[derive(Debug)]
pub struct PendingTranslation {
    block: TranslationBlock,
    loading: LoadingMarker,
    _in_flight: InFlightGuard,
}

impl PendingTranslation {
    fn start(block: TranslationBlock, in_flight: &InFlight) -> Self {
        let loading = LoadingMarker::attach(&block.container);
        Self {
            block,
            loading,
            _in_flight: in_flight.acquire(),
        }
    }

    pub fn block(&self) -> &TranslationBlock {
        &self.block
    }

    pub fn is_live(&self) -> bool {
        self.loading.is_attached()
    }

    /// 处理返回结果，加载占位在任何分支都会被移除
    pub fn resolve(self, response: &TranslateParagraphResponse) -> ResolveOutcome {
        if !self.loading.is_attached() {
            tracing::debug!("翻译结果到达时占位已移除，丢弃结果");
            return ResolveOutcome::Discarded;
        }
        self.loading.release();

        let Some(pairs) = response.sentences.as_deref() else {
            tracing::warn!(
                "段落翻译失败: {}",
                response.error.as_deref().unwrap_or("未知错误")
            );
            return ResolveOutcome::Failed;
        };

        let outcome = match align(self.block.sentence_parts.len(), pairs) {
            Alignment::Aligned(translated) => insert(&self.block, &translated),
            Alignment::Mismatch(combined) => insert_fallback(&self.block, &combined),
        };

        match outcome {
            InsertOutcome::Inline { .. } => ResolveOutcome::Inserted,
            InsertOutcome::Fallback => ResolveOutcome::Fallback,
        }
    }
}

/// 一次翻译开启产生的全部请求
#[derive(Debug)]
pub struct TranslationJob {
    lang: TranslateLang,
    pending: Vec<PendingTranslation>,
}

impl TranslationJob {
    /// 为每个块挂上加载占位
    pub fn start(blocks: Vec<TranslationBlock>, lang: TranslateLang, in_flight: &InFlight) -> Self {
        let pending = blocks
            .into_iter()
            .map(|block| PendingTranslation::start(block, in_flight))
            .collect();
        Self { lang, pending }
    }

    pub fn lang(&self) -> TranslateLang {
        self.lang
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[PendingTranslation] {
        &self.pending
    }

    /// 并发请求并逐块处理结果
    pub async fn run<T: ParagraphTranslator>(self, translator: &T) -> JobReport {
        let lang = self.lang;
        tracing::info!("开始翻译 {} 个段落 -> {}", self.pending.len(), lang);

        let tasks = self.pending.into_iter().map(|pending| async move {
            let text = pending.block().request_text();
            let response = translator.translate_paragraph(&text, lang).await;
            pending.resolve(&response)
        });

        let mut report = JobReport::default();
        for outcome in join_all(tasks).await {
            report.record(outcome);
        }

        tracing::info!(
            "翻译完成: 插入 {}，整块 {}，失败 {}，丢弃 {}",
            report.inserted,
            report.fallback,
            report.failed,
            report.discarded
        );
        report
    }
}
