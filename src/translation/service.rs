//! 远程翻译服务接口
//!
//! 核心只依赖 [`ParagraphTranslator`]：输入一段文本和目标语言，返回句对数组或
//! `{sentences: null, error}`。失败永远体现在返回值里，不会向上抛出。
//! [`RemoteTranslator`] 是后台一侧真正访问网络的接口，[`GoogleTranslateClient`]
//! 是它基于 reqwest 的实现。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{TranslationError, TranslationResult};
use crate::toggle::state::TranslateLang;

/// 一句原文与译文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    pub original: String,
    pub translated: String,
}

/// `TRANSLATE_PARAGRAPH` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateParagraphResponse {
    pub sentences: Option<Vec<SentencePair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslateParagraphResponse {
    pub fn success(sentences: Vec<SentencePair>) -> Self {
        Self {
            sentences: Some(sentences),
            error: None,
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            sentences: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.sentences.is_none()
    }
}

impl From<TranslationResult<Vec<SentencePair>>> for TranslateParagraphResponse {
    fn from(result: TranslationResult<Vec<SentencePair>>) -> Self {
        match result {
            Ok(sentences) => Self::success(sentences),
            Err(e) => Self::failure(e),
        }
    }
}

/// 页面一侧看到的翻译协作者
#[allow(async_fn_in_trait)]
pub trait ParagraphTranslator {
    async fn translate_paragraph(
        &self,
        text: &str,
        lang: TranslateLang,
    ) -> TranslateParagraphResponse;
}

/// 后台一侧访问远程服务的接口
#[allow(async_fn_in_trait)]
pub trait RemoteTranslator {
    async fn translate(&self, text: &str, lang: TranslateLang)
        -> TranslationResult<Vec<SentencePair>>;
}

/// 解析 `translate_a/single` 的响应：`[[[译文, 原文, ...], ...], ...]`
pub fn parse_gtx_response(data: &Value) -> TranslationResult<Vec<SentencePair>> {
    let segments = data
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::ParseError("响应缺少译文数组".to_string()))?;

    let pairs = segments
        .iter()
        .filter_map(Value::as_array)
        .map(|segment| SentencePair {
            translated: segment
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            original: segment
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect();

    Ok(pairs)
}

#[cfg(feature = "remote")]
pub use google::GoogleTranslateClient;

#[cfg(feature = "remote")]
mod google {
    use super::*;

    /// Google 网页翻译接口客户端
    ///
    /// 不设置超时，失败由调用方转换为 `{sentences: null, error}`。
    #[derive(Debug, Clone)]
    pub struct GoogleTranslateClient {
        client: reqwest::Client,
        api_url: String,
        source_lang: String,
    }

    impl GoogleTranslateClient {
        pub fn new(api_url: &str, source_lang: &str) -> TranslationResult<Self> {
            if api_url.trim().is_empty() {
                return Err(TranslationError::ConfigError("API 地址不能为空".to_string()));
            }

            let client = reqwest::Client::builder()
                .build()
                .map_err(|e| TranslationError::ConfigError(format!("创建 HTTP 客户端失败: {}", e)))?;

            Ok(Self {
                client,
                api_url: api_url.to_string(),
                source_lang: source_lang.to_string(),
            })
        }
    }

    impl RemoteTranslator for GoogleTranslateClient {
        async fn translate(
            &self,
            text: &str,
            lang: TranslateLang,
        ) -> TranslationResult<Vec<SentencePair>> {
            tracing::debug!("请求翻译: {} 字符 -> {}", text.chars().count(), lang);

            let response = self
                .client
                .get(&self.api_url)
                .query(&[
                    ("client", "gtx"),
                    ("sl", self.source_lang.as_str()),
                    ("tl", lang.code()),
                    ("dt", "t"),
                    ("q", text),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(TranslationError::ServiceError(format!(
                    "HTTP 状态码 {}",
                    status
                )));
            }

            let data: Value = response.json().await?;
            parse_gtx_response(&data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_gtx_segments() {
        let data = json!([
            [
                ["I love Beijing.\n", "我爱北京。\n", null, null, 10],
                ["The weather is great!", "天气很好！", null, null, 10]
            ],
            null,
            "zh-CN"
        ]);

        let pairs = parse_gtx_response(&data).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].translated, "I love Beijing.\n");
        assert_eq!(pairs[1].original, "天气很好！");
    }

    #[test]
    fn test_parse_gtx_rejects_unexpected_shape() {
        let error = parse_gtx_response(&json!({"error": "quota"})).unwrap_err();
        assert!(matches!(error, TranslationError::ParseError(_)));
    }

    #[test]
    fn test_response_json_shape() {
        let failure = TranslateParagraphResponse::failure("offline");
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({"sentences": null, "error": "offline"})
        );

        let success: TranslateParagraphResponse = serde_json::from_value(json!({
            "sentences": [{"original": "一。", "translated": "One."}]
        }))
        .unwrap();
        assert!(!success.is_failure());
        assert_eq!(success.error, None);
    }
}
