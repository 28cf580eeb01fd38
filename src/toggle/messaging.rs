//! 消息与传输
//!
//! 设置界面、后台和页面之间通过带 `type` 标签的 JSON 消息通信。传输失败只记录警告，
//! 视为没有响应。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::TranslateLang;
use crate::translation::service::{ParagraphTranslator, TranslateParagraphResponse};

/// 消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// 后台 -> 页面：切换拼音
    TogglePinyin { enabled: bool },
    /// 后台 -> 页面：切换翻译
    ToggleTranslation { enabled: bool, lang: TranslateLang },
    /// 页面 -> 后台：翻译一段文本
    TranslateParagraph { text: String, lang: TranslateLang },
    /// 设置界面 -> 后台：保存拼音开关
    SetState { enabled: bool },
    /// 设置界面 -> 后台：保存翻译开关和语言
    SetTranslateState { enabled: bool, lang: TranslateLang },
}

impl Message {
    /// 解析 JSON 消息
    pub fn from_json(json: &str) -> Result<Self, TransportError> {
        serde_json::from_str(json).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    /// 消息类型名，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Message::TogglePinyin { .. } => "TOGGLE_PINYIN",
            Message::ToggleTranslation { .. } => "TOGGLE_TRANSLATION",
            Message::TranslateParagraph { .. } => "TRANSLATE_PARAGRAPH",
            Message::SetState { .. } => "SET_STATE",
            Message::SetTranslateState { .. } => "SET_TRANSLATE_STATE",
        }
    }
}

/// 响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ack { success: bool },
    Translation(TranslateParagraphResponse),
}

impl Response {
    pub fn ack() -> Self {
        Response::Ack { success: true }
    }

    pub fn rejected() -> Self {
        Response::Ack { success: false }
    }
}

/// 传输错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// 接收方不存在
    #[error("接收方不可达: {0}")]
    Unreachable(String),

    /// 消息无法解析
    #[error("消息格式错误: {0}")]
    Malformed(String),

    /// 接收方不处理此类消息
    #[error("未处理的消息类型: {0}")]
    Unhandled(String),
}

/// 消息传输
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, message: Message) -> Result<Response, TransportError>;
}

/// 发送消息，失败时只记录警告
pub async fn send_or_warn<T: Transport>(transport: &T, message: Message) -> Option<Response> {
    let kind = message.kind();
    match transport.send(message).await {
        Ok(response) => Some(response),
        Err(e) => {
            tracing::warn!("消息 {} 发送失败: {}", kind, e);
            None
        }
    }
}

/// 通过传输层请求翻译
#[derive(Debug)]
pub struct TransportTranslator<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> TransportTranslator<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> ParagraphTranslator for TransportTranslator<'_, T> {
    async fn translate_paragraph(
        &self,
        text: &str,
        lang: TranslateLang,
    ) -> TranslateParagraphResponse {
        let message = Message::TranslateParagraph {
            text: text.to_string(),
            lang,
        };

        match send_or_warn(self.transport, message).await {
            Some(Response::Translation(response)) => response,
            Some(Response::Ack { .. }) => TranslateParagraphResponse::failure("意外的确认响应"),
            None => TranslateParagraphResponse::failure("后台不可达"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_wire_format() {
        let message = Message::SetTranslateState {
            enabled: true,
            lang: TranslateLang::En,
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "SET_TRANSLATE_STATE", "enabled": true, "lang": "en"})
        );

        let parsed = Message::from_json(r#"{"type":"TOGGLE_PINYIN","enabled":false}"#).unwrap();
        assert_eq!(parsed, Message::TogglePinyin { enabled: false });
    }

    #[test]
    fn test_unknown_lang_is_malformed() {
        let error =
            Message::from_json(r#"{"type":"TOGGLE_TRANSLATION","enabled":true,"lang":"fr"}"#)
                .unwrap_err();
        assert!(matches!(error, TransportError::Malformed(_)));
    }

    #[test]
    fn test_response_shapes() {
        let ack: Response = serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(ack, Response::ack());

        let failed: Response =
            serde_json::from_value(json!({"sentences": null, "error": "offline"})).unwrap();
        assert!(matches!(failed, Response::Translation(r) if r.is_failure()));
    }

    struct Offline;

    impl Transport for Offline {
        async fn send(&self, _message: Message) -> Result<Response, TransportError> {
            Err(TransportError::Unreachable("no receiver".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unreachable_transport_yields_failure() {
        let translator = TransportTranslator::new(&Offline);
        let response = translator
            .translate_paragraph("我爱北京。", TranslateLang::Ja)
            .await;

        assert!(response.is_failure());
        assert!(send_or_warn(&Offline, Message::SetState { enabled: true })
            .await
            .is_none());
    }
}
