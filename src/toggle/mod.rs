//! 开关控制
//!
//! - **state**: 开关状态、目标语言与偏好存储
//! - **messaging**: 消息格式与传输接口
//! - **background**: 保存状态、转发开关、代理翻译请求的后台路由
//! - **controller**: 在文档上执行开启与关闭

pub mod background;
pub mod controller;
pub mod messaging;
pub mod state;

pub use background::BackgroundRouter;
pub use controller::{FeatureState, ToggleController};
pub use messaging::{send_or_warn, Message, Response, Transport, TransportError, TransportTranslator};
pub use state::{
    JsonFileStore, MemoryStore, StateError, StateStore, StoredState, ToggleState, TranslateLang,
};
