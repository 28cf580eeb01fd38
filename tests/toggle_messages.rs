//! 开关与消息集成测试
//!
//! 设置界面 -> 后台 -> 页面的完整链路，以及状态持久化

use pinyin_tool::annotation::AnnotationEngine;
use pinyin_tool::toggle::{
    send_or_warn, BackgroundRouter, FeatureState, JsonFileStore, MemoryStore, Message, Response,
    StateStore, StoredState, ToggleController, TransportTranslator, TranslateLang,
};
use pinyin_tool::translation::{
    InFlight, ParagraphTranslator, TranslationBlockCollector, TranslationJob,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{fixed_reader, BrokenStore, Dom, Reader, StubRemote, MIXED_PAGE};

#[tokio::test]
async fn test_settings_toggle_reaches_page() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("state.json"));
    let router = BackgroundRouter::new(&store, StubRemote::default());
    router.on_installed();

    let (_dom, body) = Dom::parse(MIXED_PAGE);
    let mut page = ToggleController::new(body, AnnotationEngine::new(fixed_reader as Reader), &store);
    assert!(page.init().is_none());

    // 设置界面打开拼音和英文翻译
    let ack = send_or_warn(&router, Message::SetState { enabled: true }).await;
    assert_eq!(ack, Some(Response::ack()));
    send_or_warn(
        &router,
        Message::SetTranslateState {
            enabled: true,
            lang: TranslateLang::En,
        },
    )
    .await;

    let forwarded = router.drain_outbox();
    assert_eq!(
        forwarded,
        vec![
            Message::TogglePinyin { enabled: true },
            Message::ToggleTranslation {
                enabled: true,
                lang: TranslateLang::En
            },
        ]
    );

    let mut jobs = Vec::new();
    for message in forwarded {
        let (response, job) = page.handle_message(message);
        assert_eq!(response, Response::ack());
        jobs.extend(job);
    }
    assert_eq!(jobs.len(), 1);

    let translator = TransportTranslator::new(&router);
    let report = jobs.remove(0).run(&translator).await;

    assert_eq!(report.failed, 0);
    assert_eq!(report.total(), 6);
    assert!(Dom::annotation_regions(page.root()) > 0);
    assert!(Dom::markers_of_kind(page.root(), "inline") > 0);
    assert_eq!(page.translation_state(), FeatureState::Enabled);

    let saved = store.load_state().unwrap();
    assert!(saved.pinyin_enabled);
    assert!(saved.translate_enabled);
    assert_eq!(saved.translate_lang, TranslateLang::En);
}

#[tokio::test]
async fn test_saved_state_is_applied_on_next_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");

    {
        let store = JsonFileStore::new(&path);
        let (_dom, body) = Dom::parse("<p>我爱北京。</p>");
        let mut page = ToggleController::new(body, AnnotationEngine::new(fixed_reader as Reader), store);
        page.set_pinyin(true);
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"pinyinEnabled\": true"));

    let (_dom, body) = Dom::parse("<p>我爱北京。</p>");
    let mut page = ToggleController::new(
        body,
        AnnotationEngine::new(fixed_reader as Reader),
        JsonFileStore::new(&path),
    );
    assert!(page.init().is_none());

    assert_eq!(page.pinyin_state(), FeatureState::Enabled);
    assert_eq!(page.translation_state(), FeatureState::Disabled);
    assert_eq!(Dom::annotation_regions(page.root()), 4);
}

#[tokio::test]
async fn test_unrecognized_language_keeps_other_saved_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"pinyinEnabled": true, "translateLang": "ko"}"#).unwrap();

    let (_dom, body) = Dom::parse("<p>你好世界</p>");
    let mut page = ToggleController::new(
        body,
        AnnotationEngine::new(fixed_reader as Reader),
        JsonFileStore::new(&path),
    );
    assert!(page.init().is_none());

    assert_eq!(page.pinyin_state(), FeatureState::Enabled);
    assert_eq!(page.state().translate_lang, TranslateLang::Ja);
    assert_eq!(Dom::annotation_regions(page.root()), 4);

    page.set_pinyin(false);
    let saved = page.store().load().unwrap();
    assert_eq!(saved.pinyin_enabled, Some(false));
}

#[tokio::test]
async fn test_broken_store_is_not_fatal() {
    let (_dom, body) = Dom::parse("<p>我爱北京。天气很好！</p>");
    let mut page = ToggleController::new(body, AnnotationEngine::new(fixed_reader as Reader), BrokenStore);

    assert!(page.init().is_none());
    assert_eq!(page.state(), Default::default());

    page.set_pinyin(true);
    assert_eq!(page.pinyin_state(), FeatureState::Enabled);
    assert!(page.set_translation(true, TranslateLang::Ja).is_some());

    let router = BackgroundRouter::new(BrokenStore, StubRemote::default());
    router.on_installed();
    let ack = send_or_warn(&router, Message::SetState { enabled: false }).await;
    assert_eq!(ack, Some(Response::ack()));
}

#[tokio::test]
async fn test_router_caches_and_reports_remote_failures() {
    let failing = "第二段落的内容。";
    let remote = StubRemote::default().fail_on(failing, "HTTP 503");
    let router = BackgroundRouter::new(MemoryStore::default(), remote);
    let translator = TransportTranslator::new(&router);

    let html = format!("<p>我爱北京。天气很好！</p><p>{failing}</p>");
    for _ in 0..2 {
        let (_dom, body) = Dom::parse(&html);
        let blocks = TranslationBlockCollector::default().collect(&body);
        let report = TranslationJob::start(blocks, TranslateLang::Ja, &InFlight::default())
            .run(&translator)
            .await;

        assert_eq!(report.inserted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(Dom::markers_of_kind(&body, "loading"), 0);
    }

    // 成功的段落第二次命中缓存，失败的不缓存
    assert_eq!(router.cached_entries(), 1);

    let response = translator.translate_paragraph(failing, TranslateLang::Ja).await;
    assert!(response.is_failure());
    assert_eq!(response.error.as_deref(), Some("网络错误: HTTP 503"));
}

#[tokio::test]
async fn test_page_messages_sent_to_router_are_dropped() {
    let router = BackgroundRouter::new(MemoryStore::default(), StubRemote::default());

    let response = send_or_warn(&router, Message::TogglePinyin { enabled: true }).await;

    assert!(response.is_none());
    assert!(router.drain_outbox().is_empty());
    assert_eq!(router.store().snapshot(), StoredState::default());
}

#[test]
fn test_messages_use_wire_names() {
    let message = Message::from_json(r#"{"type":"SET_TRANSLATE_STATE","enabled":true,"lang":"en"}"#)
        .unwrap();
    assert_eq!(
        message,
        Message::SetTranslateState {
            enabled: true,
            lang: TranslateLang::En
        }
    );

    assert!(Message::from_json(r#"{"type":"SET_TRANSLATE_STATE","enabled":true,"lang":"fr"}"#).is_err());
    assert_eq!(
        Message::TranslateParagraph {
            text: "你好".to_string(),
            lang: TranslateLang::Ja
        }
        .to_json()
        .unwrap(),
        r#"{"type":"TRANSLATE_PARAGRAPH","text":"你好","lang":"ja"}"#
    );
}
