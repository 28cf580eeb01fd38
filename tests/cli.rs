//! 命令行集成测试

#[cfg(test)]
mod passing {
    use std::fs;

    use assert_cmd::Command;
    use tempfile::TempDir;

    fn command(dir: &TempDir) -> Command {
        let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
        cmd.current_dir(dir.path())
            .env_remove("PINYIN_TOOL_STATE_FILE")
            .env("PINYIN_TOOL_LOG_LEVEL", "warn");
        cmd
    }

    #[test]
    fn pinyin_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.html");
        fs::write(&input, "<html><body><p>你好 World</p></body></html>").unwrap();

        let out = command(&dir).arg("--pinyin").arg(&input).output().unwrap();

        assert!(out.status.success());
        let html = String::from_utf8_lossy(&out.stdout);
        assert!(html.contains("<ruby data-pinyin-added=\"1\">你<rt>nǐ</rt></ruby>"));
        assert!(html.contains(" World</p>"));
    }

    #[test]
    fn pinyin_from_stdin_with_numbered_tones() {
        let dir = tempfile::tempdir().unwrap();

        let out = command(&dir)
            .args(["--pinyin", "--tone", "numbers", "-"])
            .write_stdin("<p>好</p>")
            .output()
            .unwrap();

        assert!(out.status.success());
        assert!(String::from_utf8_lossy(&out.stdout).contains("<rt>hao3</rt>"));
    }

    #[test]
    fn strip_restores_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let annotated = "<html><head></head><body><p><ruby data-pinyin-added=\"1\">你<rt>nǐ</rt></ruby>好<span data-pinyin-translation=\"block\" class=\"pinyin-tool-translation\" style=\"display:block\">hello</span></p></body></html>";
        let output = dir.path().join("out.html");

        command(&dir)
            .arg("--strip")
            .arg("-o")
            .arg(&output)
            .arg("-")
            .write_stdin(annotated)
            .assert()
            .success();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<p>你好</p>"));
        assert!(!html.contains("ruby"));
        assert!(!html.contains("hello"));
    }

    #[test]
    fn unreachable_translation_service_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let out = command(&dir)
            .env("PINYIN_TOOL_API_URL", "http://127.0.0.1:9/translate_a/single")
            .args(["--translate", "--lang", "en", "-"])
            .write_stdin("<p>我爱北京。天气很好！</p>")
            .output()
            .unwrap();

        assert!(out.status.success());
        let html = String::from_utf8_lossy(&out.stdout);
        assert!(!html.contains("data-pinyin-translation"));
        assert!(html.contains("<p>我爱北京。天气很好！</p>"));
    }

    #[test]
    fn state_file_drives_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        fs::write(&state, r#"{"pinyinEnabled": true}"#).unwrap();

        let out = command(&dir)
            .arg("--state")
            .arg(&state)
            .arg("-")
            .write_stdin("<p>中</p>")
            .output()
            .unwrap();

        assert!(out.status.success());
        assert!(String::from_utf8_lossy(&out.stdout).contains("<rt>zhōng</rt>"));
    }

    #[test]
    fn init_config_writes_example() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("pinyin-tool.toml");

        command(&dir)
            .arg("--init-config")
            .arg(&target)
            .assert()
            .success();

        let content = fs::read_to_string(&target).unwrap();
        assert!(content.contains("[translation]"));
        assert!(content.contains("min_target_chars"));
    }

    #[test]
    fn env_docs_lists_variables() {
        let dir = tempfile::tempdir().unwrap();

        let out = command(&dir).arg("--env-docs").output().unwrap();

        assert!(out.status.success());
        let docs = String::from_utf8_lossy(&out.stdout);
        assert!(docs.contains("PINYIN_TOOL_API_URL"));
        assert!(docs.contains("PINYIN_TOOL_STATE_FILE"));
    }
}

#[cfg(test)]
mod failing {
    use assert_cmd::Command;

    #[test]
    fn missing_input_file() {
        let dir = tempfile::tempdir().unwrap();

        Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .current_dir(dir.path())
            .arg("does-not-exist.html")
            .assert()
            .failure();
    }

    #[test]
    fn unknown_language() {
        Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .args(["--translate", "--lang", "fr", "-"])
            .assert()
            .failure();
    }

    #[test]
    fn unknown_encoding() {
        let dir = tempfile::tempdir().unwrap();

        Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .current_dir(dir.path())
            .args(["--pinyin", "-e", "not-a-charset", "-"])
            .write_stdin("<p>中</p>")
            .assert()
            .failure();
    }
}
