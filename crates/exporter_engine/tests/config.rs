use exporter_engine::{ConfigError, ExporterConfig, SourceProfile};
use exporter_core::StylePolicy;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn empty_config_keeps_defaults() {
    let config = ExporterConfig::from_ron("()").unwrap();
    assert_eq!(config, ExporterConfig::default());
    assert_eq!(config.indent_unit, "\t");
    assert_eq!(config.profile, SourceProfile::gemini());
}

#[test]
fn partial_style_overrides_only_named_fields() {
    let config = ExporterConfig::from_ron(r#"(style: (line_prefix: "| "), indent_unit: "  ")"#)
        .unwrap();

    assert_eq!(config.style.line_prefix, "| ");
    assert_eq!(config.style.pre_query, StylePolicy::default().pre_query);
    assert_eq!(config.indent_unit, "  ");
}

#[test]
fn profile_selectors_can_be_replaced() {
    let config = ExporterConfig::from_ron(
        r#"(profile: (prompt_selector: "div.user", answer_selector: "div.bot", video_tags: []))"#,
    )
    .unwrap();

    assert_eq!(config.profile.prompt_selector, "div.user");
    assert_eq!(config.profile.answer_selector, "div.bot");
    assert!(config.profile.video_tags.is_empty());
    assert_eq!(config.profile.code_block_tag, "code-block");
}

#[test]
fn malformed_config_is_a_parse_error() {
    let err = ExporterConfig::from_ron("(style: ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("exporter.ron");
    std::fs::write(&path, r#"(style: (pre_answer: "\n## Answer\n"))"#).unwrap();

    let config = ExporterConfig::load(&path).unwrap();
    assert_eq!(config.style.pre_answer, "\n## Answer\n");

    let missing = ExporterConfig::load(&temp.path().join("missing.ron")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read { .. }));
}
