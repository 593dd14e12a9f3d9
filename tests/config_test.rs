//! Configuration loading and printing.

use ptx_format::{CdataPolicy, Classification, Config, Error, MultilineAttrs, format_pretext_with};

use std::io::Write;

#[test]
fn test_standard_profile_classifications() {
    let config = Config::standard();
    assert_eq!(config.indent_unit(), "  ");
    assert!(config.include_doc_id());
    assert_eq!(config.classification("ul"), Classification::Block);
    assert_eq!(config.classification("var"), Classification::InlineEmpty);
    assert_eq!(config.classification("em"), Classification::Inline);
    assert_eq!(config.classification("pre"), Classification::Verbatim);
    assert_eq!(config.classification("p"), Classification::None);
}

#[test]
fn test_config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ptx-format.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "indent = 4").unwrap();
    writeln!(file, "use-cdata = \"always\"").unwrap();
    writeln!(file, "[tags]").unwrap();
    writeln!(file, "inline = [\"em\"]").unwrap();
    drop(file);

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.indent_unit(), "    ");
    assert_eq!(config.cdata_policy(), &CdataPolicy::Always);
    assert_eq!(config.classification("em"), Classification::Inline);
    // Options absent from the file keep their defaults.
    assert!(!config.include_doc_id());
    assert_eq!(config.classification("ul"), Classification::None);
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let err = Config::from_file("/nonexistent/ptx-format.toml").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_malformed_toml_is_a_config_error() {
    let err = Config::from_toml("indent = [not toml").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_printed_config_reloads_identically() {
    let mut config = Config::standard();
    config.set_indent_spaces(4);
    config.set_cdata_policy(CdataPolicy::Threshold(2));
    config.set_multiline_attrs(MultilineAttrs::Threshold { count: 3, indent: 0 });
    config.set_emptyline_after(["title"]);

    let reloaded = Config::from_toml(&config.to_toml()).unwrap();
    assert_eq!(reloaded.indent_unit(), "    ");
    assert_eq!(reloaded.cdata_policy(), &CdataPolicy::Threshold(2));
    assert_eq!(
        reloaded.multiline_attrs(),
        MultilineAttrs::Threshold { count: 3, indent: 0 }
    );
    assert!(reloaded.emptyline_after("title"));
    assert_eq!(reloaded.classification("pre"), Classification::Verbatim);
    assert_eq!(reloaded.classification("section"), Classification::Block);
}

#[test]
fn test_tab_indent_flows_through_to_output() {
    let mut config = Config::standard();
    config.set_include_doc_id(false);
    config.set_indent_literal("\t");
    let formatted = format_pretext_with("<section><p>Hi</p></section>", &config).unwrap();
    assert_eq!(formatted, "<section>\n\t<p>Hi</p>\n</section>");
}

#[test]
fn test_classification_override_changes_layout() {
    let mut config = Config::standard();
    config.set_include_doc_id(false);
    // Force a normally content-driven tag into block mode.
    config.classify("title", Classification::Block);
    let formatted = format_pretext_with("<section><title>Hi</title></section>", &config).unwrap();
    assert_eq!(
        formatted,
        "<section>\n  <title>\n    Hi\n  </title>\n</section>"
    );
}
