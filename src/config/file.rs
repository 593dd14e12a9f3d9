//! TOML configuration files.
//!
//! Thin serialization layer around [`Config`]: reading a configuration file
//! and printing one back out (`--show-config`). The printed form is a valid
//! start file, with every recognized option present and commented.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Deserialize;

use super::{CdataPolicy, Classification, Config, MultilineAttrs};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    indent: Option<IndentOpt>,
    #[serde(rename = "include-doc-id")]
    include_doc_id: Option<bool>,
    #[serde(rename = "self-closing-space")]
    self_closing_space: Option<bool>,
    #[serde(rename = "use-cdata")]
    use_cdata: Option<CdataOpt>,
    #[serde(rename = "multiline-attributes")]
    multiline_attributes: Option<MultilineOpt>,
    #[serde(rename = "multiline-attribute-indent")]
    multiline_attribute_indent: Option<usize>,
    #[serde(rename = "emptyline-before")]
    emptyline_before: Option<Vec<String>>,
    #[serde(rename = "emptyline-after")]
    emptyline_after: Option<Vec<String>>,
    tags: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IndentOpt {
    Count(usize),
    Literal(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CdataOpt {
    Threshold(usize),
    Tags(Vec<String>),
    Mode(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultilineOpt {
    Threshold(usize),
    Mode(String),
}

impl Config {
    /// Build a configuration from TOML text. Options that are absent keep
    /// their [`Config::default`] values.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Config::default();

        match file.indent {
            Some(IndentOpt::Count(n)) => config.set_indent_spaces(n),
            Some(IndentOpt::Literal(s)) => config.set_indent_literal(&s),
            None => {}
        }
        if let Some(include) = file.include_doc_id {
            config.set_include_doc_id(include);
        }
        if let Some(space) = file.self_closing_space {
            config.set_self_closing_space(space);
        }
        if let Some(opt) = file.use_cdata {
            config.set_cdata_policy(match opt {
                CdataOpt::Threshold(n) => CdataPolicy::Threshold(n),
                CdataOpt::Tags(tags) => CdataPolicy::Tags(tags),
                CdataOpt::Mode(mode) => match mode.as_str() {
                    "always" => CdataPolicy::Always,
                    "never" => CdataPolicy::Never,
                    other => {
                        return Err(Error::InvalidOption(format!("use-cdata = \"{other}\"")));
                    }
                },
            });
        }
        match file.multiline_attributes {
            Some(MultilineOpt::Threshold(count)) => {
                let indent = file.multiline_attribute_indent.unwrap_or(1);
                config.set_multiline_attrs(MultilineAttrs::Threshold { count, indent });
            }
            Some(MultilineOpt::Mode(mode)) if mode == "never" => {
                config.set_multiline_attrs(MultilineAttrs::Never);
            }
            Some(MultilineOpt::Mode(other)) => {
                return Err(Error::InvalidOption(format!(
                    "multiline-attributes = \"{other}\""
                )));
            }
            None => {}
        }
        if let Some(tags) = file.emptyline_before {
            config.set_emptyline_before(tags);
        }
        if let Some(tags) = file.emptyline_after {
            config.set_emptyline_after(tags);
        }
        if let Some(table) = file.tags {
            for (key, tags) in table {
                let classification = Classification::from_key(&key)?;
                for tag in tags {
                    config.classify(&tag, classification);
                }
            }
        }
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Config::from_toml(&text)
    }

    /// Render this configuration as commented TOML suitable for a start
    /// file.
    pub fn to_toml(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# Set the indent as a number of spaces or a string. Defaults to 2 spaces."
        );
        let _ = writeln!(out, "indent = {}", toml_string(self.indent_unit()));
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "# Specify whether the document identifier should be included."
        );
        let _ = writeln!(out, "include-doc-id = {}", self.include_doc_id());
        let _ = writeln!(out);
        let _ = writeln!(out, "# Whether self-closing tags get a space before \"/>\".");
        let _ = writeln!(out, "self-closing-space = {}", self.self_closing_space());
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "# When verbatim content should use CDATA: \"always\", \"never\","
        );
        let _ = writeln!(
            out,
            "# an escape-count threshold, or a list of tags."
        );
        match self.cdata_policy() {
            CdataPolicy::Always => {
                let _ = writeln!(out, "use-cdata = \"always\"");
            }
            CdataPolicy::Never => {
                let _ = writeln!(out, "use-cdata = \"never\"");
            }
            CdataPolicy::Threshold(n) => {
                let _ = writeln!(out, "use-cdata = {n}");
            }
            CdataPolicy::Tags(tags) => {
                let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
                let _ = writeln!(out, "use-cdata = {}", toml_array(&tags));
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "# \"never\", or an attribute count at which attributes go multiline."
        );
        match self.multiline_attrs() {
            MultilineAttrs::Never => {
                let _ = writeln!(out, "multiline-attributes = \"never\"");
            }
            MultilineAttrs::Threshold { count, indent } => {
                let _ = writeln!(out, "multiline-attributes = {count}");
                let _ = writeln!(out, "multiline-attribute-indent = {indent}");
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "# Tags that get an empty line before or after them.");
        let _ = writeln!(
            out,
            "emptyline-before = {}",
            toml_array(&self.emptyline_before_tags())
        );
        let _ = writeln!(
            out,
            "emptyline-after = {}",
            toml_array(&self.emptyline_after_tags())
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "# Only list tags here when you want to force their behavior."
        );
        let _ = writeln!(out, "[tags]");
        for classification in [
            Classification::Verbatim,
            Classification::Inline,
            Classification::InlineEmpty,
            Classification::Block,
            Classification::BlockNoIndent,
        ] {
            let key = classification.key().unwrap_or_default();
            let tags = self.tags_with(classification);
            let _ = writeln!(out, "{key} = {}", toml_array(&tags));
        }
        out
    }
}

fn toml_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn toml_array(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| toml_string(v)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_full() {
        let config = Config::from_toml(
            r#"
indent = 4
include-doc-id = true
use-cdata = 3
multiline-attributes = 2
multiline-attribute-indent = 0
emptyline-after = ["title"]

[tags]
verbatim = ["pre"]
inline = ["em"]
block = ["ul"]
"#,
        )
        .unwrap();
        assert_eq!(config.indent_unit(), "    ");
        assert!(config.include_doc_id());
        assert_eq!(config.cdata_policy(), &CdataPolicy::Threshold(3));
        assert_eq!(
            config.multiline_attrs(),
            MultilineAttrs::Threshold { count: 2, indent: 0 }
        );
        assert!(config.emptyline_after("title"));
        assert_eq!(config.classification("pre"), Classification::Verbatim);
        assert_eq!(config.classification("em"), Classification::Inline);
        assert_eq!(config.classification("ul"), Classification::Block);
    }

    #[test]
    fn test_indent_accepts_literal_string() {
        let config = Config::from_toml("indent = \"\\t\"").unwrap();
        assert_eq!(config.indent_unit(), "\t");
    }

    #[test]
    fn test_unknown_classification_key_is_fatal() {
        let err = Config::from_toml("[tags]\nemphasized = [\"em\"]").unwrap_err();
        assert!(matches!(err, Error::UnknownClassification(key) if key == "emphasized"));
    }

    #[test]
    fn test_invalid_cdata_mode_is_fatal() {
        let err = Config::from_toml("use-cdata = \"sometimes\"").unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn test_printed_config_round_trips() {
        let mut config = Config::standard();
        config.set_cdata_policy(CdataPolicy::Tags(vec!["pre".to_string()]));
        config.set_emptyline_after(["title"]);
        let reloaded = Config::from_toml(&config.to_toml()).unwrap();
        assert_eq!(reloaded.indent_unit(), config.indent_unit());
        assert_eq!(reloaded.include_doc_id(), config.include_doc_id());
        assert_eq!(reloaded.cdata_policy(), config.cdata_policy());
        assert!(reloaded.emptyline_after("title"));
        assert_eq!(reloaded.classification("ul"), Classification::Block);
        assert_eq!(reloaded.classification("var"), Classification::InlineEmpty);
    }
}
