use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::rewrite::{
    DEFAULT_MARKER, DEFAULT_SUFFIX, DEFAULT_TERMINATOR, RewriteRules, Substitution,
    default_substitutions,
};

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct RelinkConfig {
    #[serde(default)]
    pub rewrite: RewriteSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct RewriteSection {
    pub marker: Option<String>,
    pub terminator: Option<String>,
    pub suffix: Option<String>,
    /// Replaces the default cleanup list when present, even if empty.
    pub substitutions: Option<Vec<Substitution>>,
}

impl RelinkConfig {
    pub fn marker(&self) -> &str {
        self.rewrite.marker.as_deref().unwrap_or(DEFAULT_MARKER)
    }

    pub fn suffix(&self) -> &str {
        self.rewrite.suffix.as_deref().unwrap_or(DEFAULT_SUFFIX)
    }

    pub fn terminator(&self) -> Result<char> {
        let Some(raw) = self.rewrite.terminator.as_deref() else {
            return Ok(DEFAULT_TERMINATOR);
        };
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(terminator), None) => Ok(terminator),
            _ => bail!("rewrite.terminator must be exactly one character, got {raw:?}"),
        }
    }

    /// Validate the section and build the rules it describes.
    pub fn rules(&self) -> Result<RewriteRules> {
        let marker = self.marker();
        let terminator = self.terminator()?;
        if marker.is_empty() {
            bail!("rewrite.marker cannot be empty");
        }
        if marker.contains(terminator) {
            bail!("rewrite.marker {marker:?} cannot contain the terminator {terminator:?}");
        }

        let substitutions = match &self.rewrite.substitutions {
            Some(list) => {
                for (index, rule) in list.iter().enumerate() {
                    if rule.from.is_empty() {
                        bail!("rewrite.substitutions[{index}].from cannot be empty");
                    }
                }
                list.clone()
            }
            None => default_substitutions(),
        };

        Ok(RewriteRules {
            substitutions,
            marker: marker.to_string(),
            terminator,
            suffix: self.suffix().to_string(),
        })
    }
}

/// Load and parse a RelinkConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<RelinkConfig> {
    if !config_path.exists() {
        return Ok(RelinkConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: RelinkConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_yields_default_rules() {
        let rules = RelinkConfig::default().rules().expect("rules");
        assert_eq!(rules, RewriteRules::default());
    }

    #[test]
    fn load_config_returns_default_for_missing_file() {
        let config = load_config(Path::new("/nonexistent/rules.toml")).expect("load config");
        assert_eq!(config, RelinkConfig::default());
    }

    #[test]
    fn load_config_parses_rewrite_section() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("rules.toml");
        fs::write(
            &config_path,
            r#"
[rewrite]
marker = "/page/"
terminator = "'"
suffix = ".htm"

[[rewrite.substitutions]]
from = "rel=nofollow"
to = ""

[[rewrite.substitutions]]
from = "draft"
to = "final"
"#,
        )
        .expect("write config");

        let config = load_config(&config_path).expect("load config");
        let rules = config.rules().expect("rules");
        assert_eq!(rules.marker, "/page/");
        assert_eq!(rules.terminator, '\'');
        assert_eq!(rules.suffix, ".htm");
        assert_eq!(
            rules.substitutions,
            vec![
                Substitution::new("rel=nofollow", ""),
                Substitution::new("draft", "final"),
            ]
        );
        assert_eq!(
            rules.transform("<a href='/page/Draft_draft'>"),
            "<a href='Draft_final.htm'>"
        );
    }

    #[test]
    fn load_config_tolerates_partial_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("rules.toml");
        fs::write(&config_path, "[rewrite]\nsuffix = \".xhtml\"\n").expect("write config");

        let rules = load_config(&config_path)
            .expect("load config")
            .rules()
            .expect("rules");
        assert_eq!(rules.marker, DEFAULT_MARKER);
        assert_eq!(rules.suffix, ".xhtml");
        assert_eq!(rules.substitutions, default_substitutions());
    }

    #[test]
    fn empty_substitution_list_disables_cleanup() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("rules.toml");
        fs::write(&config_path, "[rewrite]\nsubstitutions = []\n").expect("write config");

        let rules = load_config(&config_path)
            .expect("load config")
            .rules()
            .expect("rules");
        assert_eq!(rules.transform("nofollow?"), "nofollow?");
    }

    #[test]
    fn load_config_returns_error_for_invalid_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("rules.toml");
        fs::write(&config_path, "[rewrite\nmarker = \"oops\"").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn rules_reject_multi_character_terminator() {
        let config = RelinkConfig {
            rewrite: RewriteSection {
                terminator: Some("\"'".to_string()),
                ..RewriteSection::default()
            },
        };
        let error = config.rules().expect_err("must fail");
        assert!(error.to_string().contains("exactly one character"));
    }

    #[test]
    fn rules_reject_empty_marker() {
        let config = RelinkConfig {
            rewrite: RewriteSection {
                marker: Some(String::new()),
                ..RewriteSection::default()
            },
        };
        let error = config.rules().expect_err("must fail");
        assert!(error.to_string().contains("marker cannot be empty"));
    }

    #[test]
    fn rules_reject_marker_containing_terminator() {
        let config = RelinkConfig {
            rewrite: RewriteSection {
                marker: Some("/wiki\"/".to_string()),
                ..RewriteSection::default()
            },
        };
        let error = config.rules().expect_err("must fail");
        assert!(error.to_string().contains("cannot contain the terminator"));
    }

    #[test]
    fn rules_reject_empty_substitution_source() {
        let config = RelinkConfig {
            rewrite: RewriteSection {
                substitutions: Some(vec![
                    Substitution::new("ok", "fine"),
                    Substitution::new("", "x"),
                ]),
                ..RewriteSection::default()
            },
        };
        let error = config.rules().expect_err("must fail");
        assert!(error.to_string().contains("substitutions[1].from"));
    }
}
