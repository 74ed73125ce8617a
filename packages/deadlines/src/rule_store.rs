//! Per-family keyword rule lookup.

use std::path::Path;

use crate::error::{ConfigError, DeadlineError, Result};
use crate::types::conference::Conference;
use crate::types::rules::{FamilyRules, RuleFile};

/// Read-only rule lookup over a loaded rule file.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    file: RuleFile,
}

impl RuleStore {
    pub fn new(file: RuleFile) -> Self {
        Self { file }
    }

    /// Parse rule YAML.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> std::result::Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: RuleFile = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
            origin: origin.to_string(),
            source,
        })?;
        Ok(Self::new(file))
    }

    /// Read rules from a YAML file.
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, &path.display().to_string())
    }

    /// Rules for a family: the default layer with the family layer on top.
    pub fn rules_for(&self, family: &str) -> Result<FamilyRules> {
        let layer = self
            .file
            .families
            .get(family)
            .ok_or_else(|| DeadlineError::MissingRules {
                family: family.to_string(),
            })?;
        Ok(self.file.default.clone().overlay(layer).into())
    }

    /// Rules for one conference, including its per-conference overrides.
    ///
    /// A per-conference entry is enough on its own; otherwise the family
    /// must have rules.
    pub fn rules_for_conference(&self, conference: &Conference) -> Result<FamilyRules> {
        let family = self.file.families.get(&conference.family);
        let own = self.file.conferences.get(&conference.id);

        if family.is_none() && own.is_none() {
            return Err(DeadlineError::MissingRules {
                family: conference.family.clone(),
            });
        }

        let mut layer = self.file.default.clone();
        if let Some(family) = family {
            layer = layer.overlay(family);
        }
        if let Some(own) = own {
            layer = layer.overlay(own);
        }
        Ok(layer.into())
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.file.families.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const RULES: &str = r#"
default:
  include_keywords: ["submission deadline"]
  exclude_keywords: ["notification"]
  context_radius: 1
families:
  myconf:
    include_keywords: ["paper submission deadline", "abstract registration"]
  otherconf: {}
conferences:
  myconf-2027:
    firm_keywords: ["firm"]
"#;

    fn conf(id: &str, family: &str) -> Conference {
        Conference::new(
            id,
            family,
            "https://example.org",
            NaiveDate::from_ymd_opt(2027, 3, 15).unwrap(),
        )
    }

    #[test]
    fn test_rules_for_overlays_family_on_default() {
        let store = RuleStore::from_yaml_str(RULES, "inline").unwrap();
        let rules = store.rules_for("myconf").unwrap();

        assert_eq!(
            rules.include_keywords,
            vec!["paper submission deadline", "abstract registration"]
        );
        assert_eq!(rules.exclude_keywords, vec!["notification"]);
        assert_eq!(rules.context_radius, 1);
    }

    #[test]
    fn test_empty_family_layer_inherits_default() {
        let store = RuleStore::from_yaml_str(RULES, "inline").unwrap();
        let rules = store.rules_for("otherconf").unwrap();
        assert_eq!(rules.include_keywords, vec!["submission deadline"]);
    }

    #[test]
    fn test_missing_family_is_missing_rules() {
        let store = RuleStore::from_yaml_str(RULES, "inline").unwrap();
        let err = store.rules_for("nosuchconf").unwrap_err();
        assert!(matches!(err, DeadlineError::MissingRules { family } if family == "nosuchconf"));
    }

    #[test]
    fn test_conference_override_applies_last() {
        let store = RuleStore::from_yaml_str(RULES, "inline").unwrap();
        let rules = store
            .rules_for_conference(&conf("myconf-2027", "myconf"))
            .unwrap();
        assert_eq!(rules.firm_keywords, vec!["firm"]);

        let plain = store
            .rules_for_conference(&conf("myconf-2028", "myconf"))
            .unwrap();
        assert!(plain.firm_keywords.is_empty());
    }

    #[test]
    fn test_conference_without_family_rules_fails() {
        let store = RuleStore::from_yaml_str(RULES, "inline").unwrap();
        let err = store
            .rules_for_conference(&conf("lone-2027", "lone"))
            .unwrap_err();
        assert!(matches!(err, DeadlineError::MissingRules { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = RuleStore::from_yaml_str("families: [unclosed", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
