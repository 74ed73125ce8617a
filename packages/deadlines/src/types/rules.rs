//! Keyword rule types.
//!
//! The rule file is layered: a `default` layer, per-family layers, and
//! per-conference overrides. Each layer only sets the fields it names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One layer of the rule file. Unset fields inherit from the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firm_keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_radius: Option<usize>,
}

impl RuleLayer {
    /// Apply `upper` on top of `self`, field by field.
    pub fn overlay(mut self, upper: &RuleLayer) -> Self {
        if let Some(v) = &upper.include_keywords {
            self.include_keywords = Some(v.clone());
        }
        if let Some(v) = &upper.exclude_keywords {
            self.exclude_keywords = Some(v.clone());
        }
        if let Some(v) = &upper.firm_keywords {
            self.firm_keywords = Some(v.clone());
        }
        if let Some(v) = &upper.extension_keywords {
            self.extension_keywords = Some(v.clone());
        }
        if let Some(v) = upper.context_radius {
            self.context_radius = Some(v);
        }
        self
    }
}

/// The rule file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub default: RuleLayer,

    #[serde(default)]
    pub families: HashMap<String, RuleLayer>,

    #[serde(default)]
    pub conferences: HashMap<String, RuleLayer>,
}

/// Effective keyword rules for one family (or one conference).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyRules {
    /// Phrases whose presence marks a line as deadline-bearing
    pub include_keywords: Vec<String>,

    /// Phrases that invalidate any date in the same window
    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    /// Phrases that mark a date as a firm (final) deadline
    #[serde(default)]
    pub firm_keywords: Vec<String>,

    /// Phrases that mark a date as an extension
    #[serde(default)]
    pub extension_keywords: Vec<String>,

    /// Lines on either side of a keyword line searched for dates
    #[serde(default)]
    pub context_radius: usize,
}

impl FamilyRules {
    pub fn new<I, S>(include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include_keywords: include.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_keywords = exclude.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_firm<I, S>(mut self, firm: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.firm_keywords = firm.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extension<I, S>(mut self, extension: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extension_keywords = extension.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    /// First include keyword found in an already-lowercased line.
    pub fn include_match(&self, lowered: &str) -> Option<&str> {
        first_match(&self.include_keywords, lowered)
    }

    pub fn is_excluded(&self, lowered: &str) -> bool {
        first_match(&self.exclude_keywords, lowered).is_some()
    }

    pub fn is_firm(&self, lowered: &str) -> bool {
        first_match(&self.firm_keywords, lowered).is_some()
    }

    pub fn is_extension(&self, lowered: &str) -> bool {
        first_match(&self.extension_keywords, lowered).is_some()
    }
}

impl From<RuleLayer> for FamilyRules {
    fn from(layer: RuleLayer) -> Self {
        Self {
            include_keywords: layer.include_keywords.unwrap_or_default(),
            exclude_keywords: layer.exclude_keywords.unwrap_or_default(),
            firm_keywords: layer.firm_keywords.unwrap_or_default(),
            extension_keywords: layer.extension_keywords.unwrap_or_default(),
            context_radius: layer.context_radius.unwrap_or(0),
        }
    }
}

fn first_match<'a>(keywords: &'a [String], lowered: &str) -> Option<&'a str> {
    keywords
        .iter()
        .map(String::as_str)
        .filter(|k| !k.trim().is_empty())
        .find(|k| lowered.contains(&k.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_replaces_only_set_fields() {
        let base = RuleLayer {
            include_keywords: Some(vec!["deadline".into()]),
            exclude_keywords: Some(vec!["notification".into()]),
            context_radius: Some(1),
            ..Default::default()
        };
        let family = RuleLayer {
            include_keywords: Some(vec!["paper submission".into()]),
            ..Default::default()
        };

        let merged = FamilyRules::from(base.overlay(&family));

        assert_eq!(merged.include_keywords, vec!["paper submission"]);
        assert_eq!(merged.exclude_keywords, vec!["notification"]);
        assert_eq!(merged.context_radius, 1);
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let rules = FamilyRules::new(["Paper Submission Deadline"]).with_exclude(["Notification"]);

        let line = "paper submission deadline: march 20, 2027";
        assert_eq!(rules.include_match(line), Some("Paper Submission Deadline"));
        assert!(!rules.is_excluded(line));
        assert!(rules.is_excluded("author notification: may 1"));
    }

    #[test]
    fn test_blank_keywords_never_match() {
        let rules = FamilyRules::new(["", "  "]);
        assert_eq!(rules.include_match("anything at all"), None);
    }
}
