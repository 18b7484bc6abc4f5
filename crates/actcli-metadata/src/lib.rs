//! Serializable description of an actcli program.
//!
//! The types here carry no behavior: they mirror what a registered program
//! knows about itself (actions, their options and positional signatures) so
//! it can be dumped as JSON and read back by tooling.

use serde::{Deserialize, Serialize};

/// Current layout version of [`AppMeta`].
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct OptionMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_name: Option<String>,
    /// One of `absent`, `required`, `optional`.
    pub arg_requirement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_type: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    /// Rendered form used in help, e.g. `-i, --indent[=N]`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
}

impl OptionMeta {
    pub fn takes_value(&self) -> bool {
        self.arg_requirement != "absent"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct SignatureMeta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default)]
    pub min_args: usize,
    /// `None` when any number of trailing arguments is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_args: Option<usize>,
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ActionMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argdef: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionMeta>,
    #[serde(default)]
    pub signature: SignatureMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct AppMeta {
    pub format_version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<ActionMeta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionMeta>,
}

impl AppMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name: name.into(),
            description: String::new(),
            version: String::new(),
            default_action: None,
            global: None,
            actions: Vec::new(),
        }
    }

    /// Look up an action by name or alias.
    pub fn action(&self, name: &str) -> Option<&ActionMeta> {
        self.actions
            .iter()
            .find(|a| a.name == name)
            .or_else(|| self.actions.iter().find(|a| a.alias.as_deref() == Some(name)))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppMeta {
        let mut meta = AppMeta::new("tool");
        meta.description = "sample tool".to_string();
        meta.default_action = Some("help".to_string());
        meta.actions.push(ActionMeta {
            name: "history".to_string(),
            alias: Some("hist".to_string()),
            argdef: Some("[N]".to_string()),
            description: "show history".to_string(),
            options: vec![OptionMeta {
                name: "date".to_string(),
                short: Some("d".to_string()),
                long: Some("date".to_string()),
                arg_name: Some("DATE".to_string()),
                arg_requirement: "required".to_string(),
                help: "date (YYYY-MM-DD)".to_string(),
                usage: "-d, --date=DATE".to_string(),
                ..OptionMeta::default()
            }],
            signature: SignatureMeta {
                params: vec!["n".to_string()],
                min_args: 0,
                max_args: Some(1),
                variadic: false,
            },
            ..ActionMeta::default()
        });
        meta
    }

    #[test]
    fn serializes_kebab_case_and_skips_empty_fields() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"format-version\":1"));
        assert!(json.contains("\"default-action\":\"help\""));
        assert!(json.contains("\"arg-requirement\":\"required\""));
        assert!(json.contains("\"max-args\":1"));
        assert!(!json.contains("\"version\""));
        assert!(!json.contains("\"doc\""));
        assert!(!json.contains("\"arg-type\""));
    }

    #[test]
    fn reads_back_what_it_writes() {
        let meta = sample();
        let parsed = AppMeta::from_json(&meta.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn missing_optional_fields_default() {
        let parsed =
            AppMeta::from_json(r#"{"format-version":1,"name":"x","actions":[{"name":"a"}]}"#)
                .unwrap();
        assert_eq!(parsed.actions[0].signature, SignatureMeta::default());
        assert!(parsed.actions[0].options.is_empty());
        assert!(parsed.global.is_none());
    }

    #[test]
    fn action_lookup_by_alias() {
        let meta = sample();
        assert_eq!(meta.action("hist").map(|a| a.name.as_str()), Some("history"));
        assert!(meta.action("nope").is_none());
        assert!(meta.actions[0].options[0].takes_value());
    }
}
