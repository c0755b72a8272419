// TourBox Profile Model
// Control-to-action mapping documents (JSON or TOML) with atomic validation

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::action_parser::parse_action;
use crate::control::Control;

/// Profile loading errors. Any of these rejects the whole document.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("cannot read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("profile has no 'mappings' section")]
    MissingMappings,

    #[error("unknown control '{0}' in mappings")]
    UnknownControl(String),

    #[error("invalid mapping for '{control}': {reason}")]
    InvalidMapping { control: String, reason: String },
}

/// Document syntax of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Json,
    Toml,
}

impl ProfileFormat {
    /// Pick a format from the file extension; JSON unless it ends in `.toml`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ProfileFormat::Toml,
            _ => ProfileFormat::Json,
        }
    }
}

/// What a control fires, decided once at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionSpec {
    /// One action string with distinct press and release behavior
    Simple(String),
    /// Macro of action strings, fired on press only
    Sequence(Vec<String>),
}

impl ActionSpec {
    /// Action strings in order
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            ActionSpec::Simple(action) => std::slice::from_ref(action),
            ActionSpec::Sequence(actions) => actions,
        };
        slice.iter().map(String::as_str)
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionSpec::Simple(action) => f.write_str(action),
            ActionSpec::Sequence(actions) => write!(f, "[{}]", actions.join(", ")),
        }
    }
}

/// Press behavior of a `Simple` action on a momentary control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Keys stay down until the control is released
    #[default]
    Hold,
    /// Keys are pressed and released on press; release does nothing
    Tap,
}

/// One entry of a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub action: ActionSpec,
    pub description: Option<String>,
    pub mode: TriggerMode,
}

impl Mapping {
    /// Simple action in hold mode
    pub fn simple(action: impl Into<String>) -> Self {
        Self {
            action: ActionSpec::Simple(action.into()),
            description: None,
            mode: TriggerMode::Hold,
        }
    }

    /// Simple action in tap mode
    pub fn tap(action: impl Into<String>) -> Self {
        Self {
            mode: TriggerMode::Tap,
            ..Self::simple(action)
        }
    }

    /// Macro sequence
    pub fn sequence<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: ActionSpec::Sequence(actions.into_iter().map(Into::into).collect()),
            description: None,
            mode: TriggerMode::Hold,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =========================================================================
// Document Schema
// =========================================================================

/// Profile document root. Mapping values stay in the format's own value type
/// until their key has been checked, so a bad entry is reported by control.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileDocument<V> {
    name: Option<String>,
    description: Option<String>,
    mappings: Option<IndexMap<String, V>>,
}

/// Value side of a mapping entry
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum MappingEntry {
    /// Bare string or list of strings
    Action(ActionSpec),
    /// `{ action, description?, mode? }`
    Object(MappingObject),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingObject {
    action: ActionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<TriggerMode>,
}

impl From<MappingEntry> for Mapping {
    fn from(entry: MappingEntry) -> Self {
        match entry {
            MappingEntry::Action(action) => Mapping {
                action,
                description: None,
                mode: TriggerMode::Hold,
            },
            MappingEntry::Object(object) => Mapping {
                action: object.action,
                description: object.description,
                mode: object.mode.unwrap_or_default(),
            },
        }
    }
}

impl From<&Mapping> for MappingEntry {
    fn from(mapping: &Mapping) -> Self {
        let mode = match mapping.action {
            ActionSpec::Simple(_) => Some(mapping.mode),
            ActionSpec::Sequence(_) => None,
        };
        MappingEntry::Object(MappingObject {
            action: mapping.action.clone(),
            description: mapping.description.clone(),
            mode,
        })
    }
}

impl<V> ProfileDocument<V> {
    /// Resolve control names and decode each entry with `decode`
    fn into_profile<E, F>(self, decode: F) -> Result<Profile, ProfileError>
    where
        E: fmt::Display,
        F: Fn(V) -> Result<MappingEntry, E>,
    {
        let entries = self.mappings.ok_or(ProfileError::MissingMappings)?;

        let mut mappings = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let control = Control::from_name(&key)
                .ok_or_else(|| ProfileError::UnknownControl(key.clone()))?;
            let entry = decode(value).map_err(|e| ProfileError::InvalidMapping {
                control: key.clone(),
                reason: e.to_string(),
            })?;
            let mapping = Mapping::from(entry);
            warn_on_bad_actions(&key, &mapping.action);
            mappings.insert(control, mapping);
        }

        Ok(Profile {
            name: self.name.unwrap_or_else(|| "Unnamed".to_string()),
            description: self.description.unwrap_or_default(),
            mappings,
            source: None,
        })
    }
}

/// An immutable control-to-action mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    description: String,
    mappings: IndexMap<Control, Mapping>,
    /// File the profile was loaded from (for reload)
    source: Option<PathBuf>,
}

impl Profile {
    /// Create an empty profile
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mappings: IndexMap::new(),
            source: None,
        }
    }

    /// Builder-style insert, used for profiles assembled in code
    pub fn with_mapping(mut self, control: Control, mapping: Mapping) -> Self {
        self.mappings.insert(control, mapping);
        self
    }

    /// Load a profile document from a file, picking the format by extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut profile = Self::from_str_with(&content, ProfileFormat::from_path(path))?;
        profile.source = Some(path.to_path_buf());
        Ok(profile)
    }

    /// Load a profile document from text
    pub fn from_str_with(content: &str, format: ProfileFormat) -> Result<Self, ProfileError> {
        match format {
            ProfileFormat::Json => {
                let document: ProfileDocument<serde_json::Value> = serde_json::from_str(content)?;
                document.into_profile(serde_json::from_value::<MappingEntry>)
            }
            ProfileFormat::Toml => {
                let document: ProfileDocument<toml::Value> = toml::from_str(content)?;
                document.into_profile(|value: toml::Value| value.try_into::<MappingEntry>())
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Mapping for a control, if any
    pub fn get(&self, control: Control) -> Option<&Mapping> {
        self.mappings.get(&control)
    }

    /// Mappings in document order
    pub fn mappings(&self) -> impl Iterator<Item = (Control, &Mapping)> {
        self.mappings.iter().map(|(control, mapping)| (*control, mapping))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// File this profile was loaded from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Write the profile as a JSON document in the object mapping form
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mappings: IndexMap<String, MappingEntry> = self
            .mappings
            .iter()
            .map(|(control, mapping)| (control.name().to_string(), MappingEntry::from(mapping)))
            .collect();

        let document = ProfileDocument {
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            mappings: Some(mappings),
        };
        serde_json::to_string_pretty(&document)
    }
}

/// Grammar problems never reject a profile: an action that does not parse
/// does nothing when fired, and unknown key parts are skipped.
fn warn_on_bad_actions(control: &str, spec: &ActionSpec) {
    for action in spec.actions() {
        match parse_action(action) {
            Ok(program) => {
                for part in program.unknown() {
                    log::warn!(
                        "{}: unknown key '{}' in '{}' will be skipped",
                        control,
                        part,
                        action
                    );
                }
            }
            Err(e) => log::warn!("{}: action '{}' will do nothing: {}", control, action, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_json(text: &str) -> Result<Profile, ProfileError> {
        Profile::from_str_with(text, ProfileFormat::Json)
    }

    #[test]
    fn test_load_simple_and_sequence() {
        let profile = load_json(
            r#"{
                "name": "Dev",
                "description": "Developer workflow",
                "mappings": {
                    "side": "cmd+c",
                    "c1": ["type:/commit", "enter"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(profile.name(), "Dev");
        assert_eq!(profile.description(), "Developer workflow");
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get(Control::Side), Some(&Mapping::simple("cmd+c")));
        assert_eq!(
            profile.get(Control::C1).map(|m| &m.action),
            Some(&ActionSpec::Sequence(vec![
                "type:/commit".to_string(),
                "enter".to_string()
            ]))
        );
        assert!(profile.get(Control::Top).is_none());
    }

    #[test]
    fn test_load_object_form() {
        let profile = load_json(
            r#"{
                "name": "Objects",
                "mappings": {
                    "tall": {"action": "cmd+z", "description": "Undo"},
                    "top": {"action": "cmd+v", "mode": "tap"},
                    "tour": {"action": ["cmd+space", "type:term"]}
                }
            }"#,
        )
        .unwrap();

        let tall = profile.get(Control::Tall).unwrap();
        assert_eq!(tall.description.as_deref(), Some("Undo"));
        assert_eq!(tall.mode, TriggerMode::Hold);
        assert_eq!(profile.get(Control::Top).unwrap().mode, TriggerMode::Tap);
        assert!(matches!(
            profile.get(Control::Tour).unwrap().action,
            ActionSpec::Sequence(_)
        ));
        assert_eq!(profile.description(), "");
    }

    #[test]
    fn test_mappings_keep_document_order() {
        let profile = load_json(
            r#"{"mappings": {"top": "a", "side": "b", "tall": "c"}}"#,
        )
        .unwrap();
        let order: Vec<Control> = profile.mappings().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Control::Top, Control::Side, Control::Tall]);
        assert_eq!(profile.name(), "Unnamed");
    }

    #[test]
    fn test_missing_mappings() {
        assert!(matches!(
            load_json(r#"{"name": "x"}"#),
            Err(ProfileError::MissingMappings)
        ));
    }

    #[test]
    fn test_mappings_not_a_map() {
        assert!(matches!(
            load_json(r#"{"mappings": ["side"]}"#),
            Err(ProfileError::Json(_))
        ));
    }

    #[test]
    fn test_document_not_a_map() {
        assert!(matches!(load_json("[1, 2]"), Err(ProfileError::Json(_))));
    }

    #[test]
    fn test_unknown_top_level_field_rejects_document() {
        let result = load_json(r#"{"name": "x", "mapping": {}, "mappings": {}}"#);
        assert!(matches!(result, Err(ProfileError::Json(_))));
    }

    #[test]
    fn test_unknown_object_field_rejects_document() {
        let result = load_json(r#"{"mappings": {"c1": {"action": "a", "hotkey": "b"}}}"#);
        assert!(matches!(
            result,
            Err(ProfileError::InvalidMapping { ref control, .. }) if control == "c1"
        ));
    }

    #[test]
    fn test_unknown_control_rejects_document() {
        let result = load_json(r#"{"mappings": {"side": "cmd+c", "pedal": "a"}}"#);
        assert!(matches!(result, Err(ProfileError::UnknownControl(ref name)) if name == "pedal"));
    }

    #[test]
    fn test_bad_value_type_rejects_document() {
        let result = load_json(r#"{"mappings": {"side": "cmd+c", "top": 42}}"#);
        assert!(matches!(
            result,
            Err(ProfileError::InvalidMapping { ref control, .. }) if control == "top"
        ));
    }

    #[test]
    fn test_non_string_sequence_element_rejects_document() {
        let result = load_json(r#"{"mappings": {"c1": ["enter", 3]}}"#);
        assert!(matches!(result, Err(ProfileError::InvalidMapping { .. })));
    }

    #[test]
    fn test_object_without_action_rejects_document() {
        let result = load_json(r#"{"mappings": {"c1": {"description": "x"}}}"#);
        assert!(matches!(result, Err(ProfileError::InvalidMapping { .. })));
    }

    #[test]
    fn test_unknown_mode_rejects_document() {
        let result = load_json(r#"{"mappings": {"c1": {"action": "a", "mode": "toggle"}}}"#);
        assert!(matches!(result, Err(ProfileError::InvalidMapping { .. })));
    }

    #[test]
    fn test_unparsable_actions_still_load() {
        let profile = load_json(
            r#"{
                "mappings": {
                    "side": "cmd+c",
                    "c1": "",
                    "c2": "shell:",
                    "tour": ["enter", " "]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(profile.len(), 4);
        assert_eq!(profile.get(Control::C1), Some(&Mapping::simple("")));
        assert_eq!(profile.get(Control::C2), Some(&Mapping::simple("shell:")));
        assert!(matches!(
            profile.get(Control::Tour).unwrap().action,
            ActionSpec::Sequence(_)
        ));
    }

    #[test]
    fn test_unknown_key_part_only_warns() {
        let profile = load_json(r#"{"mappings": {"c1": "cmd+hyper+k"}}"#).unwrap();
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(load_json("{"), Err(ProfileError::Json(_))));
    }

    #[test]
    fn test_load_toml() {
        let profile = Profile::from_str_with(
            r#"
            name = "Toml"

            [mappings]
            side = "cmd+c"
            c1 = ["type:/commit", "enter"]
            tall = { action = "cmd+z", mode = "tap" }
            "#,
            ProfileFormat::Toml,
        )
        .unwrap();

        assert_eq!(profile.name(), "Toml");
        assert_eq!(profile.len(), 3);
        assert_eq!(profile.get(Control::Tall).unwrap().mode, TriggerMode::Tap);
    }

    #[test]
    fn test_json_round_trip() {
        let profile = load_json(
            r#"{
                "name": "Trip",
                "description": "d",
                "mappings": {
                    "side": {"action": "cmd+c", "description": "Copy", "mode": "tap"},
                    "c1": ["type:/commit", "enter"]
                }
            }"#,
        )
        .unwrap();

        let text = profile.to_json_pretty().unwrap();
        assert_eq!(load_json(&text).unwrap(), profile);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ProfileFormat::from_path(Path::new("a.toml")), ProfileFormat::Toml);
        assert_eq!(ProfileFormat::from_path(Path::new("a.TOML")), ProfileFormat::Toml);
        assert_eq!(ProfileFormat::from_path(Path::new("a.json")), ProfileFormat::Json);
        assert_eq!(ProfileFormat::from_path(Path::new("profile")), ProfileFormat::Json);
    }
}
