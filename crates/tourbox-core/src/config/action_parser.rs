// TourBox Config API - Action String Parser
// Parses action strings like "cmd+shift+z", "type:/commit" or "shell:open ."

use std::fmt;

use crate::key::{Key, KeyToken};

/// One executable step of an action program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStep {
    /// Press (and later release) a key
    Key(KeyToken),
    /// Inject literal text
    TypeText(String),
    /// Launch a shell command, detached
    Shell(String),
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStep::Key(token) => write!(f, "{}", token),
            ActionStep::TypeText(text) => write!(f, "type:{}", text),
            ActionStep::Shell(cmd) => write!(f, "shell:{}", cmd),
        }
    }
}

/// Parsed form of one action string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionProgram {
    steps: Vec<ActionStep>,
    /// Combo parts that resolved to nothing; skipped at execution
    unknown: Vec<String>,
}

impl ActionProgram {
    /// Program that does nothing (`none`)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    /// Pressable tokens in written order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = KeyToken> + '_ {
        self.steps.iter().filter_map(|step| match step {
            ActionStep::Key(token) => Some(*token),
            _ => None,
        })
    }

    /// Combo parts that were skipped as unknown keys
    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Hard failures of the action grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("action string cannot be empty")]
    Empty,

    #[error("shell action has no command")]
    EmptyCommand,
}

/// Parse an action string into a program.
///
/// Keywords (`none`, `type:`, `shell:`) are case-insensitive. The payload of
/// `type:` and `shell:` is everything after the first colon, verbatim.
/// Anything else is a `+`-joined combo; parts that are neither a named key nor
/// a single character are recorded in [`ActionProgram::unknown`] and skipped.
///
/// # Examples
/// ```
/// use tourbox_core::config::parse_action;
/// use tourbox_core::{Key, KeyToken};
/// let program = parse_action("cmd+c").unwrap();
/// let keys: Vec<_> = program.keys().collect();
/// assert_eq!(keys, vec![KeyToken::Named(Key::Cmd), KeyToken::Literal('c')]);
/// ```
pub fn parse_action(action: &str) -> Result<ActionProgram, GrammarError> {
    let trimmed = action.trim();
    if trimmed.is_empty() {
        return Err(GrammarError::Empty);
    }

    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(ActionProgram::empty());
    }

    if let Some((keyword, payload)) = action.trim_start().split_once(':') {
        let keyword = keyword.trim();
        if keyword.eq_ignore_ascii_case("type") {
            return Ok(ActionProgram {
                steps: vec![ActionStep::TypeText(payload.to_string())],
                unknown: Vec::new(),
            });
        }
        if keyword.eq_ignore_ascii_case("shell") {
            if payload.trim().is_empty() {
                return Err(GrammarError::EmptyCommand);
            }
            return Ok(ActionProgram {
                steps: vec![ActionStep::Shell(payload.to_string())],
                unknown: Vec::new(),
            });
        }
    }

    Ok(parse_combo(trimmed))
}

/// Split a combo on `+` and resolve each part
fn parse_combo(combo: &str) -> ActionProgram {
    let lower = combo.to_lowercase();
    let mut program = ActionProgram::default();

    for part in lower.split('+') {
        let part = part.trim();
        if let Some(token) = resolve_part(part) {
            program.steps.push(ActionStep::Key(token));
        } else {
            program.unknown.push(part.to_string());
        }
    }

    program
}

fn resolve_part(part: &str) -> Option<KeyToken> {
    if let Some(key) = Key::from_name(part) {
        return Some(KeyToken::Named(key));
    }

    let mut chars = part.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeyToken::Literal(c)),
        _ => None,
    }
}
