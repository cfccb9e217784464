//! Build-variable expansion for configured templates.
//!
//! The pull-request key is configured as a template such as
//! `${GERRIT_CHANGE_NUMBER}` and expanded against the build environment
//! right before the fetch.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Expansion failure reported by a [`MacroExpander`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacroError {
    #[error("undefined variable {0}")]
    Undefined(String),

    #[error("invalid variable name '{0}'")]
    InvalidName(String),

    #[error("unterminated variable reference at offset {0}")]
    Unterminated(usize),
}

/// Variables a template is expanded against.
#[derive(Debug, Clone, Default)]
pub struct MacroContext {
    pub env: HashMap<String, String>,
}

impl MacroContext {
    /// Build variables plus `WORKSPACE`, unless the build already defines it.
    pub fn new(workspace: &Path, mut env: HashMap<String, String>) -> Self {
        env.entry("WORKSPACE".to_string())
            .or_insert_with(|| workspace.display().to_string());
        Self { env }
    }
}

/// Expands a template into its final string.
pub trait MacroExpander: Send + Sync {
    fn expand(&self, template: &str, context: &MacroContext) -> Result<String, MacroError>;
}

/// Expands `${NAME}` and `$NAME`; `$$` yields a literal dollar.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMacroExpander;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\$(?:\$|\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*)|\{([^}]*)\}|(\{))",
        )
        .expect("token pattern is valid")
    })
}

impl MacroExpander for EnvMacroExpander {
    fn expand(&self, template: &str, context: &MacroContext) -> Result<String, MacroError> {
        let mut failure = None;

        let expanded = token_pattern().replace_all(template, |caps: &Captures<'_>| {
            if failure.is_some() {
                return String::new();
            }
            if let Some(name) = caps.get(3) {
                failure = Some(MacroError::InvalidName(name.as_str().to_string()));
                return String::new();
            }
            if caps.get(4).is_some() {
                failure = Some(MacroError::Unterminated(caps.get(0).map_or(0, |m| m.start())));
                return String::new();
            }

            match caps.get(1).or_else(|| caps.get(2)) {
                Some(name) => match context.env.get(name.as_str()) {
                    Some(value) => value.clone(),
                    None => {
                        failure = Some(MacroError::Undefined(name.as_str().to_string()));
                        String::new()
                    }
                },
                None => "$".to_string(),
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(expanded.into_owned()),
        }
    }
}
