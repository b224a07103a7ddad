use crate::ShakeError;
use serde::{Deserialize, Serialize};

/// Filter configuration.
///
/// Reads from JSON with camelCase keys; missing keys take their defaults and
/// unknown keys are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ShakeOptions {
    /// Emit compressed rules joined with nothing (`true`), or pretty rules
    /// joined by newlines (`false`).
    pub compress: bool,
    /// Also retain a rule when one of its id tokens appears in an `id`
    /// attribute. Off by default: only class tokens are tested.
    pub match_ids: bool,
    /// Treat rules whose selectors reference no class or id at all
    /// (`div > p`, `body`) as always-include instead of never-retained.
    pub keep_unanchored_rules: bool,
}

impl Default for ShakeOptions {
    fn default() -> Self {
        Self {
            compress: true,
            match_ids: false,
            keep_unanchored_rules: false,
        }
    }
}

impl ShakeOptions {
    /// Defaults with the given output mode.
    pub fn with_compress(compress: bool) -> Self {
        Self {
            compress,
            ..Self::default()
        }
    }

    /// Parse options from a JSON object.
    ///
    /// # Errors
    /// Returns [`ShakeError::Options`] for malformed JSON, wrongly typed values
    /// or unknown keys.
    pub fn from_json(text: &str) -> Result<Self, ShakeError> {
        Ok(serde_json::from_str(text)?)
    }
}
