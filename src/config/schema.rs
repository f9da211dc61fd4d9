use std::path::PathBuf;

use serde::Deserialize;

/// Context window of the host model, in tokens.
pub const DEFAULT_MAX_CONTEXT_TOKENS: u64 = 200_000;

/// Fraction of the context window at which the host compacts the session.
pub const DEFAULT_COMPACTION_RATIO: f64 = 0.8;

pub const DEFAULT_TRANSCRIPT_EXTENSION: &str = "jsonl";

/// User-configurable statusline settings.
/// Missing file is not an error -- all fields have defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatuslineConfig {
    /// Root holding one subdirectory per project, each with `<session>.jsonl` files.
    /// Default: `~/.claude/projects`
    pub projects_dir: Option<PathBuf>,

    /// Extension of transcript files, without the leading dot.
    /// Default: "jsonl"
    pub transcript_extension: String,

    /// Default: 200000
    pub max_context_tokens: u64,

    /// Default: 0.8
    pub compaction_ratio: f64,
}

impl Default for StatuslineConfig {
    fn default() -> Self {
        Self {
            projects_dir: None,
            transcript_extension: DEFAULT_TRANSCRIPT_EXTENSION.to_string(),
            max_context_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
            compaction_ratio: DEFAULT_COMPACTION_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigMessage {
    Warning(String),
}

impl StatuslineConfig {
    /// Check the loaded values and report anything that will be replaced
    /// by its default.
    pub fn validate(&self) -> Vec<ConfigMessage> {
        let mut messages = Vec::new();

        if self.max_context_tokens == 0 {
            messages.push(ConfigMessage::Warning(format!(
                "max_context_tokens must be positive, using {}",
                DEFAULT_MAX_CONTEXT_TOKENS
            )));
        }

        if !(self.compaction_ratio > 0.0 && self.compaction_ratio <= 1.0) {
            messages.push(ConfigMessage::Warning(format!(
                "compaction_ratio {} is outside (0, 1], using {}",
                self.compaction_ratio, DEFAULT_COMPACTION_RATIO
            )));
        }

        let ext = self.transcript_extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            messages.push(ConfigMessage::Warning(format!(
                "invalid transcript_extension {:?}, using {:?}",
                self.transcript_extension, DEFAULT_TRANSCRIPT_EXTENSION
            )));
        }

        messages
    }

    /// Replace every invalid value with its default. Returns the warnings
    /// that were raised.
    pub fn sanitize(&mut self) -> Vec<ConfigMessage> {
        let messages = self.validate();

        if self.max_context_tokens == 0 {
            self.max_context_tokens = DEFAULT_MAX_CONTEXT_TOKENS;
        }
        if !(self.compaction_ratio > 0.0 && self.compaction_ratio <= 1.0) {
            self.compaction_ratio = DEFAULT_COMPACTION_RATIO;
        }
        let ext = self.transcript_extension.trim_start_matches('.').to_string();
        if ext.is_empty() || ext.contains(['/', '\\']) {
            self.transcript_extension = DEFAULT_TRANSCRIPT_EXTENSION.to_string();
        } else {
            self.transcript_extension = ext;
        }

        messages
    }

    /// Token budget the percentage is measured against.
    pub fn compaction_threshold(&self) -> u64 {
        (self.max_context_tokens as f64 * self.compaction_ratio).round() as u64
    }

    /// Transcript root: the configured directory, or `~/.claude/projects`.
    /// `None` when no home directory can be determined.
    pub fn resolved_projects_dir(&self) -> Option<PathBuf> {
        self.projects_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".claude").join("projects")))
    }
}
