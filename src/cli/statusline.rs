use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::util::configure_color;
use crate::cli::Cli;
use crate::config::{self, StatuslineConfig};
use crate::error::StatuslineError;
use crate::render::{render_degraded, render_status};
use crate::session::{self, dir_name, SessionContext};
use crate::transcript::{self, UsageTotals};

/// Result of one statusline tick. Both variants carry a printable line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Degraded { line: String, cause: String },
}

impl Outcome {
    pub fn into_line(self) -> String {
        match self {
            Outcome::Success(line) => line,
            Outcome::Degraded { line, .. } => line,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Entry point. Every failure, panics included, is turned into a degraded
/// line so the process always prints exactly one line and exits 0.
pub fn run(cli: Cli) -> Result<()> {
    configure_color(cli.no_color);
    let use_unicode = !cli.no_unicode;
    let fallback_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // The default hook would print the panic to stderr.
    std::panic::set_hook(Box::new(|info| tracing::error!("statusline panicked: {}", info)));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let config = config::load(cli.config.as_deref());
        match session::read_stdin() {
            Ok(input) => build_line(&input, &config, &fallback_dir, use_unicode),
            Err(e) => degrade(e, &fallback_dir, use_unicode),
        }
    }));

    let outcome = result.unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        Outcome::Degraded {
            line: render_degraded(
                &dir_name(&fallback_dir),
                &format!("Error: {}", message),
                use_unicode,
            ),
            cause: message,
        }
    });

    if let Outcome::Degraded { cause, .. } = &outcome {
        tracing::debug!("degraded statusline: {}", cause);
    }

    // A closed stdout is the host's business; the exit code stays 0.
    let _ = writeln!(std::io::stdout().lock(), "{}", outcome.into_line());
    Ok(())
}

/// Render the statusline for a raw stdin payload.
pub fn build_line(
    input: &str,
    config: &StatuslineConfig,
    fallback_dir: &Path,
    use_unicode: bool,
) -> Outcome {
    let session = match SessionContext::from_json(input, fallback_dir) {
        Ok(session) => session,
        Err(e) => return degrade(e, fallback_dir, use_unicode),
    };

    let totals = match (&session.session_id, config.resolved_projects_dir()) {
        (Some(id), Some(root)) => {
            transcript::session_usage(&root, id, &config.transcript_extension)
        }
        _ => UsageTotals::default(),
    };

    Outcome::Success(render_status(
        &session,
        totals.total(),
        config.compaction_threshold(),
        use_unicode,
    ))
}

fn degrade(error: StatuslineError, fallback_dir: &Path, use_unicode: bool) -> Outcome {
    let message = match &error {
        StatuslineError::EmptyInput => error.to_string(),
        _ => format!("Error: {}", error),
    };
    Outcome::Degraded {
        line: render_degraded(&dir_name(fallback_dir), &message, use_unicode),
        cause: error.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
