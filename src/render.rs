//! Turns session facts and token totals into the printed statusline.

use colored::Colorize;

use crate::session::SessionContext;

/// Percentage from which the usage is shown as a warning.
pub const WARNING_PERCENT: u64 = 70;

/// Percentage from which the usage is shown as critical.
pub const CRITICAL_PERCENT: u64 = 90;

/// How urgent the current token usage is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageBand {
    Nominal,
    Warning,
    Critical,
}

impl UsageBand {
    /// Lower bounds are inclusive: 70 is already `Warning`, 90 is `Critical`.
    pub fn classify(percentage: u64) -> Self {
        if percentage >= CRITICAL_PERCENT {
            UsageBand::Critical
        } else if percentage >= WARNING_PERCENT {
            UsageBand::Warning
        } else {
            UsageBand::Nominal
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            UsageBand::Nominal => text.green().to_string(),
            UsageBand::Warning => text.yellow().to_string(),
            UsageBand::Critical => text.red().to_string(),
        }
    }
}

/// Format a token count, e.g. 999 -> "999", 12345 -> "12.3K".
/// Thousands are rounded half-up to one decimal.
pub fn format_tokens(tokens: u64) -> String {
    if tokens < 1000 {
        return tokens.to_string();
    }
    let tenths = (tokens as u128 + 50) / 100;
    format!("{}.{}K", tenths / 10, tenths % 10)
}

/// `round(100 * total / threshold)`, half-up, never above 100.
pub fn percentage(total: u64, threshold: u64) -> u64 {
    if threshold == 0 {
        return if total == 0 { 0 } else { 100 };
    }
    let scaled = (200 * total as u128 + threshold as u128) / (2 * threshold as u128);
    scaled.min(100) as u64
}

/// Icon set used by the statusline.
#[derive(Debug, Clone, Copy)]
struct Glyphs {
    dir: &'static str,
    model: &'static str,
    tokens: &'static str,
    warning: &'static str,
}

const UNICODE_GLYPHS: Glyphs = Glyphs {
    dir: "\u{1F4C1} ",
    model: "\u{1F916} ",
    tokens: "\u{1F3AB} ",
    warning: "\u{26A0}\u{FE0F}  ",
};

const ASCII_GLYPHS: Glyphs = Glyphs {
    dir: "dir: ",
    model: "model: ",
    tokens: "tokens: ",
    warning: "! ",
};

fn glyphs(use_unicode: bool) -> Glyphs {
    if use_unicode {
        UNICODE_GLYPHS
    } else {
        ASCII_GLYPHS
    }
}

/// Render the full statusline: directory, model, tokens, percentage.
pub fn render_status(
    session: &SessionContext,
    total_tokens: u64,
    threshold: u64,
    use_unicode: bool,
) -> String {
    let g = glyphs(use_unicode);
    let pct = percentage(total_tokens, threshold);
    let styled_pct = UsageBand::classify(pct).paint(&format!("{}%", pct));

    format!(
        "{}{} | {}{} | {}{} ({})",
        g.dir,
        session.dir_name(),
        g.model,
        session.model,
        g.tokens,
        format_tokens(total_tokens),
        styled_pct
    )
}

/// Render the fallback line shown when the session cannot be described:
/// only the directory and a warning message.
pub fn render_degraded(dir_name: &str, message: &str, use_unicode: bool) -> String {
    let g = glyphs(use_unicode);
    format!("{}{} | {}{}", g.dir, dir_name, g.warning, message)
}
