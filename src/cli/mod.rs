pub mod statusline;
pub mod util;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

/// One-line session status: directory, model and context token usage
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "tokenline", version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,

    /// Use ASCII labels instead of emoji icons
    #[arg(long)]
    pub no_unicode: bool,

    /// Path to statusline.toml (default: $TOKENLINE_CONFIG, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments without ever failing the statusline.
    pub fn parse_lenient() -> Self {
        Self::parse_lenient_from(std::env::args_os())
    }

    /// `--help` and `--version` print and exit as usual. Any other argument
    /// error falls back to the default flags so the host still gets its line.
    pub fn parse_lenient_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                tracing::debug!("ignoring command line: {}", e);
                Self::default()
            }
        }
    }
}
