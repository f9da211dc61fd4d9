mod cli;
mod config;
mod error;
mod render;
mod session;
mod transcript;

use anyhow::Result;

use cli::Cli;

fn main() -> Result<()> {
    cli::util::init_logging();
    let cli = Cli::parse_lenient();
    cli::statusline::run(cli)
}
