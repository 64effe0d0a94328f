mod cli;
mod commands;

use cli::{BuildParams, CheckParams, DumpParams, build_cli};
use tracing_subscriber::filter::EnvFilter;

/// Environment variable holding the log filter, e.g. `QUILL_LOG=quill_image=debug`.
const LOG_ENV: &str = "QUILL_LOG";

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("build", m)) => {
            let params = BuildParams::from_matches(m);
            commands::build::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
