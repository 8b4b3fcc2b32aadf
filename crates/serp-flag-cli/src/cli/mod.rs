//! CLI subcommand implementations for the serp-flag binary.

pub mod annotate_cmd;
pub mod audit;
pub mod classify_cmd;
pub mod doctor;
pub mod extract_cmd;
pub mod output;
pub mod settings;
pub mod source;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
pub fn init_tracing() {
    let default_directives = if output::is_verbose() {
        "serp_flag=debug,serp_flag_cli=debug"
    } else if output::is_quiet() {
        "serp_flag=error,serp_flag_cli=error"
    } else {
        "serp_flag=warn,serp_flag_cli=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
