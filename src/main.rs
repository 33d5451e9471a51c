//! # Rule
//!
//! Interactive shell for the rule language.
//!

use tracing_subscriber::EnvFilter;

mod term;

fn main() {
    let filter = EnvFilter::try_from_env("RULE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    term::main(&args);
}
