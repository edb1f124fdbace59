use std::io;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Filter directive for the given number of `-v` flags, falling back to the
/// configured filter when none were passed.
pub fn filter_directive(verbosity: u8, configured: &str) -> String {
    match verbosity {
        0 => configured.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Events go to stderr; stdout carries the
/// protocol.
pub fn init(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log filter '{directive}'"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install logger: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_configured_filter() {
        assert_eq!(filter_directive(0, "warn"), "warn");
        assert_eq!(filter_directive(1, "warn"), "info");
        assert_eq!(filter_directive(2, "warn"), "debug");
        assert_eq!(filter_directive(7, "warn"), "trace");
    }

    #[test]
    fn rejects_malformed_directive() {
        assert!(init("docs_mcp=loud").is_err());
    }
}
