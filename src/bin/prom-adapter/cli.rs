//! Command-line interface definitions for the remote storage adapter.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the remote storage adapter.
#[derive(Debug, Parser)]
#[command(name = "prom-adapter")]
#[command(author, version, about = "Prometheus remote write/read storage adapter")]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overrides `http.listen` from the configuration
    #[arg(long)]
    pub listen: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test parsing of both options.
    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from(["prom-adapter", "--config", "adapter.yaml", "--listen", ":9201"]);
        assert_eq!(cli.config, Some(PathBuf::from("adapter.yaml")));
        assert_eq!(cli.listen.as_deref(), Some(":9201"));

        let cli = Cli::parse_from(["prom-adapter"]);
        assert!(cli.config.is_none());
        assert!(cli.listen.is_none());
    }
}
