use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/volregime.yaml";

#[derive(Parser, Debug)]
#[command(name = "volregime")]
#[command(about = "VolRegime - volatility regime prediction and options strategy selection")]
#[command(version)]
pub struct Cli {
    /// Log output format; overrides the configuration file
    #[arg(long, global = true, value_enum, env = "VOLREGIME_LOG_FORMAT")]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the prediction, feed and data routes over HTTP
    Serve {
        /// Path to the configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one prediction against the stored series and print the report
    Predict {
        /// Path to the configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Validate configuration without starting the server
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["volregime", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { config, host, port } => {
                assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_PATH));
                assert!(host.is_none());
                assert!(port.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_log_format() {
        let cli =
            Cli::try_parse_from(["volregime", "predict", "--log-format", "json", "-c", "x.yaml"])
                .unwrap();
        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
        assert!(matches!(cli.command, Commands::Predict { pretty: false, .. }));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["volregime", "serve", "--log-format", "xml"]).is_err());
    }
}
