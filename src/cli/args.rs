//! CLI argument parsing using clap.

use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::mode::ModeEntry;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Drop-directory watch service
#[derive(Parser, Debug)]
#[command(
    name = "ftp-watcher",
    version = env!("CARGO_PKG_VERSION"),
    about = "Watch a directory and compress, encrypt or unpack every new file",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default settings file
    #[command(about = "Set up .ftp-watcher directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings after all overrides")]
    Config,

    /// Run the watch service in the foreground until Ctrl-C
    #[command(
        about = "Watch the source directory and process new files",
        after_help = "Examples:\n  ftp-watcher run --source in --target out --mode compress=archive\n  ftp-watcher run --source in --target out --mode encrypt=sealed --mode compress=archive\n\nModes:\n  compress, decompress, encrypt, decrypt, compress-and-encrypt"
    )]
    Run(RunArgs),
}

/// Overrides for the `run` command; unset values come from settings.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory to watch for new files
    #[arg(short, long, env = "FTPW_SOURCE_DIR")]
    pub source: Option<PathBuf>,

    /// Directory receiving outputs and error files
    #[arg(short, long, env = "FTPW_TARGET_DIR")]
    pub target: Option<PathBuf>,

    /// Transform as <mode>=<parameter>; repeat to chain, runs in the given order
    #[arg(short, long = "mode", value_name = "MODE=PARAM")]
    pub modes: Vec<ModeEntry>,

    /// Maximum number of files processed at once
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Milliseconds to wait for in-flight files on shutdown
    #[arg(long)]
    pub grace_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    #[test]
    fn test_parse_run_with_modes_in_order() {
        let cli = Cli::try_parse_from([
            "ftp-watcher",
            "run",
            "--source",
            "in",
            "--target",
            "out",
            "--mode",
            "encrypt=key1",
            "-m",
            "compress=archive",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.source, Some(PathBuf::from("in")));
        assert_eq!(args.target, Some(PathBuf::from("out")));
        assert_eq!(
            args.modes,
            vec![
                ModeEntry::new(Mode::Encrypt, "key1"),
                ModeEntry::new(Mode::Compress, "archive"),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["ftp-watcher", "run", "--mode", "shred=x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["ftp-watcher", "config", "--config", "custom.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Config));
    }
}
