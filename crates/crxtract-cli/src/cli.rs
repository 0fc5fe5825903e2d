//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crxtract")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and extract an extension package
    Fetch(FetchArgs),
    /// Inspect a container without extracting it
    Inspect(InspectArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Extension identifier, store URL, or path to a container file
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Directory extensions are unpacked into (default: ./extensions)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the output directory name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Download timeout in milliseconds
    #[arg(long, default_value = "30000", value_name = "MS")]
    pub timeout: u64,

    /// Maximum container file size in bytes (suffixes K, M, G, T)
    #[arg(long, value_parser = parse_byte_size)]
    pub max_file_size: Option<u64>,

    /// Maximum compression ratio of the payload
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_compression_ratio: u32,

    /// Maximum number of files to extract
    #[arg(long, default_value = "10000")]
    pub max_files: usize,

    /// Maximum total extracted size in bytes (suffixes K, M, G, T)
    #[arg(long, value_parser = parse_byte_size)]
    pub max_extracted_size: Option<u64>,

    /// Additional allowed output root (repeatable)
    #[arg(long = "allow-root", value_name = "DIR")]
    pub allow_roots: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the container file
    #[arg(value_name = "CONTAINER")]
    pub container: PathBuf,
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("100").unwrap(), 100);
        assert_eq!(parse_byte_size("1K").unwrap(), 1024);
        assert_eq!(parse_byte_size("2M").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_byte_size("3G").unwrap(), 3 * 1024 * 1024 * 1024);
        assert_eq!(parse_byte_size("1T").unwrap(), 1024_u64.pow(4));
        assert!(parse_byte_size("invalid").is_err());
        assert!(parse_byte_size("").is_err());
    }

    #[test]
    fn test_parse_byte_size_overflow() {
        assert!(parse_byte_size("18446744073709551615K").is_err());
    }

    #[test]
    fn test_cli_parses_fetch() {
        let cli = Cli::try_parse_from([
            "crxtract",
            "fetch",
            "cfhdojbkjhnklbpkdaibdccddilifddb",
            "--max-files",
            "500",
            "--allow-root",
            "/var/cache",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.input, "cfhdojbkjhnklbpkdaibdccddilifddb");
                assert_eq!(args.max_files, 500);
                assert_eq!(args.allow_roots, vec![PathBuf::from("/var/cache")]);
            }
            _ => panic!("expected fetch command"),
        }
    }

    #[test]
    fn test_verbose_quiet_conflict() {
        let result = Cli::try_parse_from(["crxtract", "-v", "-q", "fetch", "x"]);
        assert!(result.is_err());
    }
}
