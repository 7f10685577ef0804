use clap::Parser;
use std::path::PathBuf;

use waf_origin_check::config::{Options, DEFAULT_CONCURRENCY, DEFAULT_ENV_PATH, DEFAULT_TIMEOUT_SECS};

/// Lists WAF-protected websites and checks whether their origins answer directly.
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose mode (prints credentials, info logging)
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Enable detailed debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Specify the output file with a .txt extension
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Specify the timeout in seconds (positive integer)
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..), default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// List only websites, no check is performed
    #[arg(short = 'l', long, default_value_t = false)]
    pub list_only: bool,

    /// Specify the path to a .env file for environment variables
    #[arg(long = "env", value_name = "PATH", default_value = DEFAULT_ENV_PATH)]
    pub env: PathBuf,

    /// Maximum number of origin checks in flight
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u16).range(1..), default_value_t = DEFAULT_CONCURRENCY as u16)]
    pub concurrency: u16,
}

impl Cli {
    pub fn into_options(self) -> Options {
        Options {
            verbose: self.verbose,
            debug: self.debug,
            output_path: self.output,
            timeout_secs: self.timeout,
            list_only: self.list_only,
            env_path: self.env,
            concurrency: usize::from(self.concurrency),
        }
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("waf_origin_check").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let opts = parse(&[]).unwrap().into_options();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn all_flags() {
        let opts = parse(&["-v", "-o", "out.txt", "-t", "3", "-l", "--env", "prod.env", "-c", "2"])
            .unwrap()
            .into_options();
        assert!(opts.verbose);
        assert!(opts.list_only);
        assert_eq!(opts.output_path, Some(PathBuf::from("out.txt")));
        assert_eq!(opts.timeout_secs, 3);
        assert_eq!(opts.env_path, PathBuf::from("prod.env"));
        assert_eq!(opts.concurrency, 2);
    }

    #[test]
    fn timeout_must_be_positive_integer() {
        for bad in ["0", "-5", "abc", "1.5", ""] {
            assert!(parse(&["--timeout", bad]).is_err(), "accepted --timeout {:?}", bad);
        }
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let err = parse(&["--bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn output_extension_not_checked_here() {
        assert!(parse(&["-o", "report.csv"]).is_ok());
    }
}
