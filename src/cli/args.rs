//! Command-line argument parsing for Dosewise
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::types::DoseRequest;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dosewise - Weight-based pediatric dose calculator
#[derive(Parser, Debug)]
#[command(name = "dosewise")]
#[command(version = "0.3.0")]
#[command(about = "Calculate pediatric doses and get caregiver advice", long_about = None)]
pub struct Args {
    /// Configuration file path (~/.dosewise/config.toml by default)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate a dose for one patient
    Calculate {
        /// Medicine name (case-insensitive)
        #[arg(short, long)]
        medicine: String,

        /// Patient weight in kilograms
        #[arg(short, long)]
        weight: f64,

        /// Override the concentration mass (mg)
        #[arg(long)]
        concentration_mg: Option<f64>,

        /// Override the concentration volume (ml)
        #[arg(long)]
        concentration_ml: Option<f64>,

        /// Medicine registry file
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Also generate a caregiver advisory
        #[arg(long)]
        advise: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List medicines in the registry
    Medicines {
        /// Medicine registry file
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// Display current configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Commands {
    /// Dose request described by a `calculate` invocation
    pub fn dose_request(&self) -> Option<DoseRequest> {
        match self {
            Commands::Calculate {
                medicine,
                weight,
                concentration_mg,
                concentration_ml,
                ..
            } => {
                let mut request = DoseRequest::new(medicine.clone(), *weight);
                if let Some(mg) = concentration_mg {
                    request = request.with_concentration_mg(*mg);
                }
                if let Some(ml) = concentration_ml {
                    request = request.with_concentration_ml(*ml);
                }
                Some(request)
            }
            _ => None,
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default tracing filter for this level
    pub fn log_level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show the advisory spinner
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["dosewise", "config"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["dosewise", "-q", "config"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["dosewise", "-v", "config"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["dosewise", "config", "-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_calculate_builds_request() {
        let args = parse(&[
            "dosewise",
            "calculate",
            "--medicine",
            "Ibuprofeno",
            "--weight",
            "12.5",
            "--concentration-ml",
            "10",
            "--advise",
        ]);

        let request = args.command.dose_request().unwrap();
        assert_eq!(request.medicine_name, "Ibuprofeno");
        assert_eq!(request.weight_kg, 12.5);
        assert_eq!(request.concentration.mg, None);
        assert_eq!(request.concentration.ml, Some(10.0));

        match args.command {
            Commands::Calculate { advise, json, .. } => {
                assert!(advise);
                assert!(!json);
            }
            _ => panic!("expected calculate"),
        }
    }

    #[test]
    fn test_calculate_requires_weight() {
        assert!(Args::try_parse_from(["dosewise", "calculate", "--medicine", "X"]).is_err());
    }

    #[test]
    fn test_config_init_flag() {
        assert!(matches!(parse(&["dosewise", "config"]).command, Commands::Config { init: false }));
        assert!(matches!(
            parse(&["dosewise", "--config", "/tmp/d.toml", "config", "--init"]).command,
            Commands::Config { init: true }
        ));
    }

    #[test]
    fn test_other_commands_have_no_request() {
        assert!(parse(&["dosewise", "medicines"]).command.dose_request().is_none());
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());

        assert_eq!(Verbosity::Quiet.log_level(), "error");
        assert_eq!(Verbosity::Normal.log_level(), "warn");
        assert_eq!(Verbosity::Verbose.log_level(), "info");
        assert_eq!(Verbosity::VeryVerbose.log_level(), "debug");
    }
}
