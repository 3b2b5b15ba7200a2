//! CLI module for the category classification evaluation harness
//!
//! Provides subcommands:
//! - `run`: evaluate the selected test cases against both classifiers
//! - `list`: show which test cases a selection picks

pub mod list;
pub mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::evaluation::SelectionInfo;
use crate::domain::test_case::{Selection, SelectionError, TestCaseRegistry};
use crate::domain::DomainError;
use crate::infrastructure::logging::{self, LoggingConfig};
use crate::infrastructure::test_case::{load_registry, TestCaseFileError};

/// Category classification evaluation - compare OLD and RAG classifiers
#[derive(Parser)]
#[command(name = "category-eval")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate test cases against both classifiers
    Run(run::RunArgs),

    /// List the selected test cases without running them
    List(list::ListArgs),
}

/// Process exit status of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every selected assertion passed
    Passed,
    /// At least one assertion failed
    Failed,
    /// Invalid configuration or test case collection
    ConfigError,
    /// Report writing or other internal failure
    InternalError,
    /// Malformed command line, e.g. a bad selection expression
    UsageError,
    /// Selection matched nothing
    NoTestsCollected,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Passed => 0,
            Status::Failed => 1,
            Status::ConfigError => 2,
            Status::InternalError => 3,
            Status::UsageError => 4,
            Status::NoTestsCollected => 5,
        }
    }

    /// Map a command error to its exit status
    pub fn from_error(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if cause.downcast_ref::<SelectionError>().is_some() {
                return Status::UsageError;
            }
            if cause.downcast_ref::<TestCaseFileError>().is_some()
                || cause.downcast_ref::<config::ConfigError>().is_some()
            {
                return Status::ConfigError;
            }
            if let Some(domain) = cause.downcast_ref::<DomainError>() {
                return if domain.is_configuration() {
                    Status::ConfigError
                } else {
                    Status::InternalError
                };
            }
        }

        Status::InternalError
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

/// Test case source and selection, shared by `run` and `list`
#[derive(Args, Clone, Debug, Default)]
pub struct SelectionArgs {
    /// Test case file (.toml or .json) replacing the built-in dataset
    #[arg(long, value_name = "PATH")]
    pub cases: Option<PathBuf>,

    /// Append the cases from --cases to the built-in dataset
    #[arg(long, requires = "cases")]
    pub with_builtin: bool,

    /// Only run assertions matching the keyword expression
    #[arg(short = 'k', value_name = "EXPR")]
    pub keyword: Option<String>,

    /// Only run cases matching the marker expression
    #[arg(short = 'm', value_name = "EXPR")]
    pub marker: Option<String>,

    /// Only consider the first N test cases
    #[arg(long, value_name = "N")]
    pub queries: Option<usize>,
}

impl SelectionArgs {
    pub fn selection(&self) -> Result<Selection, SelectionError> {
        Selection::parse(self.keyword.as_deref(), self.marker.as_deref())
    }

    pub fn selection_info(&self) -> SelectionInfo {
        SelectionInfo {
            keyword: self.keyword.clone(),
            marker: self.marker.clone(),
        }
    }

    pub fn registry(&self) -> Result<TestCaseRegistry, TestCaseFileError> {
        let registry = load_registry(self.cases.as_deref(), self.with_builtin)?;

        Ok(match self.queries {
            Some(limit) => registry.truncated(limit),
            None => registry,
        })
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    Ok(AppConfig::load()?)
}

fn init_logging(config: &AppConfig) {
    logging::init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}
