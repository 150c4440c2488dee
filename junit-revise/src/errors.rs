// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{ReviseExitCode, output::StderrStyles};
use camino::Utf8PathBuf;
use junit_rerun::{DeserializeError, SerializeError};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected failure while revising a report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("failed to read input report")]
    InputReadError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to parse input report")]
    ReportParseError {
        path: Utf8PathBuf,
        #[source]
        err: DeserializeError,
    },
    #[error("failed to serialize revised report")]
    SerializeError {
        #[from]
        err: SerializeError,
    },
    #[error("failed to write revised report")]
    OutputWriteError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to write to stderr")]
    WriteStderrError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    pub(crate) fn input_read_error(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::InputReadError {
            path: path.into(),
            err,
        }
    }

    pub(crate) fn report_parse_error(path: impl Into<Utf8PathBuf>, err: DeserializeError) -> Self {
        Self::ReportParseError {
            path: path.into(),
            err,
        }
    }

    pub(crate) fn output_write_error(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::OutputWriteError {
            path: path.into(),
            err,
        }
    }

    pub(crate) fn write_stderr_error(err: std::io::Error) -> Self {
        Self::WriteStderrError { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::InputReadError { .. } => ReviseExitCode::INPUT_READ_FAILED,
            Self::ReportParseError { .. } => ReviseExitCode::REPORT_PARSE_FAILED,
            Self::SerializeError { .. }
            | Self::OutputWriteError { .. }
            | Self::WriteStderrError { .. } => ReviseExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::InputReadError { path, err } => {
                tracing::error!(
                    "failed to read input report `{}`",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::ReportParseError { path, err } => {
                tracing::error!(
                    "`{}` is not a valid JUnit report",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::SerializeError { err } => {
                tracing::error!("failed to serialize revised report");
                Some(err as &dyn Error)
            }
            Self::OutputWriteError { path, err } => {
                tracing::error!(
                    "failed to write revised report to `{}`",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::WriteStderrError { err } => {
                tracing::error!("failed to write to stderr");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: "junit_revise::no_heading", "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
