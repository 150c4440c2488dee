// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, ReviseExitCode,
    output::{OutputContext, OutputWriter, StderrStyles, clap_styles},
};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{CommandFactory, Parser};
use junit_rerun::{ReconcileSummary, Report};
use owo_colors::OwoColorize;
use std::io::Write;

/// The suffix appended to the input path to form the output path.
pub static REVISED_SUFFIX: &str = ".revised";

/// Rewrite a JUnit XML report so that failed attempts of rerun tests are marked as skipped.
///
/// A test that failed and was then run again shows up as two adjacent testcases with the same
/// name. The failed attempt is rewritten as skipped, and its failure text is kept in the skip
/// message, prefixed with "RERUN: ". The revised report is written next to the input, as
/// <FILE>.revised.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct JunitReviseApp {
    /// JUnit XML report to revise
    #[arg(long, short, value_name = "FILE")]
    file: Option<Utf8PathBuf>,
}

impl JunitReviseApp {
    /// Initializes the output context, including the global logger.
    pub fn init_output(&self) -> OutputContext {
        OutputContext::init()
    }

    /// Executes the app, returning the process exit code on success.
    pub fn exec(
        self,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        let Some(input) = self.file else {
            // Nothing to do: print usage and exit normally.
            let help = Self::command().render_help();
            let mut stderr = output_writer.stderr_writer();
            write!(stderr, "{help}").map_err(ExpectedError::write_stderr_error)?;
            stderr.flush().map_err(ExpectedError::write_stderr_error)?;
            return Ok(ReviseExitCode::OK);
        };

        let revised = revised_path(&input);
        let summary = revise_report(&input, &revised)?;
        log_summary(&summary, &revised, &output.stderr_styles());

        Ok(ReviseExitCode::OK)
    }
}

/// Returns the path the revised report for `input` is written to.
pub fn revised_path(input: &Utf8Path) -> Utf8PathBuf {
    let mut revised = input.as_str().to_owned();
    revised.push_str(REVISED_SUFFIX);
    revised.into()
}

/// Reads the report at `input`, reconciles reruns and writes the result to `output`.
///
/// Nothing is written if the input can't be read or parsed. The output is replaced atomically.
pub fn revise_report(
    input: &Utf8Path,
    output: &Utf8Path,
) -> Result<ReconcileSummary, ExpectedError> {
    tracing::debug!("reading JUnit report from `{input}`");
    let contents =
        std::fs::read(input).map_err(|err| ExpectedError::input_read_error(input, err))?;

    let mut report = Report::deserialize_from_slice(&contents)
        .map_err(|err| ExpectedError::report_parse_error(input, err))?;

    let summary = report.reconcile_reruns();
    for superseded in &summary.superseded {
        tracing::debug!(
            "{} / {}: marked failed attempt {} as rerun",
            superseded.testsuite,
            superseded.name,
            superseded.index,
        );
    }

    let revised = report.to_string()?;

    let file = AtomicFile::new(output, OverwriteBehavior::AllowOverwrite);
    file.write(|f| f.write_all(revised.as_bytes()))
        .map_err(|err| match err {
            atomicwrites::Error::Internal(err) | atomicwrites::Error::User(err) => {
                ExpectedError::output_write_error(output, err)
            }
        })?;

    Ok(summary)
}

fn log_summary(summary: &ReconcileSummary, revised: &Utf8Path, styles: &StderrStyles) {
    let count = summary.len();
    tracing::info!(
        "marked {} failed {} as rerun, wrote `{}`",
        count.style(styles.count),
        if count == 1 { "attempt" } else { "attempts" },
        revised.style(styles.bold),
    );
}
