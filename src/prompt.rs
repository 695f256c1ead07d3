//! Line-based prompts on stdin/stdout.
//!
//! Empty input or end of input always means "cancel".

use async_trait::async_trait;
use std::io::{self, BufRead, Write};

use crate::error::{Result, SyncError};
use crate::sync::selection::Selector;

/// Numbered menu on stdout, answered with a line from stdin.
///
/// The terminal read runs on the blocking pool.
pub struct PromptSelector;

#[async_trait]
impl Selector for PromptSelector {
    async fn select(&self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        let message = message.to_string();
        let choices = choices.to_vec();
        run_blocking(move || {
            let stdin = io::stdin();
            select_from(&mut stdin.lock(), &mut io::stdout(), &message, &choices)
        })
        .await
    }
}

/// Run a terminal interaction on the blocking pool.
pub async fn run_blocking<T, F>(interaction: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(interaction).await.map_err(|e| {
        SyncError::from_io_error(io::Error::other(e.to_string()), "prompting", None)
    })?
}

/// Show `choices` numbered from 0 and read indices until one is in range.
pub fn select_from<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    choices: &[String],
) -> Result<Option<usize>> {
    let io_err = |e| SyncError::from_io_error(e, "prompting", None);

    writeln!(output, "{}", message).map_err(io_err)?;
    for (i, choice) in choices.iter().enumerate() {
        writeln!(output, "  {}) {}", i, choice).map_err(io_err)?;
    }

    loop {
        write!(output, "Enter a number (empty to cancel): ").map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let Some(line) = read_trimmed(input)? else {
            return Ok(None);
        };
        match line.parse::<usize>() {
            Ok(index) if index < choices.len() => return Ok(Some(index)),
            _ => writeln!(output, "Please pick a number between 0 and {}", choices.len().saturating_sub(1))
                .map_err(io_err)?,
        }
    }
}

/// Ask for a value, re-asking while `validate` rejects it.
///
/// Returns `None` on empty input.
pub fn prompt_value<R, W, F>(input: &mut R, output: &mut W, message: &str, validate: F) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<String>,
{
    let io_err = |e| SyncError::from_io_error(e, "prompting", None);
    loop {
        write!(output, "{}: ", message).map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let Some(line) = read_trimmed(input)? else {
            return Ok(None);
        };
        match validate(&line) {
            Ok(value) => return Ok(Some(value)),
            Err(SyncError::Validation { message, .. }) => writeln!(output, "{}", message).map_err(io_err)?,
            Err(other) => return Err(other),
        }
    }
}

fn read_trimmed<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let n = input
        .read_line(&mut line)
        .map_err(|e| SyncError::from_io_error(e, "reading input", None))?;
    let line = line.trim();
    if n == 0 || line.is_empty() {
        Ok(None)
    } else {
        Ok(Some(line.to_string()))
    }
}
