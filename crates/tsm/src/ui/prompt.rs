//! Line-based fallback used when the terminal cannot enter raw mode.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};

use crate::app::rank::filter_and_rank;
use crate::app::selection::{Outcome, PAGE_LIMIT};
use crate::domain::errors::DomainError;
use crate::domain::model::Candidate;

/// Ask for a query once, list the ranked matches and read the chosen number.
///
/// An empty answer to the number prompt cancels.
pub fn prompt_once<R: BufRead, W: Write>(
    items: &[Candidate],
    input: &mut R,
    output: &mut W,
) -> Result<Outcome> {
    write!(output, "Query: ")?;
    output.flush()?;
    let query = read_line(input).context("failed to read query")?;

    let view = filter_and_rank(items, query.trim(), PAGE_LIMIT);
    if view.is_empty() {
        writeln!(output, "No matches.")?;
        return Ok(Outcome::Cancelled);
    }

    for (idx, ranked) in view.iter().enumerate() {
        let candidate = ranked.candidate;
        let path = candidate
            .path()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let line = format!(
            "{:2}) {:<3} {:<24} {}",
            idx + 1,
            candidate.kind().tag(),
            candidate.name(),
            path
        );
        writeln!(output, "{}", line.trim_end())?;
    }

    write!(output, "Pick number: ")?;
    output.flush()?;
    let answer = read_line(input).context("failed to read selection")?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(Outcome::Cancelled);
    }

    let picked = answer
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|idx| view.get(idx))
        .ok_or(DomainError::InvalidSelection)?;
    Ok(Outcome::Confirmed(picked.candidate.clone()))
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no input available");
    }
    Ok(line)
}
