use crate::error::EngineError;
use core_types::{InvalidTradeError, TradeRecord};
use rayon::prelude::*;
use std::path::Path;

/// An input line that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRejection {
    /// 1-based line number in the input file (the header is line 1).
    pub line: usize,
    pub error: InvalidTradeError,
}

/// Validated trades in input order, plus every line that was skipped.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub trades: Vec<TradeRecord>,
    pub rejected: Vec<LineRejection>,
}

/// Reads and validates the trade file at `path`.
///
/// An unreadable file is fatal. Individual bad lines are not: they are logged,
/// collected in `rejected`, and the rest of the batch is kept.
pub fn load_trades(path: &Path) -> Result<LoadedBatch, EngineError> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let batch = parse_trades(&content);
    tracing::info!(
        path = %path.display(),
        valid = batch.trades.len(),
        rejected = batch.rejected.len(),
        "Trade input loaded."
    );
    Ok(batch)
}

/// Validates every non-blank line after the header, in parallel.
pub fn parse_trades(content: &str) -> LoadedBatch {
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
        .collect();

    // Ordered collect keeps input order regardless of which thread parsed what.
    let parsed: Vec<(usize, Result<TradeRecord, InvalidTradeError>)> = lines
        .par_iter()
        .map(|&(line_no, line)| (line_no, line.parse::<TradeRecord>()))
        .collect();

    let mut batch = LoadedBatch::default();
    for (line, result) in parsed {
        match result {
            Ok(trade) => batch.trades.push(trade),
            Err(error) => {
                tracing::warn!(line, reason = %error, "Skipping invalid trade record.");
                batch.rejected.push(LineRejection { line, error });
            }
        }
    }
    batch
}
