//! Batch processing of address tables against a single vehicle and tariff period.
//!
//! Rows are looked up one at a time. A failed lookup marks that row with [`ERROR_MARKER`]
//! and the batch carries on; empty addresses are passed through untouched.

mod reader;
mod writer;

pub use reader::BatchInput;

use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::reimbursement::{
    Period, ReimbursementError, ReimbursementResult, ReimbursementService, TimeUnitKind,
};
use crate::routing::RouteProvider;

/// Written into both appended cells of a row whose lookup failed.
pub const ERROR_MARKER: &str = "ERROR";

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to access batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid batch table: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Setup(#[from] ReimbursementError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Calculated { total_amount: u32, time_units: u32 },
    Failed { reason: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRow {
    pub cells: Vec<String>,
    pub outcome: RowOutcome,
}

impl BatchRow {
    pub fn address(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub calculated: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub period: Period,
    pub time_unit: TimeUnitKind,
    pub header: Option<Vec<String>>,
    pub columns: usize,
    pub rows: Vec<BatchRow>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        self.rows
            .iter()
            .fold(BatchSummary::default(), |mut summary, row| {
                summary.rows += 1;
                match &row.outcome {
                    RowOutcome::Calculated { total_amount, .. } => {
                        summary.calculated += 1;
                        summary.total_amount += u64::from(*total_amount);
                    }
                    RowOutcome::Failed { .. } => summary.failed += 1,
                    RowOutcome::Skipped => summary.skipped += 1,
                }
                summary
            })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), BatchError> {
        writer::write_report(self, writer)
    }

    pub fn to_csv_string(&self) -> Result<String, BatchError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl BatchInput {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BatchError> {
        reader::read_input(reader)
    }
}

/// Maps every row through `calculate`; the closure is only called for non-empty addresses.
pub fn map_rows<F>(input: &BatchInput, mut calculate: F) -> Vec<BatchRow>
where
    F: FnMut(&str) -> Result<ReimbursementResult, ReimbursementError>,
{
    input
        .rows
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            let address = cells.first().map(|cell| cell.trim()).unwrap_or_default();
            let outcome = if address.is_empty() {
                RowOutcome::Skipped
            } else {
                match calculate(address) {
                    Ok(result) => RowOutcome::Calculated {
                        total_amount: result.total_amount,
                        time_units: result.time_units,
                    },
                    Err(err) => {
                        warn!(row = index + 1, address, error = %err, "batch row failed");
                        RowOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                }
            };
            BatchRow {
                cells: cells.clone(),
                outcome,
            }
        })
        .collect()
}

/// Runs the whole table against one vehicle and period. Unknown vehicles or periods fail
/// the batch before any lookup happens.
pub fn process<P>(
    service: &ReimbursementService<P>,
    input: &BatchInput,
    plate: &str,
    period: Period,
) -> Result<BatchReport, BatchError>
where
    P: RouteProvider + 'static,
{
    let (vehicle, tariff) = service.prepare(plate, period)?;
    let rows = map_rows(input, |address| {
        service.calculate_routed(address, &vehicle, &tariff)
    });

    let report = BatchReport {
        period,
        time_unit: TimeUnitKind::for_year(tariff.display_year),
        header: input.header.clone(),
        columns: input.column_count(),
        rows,
    };

    let summary = report.summary();
    info!(
        period = %period.key(),
        vehicle = %vehicle.plate,
        rows = summary.rows,
        calculated = summary.calculated,
        failed = summary.failed,
        skipped = summary.skipped,
        "batch processed"
    );
    Ok(report)
}
