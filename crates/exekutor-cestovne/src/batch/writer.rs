use std::io::Write;

use super::{BatchError, BatchReport, RowOutcome, ERROR_MARKER};

const TOTAL_HEADER: &str = "Náhrada km + PHM (Kč)";

pub(crate) fn write_report<W: Write>(report: &BatchReport, writer: W) -> Result<(), BatchError> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let columns = report.columns;

    let mut header = match &report.header {
        Some(existing) => pad(existing, columns),
        None => synthesized_header(columns),
    };
    header.push(TOTAL_HEADER.to_string());
    header.push(report.time_unit.summary_label().to_string());
    csv_writer.write_record(&header)?;

    for row in &report.rows {
        let mut record = pad(&row.cells, columns);
        match &row.outcome {
            RowOutcome::Calculated {
                total_amount,
                time_units,
            } => {
                record.push(total_amount.to_string());
                record.push(time_units.to_string());
            }
            RowOutcome::Failed { .. } => {
                record.push(ERROR_MARKER.to_string());
                record.push(ERROR_MARKER.to_string());
            }
            RowOutcome::Skipped => {
                record.push(String::new());
                record.push(String::new());
            }
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn synthesized_header(columns: usize) -> Vec<String> {
    (0..columns)
        .map(|index| {
            if index == 0 {
                "Adresa".to_string()
            } else {
                format!("Sloupec {}", index + 1)
            }
        })
        .collect()
}

fn pad(cells: &[String], columns: usize) -> Vec<String> {
    let mut padded = cells.to_vec();
    if padded.len() < columns {
        padded.resize(columns, String::new());
    }
    padded
}
