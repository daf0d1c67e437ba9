use std::io::Read;

use super::BatchError;

/// First-cell values recognised as an existing header row.
const ADDRESS_HEADERS: &[&str] = &[
    "adresa",
    "adresy",
    "cílová adresa",
    "cilova adresa",
    "address",
    "destination",
];

/// Address table as read from the input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchInput {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl BatchInput {
    /// Widest row, header included.
    pub fn column_count(&self) -> usize {
        let header_width = self.header.as_ref().map_or(0, Vec::len);
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header_width))
            .max()
            .unwrap_or(0)
            .max(1)
    }
}

pub(crate) fn read_input<R: Read>(reader: R) -> Result<BatchInput, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(clean_cell).collect::<Vec<_>>());
    }

    let header = match rows.first() {
        Some(first) if is_header(first) => Some(rows.remove(0)),
        _ => None,
    };

    Ok(BatchInput { header, rows })
}

fn clean_cell(value: &str) -> String {
    value.replace('\u{feff}', "").trim().to_string()
}

fn is_header(row: &[String]) -> bool {
    row.first()
        .map(|cell| {
            let normalized = cell.trim().to_lowercase();
            ADDRESS_HEADERS.contains(&normalized.as_str())
        })
        .unwrap_or(false)
}
