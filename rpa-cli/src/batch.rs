//! CSV batch input and output.
//!
//! ## Input format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column                | Required | Type    | Notes                     |
//! |-----------------------|----------|---------|---------------------------|
//! | `gross_amount`        | yes      | decimal | e.g. `5000.00`            |
//! | `dependents`          | yes      | integer | `0` to `20`               |
//! | `service_tax_rate`    | no       | decimal | percent; empty means `5`  |
//! | `include_service_tax` | no       | bool    | empty means `true`        |
//!
//! ```csv
//! gross_amount,dependents,service_tax_rate,include_service_tax
//! 5000.00,2,5,true
//! 2000.00,0,,
//! ```
//!
//! ## Output format
//!
//! One row per input row with the component amounts, totals and net.

use std::io;
use std::path::{Path, PathBuf};

use rpa_core::{DEFAULT_SERVICE_TAX_RATE, TaxEngine, TaxError, TaxInput, TaxSummary};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct BatchRow {
    gross_amount: Decimal,
    dependents: i32,
    #[serde(default)]
    service_tax_rate: Option<Decimal>,
    #[serde(default)]
    include_service_tax: Option<bool>,
}

#[derive(Debug, Error)]
pub enum BatchLoadError {
    /// Structurally invalid CSV, a missing column or a cell of the wrong type.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A row parsed but failed validation. `row` is 1-based, header excluded.
    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: TaxError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn convert_row(
    row: BatchRow,
    row_number: usize,
) -> Result<TaxInput, BatchLoadError> {
    TaxInput::new(
        row.gross_amount,
        row.dependents,
        row.service_tax_rate.unwrap_or(DEFAULT_SERVICE_TAX_RATE),
        row.include_service_tax.unwrap_or(true),
    )
    .map_err(|source| BatchLoadError::InvalidRow {
        row: row_number,
        source,
    })
}

/// Parses every row of `reader` into a validated [`TaxInput`], in file order.
pub fn load_from_reader<R: io::Read>(reader: R) -> Result<Vec<TaxInput>, BatchLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    reader
        .deserialize::<BatchRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

pub fn load_from_str(input: &str) -> Result<Vec<TaxInput>, BatchLoadError> {
    load_from_reader(input.as_bytes())
}

pub fn load_from_file(path: &Path) -> Result<Vec<TaxInput>, BatchLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| BatchLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let inputs = load_from_str(&contents)?;
    debug!(path = %path.display(), rows = inputs.len(), "batch file loaded");
    Ok(inputs)
}

/// Running totals over a set of summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub count: usize,
    pub total_gross: Decimal,
    pub total_tax: Decimal,
    pub total_net: Decimal,
}

impl BatchTotals {
    pub fn add(
        &mut self,
        summary: &TaxSummary,
    ) {
        self.count += 1;
        self.total_gross += summary.gross_amount;
        self.total_tax += summary.total_tax;
        self.total_net += summary.net_amount;
    }

    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a TaxSummary>) -> Self {
        let mut totals = Self::default();
        for summary in summaries {
            totals.add(summary);
        }
        totals
    }
}

/// One computed row, paired with the input that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRecord {
    pub gross_amount: Decimal,
    pub dependents: u8,
    pub service_tax_rate: Decimal,
    pub include_service_tax: bool,
    pub contribution: Decimal,
    pub income_tax: Decimal,
    pub service_tax: Decimal,
    pub total_tax: Decimal,
    pub net_amount: Decimal,
    pub total_tax_percent: Decimal,
}

impl BatchRecord {
    fn new(
        input: &TaxInput,
        summary: &TaxSummary,
    ) -> Self {
        Self {
            gross_amount: summary.gross_amount,
            dependents: input.dependents(),
            service_tax_rate: input.service_tax_rate(),
            include_service_tax: input.include_service_tax(),
            contribution: summary.contribution.amount,
            income_tax: summary.income_tax.amount,
            service_tax: summary.service_tax.amount,
            total_tax: summary.total_tax,
            net_amount: summary.net_amount,
            total_tax_percent: summary.total_tax_percent,
        }
    }
}

/// Summaries for every input plus their totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub records: Vec<BatchRecord>,
    pub totals: BatchTotals,
}

/// Computes every input through `engine`.
///
/// # Errors
///
/// Stops at the first row the engine rejects; `row` is 1-based.
pub fn compute(
    engine: &TaxEngine,
    inputs: &[TaxInput],
) -> Result<BatchReport, BatchLoadError> {
    let mut records = Vec::with_capacity(inputs.len());
    let mut totals = BatchTotals::default();

    for (idx, input) in inputs.iter().enumerate() {
        let summary = engine
            .compute_summary(input)
            .map_err(|source| BatchLoadError::InvalidRow {
                row: idx + 1,
                source,
            })?;
        totals.add(&summary);
        records.push(BatchRecord::new(input, &summary));
    }

    info!(
        count = totals.count,
        total_gross = %totals.total_gross,
        total_net = %totals.total_net,
        "batch computed"
    );
    Ok(BatchReport { records, totals })
}

/// Writes one CSV row per record, with a header.
pub fn write_records<W: io::Write>(
    writer: W,
    records: &[BatchRecord],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
