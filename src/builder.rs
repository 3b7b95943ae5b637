//! Record builders: classified row streams folded into finalized records.
//!
//! Both builders are pure over their input workbook. Row-level anomalies are
//! silently excluded per the leniency rules in the classifier; only a workbook
//! that yields zero records at all surfaces as an error.

use crate::cell::{Cell, Sheet, Workbook};
use crate::classify::{
    classify_loan_row, classify_revenue_row, read_loan_metadata, LoanRowKind, RevenueRowKind,
    RevenueTables, FIRST_PAYMENT_ROW, MIN_LOAN_SHEET_ROWS,
};
use crate::error::{Result, WorkbookError};
use crate::schema::{loan_color, Location, LoanSchedule, MonthlyLedgerEntry};
use log::{debug, info};

/// Builds one [`LoanSchedule`] per sheet that carries valid payment rows.
///
/// Sheets that are too short or yield zero valid payments contribute nothing;
/// that is a normal filtering outcome, not an error. A workbook where every
/// sheet filters out is an [`WorkbookError::EmptyResult`].
pub fn build_loan_schedules(workbook: &Workbook) -> Result<Vec<LoanSchedule>> {
    let mut loans = Vec::new();

    for sheet in &workbook.sheets {
        if sheet.row_count() < MIN_LOAN_SHEET_ROWS {
            debug!(
                "Skipping sheet '{}': {} rows is below the metadata block",
                sheet.name,
                sheet.row_count()
            );
            continue;
        }

        let metadata = read_loan_metadata(sheet);

        let mut payments = Vec::new();
        for row in sheet.rows.iter().skip(FIRST_PAYMENT_ROW) {
            if let LoanRowKind::Payment(payment) = classify_loan_row(row) {
                payments.push(payment);
            }
        }

        if payments.is_empty() {
            debug!("Skipping sheet '{}': no valid payment rows", sheet.name);
            continue;
        }

        // Source row order is not trusted.
        payments.sort_by_key(|p| p.due_date);

        debug!(
            "Sheet '{}' -> loan '{}' with {} payments",
            sheet.name,
            metadata.name,
            payments.len()
        );

        loans.push(LoanSchedule {
            color: loan_color(&metadata.name).to_string(),
            name: metadata.name,
            original_amount: metadata.original_amount,
            frequency: metadata.frequency,
            payments,
        });
    }

    if loans.is_empty() {
        return Err(WorkbookError::EmptyResult {
            diagnostic: "No sheet contained valid loan payment rows.".to_string(),
        });
    }

    info!("Built {} loan schedules", loans.len());
    Ok(loans)
}

/// Open-section state of the ledger scan: which month block is being filled
/// and which site its category rows currently belong to.
struct OpenPeriod {
    entry: MonthlyLedgerEntry,
    location: Option<Location>,
}

/// Local fold accumulator for the revenue scan. The finalized sequence is the
/// fold's result; no state outlives the call.
struct LedgerFold {
    entries: Vec<MonthlyLedgerEntry>,
    open: Option<OpenPeriod>,
}

impl LedgerFold {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            open: None,
        }
    }

    fn apply(&mut self, kind: RevenueRowKind) {
        match kind {
            RevenueRowKind::PeriodHeader { month, year, total } => {
                self.finalize_open();
                self.open = Some(OpenPeriod {
                    entry: MonthlyLedgerEntry::new(month, year, total),
                    location: None,
                });
            }
            RevenueRowKind::LocationMarker { location, subtotal } => {
                // A marker outside any month block is unattributable.
                if let Some(open) = self.open.as_mut() {
                    open.location = Some(location);
                    match location {
                        Location::Palace => open.entry.palace = subtotal,
                        Location::Terrace => open.entry.terrace = subtotal,
                    }
                }
            }
            RevenueRowKind::CategoryRow { category, amount } => {
                // Only attributable under the most recently seen location
                // marker of the same month block.
                if let Some(open) = self.open.as_mut() {
                    if let Some(location) = open.location {
                        open.entry.categories_mut(location).add(category, amount);
                    }
                }
            }
            RevenueRowKind::Ignorable => {}
        }
    }

    fn finalize_open(&mut self) {
        if let Some(open) = self.open.take() {
            self.entries.push(open.entry);
        }
    }

    fn finish(mut self) -> Vec<MonthlyLedgerEntry> {
        self.finalize_open();
        self.entries
    }
}

/// Scans the first sheet of the revenue workbook into month-block records.
///
/// Zero finalized periods is a parse failure, distinct from "file had no
/// rows": the error carries the raw classification of the first rows so the
/// caller can see what was actually read.
pub fn build_ledger_entries(workbook: &Workbook) -> Result<Vec<MonthlyLedgerEntry>> {
    let sheet = workbook
        .sheets
        .first()
        .ok_or_else(|| WorkbookError::MalformedInput("workbook contains no sheets".to_string()))?;

    let tables = RevenueTables::new()?;

    let mut fold = LedgerFold::new();
    for row in &sheet.rows {
        fold.apply(classify_revenue_row(&tables, row));
    }
    let entries = fold.finish();

    if entries.is_empty() {
        return Err(WorkbookError::EmptyResult {
            diagnostic: format!("Debug info:\n{}", raw_row_excerpt(sheet, 10)),
        });
    }

    info!(
        "Built {} monthly ledger entries from sheet '{}'",
        entries.len(),
        sheet.name
    );
    Ok(entries)
}

/// Raw dump of the first `limit` rows' label columns, for the empty-result
/// diagnostic.
fn raw_row_excerpt(sheet: &Sheet, limit: usize) -> String {
    sheet
        .rows
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, row)| {
            let get = |col: usize| row.get(col).unwrap_or(&Cell::Empty);
            format!(
                "Row {}: col0={:?}, col1={:?}, col2={:?}",
                i,
                get(0),
                get(1),
                get(2)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
