//! Row classification for both pipelines.
//!
//! The two source layouts call for two different contracts. Loan sheets keep
//! their metadata at fixed row positions, so the debt classifier is purely
//! positional. The revenue ledger moves its sections around between files but
//! keeps a stable label vocabulary, so the revenue classifier is lexical:
//! a finite lookup table per label kind, with unrecognized labels classified
//! as ignorable rather than rejected.

use crate::cell::{Cell, Sheet};
use crate::error::{Result, WorkbookError};
use crate::schema::{Category, Location, Month, PaymentFrequency, PaymentRow};
use std::collections::BTreeMap;

// Fixed-position contract of a loan sheet. Rows 0-5 are metadata, payments
// start at row 6, so anything shorter than 7 rows cannot hold data.
pub const LOAN_NAME_ROW: usize = 0;
pub const LOAN_AMOUNT_ROW: usize = 1;
pub const LOAN_FREQUENCY_ROW: usize = 3;
pub const LOAN_METADATA_COL: usize = 1;
pub const FIRST_PAYMENT_ROW: usize = 6;
pub const MIN_LOAN_SHEET_ROWS: usize = 7;

// Payment row columns.
const COL_SEQUENCE: usize = 0;
const COL_DUE_DATE: usize = 1;
const COL_PRINCIPAL: usize = 2;
const COL_INTEREST: usize = 3;
const COL_TOTAL_PAYMENT: usize = 4;
const COL_REMAINING_BALANCE: usize = 5;

/// Loan metadata read from the fixed header rows.
#[derive(Debug, Clone)]
pub struct LoanMetadata {
    pub name: String,
    pub original_amount: f64,
    pub frequency: PaymentFrequency,
}

/// Reads the fixed-position metadata block of one loan sheet. The name cell
/// falls back to the sheet's own name when blank.
pub fn read_loan_metadata(sheet: &Sheet) -> LoanMetadata {
    let name = sheet
        .cell(LOAN_NAME_ROW, LOAN_METADATA_COL)
        .text_trimmed()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| sheet.name.clone());

    let original_amount = sheet.cell(LOAN_AMOUNT_ROW, LOAN_METADATA_COL).as_number();

    let frequency = sheet
        .cell(LOAN_FREQUENCY_ROW, LOAN_METADATA_COL)
        .as_text()
        .map(PaymentFrequency::from_label)
        .unwrap_or(PaymentFrequency::Monthly);

    LoanMetadata {
        name,
        original_amount,
        frequency,
    }
}

#[derive(Debug, Clone)]
pub enum LoanRowKind {
    Payment(PaymentRow),
    /// Separator, stray annotation, or a row without a parseable due date.
    Ignorable,
}

/// Classifies one candidate payment row (row index >= [`FIRST_PAYMENT_ROW`]).
///
/// A row where sequence, due date, principal and total payment are all absent
/// is noise, not a zero-payment event. A row with data but no parseable due
/// date is dropped as well; the remaining currency fields default to 0.
pub fn classify_loan_row(row: &[Cell]) -> LoanRowKind {
    let get = |col: usize| row.get(col).unwrap_or(&Cell::Empty);

    let sequence_cell = get(COL_SEQUENCE);
    let due_date_cell = get(COL_DUE_DATE);
    let principal = get(COL_PRINCIPAL).as_number();
    let interest = get(COL_INTEREST).as_number();
    let total_payment = get(COL_TOTAL_PAYMENT).as_number();
    let remaining_balance = get(COL_REMAINING_BALANCE).as_number();

    if sequence_cell.is_empty()
        && due_date_cell.is_empty()
        && principal == 0.0
        && total_payment == 0.0
    {
        return LoanRowKind::Ignorable;
    }

    let Some(due_date) = due_date_cell.as_date() else {
        return LoanRowKind::Ignorable;
    };

    LoanRowKind::Payment(PaymentRow {
        sequence: sequence_cell.as_number(),
        due_date,
        principal,
        interest,
        total_payment,
        remaining_balance,
    })
}

/// Years outside this window on a would-be period header mark the row
/// ignorable; the files carry stray numeric rows that look like headers.
pub const MIN_LEDGER_YEAR: i32 = 2020;
pub const MAX_LEDGER_YEAR: i32 = 2030;

/// Raw month labels as they appear in the ledger files (Spanish), including
/// the Setiembre variant spelling. Trailing whitespace is handled by trimming
/// before lookup.
const MONTH_LABELS: &[(&str, Month)] = &[
    ("Enero", Month::Jan),
    ("Febrero", Month::Feb),
    ("Marzo", Month::Mar),
    ("Abril", Month::Apr),
    ("Mayo", Month::May),
    ("Junio", Month::Jun),
    ("Julio", Month::Jul),
    ("Agosto", Month::Aug),
    ("Septiembre", Month::Sep),
    ("Setiembre", Month::Sep),
    ("Octubre", Month::Oct),
    ("Noviembre", Month::Nov),
    ("Diciembre", Month::Dec),
];

/// Raw category labels, many-to-one onto the seven canonical categories.
/// Both fee labels land on Other; Training appears accented, unaccented, and
/// in the mojibake form real exports contain.
const CATEGORY_LABELS: &[(&str, Category)] = &[
    ("Private Offices", Category::PrivateOffices),
    ("Coworking", Category::Coworking),
    ("Meeting Rooms", Category::MeetingRooms),
    ("Catering", Category::Catering),
    ("Services", Category::Services),
    ("Commision due", Category::Other),
    ("One-off Fees", Category::Other),
    ("Formacion", Category::Training),
    ("Formación", Category::Training),
    ("FormaciÃ³n", Category::Training),
];

/// The lexical lookup tables for the revenue pipeline, validated once at
/// construction: every raw label must map to exactly one canonical tag.
#[derive(Debug, Clone)]
pub struct RevenueTables {
    months: BTreeMap<&'static str, Month>,
    categories: BTreeMap<&'static str, Category>,
}

impl RevenueTables {
    pub fn new() -> Result<Self> {
        Ok(Self {
            months: build_table(MONTH_LABELS)?,
            categories: build_table(CATEGORY_LABELS)?,
        })
    }

    pub fn month(&self, label: &str) -> Option<Month> {
        self.months.get(label.trim()).copied()
    }

    pub fn category(&self, label: &str) -> Option<Category> {
        self.categories.get(label.trim()).copied()
    }
}

fn build_table<T: Copy + PartialEq + std::fmt::Debug>(
    labels: &'static [(&'static str, T)],
) -> Result<BTreeMap<&'static str, T>> {
    let mut table = BTreeMap::new();
    for (label, tag) in labels {
        if let Some(existing) = table.insert(*label, *tag) {
            if existing != *tag {
                return Err(WorkbookError::InvalidLabelTable(format!(
                    "label '{}' maps to both {:?} and {:?}",
                    label, existing, tag
                )));
            }
        }
    }
    Ok(table)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RevenueRowKind {
    /// Opens a new month block; carries the stated grand total for the month.
    PeriodHeader { month: Month, year: i32, total: f64 },
    /// Selects which site subsequent category rows belong to; carries the
    /// stated subtotal for that site.
    LocationMarker { location: Location, subtotal: f64 },
    CategoryRow { category: Category, amount: f64 },
    Ignorable,
}

/// Classifies one ledger row from its first three columns:
/// label, year, amount.
///
/// Classification is purely lexical; whether a location marker or category
/// row is actually attributable depends on the builder's open-section state.
pub fn classify_revenue_row(tables: &RevenueTables, row: &[Cell]) -> RevenueRowKind {
    let get = |col: usize| row.get(col).unwrap_or(&Cell::Empty);

    let Some(label) = get(0).text_trimmed() else {
        return RevenueRowKind::Ignorable;
    };
    let amount = get(2).as_number();

    if let Some(month) = tables.month(&label) {
        let year_raw = get(1).as_number();
        let year = year_raw.floor() as i32;
        if year_raw != 0.0 && (MIN_LEDGER_YEAR..=MAX_LEDGER_YEAR).contains(&year) {
            return RevenueRowKind::PeriodHeader {
                month,
                year,
                total: amount,
            };
        }
        // Month label with a missing or out-of-range year is a stray row.
        return RevenueRowKind::Ignorable;
    }

    for location in [Location::Palace, Location::Terrace] {
        if label == location.display_name() {
            return RevenueRowKind::LocationMarker {
                location,
                subtotal: amount,
            };
        }
    }

    if let Some(category) = tables.category(&label) {
        return RevenueRowKind::CategoryRow { category, amount };
    }

    RevenueRowKind::Ignorable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Sheet;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn tables() -> RevenueTables {
        RevenueTables::new().unwrap()
    }

    #[test]
    fn test_tables_build_cleanly() {
        let t = tables();
        assert_eq!(t.month("Marzo"), Some(Month::Mar));
        assert_eq!(t.month("Septiembre "), Some(Month::Sep));
        assert_eq!(t.month("Setiembre"), Some(Month::Sep));
        assert_eq!(t.month("March"), None);
        assert_eq!(t.category("One-off Fees"), Some(Category::Other));
        assert_eq!(t.category("Commision due"), Some(Category::Other));
        assert_eq!(t.category("FormaciÃ³n"), Some(Category::Training));
    }

    #[test]
    fn test_period_header_year_window() {
        let t = tables();
        let header = classify_revenue_row(
            &t,
            &[text("Marzo "), Cell::Number(2025.0), Cell::Number(10000.0)],
        );
        assert_eq!(
            header,
            RevenueRowKind::PeriodHeader {
                month: Month::Mar,
                year: 2025,
                total: 10000.0
            }
        );

        // Out-of-range and unparseable years are ignorable, not errors.
        let stray = classify_revenue_row(
            &t,
            &[text("Marzo"), Cell::Number(1999.0), Cell::Number(10000.0)],
        );
        assert_eq!(stray, RevenueRowKind::Ignorable);

        let no_year = classify_revenue_row(&t, &[text("Marzo"), Cell::Empty, Cell::Number(1.0)]);
        assert_eq!(no_year, RevenueRowKind::Ignorable);
    }

    #[test]
    fn test_fractional_year_is_floored() {
        let t = tables();
        let header = classify_revenue_row(
            &t,
            &[text("Abril"), Cell::Number(2024.9), Cell::Number(500.0)],
        );
        assert_eq!(
            header,
            RevenueRowKind::PeriodHeader {
                month: Month::Apr,
                year: 2024,
                total: 500.0
            }
        );
    }

    #[test]
    fn test_location_marker_is_case_exact() {
        let t = tables();
        let marker = classify_revenue_row(
            &t,
            &[text("Malaga Palace"), Cell::Empty, Cell::Number(6000.0)],
        );
        assert_eq!(
            marker,
            RevenueRowKind::LocationMarker {
                location: Location::Palace,
                subtotal: 6000.0
            }
        );

        let wrong_case =
            classify_revenue_row(&t, &[text("MALAGA PALACE"), Cell::Empty, Cell::Number(1.0)]);
        assert_eq!(wrong_case, RevenueRowKind::Ignorable);
    }

    #[test]
    fn test_unknown_label_is_ignorable() {
        let t = tables();
        let row = classify_revenue_row(&t, &[text("Random header"), Cell::Empty, Cell::Empty]);
        assert_eq!(row, RevenueRowKind::Ignorable);
        assert_eq!(classify_revenue_row(&t, &[]), RevenueRowKind::Ignorable);
    }

    #[test]
    fn test_loan_metadata_falls_back_to_sheet_name() {
        let sheet = Sheet::new(
            "Outfund 40000",
            vec![
                vec![text("Loan"), Cell::Empty],
                vec![text("Amount"), Cell::Number(40000.0)],
                vec![],
                vec![text("Frequency"), text("Weekly")],
            ],
        );
        let meta = read_loan_metadata(&sheet);
        assert_eq!(meta.name, "Outfund 40000");
        assert_eq!(meta.original_amount, 40000.0);
        assert_eq!(meta.frequency, PaymentFrequency::Weekly);
    }

    #[test]
    fn test_loan_row_noise_and_date_rules() {
        // All-absent key fields: noise.
        let noise = classify_loan_row(&[
            Cell::Empty,
            Cell::Empty,
            Cell::Number(0.0),
            Cell::Number(12.0),
            Cell::Number(0.0),
            Cell::Number(5000.0),
        ]);
        assert!(matches!(noise, LoanRowKind::Ignorable));

        // Data but no parseable due date: dropped.
        let no_date = classify_loan_row(&[
            Cell::Number(4.0),
            text("soon"),
            Cell::Number(100.0),
            Cell::Number(12.0),
            Cell::Number(112.0),
            Cell::Number(5000.0),
        ]);
        assert!(matches!(no_date, LoanRowKind::Ignorable));

        let valid = classify_loan_row(&[
            Cell::Number(4.0),
            Cell::Date(chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            Cell::Number(100.0),
            Cell::Number(12.0),
            Cell::Number(112.0),
            Cell::Number(5000.0),
        ]);
        match valid {
            LoanRowKind::Payment(p) => {
                assert_eq!(p.principal, 100.0);
                assert_eq!(p.remaining_balance, 5000.0);
            }
            LoanRowKind::Ignorable => panic!("expected a payment row"),
        }
    }

    #[test]
    fn test_short_loan_row_defaults_missing_fields() {
        let row = classify_loan_row(&[
            Cell::Number(1.0),
            Cell::Date(chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            Cell::Number(100.0),
        ]);
        match row {
            LoanRowKind::Payment(p) => {
                assert_eq!(p.interest, 0.0);
                assert_eq!(p.total_payment, 0.0);
                assert_eq!(p.remaining_balance, 0.0);
            }
            LoanRowKind::Ignorable => panic!("expected a payment row"),
        }
    }
}
