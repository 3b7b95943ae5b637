//! # Financial Workbook Engine
//!
//! A library for extracting a normalized domain model from loosely structured
//! financial spreadsheets and re-bucketing it over arbitrary time periods.
//!
//! Two independent pipelines share the same shape:
//!
//! - **Debt**: loan amortization workbooks, one loan per sheet with a
//!   fixed-position metadata block, extracted into [`LoanSchedule`] records
//!   and snapshotted at a configured cutoff date ([`LoanSnapshot`]).
//! - **Revenue**: monthly revenue ledgers with month blocks, location
//!   sub-sections and category sub-rows, extracted into
//!   [`MonthlyLedgerEntry`] records and re-bucketed by month, quarter or
//!   year with orthogonal location and period filters.
//!
//! Data flows one direction: grid -> classified rows -> records ->
//! reconstructed records -> aggregated views. Each stage produces a new
//! immutable structure, so every view is a pure recomputation over the
//! current record set and a new upload replaces prior state wholesale.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_workbook_engine::*;
//! use chrono::NaiveDate;
//!
//! Workbook::check_extension("ICampus_Loans_Clean_v2.xlsx")?;
//! let workbook = decode_upload(bytes); // external spreadsheet decoder
//!
//! let cutoff = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//! let debt = parse_debt_workbook(&workbook, cutoff)?;
//! println!("total debt: {}", debt.metrics.total_debt);
//! for bucket in debt.payment_schedule() {
//!     println!("{}: {}", bucket.label, bucket.total);
//! }
//! ```

pub mod aggregate;
pub mod builder;
pub mod cell;
pub mod classify;
pub mod error;
pub mod reconstruct;
pub mod schema;
pub mod utils;

pub use aggregate::{
    bucket_entries, category_series, debt_timeline, location_breakdown, payment_schedule,
    period_filter_options, CategorySeriesPoint, CategorySlice, Granularity, LocationBreakdown,
    LocationFilter, PeriodFilter, PeriodKind, RevenueBucket, ScheduleBucket, TimelinePoint,
};
pub use builder::{build_ledger_entries, build_loan_schedules};
pub use cell::{Cell, Sheet, Workbook};
pub use classify::{
    classify_loan_row, classify_revenue_row, read_loan_metadata, LoanMetadata, LoanRowKind,
    RevenueRowKind, RevenueTables,
};
pub use error::{Result, WorkbookError};
pub use reconstruct::{reconstruct_loans, DebtMetrics, LoanSnapshot, ReconstructedLoan};
pub use schema::*;
pub use utils::*;

use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

/// The finalized debt dataset for one upload: every reconstructed loan plus
/// the cutoff-anchored portfolio summary.
#[derive(Debug, Clone, Serialize)]
pub struct DebtModel {
    pub cutoff: NaiveDate,
    pub loans: Vec<ReconstructedLoan>,
    pub metrics: DebtMetrics,
}

impl DebtModel {
    /// Stepped balance curve over a caller-supplied inclusive month range.
    /// The range may reach back before the cutoff.
    pub fn timeline(&self, start: NaiveDate, end: NaiveDate) -> Vec<TimelinePoint> {
        debt_timeline(&self.loans, start, end)
    }

    /// Balance curve from the cutoff month through the final payoff month.
    pub fn timeline_from_cutoff(&self) -> Vec<TimelinePoint> {
        let end = self.metrics.final_payoff.unwrap_or(self.cutoff);
        debt_timeline(&self.loans, self.cutoff, end)
    }

    /// Upcoming payments grouped by calendar month, ascending.
    pub fn payment_schedule(&self) -> Vec<ScheduleBucket> {
        payment_schedule(&self.loans, self.cutoff)
    }
}

/// The finalized revenue dataset for one upload.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueModel {
    pub entries: Vec<MonthlyLedgerEntry>,
}

impl RevenueModel {
    /// Revenue by location over time at the requested granularity.
    pub fn display_series(&self, granularity: Granularity) -> Vec<RevenueBucket> {
        bucket_entries(&self.entries, granularity)
    }

    /// Category composition over time under a location filter.
    pub fn category_series(
        &self,
        granularity: Granularity,
        filter: LocationFilter,
    ) -> Vec<CategorySeriesPoint> {
        category_series(&self.entries, granularity, filter)
    }

    /// Per-location category breakdown for one selected period.
    pub fn location_breakdown(&self, filter: PeriodFilter) -> LocationBreakdown {
        location_breakdown(&self.entries, filter)
    }

    /// Selectable periods of one kind, in data order.
    pub fn period_filter_options(&self, kind: PeriodKind) -> Vec<PeriodFilter> {
        period_filter_options(&self.entries, kind)
    }

    /// Most recent year present in the record set; the default breakdown
    /// filter after an upload.
    pub fn latest_year(&self) -> Option<i32> {
        self.entries.iter().map(|e| e.year).max()
    }
}

pub struct WorkbookProcessor;

impl WorkbookProcessor {
    /// Runs the debt pipeline over one uploaded workbook.
    pub fn parse_debt(workbook: &Workbook, cutoff: NaiveDate) -> Result<DebtModel> {
        info!(
            "Parsing debt workbook: {} sheets, cutoff {}",
            workbook.sheets.len(),
            cutoff
        );

        let schedules = build_loan_schedules(workbook)?;
        let loans = reconstruct_loans(schedules, cutoff);
        let metrics = DebtMetrics::summarize(&loans);

        debug!(
            "Debt model: {} loans, total debt {:.2}, {} active",
            loans.len(),
            metrics.total_debt,
            metrics.active_loans
        );

        Ok(DebtModel {
            cutoff,
            loans,
            metrics,
        })
    }

    /// Runs the revenue pipeline over one uploaded workbook.
    pub fn parse_revenue(workbook: &Workbook) -> Result<RevenueModel> {
        info!(
            "Parsing revenue workbook: {} sheets",
            workbook.sheets.len()
        );

        let entries = build_ledger_entries(workbook)?;

        debug!("Revenue model: {} month blocks", entries.len());

        Ok(RevenueModel { entries })
    }
}

pub fn parse_debt_workbook(workbook: &Workbook, cutoff: NaiveDate) -> Result<DebtModel> {
    WorkbookProcessor::parse_debt(workbook, cutoff)
}

pub fn parse_revenue_workbook(workbook: &Workbook) -> Result<RevenueModel> {
    WorkbookProcessor::parse_revenue(workbook)
}

/// Serializes any view structure for the presentation layer.
pub fn to_json<T: Serialize>(view: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}
