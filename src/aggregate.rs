//! Re-bucketing of finalized records into the views the presentation layer
//! consumes.
//!
//! Every function here is a pure derivation over the record set: no shared
//! accumulator survives a call, so views can be recomputed on demand and
//! invoked concurrently. Grouping preserves the record order of the source
//! data within each granularity.

use crate::reconstruct::ReconstructedLoan;
use crate::schema::{Category, CategoryTotals, Location, Month, MonthlyLedgerEntry, Quarter};
use crate::utils::{first_day_of_next_month, last_day_of_month, month_key, safe_percent, short_month_label};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// One month step of the debt timeline: reconstructed balance per loan and
/// the portfolio total.
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub label: String,
    pub total: f64,
    pub balances: BTreeMap<String, f64>,
}

/// Reconstructs a stepped balance curve over an inclusive month range.
///
/// For each bucket, a loan's balance is the post-payment balance of its
/// latest payment due by that month's end; before the first payment it is the
/// pre-first-payment balance (first payment's balance plus principal). The
/// range may reach back before the cutoff; historical buckets are a feature.
pub fn debt_timeline(
    loans: &[ReconstructedLoan],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<TimelinePoint> {
    let mut timeline = Vec::new();

    let horizon = last_day_of_month(end.year(), end.month());
    let mut current = match NaiveDate::from_ymd_opt(start.year(), start.month(), 1) {
        Some(d) => d,
        None => return timeline,
    };
    while current <= horizon {
        let month_end = last_day_of_month(current.year(), current.month());

        let mut balances = BTreeMap::new();
        let mut total = 0.0;
        for loan in loans {
            let balance = match loan
                .schedule
                .payments
                .iter()
                .rev()
                .find(|p| p.due_date <= month_end)
            {
                Some(latest) => latest.remaining_balance,
                None => match loan.schedule.payments.first() {
                    Some(first) => first.remaining_balance + first.principal,
                    None => 0.0,
                },
            };
            total += balance;
            balances.insert(loan.schedule.name.clone(), balance);
        }

        timeline.push(TimelinePoint {
            label: short_month_label(month_end),
            total,
            balances,
        });

        current = first_day_of_next_month(current);
    }

    timeline
}

/// One calendar month of upcoming payments, summed per loan and in total.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleBucket {
    /// Zero-padded "YYYY-MM"; lexicographic order is chronological.
    pub key: String,
    pub label: String,
    pub total: f64,
    pub payments: BTreeMap<String, f64>,
}

/// Groups payments due on or after the cutoff by calendar year-month,
/// ascending.
pub fn payment_schedule(loans: &[ReconstructedLoan], cutoff: NaiveDate) -> Vec<ScheduleBucket> {
    let mut buckets: BTreeMap<String, ScheduleBucket> = BTreeMap::new();

    for loan in loans {
        for payment in loan.schedule.payments.iter().filter(|p| p.due_date >= cutoff) {
            let key = month_key(payment.due_date);
            let bucket = buckets.entry(key.clone()).or_insert_with(|| ScheduleBucket {
                key,
                label: short_month_label(payment.due_date),
                total: 0.0,
                payments: BTreeMap::new(),
            });
            *bucket
                .payments
                .entry(loan.schedule.name.clone())
                .or_insert(0.0) += payment.total_payment;
            bucket.total += payment.total_payment;
        }
    }

    buckets.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Granularity {
    Monthly,
    Quarterly,
    Yearly,
}

/// Which site's figures a category view should show. `Both` sums the two
/// component-wise; it is a view parameter, not a separate data path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocationFilter {
    Both,
    Palace,
    Terrace,
}

/// One bucket of the re-grouped revenue series, at any granularity.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueBucket {
    pub label: String,
    pub total: f64,
    pub palace: f64,
    pub terrace: f64,
    pub palace_categories: CategoryTotals,
    pub terrace_categories: CategoryTotals,
}

impl RevenueBucket {
    fn from_entry(label: String, entry: &MonthlyLedgerEntry) -> Self {
        Self {
            label,
            total: entry.total,
            palace: entry.palace,
            terrace: entry.terrace,
            palace_categories: entry.palace_categories,
            terrace_categories: entry.terrace_categories,
        }
    }

    fn absorb(&mut self, entry: &MonthlyLedgerEntry) {
        self.total += entry.total;
        self.palace += entry.palace;
        self.terrace += entry.terrace;
        self.palace_categories.merge(&entry.palace_categories);
        self.terrace_categories.merge(&entry.terrace_categories);
    }

    /// Palace share of the location-stated revenue, 0 when both are 0.
    pub fn palace_percent(&self) -> f64 {
        safe_percent(self.palace, self.palace + self.terrace)
    }

    pub fn terrace_percent(&self) -> f64 {
        safe_percent(self.terrace, self.palace + self.terrace)
    }

    /// Category totals under a location filter.
    pub fn categories(&self, filter: LocationFilter) -> CategoryTotals {
        match filter {
            LocationFilter::Palace => self.palace_categories,
            LocationFilter::Terrace => self.terrace_categories,
            LocationFilter::Both => {
                let mut merged = self.palace_categories;
                merged.merge(&self.terrace_categories);
                merged
            }
        }
    }
}

fn bucket_label(entry: &MonthlyLedgerEntry, granularity: Granularity) -> String {
    match granularity {
        Granularity::Monthly => entry.label(),
        Granularity::Quarterly => format!("{} {}", entry.month.quarter().label(), entry.year),
        Granularity::Yearly => entry.year.to_string(),
    }
}

/// Re-buckets ledger entries by the requested granularity, summing totals,
/// location subtotals, and category cells component-wise. Monthly is the
/// identity grouping. Bucket order follows first appearance in the record
/// set, so re-bucketing an already-yearly series by year is the identity.
pub fn bucket_entries(
    entries: &[MonthlyLedgerEntry],
    granularity: Granularity,
) -> Vec<RevenueBucket> {
    let mut buckets: Vec<RevenueBucket> = Vec::new();

    for entry in entries {
        let label = bucket_label(entry, granularity);
        // Monthly keeps duplicate month blocks as separate rows, as read.
        let existing = if granularity == Granularity::Monthly {
            None
        } else {
            buckets.iter().position(|b| b.label == label)
        };
        match existing {
            Some(i) => buckets[i].absorb(entry),
            None => buckets.push(RevenueBucket::from_entry(label, entry)),
        }
    }

    buckets
}

/// One bucket of the category composition series.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySeriesPoint {
    pub label: String,
    pub categories: CategoryTotals,
}

/// Category composition over time, under a location filter.
pub fn category_series(
    entries: &[MonthlyLedgerEntry],
    granularity: Granularity,
    filter: LocationFilter,
) -> Vec<CategorySeriesPoint> {
    bucket_entries(entries, granularity)
        .into_iter()
        .map(|bucket| CategorySeriesPoint {
            label: bucket.label.clone(),
            categories: bucket.categories(filter),
        })
        .collect()
}

/// Single-period selector for the per-location breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodFilter {
    Year(i32),
    Quarter(Quarter, i32),
    Month(Month, i32),
}

impl PeriodFilter {
    pub fn matches(&self, entry: &MonthlyLedgerEntry) -> bool {
        match *self {
            PeriodFilter::Year(year) => entry.year == year,
            PeriodFilter::Quarter(quarter, year) => {
                entry.month.quarter() == quarter && entry.year == year
            }
            PeriodFilter::Month(month, year) => entry.month == month && entry.year == year,
        }
    }

    pub fn label(&self) -> String {
        match *self {
            PeriodFilter::Year(year) => year.to_string(),
            PeriodFilter::Quarter(quarter, year) => format!("{} {}", quarter.label(), year),
            PeriodFilter::Month(month, year) => format!("{} {}", month.short_name(), year),
        }
    }
}

/// The kinds of period a caller can filter the breakdown by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodKind {
    Year,
    Quarter,
    Month,
}

/// Enumerates the selectable periods of one kind present in the record set,
/// deduplicated, in data order. Feeds the filter dropdown.
pub fn period_filter_options(
    entries: &[MonthlyLedgerEntry],
    kind: PeriodKind,
) -> Vec<PeriodFilter> {
    let mut options = Vec::new();
    for entry in entries {
        let option = match kind {
            PeriodKind::Year => PeriodFilter::Year(entry.year),
            PeriodKind::Quarter => PeriodFilter::Quarter(entry.month.quarter(), entry.year),
            PeriodKind::Month => PeriodFilter::Month(entry.month, entry.year),
        };
        if !options.contains(&option) {
            options.push(option);
        }
    }
    options
}

/// One non-zero category of a location's breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySlice {
    pub category: Category,
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Per-location category breakdowns for one selected period, with location
/// shares of the combined total.
#[derive(Debug, Clone, Serialize)]
pub struct LocationBreakdown {
    pub palace: Vec<CategorySlice>,
    pub terrace: Vec<CategorySlice>,
    pub palace_total: f64,
    pub terrace_total: f64,
    pub grand_total: f64,
    pub palace_share: f64,
    pub terrace_share: f64,
}

pub fn location_breakdown(
    entries: &[MonthlyLedgerEntry],
    filter: PeriodFilter,
) -> LocationBreakdown {
    let selected: Vec<&MonthlyLedgerEntry> =
        entries.iter().filter(|e| filter.matches(e)).collect();

    let slices = |location: Location| -> Vec<CategorySlice> {
        Category::ALL
            .iter()
            .map(|&category| {
                let value: f64 = selected
                    .iter()
                    .map(|e| e.categories(location).get(category))
                    .sum();
                CategorySlice {
                    category,
                    name: category.display_name().to_string(),
                    value,
                    color: category.color().to_string(),
                }
            })
            .filter(|slice| slice.value > 0.0)
            .collect()
    };

    let palace = slices(Location::Palace);
    let terrace = slices(Location::Terrace);
    let palace_total: f64 = palace.iter().map(|s| s.value).sum();
    let terrace_total: f64 = terrace.iter().map(|s| s.value).sum();
    let grand_total = palace_total + terrace_total;

    LocationBreakdown {
        palace,
        terrace,
        palace_total,
        terrace_total,
        grand_total,
        palace_share: safe_percent(palace_total, grand_total),
        terrace_share: safe_percent(terrace_total, grand_total),
    }
}
