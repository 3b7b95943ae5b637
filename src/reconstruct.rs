//! Point-in-time reconstruction of loan state at the cutoff date.
//!
//! The source schedules only state the balance AFTER each payment posts, so
//! the balance standing at an arbitrary cutoff is not literally present in
//! the data. This module derives it from the anchor payment: the first
//! payment due on or after the cutoff, or the final payment for a loan that
//! is already past maturity. No interpolation is performed; the nearest
//! future payment defines the snapshot.

use crate::schema::{LoanSchedule, PaymentFrequency, WEEKS_PER_MONTH};
use crate::utils::safe_percent;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Derived cutoff-anchored quantities for one loan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoanSnapshot {
    /// Balance standing at the cutoff: the anchor's post-payment balance
    /// with that payment's principal added back.
    pub balance_at_cutoff: f64,
    /// Anchor payment amount normalized to a monthly equivalent
    /// (weekly schedules scale by 4.33 average weeks per month).
    pub monthly_payment: f64,
    /// Anchor payment amount as stated, unnormalized.
    pub payment_amount: f64,
    /// Interest summed over payments due on or after the cutoff only.
    pub interest_remaining: f64,
    /// Due date of the last payment in the schedule.
    pub end_date: NaiveDate,
}

impl LoanSnapshot {
    /// Derives the snapshot from a sorted schedule. Returns `None` only for
    /// a schedule with no payments, which the builder never emits.
    pub fn derive(loan: &LoanSchedule, cutoff: NaiveDate) -> Option<Self> {
        let last = loan.payments.last()?;

        let anchor = loan
            .payments
            .iter()
            .find(|p| p.due_date >= cutoff)
            .unwrap_or(last);

        let interest_remaining = loan
            .payments
            .iter()
            .filter(|p| p.due_date >= cutoff)
            .map(|p| p.interest)
            .sum();

        let monthly_payment = match loan.frequency {
            PaymentFrequency::Weekly => anchor.total_payment * WEEKS_PER_MONTH,
            PaymentFrequency::Monthly => anchor.total_payment,
        };

        Some(Self {
            balance_at_cutoff: anchor.remaining_balance + anchor.principal,
            monthly_payment,
            payment_amount: anchor.total_payment,
            interest_remaining,
            end_date: last.due_date,
        })
    }
}

/// A loan schedule together with its cutoff snapshot: the unit the
/// aggregation views consume.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReconstructedLoan {
    pub schedule: LoanSchedule,
    pub snapshot: LoanSnapshot,
}

/// Derives snapshots for every schedule at the given cutoff.
pub fn reconstruct_loans(schedules: Vec<LoanSchedule>, cutoff: NaiveDate) -> Vec<ReconstructedLoan> {
    schedules
        .into_iter()
        .filter_map(|schedule| {
            LoanSnapshot::derive(&schedule, cutoff)
                .map(|snapshot| ReconstructedLoan { schedule, snapshot })
        })
        .collect()
}

/// Cutoff-anchored summary across the whole loan portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DebtMetrics {
    pub total_debt: f64,
    pub total_original: f64,
    pub monthly_payment: f64,
    pub interest_remaining: f64,
    /// Loans whose balance at the cutoff is still positive.
    pub active_loans: usize,
    /// Due date of the final payment across all loans.
    pub final_payoff: Option<NaiveDate>,
    pub paid_off_percent: f64,
}

impl DebtMetrics {
    pub fn summarize(loans: &[ReconstructedLoan]) -> Self {
        let total_debt: f64 = loans.iter().map(|l| l.snapshot.balance_at_cutoff).sum();
        let total_original: f64 = loans.iter().map(|l| l.schedule.original_amount).sum();

        Self {
            total_debt,
            total_original,
            monthly_payment: loans.iter().map(|l| l.snapshot.monthly_payment).sum(),
            interest_remaining: loans.iter().map(|l| l.snapshot.interest_remaining).sum(),
            active_loans: loans
                .iter()
                .filter(|l| l.snapshot.balance_at_cutoff > 0.0)
                .count(),
            final_payoff: loans.iter().map(|l| l.snapshot.end_date).max(),
            paid_off_percent: safe_percent(total_original - total_debt, total_original),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PaymentRow;

    fn payment(y: i32, m: u32, principal: f64, interest: f64, total: f64, balance: f64) -> PaymentRow {
        PaymentRow {
            sequence: 0.0,
            due_date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            principal,
            interest,
            total_payment: total,
            remaining_balance: balance,
        }
    }

    fn loan(frequency: PaymentFrequency, payments: Vec<PaymentRow>) -> LoanSchedule {
        LoanSchedule {
            name: "Test Loan".to_string(),
            original_amount: 10000.0,
            frequency,
            payments,
            color: "#64748b".to_string(),
        }
    }

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    #[test]
    fn test_balance_adds_anchor_principal_back() {
        let loan = loan(
            PaymentFrequency::Monthly,
            vec![
                payment(2026, 1, 500.0, 60.0, 560.0, 5500.0),
                payment(2026, 2, 500.0, 50.0, 550.0, 5000.0),
                payment(2026, 3, 500.0, 40.0, 540.0, 4500.0),
            ],
        );
        let snap = LoanSnapshot::derive(&loan, cutoff()).unwrap();

        // Anchor is the Feb payment; its post-payment balance is 5000.
        assert_eq!(snap.balance_at_cutoff, 5500.0);
        assert_eq!(snap.payment_amount, 550.0);
        assert_eq!(snap.monthly_payment, 550.0);
        // Interest sums over on/after-cutoff payments only: 50 + 40.
        assert_eq!(snap.interest_remaining, 90.0);
        assert_eq!(snap.end_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_paid_off_loan_anchors_on_last_payment() {
        let loan = loan(
            PaymentFrequency::Monthly,
            vec![
                payment(2025, 11, 500.0, 20.0, 520.0, 500.0),
                payment(2025, 12, 500.0, 10.0, 510.0, 0.0),
            ],
        );
        let snap = LoanSnapshot::derive(&loan, cutoff()).unwrap();

        // No future payments: the final row is the anchor.
        assert_eq!(snap.balance_at_cutoff, 500.0);
        assert_eq!(snap.interest_remaining, 0.0);
        assert_eq!(snap.end_date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn test_weekly_monthly_equivalent() {
        let loan = loan(
            PaymentFrequency::Weekly,
            vec![payment(2026, 2, 80.0, 20.0, 100.0, 900.0)],
        );
        let snap = LoanSnapshot::derive(&loan, cutoff()).unwrap();
        assert_eq!(snap.monthly_payment, 433.0);
        assert_eq!(snap.payment_amount, 100.0);
    }

    #[test]
    fn test_cutoff_between_payments_uses_nearest_future() {
        let loan = loan(
            PaymentFrequency::Monthly,
            vec![
                payment(2026, 1, 500.0, 60.0, 560.0, 6000.0),
                payment(2026, 4, 500.0, 40.0, 540.0, 5500.0),
            ],
        );
        // Nothing falls on the cutoff itself; April defines the snapshot.
        let snap = LoanSnapshot::derive(&loan, cutoff()).unwrap();
        assert_eq!(snap.balance_at_cutoff, 6000.0);
    }

    #[test]
    fn test_metrics_summary() {
        let loans = reconstruct_loans(
            vec![
                loan(
                    PaymentFrequency::Monthly,
                    vec![payment(2026, 3, 500.0, 50.0, 550.0, 4500.0)],
                ),
                loan(
                    PaymentFrequency::Monthly,
                    vec![payment(2025, 12, 100.0, 0.0, 100.0, 0.0)],
                ),
            ],
            cutoff(),
        );
        let metrics = DebtMetrics::summarize(&loans);

        assert_eq!(metrics.total_debt, 5100.0);
        assert_eq!(metrics.total_original, 20000.0);
        assert_eq!(metrics.active_loans, 2);
        assert_eq!(
            metrics.final_payoff,
            Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        );
        assert!((metrics.paid_off_percent - 74.5).abs() < 0.01);
    }

    #[test]
    fn test_paid_off_percent_zero_original() {
        let metrics = DebtMetrics::summarize(&[]);
        assert_eq!(metrics.paid_off_percent, 0.0);
        assert_eq!(metrics.final_payoff, None);
    }
}
