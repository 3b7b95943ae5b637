//! The normalized domain model both pipelines extract into.
//!
//! Everything here is built once per upload and immutable afterwards; a new
//! upload replaces the whole record set.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Average weeks per calendar month, used to convert weekly payment amounts
/// to a monthly equivalent.
pub const WEEKS_PER_MONTH: f64 = 4.33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum PaymentFrequency {
    Monthly,
    Weekly,
}

impl PaymentFrequency {
    /// Case-insensitive match on the frequency cell. Anything that is not
    /// "weekly" is treated as monthly, the dominant layout in practice.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("weekly") {
            PaymentFrequency::Weekly
        } else {
            PaymentFrequency::Monthly
        }
    }
}

/// One row of a loan amortization table, already coerced and validated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaymentRow {
    pub sequence: f64,
    pub due_date: NaiveDate,
    pub principal: f64,
    pub interest: f64,
    pub total_payment: f64,
    /// Balance AFTER this payment posts, as stated in the source file.
    pub remaining_balance: f64,
}

/// One loan, extracted from one sheet of the loans workbook.
///
/// `payments` is always sorted ascending by due date; source row order is not
/// trusted. A schedule with zero valid payment rows is never constructed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoanSchedule {
    pub name: String,
    pub original_amount: f64,
    pub frequency: PaymentFrequency,
    pub payments: Vec<PaymentRow>,
    /// Presentation hint, assigned by name lookup.
    pub color: String,
}

/// Chart color per known loan name, with a neutral fallback for anything
/// not in the table. Cosmetic only.
pub fn loan_color(name: &str) -> &'static str {
    match name {
        "Leasing Sabadell" => "#6366f1",
        "Acquisgran 50000" => "#22c55e",
        "Caixa Prestamo 30000" => "#f59e0b",
        "Caixa Prestamo 50000" => "#ef4444",
        "Caixa Prestamo 65000" => "#8b5cf6",
        "Sabadell Prestamo 15000" => "#06b6d4",
        "Outfund 50000" => "#ec4899",
        "Outfund 40000" => "#ec4899",
        "BBVA Click and Play 17000" => "#14b8a6",
        _ => "#64748b",
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    pub fn quarter(&self) -> Quarter {
        match self {
            Month::Jan | Month::Feb | Month::Mar => Quarter::Q1,
            Month::Apr | Month::May | Month::Jun => Quarter::Q2,
            Month::Jul | Month::Aug | Month::Sep => Quarter::Q3,
            Month::Oct | Month::Nov | Month::Dec => Quarter::Q4,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn label(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

/// The two physical sites revenue is reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Palace,
    Terrace,
}

impl Location {
    pub fn display_name(&self) -> &'static str {
        match self {
            Location::Palace => "Malaga Palace",
            Location::Terrace => "Malaga Terrace",
        }
    }
}

/// The seven canonical revenue categories. Multiple raw labels in the source
/// files map onto these (see the classifier's category table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    PrivateOffices,
    Coworking,
    MeetingRooms,
    Catering,
    Services,
    Other,
    Training,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::PrivateOffices,
        Category::Coworking,
        Category::MeetingRooms,
        Category::Catering,
        Category::Services,
        Category::Other,
        Category::Training,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::PrivateOffices => "Private Offices",
            Category::Coworking => "Coworking",
            Category::MeetingRooms => "Meeting Rooms",
            Category::Catering => "Catering",
            Category::Services => "Services",
            Category::Other => "Other",
            Category::Training => "Training",
        }
    }

    /// Chart color per canonical category. Cosmetic only.
    pub fn color(&self) -> &'static str {
        match self {
            Category::PrivateOffices => "#6366f1",
            Category::Coworking => "#22c55e",
            Category::MeetingRooms => "#f59e0b",
            Category::Catering => "#ef4444",
            Category::Services => "#8b5cf6",
            Category::Other => "#64748b",
            Category::Training => "#06b6d4",
        }
    }
}

/// Per-category amounts for one location within one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryTotals {
    pub private_offices: f64,
    pub coworking: f64,
    pub meeting_rooms: f64,
    pub catering: f64,
    pub services: f64,
    pub other: f64,
    pub training: f64,
}

impl CategoryTotals {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::PrivateOffices => self.private_offices,
            Category::Coworking => self.coworking,
            Category::MeetingRooms => self.meeting_rooms,
            Category::Catering => self.catering,
            Category::Services => self.services,
            Category::Other => self.other,
            Category::Training => self.training,
        }
    }

    /// Accumulate into a category. A location/category pair may be repeated
    /// across source rows and must sum, never overwrite.
    pub fn add(&mut self, category: Category, amount: f64) {
        match category {
            Category::PrivateOffices => self.private_offices += amount,
            Category::Coworking => self.coworking += amount,
            Category::MeetingRooms => self.meeting_rooms += amount,
            Category::Catering => self.catering += amount,
            Category::Services => self.services += amount,
            Category::Other => self.other += amount,
            Category::Training => self.training += amount,
        }
    }

    pub fn merge(&mut self, other: &CategoryTotals) {
        for category in Category::ALL {
            self.add(category, other.get(category));
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// One month block of the revenue ledger.
///
/// `total` is the stated grand total from the period-header row. It is
/// independent of the location/category breakdown and is never reconciled
/// against it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyLedgerEntry {
    pub month: Month,
    pub year: i32,
    pub total: f64,
    pub palace: f64,
    pub terrace: f64,
    pub palace_categories: CategoryTotals,
    pub terrace_categories: CategoryTotals,
}

impl MonthlyLedgerEntry {
    pub fn new(month: Month, year: i32, total: f64) -> Self {
        Self {
            month,
            year,
            total,
            palace: 0.0,
            terrace: 0.0,
            palace_categories: CategoryTotals::default(),
            terrace_categories: CategoryTotals::default(),
        }
    }

    pub fn location_total(&self, location: Location) -> f64 {
        match location {
            Location::Palace => self.palace,
            Location::Terrace => self.terrace,
        }
    }

    pub fn categories(&self, location: Location) -> &CategoryTotals {
        match location {
            Location::Palace => &self.palace_categories,
            Location::Terrace => &self.terrace_categories,
        }
    }

    pub fn categories_mut(&mut self, location: Location) -> &mut CategoryTotals {
        match location {
            Location::Palace => &mut self.palace_categories,
            Location::Terrace => &mut self.terrace_categories,
        }
    }

    /// "Mar 2025" style label used by the monthly views.
    pub fn label(&self) -> String {
        format!("{} {}", self.month.short_name(), self.year)
    }
}
