//! Loan (borrow record) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Lifecycle status of a loan.
///
/// A loan is created `Pending` and moves exactly once to one of the three
/// terminal states when it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    Pending,
    Returned,
    Fine,
    #[serde(rename = "Borrow Cancelled")]
    BorrowCancelled,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "Pending",
            LoanStatus::Returned => "Returned",
            LoanStatus::Fine => "Fine",
            LoanStatus::BorrowCancelled => "Borrow Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self != LoanStatus::Pending
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(LoanStatus::Pending),
            "Returned" => Ok(LoanStatus::Returned),
            "Fine" => Ok(LoanStatus::Fine),
            "Borrow Cancelled" => Ok(LoanStatus::BorrowCancelled),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Internal row structure for database queries (status as raw string)
#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    id: i64,
    user_id: i64,
    book_id: i64,
    borrow_date: NaiveDate,
    due_date: NaiveDate,
    returned: bool,
    fine_paid: bool,
    status: String,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Loan {
            id: row.id,
            user_id: row.user_id,
            book_id: row.book_id,
            borrow_date: row.borrow_date,
            due_date: row.due_date,
            returned: row.returned,
            fine_paid: row.fine_paid,
            status: row.status.parse().unwrap_or(LoanStatus::Pending),
        }
    }
}

/// Loan model from database.
///
/// `due_date` is the date the copy is expected back, not the actual
/// return instant; the actual return only flips `returned` and settles
/// `status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
    pub fine_paid: bool,
    pub status: LoanStatus,
}

/// New loan values for insertion; created records start `Pending`
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub user_id: i64,
    pub book_id: i64,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Borrow request carrying the caller-supplied dates
#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Aggregate unpaid-fine view for a user
#[derive(Debug, Serialize, ToSchema)]
pub struct FineStatus {
    pub has_fine: bool,
    pub fine_amount: i64,
}
