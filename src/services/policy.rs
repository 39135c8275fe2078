//! Eligibility and fine rules, free of side effects.
//!
//! Everything here takes the evaluation date as an argument; callers feed it
//! from the [`Clock`](crate::clock::Clock) so the rules stay deterministic.

use chrono::NaiveDate;

use crate::models::loan::{Loan, LoanStatus};

/// A user may borrow unless any of their loans is both unreturned and
/// overdue. One overdue loan blocks all new borrows.
pub fn can_borrow(loans: &[Loan], today: NaiveDate) -> bool {
    !loans
        .iter()
        .any(|loan| !loan.returned && loan.due_date < today)
}

/// Terminal status for a loan being returned on `today`.
///
/// A borrow date in the future marks the record as nonsensical and wins
/// over lateness; otherwise a past due date means a fine.
pub fn classify_return(loan: &Loan, today: NaiveDate) -> LoanStatus {
    if loan.borrow_date > today {
        LoanStatus::BorrowCancelled
    } else if loan.due_date < today {
        LoanStatus::Fine
    } else {
        LoanStatus::Returned
    }
}

/// Fine owed on a loan as of `today`: `fine_per_day` for each whole day past
/// the due date, uncapped. Returned loans and settled fines owe nothing.
pub fn calculate_fine(loan: &Loan, today: NaiveDate, fine_per_day: i64) -> i64 {
    if loan.returned || loan.fine_paid {
        return 0;
    }
    if loan.due_date >= today {
        return 0;
    }
    let days_overdue = today.signed_duration_since(loan.due_date).num_days();
    days_overdue * fine_per_day
}
