//! Borrowing lifecycle service
//!
//! Orchestrates borrow and return against the catalog and loan stores,
//! applying the rules from [`policy`](super::policy).

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{BorrowRequest, FineStatus, Loan, NewLoan},
        user::User,
    },
    repository::{AccountStore, CatalogStore, LoanStore, Repository},
    services::policy,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    fine_per_day: i64,
}

impl CirculationService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, fine_per_day: i64) -> Self {
        Self {
            repository,
            clock,
            fine_per_day,
        }
    }

    async fn require_user(&self, user_id: i64) -> AppResult<User> {
        self.repository
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn require_book(&self, book_id: i64) -> AppResult<Book> {
        self.repository
            .books
            .get(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    async fn require_loan(&self, loan_id: i64) -> AppResult<Loan> {
        self.repository
            .loans
            .get(loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Borrow record not found".to_string()))
    }

    /// Borrow a copy of a book.
    ///
    /// The copy reservation and the loan record are kept consistent: the
    /// guarded decrement re-checks the counter atomically, and a failed
    /// loan insert releases the reserved copy again.
    pub async fn borrow(
        &self,
        user_id: i64,
        book_id: i64,
        request: BorrowRequest,
    ) -> AppResult<Loan> {
        let user = self.require_user(user_id).await?;

        let loans = self.repository.loans.find_by_user(user.id).await?;
        if !policy::can_borrow(&loans, self.clock.today()) {
            return Err(AppError::IneligibleUser);
        }

        let book = self.require_book(book_id).await?;
        if book.available_copies <= 0 {
            return Err(AppError::NoCopiesAvailable);
        }

        if self
            .repository
            .loans
            .exists_active(user.id, book.id)
            .await?
        {
            return Err(AppError::AlreadyBorrowed);
        }

        self.repository.books.adjust_copies(book.id, -1).await?;

        let created = self
            .repository
            .loans
            .insert(NewLoan {
                user_id: user.id,
                book_id: book.id,
                borrow_date: request.borrow_date,
                due_date: request.due_date,
            })
            .await;

        match created {
            Ok(loan) => {
                tracing::info!(loan = loan.id, user = user.id, book = book.id, "loan created");
                Ok(loan)
            }
            Err(err) => {
                // Release the reserved copy before surfacing the failure
                if let Err(release) = self.repository.books.adjust_copies(book.id, 1).await {
                    tracing::error!(book = book.id, "failed to release copy: {}", release);
                }
                Err(err)
            }
        }
    }

    /// Return a borrowed copy, settling the loan into its terminal status.
    pub async fn return_loan(&self, loan_id: i64) -> AppResult<Loan> {
        let mut loan = self.require_loan(loan_id).await?;
        if loan.returned {
            return Err(AppError::Conflict("Loan already returned".to_string()));
        }

        // A returned copy always makes the title available again
        self.repository.books.adjust_copies(loan.book_id, 1).await?;

        loan.returned = true;
        loan.status = policy::classify_return(&loan, self.clock.today());
        self.repository.loans.save(&loan).await?;

        tracing::info!(loan = loan.id, status = %loan.status, "loan returned");
        Ok(loan)
    }

    /// All loans ever recorded for a user
    pub async fn loans_for_user(&self, user_id: i64) -> AppResult<Vec<Loan>> {
        let user = self.require_user(user_id).await?;
        self.repository.loans.find_by_user(user.id).await
    }

    /// Whether the user is currently eligible to borrow
    pub async fn can_borrow(&self, user_id: i64) -> AppResult<bool> {
        let user = self.require_user(user_id).await?;
        let loans = self.repository.loans.find_by_user(user.id).await?;
        Ok(policy::can_borrow(&loans, self.clock.today()))
    }

    /// Fine currently owed on a single loan
    pub async fn fine_for(&self, loan_id: i64) -> AppResult<i64> {
        let loan = self.require_loan(loan_id).await?;
        Ok(policy::calculate_fine(
            &loan,
            self.clock.today(),
            self.fine_per_day,
        ))
    }

    /// Total unpaid fine across the user's unreturned loans; informational,
    /// never used for enforcement
    pub async fn fine_status(&self, user_id: i64) -> AppResult<FineStatus> {
        let loans = self.loans_for_user(user_id).await?;
        let today = self.clock.today();
        let fine_amount: i64 = loans
            .iter()
            .filter(|loan| !loan.returned)
            .map(|loan| policy::calculate_fine(loan, today, self.fine_per_day))
            .sum();
        Ok(FineStatus {
            has_fine: fine_amount > 0,
            fine_amount,
        })
    }

    /// Whether an unreturned loan already links this user and book
    pub async fn already_borrowed(&self, user_id: i64, book_id: i64) -> AppResult<bool> {
        let user = self.require_user(user_id).await?;
        let book = self.require_book(book_id).await?;
        self.repository.loans.exists_active(user.id, book.id).await
    }

    /// Count of loans not yet returned
    pub async fn count_active(&self) -> AppResult<i64> {
        self.repository.loans.count_active().await
    }
}
