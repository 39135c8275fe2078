//! Store boundary: traits the services depend on, plus the Postgres
//! implementations.
//!
//! Services never see sqlx directly; they hold trait objects so tests can
//! substitute in-memory fakes.

pub mod books;
pub mod loans;
pub mod users;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook},
        loan::{Loan, NewLoan},
        user::{NewUser, Role, User},
    },
};

/// Book records with their copy counters.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Option<Book>>;
    async fn list(&self) -> AppResult<Vec<Book>>;
    async fn list_available(&self) -> AppResult<Vec<Book>>;
    async fn list_available_by_category(&self, category: &str) -> AppResult<Vec<Book>>;
    async fn categories(&self) -> AppResult<Vec<String>>;
    async fn insert(&self, book: CreateBook) -> AppResult<Book>;
    async fn update(&self, book: &Book) -> AppResult<()>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn count(&self) -> AppResult<i64>;
    async fn count_available(&self) -> AppResult<i64>;

    /// Apply `delta` to the copy counter in one guarded step.
    ///
    /// The counter never drops below zero: a decrement that would do so is
    /// rejected with `NoCopiesAvailable` instead of clamping, and the guard
    /// is evaluated atomically so concurrent borrowers cannot both take the
    /// last copy. `available` is recomputed in the same step.
    async fn adjust_copies(&self, id: i64, delta: i32) -> AppResult<Book>;
}

/// User accounts, including the transient OTP slot.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<User>>;
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;
    async fn exists_by_mobile(&self, mobile: &str) -> AppResult<bool>;
    async fn exists_by_role(&self, role: Role) -> AppResult<bool>;
    async fn insert(&self, user: NewUser) -> AppResult<User>;
    async fn save(&self, user: &User) -> AppResult<()>;
}

/// Borrow records.
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Option<Loan>>;
    async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<Loan>>;
    /// True when an unreturned loan links this user and book
    async fn exists_active(&self, user_id: i64, book_id: i64) -> AppResult<bool>;
    async fn insert(&self, loan: NewLoan) -> AppResult<Loan>;
    async fn save(&self, loan: &Loan) -> AppResult<()>;
    async fn count_active(&self) -> AppResult<i64>;
    /// Unreturned loans due exactly on `date`
    async fn find_due_on(&self, date: NaiveDate) -> AppResult<Vec<Loan>>;
    /// Returned loans whose due date is strictly before `date`
    async fn find_returned_before(&self, date: NaiveDate) -> AppResult<Vec<Loan>>;
    async fn delete_all(&self, ids: &[i64]) -> AppResult<u64>;
}

/// Aggregate handed to the services; one trait object per store.
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn CatalogStore>,
    pub users: Arc<dyn AccountStore>,
    pub loans: Arc<dyn LoanStore>,
}

impl Repository {
    /// Wire all stores to the given Postgres pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool)),
        }
    }
}
