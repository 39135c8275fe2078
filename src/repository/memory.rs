//! In-memory store fakes backing the service unit tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook},
        loan::{Loan, LoanStatus, NewLoan},
        user::{NewUser, Role, User},
    },
    repository::{AccountStore, CatalogStore, LoanStore},
};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    table: Mutex<Table<Book>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.table.lock().unwrap().rows.values().cloned().collect())
    }

    async fn list_available(&self) -> AppResult<Vec<Book>> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|b| b.available)
            .cloned()
            .collect())
    }

    async fn list_available_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|b| b.available && b.category == category)
            .cloned()
            .collect())
    }

    async fn categories(&self) -> AppResult<Vec<String>> {
        let mut categories: Vec<String> = self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .map(|b| b.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn insert(&self, book: CreateBook) -> AppResult<Book> {
        let mut table = self.table.lock().unwrap();
        let id = table.allocate();
        let created = Book {
            id,
            title: book.title,
            author: book.author,
            category: book.category,
            total_copies: book.total_copies,
            available_copies: book.total_copies,
            available: book.total_copies > 0,
            cover: book.cover,
            description: book.description,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, book: &Book) -> AppResult<()> {
        let mut table = self.table.lock().unwrap();
        match table.rows.get_mut(&book.id) {
            Some(slot) => {
                *slot = book.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book.id
            ))),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.table
            .lock()
            .unwrap()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.lock().unwrap().rows.len() as i64)
    }

    async fn count_available(&self) -> AppResult<i64> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|b| b.available)
            .count() as i64)
    }

    async fn adjust_copies(&self, id: i64, delta: i32) -> AppResult<Book> {
        let mut table = self.table.lock().unwrap();
        let book = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        if book.available_copies + delta < 0 {
            return Err(AppError::NoCopiesAvailable);
        }
        book.available_copies += delta;
        book.available = book.available_copies > 0;
        Ok(book.clone())
    }
}

#[derive(Default)]
pub struct InMemoryAccounts {
    table: Mutex<Table<User>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccounts {
    async fn get(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<User>> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .find(|u| u.mobile == mobile)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn exists_by_mobile(&self, mobile: &str) -> AppResult<bool> {
        Ok(self.find_by_mobile(mobile).await?.is_some())
    }

    async fn exists_by_role(&self, role: Role) -> AppResult<bool> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .any(|u| u.role == role))
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let mut table = self.table.lock().unwrap();
        let id = table.allocate();
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            role: user.role,
            mobile: user.mobile,
            otp_code: None,
            otp_generated_at: None,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut table = self.table.lock().unwrap();
        match table.rows.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "User with id {} not found",
                user.id
            ))),
        }
    }
}

#[derive(Default)]
pub struct InMemoryLoans {
    table: Mutex<Table<Loan>>,
}

impl InMemoryLoans {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoans {
    async fn get(&self, id: i64) -> AppResult<Option<Loan>> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<Loan>> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn exists_active(&self, user_id: i64, book_id: i64) -> AppResult<bool> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .any(|l| l.user_id == user_id && l.book_id == book_id && !l.returned))
    }

    async fn insert(&self, loan: NewLoan) -> AppResult<Loan> {
        let mut table = self.table.lock().unwrap();
        let id = table.allocate();
        let created = Loan {
            id,
            user_id: loan.user_id,
            book_id: loan.book_id,
            borrow_date: loan.borrow_date,
            due_date: loan.due_date,
            returned: false,
            fine_paid: false,
            status: LoanStatus::Pending,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn save(&self, loan: &Loan) -> AppResult<()> {
        let mut table = self.table.lock().unwrap();
        match table.rows.get_mut(&loan.id) {
            Some(slot) => {
                *slot = loan.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Loan with id {} not found",
                loan.id
            ))),
        }
    }

    async fn count_active(&self) -> AppResult<i64> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|l| !l.returned)
            .count() as i64)
    }

    async fn find_due_on(&self, date: NaiveDate) -> AppResult<Vec<Loan>> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|l| !l.returned && l.due_date == date)
            .cloned()
            .collect())
    }

    async fn find_returned_before(&self, date: NaiveDate) -> AppResult<Vec<Loan>> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|l| l.returned && l.due_date < date)
            .cloned()
            .collect())
    }

    async fn delete_all(&self, ids: &[i64]) -> AppResult<u64> {
        let mut table = self.table.lock().unwrap();
        let mut deleted = 0;
        for id in ids {
            if table.rows.remove(id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
