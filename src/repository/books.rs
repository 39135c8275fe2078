//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for BooksRepository {
    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn list_available(&self) -> AppResult<Vec<Book>> {
        let books =
            sqlx::query_as::<_, Book>("SELECT * FROM books WHERE available ORDER BY title")
                .fetch_all(&self.pool)
                .await?;
        Ok(books)
    }

    async fn list_available_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE available AND category = $1 ORDER BY title",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn categories(&self) -> AppResult<Vec<String>> {
        let categories =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM books ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn insert(&self, book: CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, category, total_copies, available_copies, available, cover, description)
            VALUES ($1, $2, $3, $4, $4, $4 > 0, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(book.total_copies)
        .bind(&book.cover)
        .bind(&book.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, book: &Book) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
               SET title = $2, author = $3, category = $4, total_copies = $5,
                   available_copies = $6, available = $7, cover = $8, description = $9
             WHERE id = $1
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(book.available)
        .bind(&book.cover)
        .bind(&book.description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_available(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE available")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn adjust_copies(&self, id: i64, delta: i32) -> AppResult<Book> {
        // The WHERE guard makes the decrement a compare-and-swap: Postgres
        // serializes the row update, so two borrowers cannot both take the
        // last copy.
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
               SET available_copies = available_copies + $2,
                   available = available_copies + $2 > 0
             WHERE id = $1 AND available_copies + $2 >= 0
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        match book {
            Some(book) => Ok(book),
            None => {
                // Distinguish a missing row from an exhausted counter
                if self.get(id).await?.is_some() {
                    Err(AppError::NoCopiesAvailable)
                } else {
                    Err(AppError::NotFound(format!("Book with id {} not found", id)))
                }
            }
        }
    }
}
