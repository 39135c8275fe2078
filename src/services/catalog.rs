//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::{CatalogStore, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.insert(book).await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository
            .books
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn list_available(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_available().await
    }

    pub async fn list_available_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        self.repository
            .books
            .list_available_by_category(category)
            .await
    }

    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.repository.books.categories().await
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.books.count().await
    }

    pub async fn count_available(&self) -> AppResult<i64> {
        self.repository.books.count_available().await
    }

    /// Update a book's descriptive fields and copy total.
    ///
    /// A change to `total_copies` shifts `available_copies` by the same
    /// delta; shrinking the total below the number of copies currently out
    /// on loan is rejected.
    pub async fn update_book(&self, id: i64, update: UpdateBook) -> AppResult<Book> {
        let mut book = self.get_book(id).await?;

        if let Some(title) = update.title {
            book.title = title;
        }
        if let Some(author) = update.author {
            book.author = author;
        }
        if let Some(category) = update.category {
            book.category = category;
        }
        if let Some(cover) = update.cover {
            book.cover = Some(cover);
        }
        if let Some(description) = update.description {
            book.description = Some(description);
        }
        if let Some(total) = update.total_copies {
            let delta = total - book.total_copies;
            let available = book.available_copies + delta;
            if available < 0 {
                return Err(AppError::Validation(
                    "Copy total cannot drop below the number of copies on loan".to_string(),
                ));
            }
            book.total_copies = total;
            book.available_copies = available;
            book.available = available > 0;
        }

        self.repository.books.update(&book).await?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::memory::{InMemoryAccounts, InMemoryCatalog, InMemoryLoans};

    fn service() -> CatalogService {
        CatalogService::new(Repository {
            books: Arc::new(InMemoryCatalog::new()),
            users: Arc::new(InMemoryAccounts::new()),
            loans: Arc::new(InMemoryLoans::new()),
        })
    }

    fn new_book(title: &str, category: &str, copies: i32) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: "Author".to_string(),
            category: category.to_string(),
            total_copies: copies,
            cover: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn new_books_start_fully_available() {
        let service = service();
        let book = service.add_book(new_book("Dune", "SF", 3)).await.unwrap();
        assert_eq!(book.available_copies, 3);
        assert!(book.available);

        let empty = service.add_book(new_book("Void", "SF", 0)).await.unwrap();
        assert!(!empty.available);
    }

    #[tokio::test]
    async fn category_listing_filters_available_books() {
        let service = service();
        service.add_book(new_book("Dune", "SF", 1)).await.unwrap();
        service.add_book(new_book("Gone", "SF", 0)).await.unwrap();
        service
            .add_book(new_book("Emma", "Classics", 2))
            .await
            .unwrap();

        let sf = service.list_available_by_category("SF").await.unwrap();
        assert_eq!(sf.len(), 1);
        assert_eq!(sf[0].title, "Dune");

        let categories = service.categories().await.unwrap();
        assert_eq!(categories, vec!["Classics".to_string(), "SF".to_string()]);
    }

    #[tokio::test]
    async fn growing_the_copy_total_grows_availability() {
        let service = service();
        let book = service.add_book(new_book("Dune", "SF", 2)).await.unwrap();

        let updated = service
            .update_book(
                book.id,
                UpdateBook {
                    title: None,
                    author: None,
                    category: None,
                    total_copies: Some(5),
                    cover: None,
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.total_copies, 5);
        assert_eq!(updated.available_copies, 5);
    }

    #[tokio::test]
    async fn shrinking_below_loaned_copies_is_rejected() {
        let service = service();
        let book = service.add_book(new_book("Dune", "SF", 3)).await.unwrap();
        // Two copies out on loan
        service
            .repository
            .books
            .adjust_copies(book.id, -2)
            .await
            .unwrap();

        let result = service
            .update_book(
                book.id,
                UpdateBook {
                    title: None,
                    author: None,
                    category: None,
                    total_copies: Some(1),
                    cover: None,
                    description: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
