use folio_db::DbPool;
use folio_http::{field_error, AppError};

use super::models::{Book, CreateBook, UpdateBook};

#[derive(Debug, thiserror::Error)]
pub enum BookStoreError {
    #[error("book {0} already exists")]
    Duplicate(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<BookStoreError> for AppError {
    fn from(err: BookStoreError) -> Self {
        match err {
            BookStoreError::Duplicate(isbn) => AppError::duplicate(
                vec![field_error("isbn", "already exists")],
                format!("book {} already exists", isbn),
            ),
            BookStoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

/// SQL access to the `books` table
#[derive(Clone)]
pub struct BookRepository {
    pool: DbPool,
}

impl BookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Book>, BookStoreError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT isbn, author, title, price FROM books ORDER BY isbn",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn find(&self, isbn: &str) -> Result<Option<Book>, BookStoreError> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT isbn, author, title, price FROM books WHERE isbn = ?",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    pub async fn count(&self) -> Result<i64, BookStoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert(&self, new: CreateBook) -> Result<Book, BookStoreError> {
        let book = Book::from(new);
        sqlx::query("INSERT INTO books (isbn, author, title, price) VALUES (?, ?, ?, ?)")
            .bind(&book.isbn)
            .bind(&book.author)
            .bind(&book.title)
            .bind(book.price)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if folio_db::is_unique_violation(&e) {
                    BookStoreError::Duplicate(book.isbn.clone())
                } else {
                    BookStoreError::Database(e)
                }
            })?;
        Ok(book)
    }

    /// Apply the present fields of `changes`; `None` when no book has this ISBN
    pub async fn update(
        &self,
        isbn: &str,
        changes: &UpdateBook,
    ) -> Result<Option<Book>, BookStoreError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
               SET author = COALESCE(?, author),
                   title  = COALESCE(?, title),
                   price  = COALESCE(?, price)
             WHERE isbn = ?
            RETURNING isbn, author, title, price
            "#,
        )
        .bind(changes.author.as_deref())
        .bind(changes.title.as_deref())
        .bind(changes.price)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    /// Remove a book, returning it; `None` when no book has this ISBN
    pub async fn delete(&self, isbn: &str) -> Result<Option<Book>, BookStoreError> {
        let book = sqlx::query_as::<_, Book>(
            "DELETE FROM books WHERE isbn = ? RETURNING isbn, author, title, price",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::MIGRATION_001;

    async fn repository() -> BookRepository {
        let pool = folio_db::connect("sqlite::memory:", 1).await.unwrap();
        sqlx::raw_sql(MIGRATION_001).execute(&pool).await.unwrap();
        BookRepository::new(pool)
    }

    fn book(isbn: &str, author: &str, title: &str, price: f64) -> CreateBook {
        CreateBook {
            isbn: isbn.to_string(),
            author: author.to_string(),
            title: title.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn save_and_find_by_isbn() {
        let repo = repository().await;
        repo.insert(book("123", "John Doe", "Repo Test", 15.5))
            .await
            .unwrap();

        let found = repo.find("123").await.unwrap().unwrap();
        assert_eq!(found.author, "John Doe");
        assert_eq!(found.title, "Repo Test");
        assert_eq!(found.price, 15.5);
        assert!(repo.find("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_ordered_by_isbn() {
        let repo = repository().await;
        repo.insert(book("222", "Author2", "Title2", 20.0)).await.unwrap();
        repo.insert(book("111", "Author1", "Title1", 10.0)).await.unwrap();

        let isbns: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.isbn)
            .collect();
        assert_eq!(isbns, vec!["111", "222"]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected() {
        let repo = repository().await;
        repo.insert(book("333", "A", "T", 1.0)).await.unwrap();

        let err = repo.insert(book("333", "B", "U", 2.0)).await.unwrap_err();
        assert!(matches!(err, BookStoreError::Duplicate(ref isbn) if isbn == "333"));
    }

    #[tokio::test]
    async fn update_changes_only_present_fields() {
        let repo = repository().await;
        repo.insert(book("444", "Old Author", "Old Title", 30.0))
            .await
            .unwrap();

        let changes = UpdateBook {
            author: Some("New Author".to_string()),
            ..UpdateBook::default()
        };
        let updated = repo.update("444", &changes).await.unwrap().unwrap();

        assert_eq!(updated.author, "New Author");
        assert_eq!(updated.title, "Old Title");
        assert_eq!(updated.price, 30.0);
        assert!(repo.update("missing", &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let repo = repository().await;
        repo.insert(book("555", "Delete Author", "Delete Title", 40.0))
            .await
            .unwrap();

        let deleted = repo.delete("555").await.unwrap().unwrap();
        assert_eq!(deleted.isbn, "555");
        assert!(repo.find("555").await.unwrap().is_none());
        assert!(repo.delete("555").await.unwrap().is_none());
    }
}
