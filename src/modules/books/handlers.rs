use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use folio_authz::AuthUser;
use folio_http::{AppError, ValidatedJson};

use super::{
    models::{Book, CreateBook, UpdateBook},
    BooksState,
};

fn missing(isbn: &str) -> AppError {
    AppError::not_found(format!("book {} not found", isbn))
}

pub async fn list_books(
    _user: AuthUser,
    State(state): State<BooksState>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.repo.list().await?))
}

pub async fn get_book(
    _user: AuthUser,
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
) -> Result<Json<Book>, AppError> {
    let book = state.repo.find(&isbn).await?.ok_or_else(|| missing(&isbn))?;
    Ok(Json(book))
}

/// Accepted with the stored book echoed back
pub async fn create_book(
    user: AuthUser,
    State(state): State<BooksState>,
    ValidatedJson(new): ValidatedJson<CreateBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = state.repo.insert(new).await?;
    tracing::info!(isbn = %book.isbn, user = %user.username, "book added");
    Ok((StatusCode::ACCEPTED, Json(book)))
}

pub async fn update_book(
    user: AuthUser,
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
    ValidatedJson(changes): ValidatedJson<UpdateBook>,
) -> Result<Json<Book>, AppError> {
    let book = state
        .repo
        .update(&isbn, &changes)
        .await?
        .ok_or_else(|| missing(&isbn))?;
    tracing::info!(isbn = %book.isbn, user = %user.username, "book updated");
    Ok(Json(book))
}

pub async fn delete_book(
    user: AuthUser,
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .repo
        .delete(&isbn)
        .await?
        .ok_or_else(|| missing(&isbn))?;
    tracing::info!(isbn = %isbn, user = %user.username, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
