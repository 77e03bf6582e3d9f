pub mod handlers;
pub mod models;
pub mod repository;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::FromRef, routing::get, Router};
use folio_authz::Authenticator;
use folio_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::BookRepository;

pub(crate) const MIGRATION_001: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        isbn   TEXT PRIMARY KEY NOT NULL,
        author TEXT NOT NULL,
        title  TEXT NOT NULL,
        price  REAL NOT NULL CHECK (price >= 0)
    );
"#;

/// Shared state for the books handlers
#[derive(Clone)]
pub struct BooksState {
    pub repo: BookRepository,
    pub auth: Authenticator,
}

impl FromRef<BooksState> for Authenticator {
    fn from_ref(state: &BooksState) -> Self {
        state.auth.clone()
    }
}

/// Book catalog CRUD, every route behind a bearer access token
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(state: BooksState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn base_path(&self) -> String {
        "/books".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let count = self.state.repo.count().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = count,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(handlers::list_books).post(handlers::create_book),
            )
            .route(
                "/{isbn}",
                get(handlers::get_book)
                    .patch(handlers::update_book)
                    .delete(handlers::delete_book),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            version: 20260101000200,
            id: "001_books",
            up: MIGRATION_001,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn json_body(schema: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let isbn_param = json!({
        "name": "isbn",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let security = json!([{ "bearerAuth": [] }]);

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "security": security,
                    "responses": {
                        "200": {
                            "description": "All books ordered by ISBN",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "401": error_response("Missing or invalid access token")
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "security": security,
                    "requestBody": json_body("CreateBook"),
                    "responses": {
                        "202": book_response("Book accepted"),
                        "400": error_response("Invalid payload or duplicate ISBN"),
                        "401": error_response("Missing or invalid access token")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Get a book by ISBN",
                    "tags": ["Books"],
                    "security": security,
                    "parameters": [isbn_param],
                    "responses": {
                        "200": book_response("The book"),
                        "401": error_response("Missing or invalid access token"),
                        "404": error_response("No book with this ISBN")
                    }
                },
                "patch": {
                    "summary": "Update a book",
                    "tags": ["Books"],
                    "security": security,
                    "parameters": [isbn_param],
                    "requestBody": json_body("UpdateBook"),
                    "responses": {
                        "200": book_response("The updated book"),
                        "400": error_response("Invalid payload"),
                        "401": error_response("Missing or invalid access token"),
                        "404": error_response("No book with this ISBN")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "security": security,
                    "parameters": [isbn_param],
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "401": error_response("Missing or invalid access token"),
                        "404": error_response("No book with this ISBN")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "isbn": { "type": "string", "description": "Unique identifier for the book" },
                        "author": { "type": "string" },
                        "title": { "type": "string" },
                        "price": { "type": "number", "minimum": 0 }
                    },
                    "required": ["isbn", "author", "title", "price"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "isbn": { "type": "string" },
                        "author": { "type": "string" },
                        "title": { "type": "string" },
                        "price": { "type": "number", "minimum": 0 }
                    },
                    "required": ["isbn", "author", "title", "price"]
                },
                "UpdateBook": {
                    "type": "object",
                    "properties": {
                        "author": { "type": "string" },
                        "title": { "type": "string" },
                        "price": { "type": "number", "minimum": 0 }
                    }
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(state: BooksState) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(state))
}
