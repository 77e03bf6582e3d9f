use folio_http::{field_error, Validate};
use serde::{Deserialize, Serialize};

/// Catalog entry, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Unique identifier for the book
    pub isbn: String,
    pub author: String,
    pub title: String,
    pub price: f64,
}

/// Request model for adding a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    pub isbn: String,
    pub author: String,
    pub title: String,
    pub price: f64,
}

/// Partial update; absent fields keep their stored value. The ISBN comes from the path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBook {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

fn check_text(details: &mut Vec<serde_json::Value>, field: &str, value: &str) {
    if value.trim().is_empty() {
        details.push(field_error(field, "must not be blank"));
    }
}

fn check_price(details: &mut Vec<serde_json::Value>, price: f64) {
    if !price.is_finite() || price < 0.0 {
        details.push(field_error("price", "must be zero or greater"));
    }
}

impl Validate for CreateBook {
    fn validate(&self) -> Vec<serde_json::Value> {
        let mut details = Vec::new();
        check_text(&mut details, "isbn", &self.isbn);
        check_text(&mut details, "author", &self.author);
        check_text(&mut details, "title", &self.title);
        check_price(&mut details, self.price);
        details
    }
}

impl Validate for UpdateBook {
    fn validate(&self) -> Vec<serde_json::Value> {
        let mut details = Vec::new();
        if let Some(author) = &self.author {
            check_text(&mut details, "author", author);
        }
        if let Some(title) = &self.title {
            check_text(&mut details, "title", title);
        }
        if let Some(price) = self.price {
            check_price(&mut details, price);
        }
        details
    }
}

impl From<CreateBook> for Book {
    fn from(new: CreateBook) -> Self {
        Self {
            isbn: new.isbn,
            author: new.author,
            title: new.title,
            price: new.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateBook {
        CreateBook {
            isbn: "9780131103627".to_string(),
            author: "Kernighan".to_string(),
            title: "The C Programming Language".to_string(),
            price: 42.5,
        }
    }

    #[test]
    fn valid_create_has_no_errors() {
        assert!(create().validate().is_empty());
    }

    #[test]
    fn blank_fields_and_negative_price_are_reported() {
        let invalid = CreateBook {
            isbn: " ".to_string(),
            title: String::new(),
            price: -1.0,
            ..create()
        };

        let fields: Vec<_> = invalid
            .validate()
            .into_iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, vec!["isbn", "title", "price"]);
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(UpdateBook::default().validate().is_empty());

        let update = UpdateBook {
            author: Some(String::new()),
            ..UpdateBook::default()
        };
        assert_eq!(update.validate().len(), 1);
    }
}
