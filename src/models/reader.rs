//! Reader interaction rows: loves, bookmarks, ratings, comments.
//!
//! The backend serializes the user as a username string and embeds the
//! full book in each row.

use serde::{Deserialize, Serialize};

use super::book::Book;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Love {
    pub user: String,
    pub book: Book,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub user: String,
    pub book: Book,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user: String,
    pub book: Book,
    /// Decimal field serialized as a string, e.g. "4.0".
    pub rating: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Rating {
    pub fn value(&self) -> Option<f64> {
        self.rating.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub user: String,
    pub book: Book,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_love_row() {
        let json = r#"{
            "user": "reader1",
            "book": {"id": 7, "title": "The Long Trail"},
            "created_at": "2024-06-01T10:00:00Z"
        }"#;
        let love: Love = serde_json::from_str(json).unwrap();
        assert_eq!(love.user, "reader1");
        assert_eq!(love.book.id, 7);
    }

    #[test]
    fn rating_value_parses_decimal_string() {
        let json = r#"{
            "user": "reader1",
            "book": {"id": 7, "title": "The Long Trail"},
            "rating": "3.5"
        }"#;
        let rating: Rating = serde_json::from_str(json).unwrap();
        assert_eq!(rating.value(), Some(3.5));
    }
}
