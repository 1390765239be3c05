use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Chapter entry inside a book listing (title only, no content).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterTitle {
    pub id: i64,
    pub chapter_title: String,
}

/// Full chapter as returned by the reading endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub id: Option<i64>,
    pub chapter_title: String,
    pub content: String,
    pub chapter_number: u32,
    #[serde(default)]
    pub date_published: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub publisher: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<Genre>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub can_fork: bool,
    /// Decimal field; the backend serializes it as a string like "4.5".
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub chapters: Vec<ChapterTitle>,
}

impl Book {
    /// Average rating as a number, when present and well-formed.
    pub fn rating_value(&self) -> Option<f64> {
        self.rating.as_deref().and_then(|r| r.parse().ok())
    }

    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(|a| a.name.as_str()).unwrap_or("Unknown")
    }
}

/// One page of the paginated book list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPage {
    pub count: i64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<Book>,
}
