//! Data models for EbookHub entities.
//!
//! This module contains the data structures returned by the typed
//! endpoints:
//!
//! - `Book`, `BookPage`, `Chapter`, `ChapterTitle`: the catalog
//! - `Author`, `Genre`: book metadata
//! - `Love`, `Bookmark`, `Rating`, `Comment`: reader interactions

pub mod book;
pub mod reader;

pub use book::{Author, Book, BookPage, Chapter, ChapterTitle, Genre};
pub use reader::{Bookmark, Comment, Love, Rating};
