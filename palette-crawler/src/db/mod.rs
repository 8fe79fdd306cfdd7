//! Database access for palette-crawler

pub mod photos;

pub use photos::SqlitePhotoStore;
