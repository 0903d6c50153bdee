pub mod metadata;
pub mod photo_library;
