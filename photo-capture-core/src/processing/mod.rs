pub mod orientation;
pub mod still_image;
