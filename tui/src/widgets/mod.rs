//! Custom widgets for the poster studio surface.

pub mod image_block;
pub mod text_block;

pub use image_block::ImageBlock;
pub use text_block::{TextBlock, TextBlockState};
