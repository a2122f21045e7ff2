pub mod multi_rect;
pub mod pattern;
