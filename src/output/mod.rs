//! Output formatting

pub mod text;
