//! Utility modules
//!
//! Numeric helpers shared by the distribution families.

pub mod special;
