//! Wire format types for upstream provider APIs

pub mod gemini;
