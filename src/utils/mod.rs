//! Small shared helpers

pub mod comparison;
pub mod duration;

pub use comparison::safe_float_cmp;
pub use duration::{parse_duration_literal, format_duration_literal};
