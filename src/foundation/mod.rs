/// Shared value types: sizes, vectors, colors and pixel/offset conversions.
pub mod core;
/// Crate-wide error type.
pub mod error;
/// Vector and rotation helpers.
pub mod math;
