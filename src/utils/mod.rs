mod framing;
mod validation;

// Framing operations
pub use framing::{fix_length, fix_length_in_place, frame_count};

// Validation operations
pub use validation::{ensure_finite, ensure_non_negative, ensure_same_shape, valid_audio};

#[cfg(test)]
mod tests;
