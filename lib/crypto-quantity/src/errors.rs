use thiserror::Error;

/// Failures surfaced by quantity constructors and decoding.
///
/// Arithmetic and precision conversion on already-constructed quantities are
/// total and never return these, with the single exception of
/// [`QuantityError::DivisionByZero`] from `divide_and_round`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid serialized quantity: {0}")]
    InvalidSerialization(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("precision mismatch ({left} != {right})")]
    PrecisionMismatch { left: u32, right: u32 },
}
