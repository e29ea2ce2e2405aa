//! Exact fixed-point quantities for crypto assets.
//!
//! A [`CryptoQuantity`] stores an amount as an arbitrary-precision signed
//! integer of smallest units (the decimal value scaled by `10^precision`)
//! together with the precision itself, so amounts can be summed, compared,
//! divided, and serialized without binary-float drift. Assets with different
//! decimal conventions are handled by the precision value alone: 8 digits for
//! bitcoin-style assets ([`DEFAULT_PRECISION`]), 18 for ethereum-style assets
//! ([`ETHEREUM_PRECISION`]).
//!
//! ```
//! use crypto_quantity::{CryptoQuantity, ETHEREUM_PRECISION};
//!
//! let fee = CryptoQuantity::from_float(0.12345).unwrap();
//! assert_eq!(fee.units_string(), "12345000");
//!
//! let wei = fee.convert_precision(ETHEREUM_PRECISION);
//! assert_eq!(wei.units_string(), "123450000000000000");
//! ```

use num_bigint::BigInt;
use num_traits::FromPrimitive;

pub mod errors;
pub mod quantity;

pub use errors::QuantityError;
pub use quantity::{CryptoQuantity, IntoUnits, SerializedQuantity, UnitsOperand};

/// Decimal digits assumed when no precision is given (bitcoin-style assets).
pub const DEFAULT_PRECISION: u32 = 8;

/// Decimal digits used by ethereum-style assets.
pub const ETHEREUM_PRECISION: u32 = 18;

/// `10^precision`, the number of smallest units in one whole unit.
pub(crate) fn scale_factor(precision: u32) -> BigInt {
    BigInt::from(10u32).pow(precision)
}

/// Splits a float into its rounded whole part and the remainder scaled to
/// `precision` digits, each rounded half away from zero. Scaling the two
/// parts separately keeps large amounts from losing their fractional digits
/// to one oversized multiplication. Returns `None` for non-finite inputs.
pub(crate) fn float_parts(value: f64, precision: u32) -> Option<(BigInt, BigInt)> {
    let whole = value.round();
    let fraction = ((value - whole) * 10f64.powi(precision as i32)).round();
    Some((BigInt::from_f64(whole)?, BigInt::from_f64(fraction)?))
}
