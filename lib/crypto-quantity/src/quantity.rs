use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::QuantityError;
use crate::{float_parts, scale_factor, DEFAULT_PRECISION};

/// An exact asset amount backed by a `BigInt` of smallest units.
///
/// A `CryptoQuantity` carries the amount scaled by `10^precision` (satoshis,
/// wei, ...) together with the precision itself, the number of decimal digits
/// after the implied decimal point. Nothing in the representation is a binary
/// float, so amounts round-trip through arithmetic and serialization without
/// drift.
///
/// # Examples
///
/// ```
/// use crypto_quantity::CryptoQuantity;
///
/// let a = CryptoQuantity::from_float(1.0).unwrap();
/// let b = CryptoQuantity::from_units(5).unwrap();
///
/// assert!(a.add(&b).equals(100_000_005));
/// ```
///
/// # Notes
///
/// Every operation returns a brand-new value and leaves its operands
/// untouched; a quantity is never mutated after construction.
///
/// The binary operations read a quantity operand by its raw units and do not
/// check its precision against the receiver's: callers mixing precisions are
/// expected to align them first with [`convert_precision`], or to opt into
/// rejection with [`require_matching_precision`]. The derived `PartialEq`
/// compares units and precision structurally; the [`equals`] predicate keeps
/// the raw-unit reading used by the rest of the operation set.
///
/// [`convert_precision`]: CryptoQuantity::convert_precision
/// [`require_matching_precision`]: CryptoQuantity::require_matching_precision
/// [`equals`]: CryptoQuantity::equals
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct CryptoQuantity {
    units: BigInt,
    precision: u32,
}

/// Wire form of a quantity: the exact smallest-unit amount as a decimal
/// string plus the precision it is scaled by.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SerializedQuantity {
    pub value: String,
    pub precision: u32,
}

/// Fallible conversion into a smallest-unit amount, accepted by the
/// constructors. Implemented for native integers, `BigInt`s, decimal strings
/// (optional leading `-`), and existing quantities.
pub trait IntoUnits {
    fn into_units(self) -> Result<BigInt, QuantityError>;
}

/// Right-hand operand of the binary operations, read as a raw smallest-unit
/// amount at the receiver's scale. Implemented for quantities, `BigInt`s, and
/// native integers; decimal strings must be lifted through
/// [`CryptoQuantity::from_units`] first so the operations stay total.
pub trait UnitsOperand {
    fn to_units(&self) -> BigInt;
}

impl CryptoQuantity {
    /// Wraps an exact smallest-unit amount at the default precision.
    pub fn from_units(value: impl IntoUnits) -> Result<Self, QuantityError> {
        Self::from_units_with_precision(value, DEFAULT_PRECISION)
    }

    /// Wraps an exact smallest-unit amount at the given precision.
    ///
    /// String input fails with [`QuantityError::InvalidAmount`] unless it is
    /// a base-10 integer literal with an optional leading `-`.
    pub fn from_units_with_precision(
        value: impl IntoUnits,
        precision: u32,
    ) -> Result<Self, QuantityError> {
        Ok(Self {
            units: value.into_units()?,
            precision,
        })
    }

    /// Converts a float to smallest units at the default precision.
    pub fn from_float(value: f64) -> Result<Self, QuantityError> {
        Self::from_float_with_precision(value, DEFAULT_PRECISION)
    }

    /// Converts a float to smallest units at the given precision.
    ///
    /// The whole part and the fractional remainder are scaled separately,
    /// each rounded half away from zero. Binary floats cannot represent most
    /// decimal fractions exactly, so this is a lossy entry point by nature;
    /// fractions below the precision quantize to nothing. Non-finite input
    /// fails with [`QuantityError::InvalidAmount`].
    pub fn from_float_with_precision(value: f64, precision: u32) -> Result<Self, QuantityError> {
        if !value.is_finite() {
            return Err(QuantityError::InvalidAmount(format!(
                "non-finite amount: {value}"
            )));
        }
        let (whole, fraction) = float_parts(value, precision).ok_or_else(|| {
            QuantityError::InvalidAmount(format!("amount does not fit precision {precision}"))
        })?;
        Ok(Self {
            units: whole * scale_factor(precision) + fraction,
            precision,
        })
    }

    /// The additive identity at the default precision.
    pub fn zero() -> Self {
        Self::zero_with_precision(DEFAULT_PRECISION)
    }

    /// The additive identity at the given precision.
    pub fn zero_with_precision(precision: u32) -> Self {
        Self {
            units: BigInt::zero(),
            precision,
        }
    }

    /// The underlying smallest-unit amount.
    pub fn units(&self) -> &BigInt {
        &self.units
    }

    /// Number of decimal digits after the implied decimal point.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    // ------------------------------------------------------------------
    // arithmetic

    /// Sum of the receiver and `rhs`, at the receiver's precision.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, rhs: impl UnitsOperand) -> Self {
        Self {
            units: &self.units + rhs.to_units(),
            precision: self.precision,
        }
    }

    /// Difference of the receiver and `rhs`, at the receiver's precision.
    pub fn subtract(&self, rhs: impl UnitsOperand) -> Self {
        Self {
            units: &self.units - rhs.to_units(),
            precision: self.precision,
        }
    }

    /// Product of the receiver's units and `rhs`, at the receiver's
    /// precision. The operand is read as a raw unit count, so multiplying by
    /// a quantity of one whole unit scales by `10^precision`, not by one.
    pub fn multiply(&self, rhs: impl UnitsOperand) -> Self {
        Self {
            units: &self.units * rhs.to_units(),
            precision: self.precision,
        }
    }

    /// Truncating integer division of the receiver's units by `divisor`.
    ///
    /// With `round_up`, a remainder strictly greater than zero bumps the
    /// quotient by one. Never floating-point division. A zero divisor fails
    /// with [`QuantityError::DivisionByZero`].
    pub fn divide_and_round(
        &self,
        divisor: impl UnitsOperand,
        round_up: bool,
    ) -> Result<Self, QuantityError> {
        let divisor = divisor.to_units();
        if divisor.is_zero() {
            return Err(QuantityError::DivisionByZero);
        }
        let quotient = &self.units / &divisor;
        let remainder = &self.units % &divisor;
        let units = if round_up && remainder > BigInt::zero() {
            quotient + 1
        } else {
            quotient
        };
        Ok(Self {
            units,
            precision: self.precision,
        })
    }

    // ------------------------------------------------------------------
    // comparison

    /// Three-way comparison of raw units.
    pub fn compare_units(&self, rhs: impl UnitsOperand) -> Ordering {
        self.units.cmp(&rhs.to_units())
    }

    pub fn gt(&self, rhs: impl UnitsOperand) -> bool {
        self.compare_units(rhs) == Ordering::Greater
    }

    pub fn gte(&self, rhs: impl UnitsOperand) -> bool {
        self.compare_units(rhs) != Ordering::Less
    }

    pub fn lt(&self, rhs: impl UnitsOperand) -> bool {
        self.compare_units(rhs) == Ordering::Less
    }

    pub fn lte(&self, rhs: impl UnitsOperand) -> bool {
        self.compare_units(rhs) != Ordering::Greater
    }

    /// Raw-unit equality. A non-quantity operand is read as a smallest-unit
    /// amount, never as a decimal value; a quantity operand is compared by
    /// units with its precision ignored.
    pub fn equals(&self, rhs: impl UnitsOperand) -> bool {
        self.compare_units(rhs) == Ordering::Equal
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }

    /// Rejects a cross-precision pairing with
    /// [`QuantityError::PrecisionMismatch`]. Opt-in: the binary operations
    /// themselves never call this.
    pub fn require_matching_precision(&self, other: &CryptoQuantity) -> Result<(), QuantityError> {
        if self.precision == other.precision {
            Ok(())
        } else {
            Err(QuantityError::PrecisionMismatch {
                left: self.precision,
                right: other.precision,
            })
        }
    }

    // ------------------------------------------------------------------
    // precision conversion

    /// Re-expresses the amount at a new precision.
    ///
    /// Widening appends zero digits and is exact. Narrowing drops digits and
    /// rounds on the most-significant dropped digit alone: `5` or higher
    /// bumps the kept magnitude by one, anything lower truncates. The full
    /// dropped remainder is never consulted (dropping `049` truncates), and
    /// the rule is applied to the magnitude with the sign held aside, so
    /// `-...5` moves away from zero. Narrowing past the available digits
    /// quantizes to zero or plus/minus one from the rounding digit.
    pub fn convert_precision(&self, precision: u32) -> Self {
        match precision.cmp(&self.precision) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => {
                let delta = precision - self.precision;
                Self {
                    units: &self.units * scale_factor(delta),
                    precision,
                }
            },
            Ordering::Less => {
                let dropped = self.precision - precision;
                let scale = BigUint::from(10u32).pow(dropped);
                let mut kept = self.units.magnitude() / &scale;
                let discarded = self.units.magnitude() % &scale;
                let leading = discarded / BigUint::from(10u32).pow(dropped - 1);
                if leading >= BigUint::from(5u8) {
                    kept += 1u32;
                }
                Self {
                    units: BigInt::from_biguint(self.units.sign(), kept),
                    precision,
                }
            },
        }
    }

    // ------------------------------------------------------------------
    // views

    /// The amount as a float, for display and interop only.
    ///
    /// WARNING: truncation occurs whenever the units need more significant
    /// digits than an `f64` mantissa holds. Never feed the result back into
    /// arithmetic.
    pub fn float_value(&self) -> f64 {
        let scale = scale_factor(self.precision);
        let quotient = &self.units / &scale;
        let remainder = &self.units % &scale;
        quotient.to_f64().unwrap_or_default()
            + remainder.to_f64().unwrap_or_default() / 10f64.powi(self.precision as i32)
    }

    /// Exact decimal form of the units, the canonical lossless
    /// representation.
    pub fn units_string(&self) -> String {
        self.units.to_string()
    }

    /// Whole units only, the fractional remainder discarded. Lossy; kept for
    /// integrations that treat the asset as indivisible.
    pub fn whole_units(&self) -> BigInt {
        &self.units / scale_factor(self.precision)
    }

    pub fn whole_units_string(&self) -> String {
        self.whole_units().to_string()
    }

    /// Reads a smallest-unit amount as a float at the default precision.
    pub fn units_to_float(value: impl IntoUnits) -> Result<f64, QuantityError> {
        Ok(Self::from_units(value)?.float_value())
    }

    /// Scales a float to a smallest-unit string at the default precision.
    pub fn float_to_units(value: f64) -> Result<String, QuantityError> {
        Ok(Self::from_float(value)?.units_string())
    }

    // ------------------------------------------------------------------
    // serialization

    /// The canonical two-field wire form.
    pub fn to_serialized(&self) -> SerializedQuantity {
        SerializedQuantity {
            value: self.units.to_string(),
            precision: self.precision,
        }
    }

    /// Decodes an already-parsed wire mapping.
    pub fn from_serialized(serialized: SerializedQuantity) -> Result<Self, QuantityError> {
        Self::from_units_with_precision(serialized.value.as_str(), serialized.precision).map_err(
            |_| {
                QuantityError::InvalidSerialization(format!(
                    "value {:?} is not an integer string",
                    serialized.value
                ))
            },
        )
    }

    /// Decodes the JSON text form of the wire mapping. Anything that does
    /// not resolve to a mapping with both required fields fails with
    /// [`QuantityError::InvalidSerialization`].
    pub fn unserialize(raw: &str) -> Result<Self, QuantityError> {
        let serialized: SerializedQuantity = serde_json::from_str(raw)
            .map_err(|err| QuantityError::InvalidSerialization(err.to_string()))?;
        Self::from_serialized(serialized)
    }
}

impl fmt::Display for CryptoQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.units.fmt(f)
    }
}

impl fmt::Debug for CryptoQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.units, self.precision)
    }
}

impl FromStr for CryptoQuantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_units(s)
    }
}

impl Default for CryptoQuantity {
    fn default() -> Self {
        Self::zero()
    }
}

fn invalid_integer(input: &str) -> QuantityError {
    QuantityError::InvalidAmount(format!("not a base-10 integer string: {input:?}"))
}

impl IntoUnits for &str {
    fn into_units(self) -> Result<BigInt, QuantityError> {
        // BigInt::from_str also takes a leading '+', which the wire form
        // never carries.
        if self.starts_with('+') {
            return Err(invalid_integer(self));
        }
        BigInt::from_str(self).map_err(|_| invalid_integer(self))
    }
}

impl IntoUnits for String {
    fn into_units(self) -> Result<BigInt, QuantityError> {
        self.as_str().into_units()
    }
}

impl IntoUnits for BigInt {
    fn into_units(self) -> Result<BigInt, QuantityError> {
        Ok(self)
    }
}

impl IntoUnits for &BigInt {
    fn into_units(self) -> Result<BigInt, QuantityError> {
        Ok(self.clone())
    }
}

impl IntoUnits for &CryptoQuantity {
    fn into_units(self) -> Result<BigInt, QuantityError> {
        Ok(self.units.clone())
    }
}

macro_rules! into_units_from_int {
    ($($ty:ty),*) => {
        $(
            impl IntoUnits for $ty {
                fn into_units(self) -> Result<BigInt, QuantityError> {
                    Ok(BigInt::from(self))
                }
            }
        )*
    };
}

into_units_from_int!(i32, i64, i128, u32, u64, u128);

impl UnitsOperand for CryptoQuantity {
    fn to_units(&self) -> BigInt {
        self.units.clone()
    }
}

impl UnitsOperand for &CryptoQuantity {
    fn to_units(&self) -> BigInt {
        self.units.clone()
    }
}

impl UnitsOperand for BigInt {
    fn to_units(&self) -> BigInt {
        self.clone()
    }
}

impl UnitsOperand for &BigInt {
    fn to_units(&self) -> BigInt {
        (*self).clone()
    }
}

macro_rules! units_operand_from_int {
    ($($ty:ty),*) => {
        $(
            impl UnitsOperand for $ty {
                fn to_units(&self) -> BigInt {
                    BigInt::from(*self)
                }
            }
        )*
    };
}

units_operand_from_int!(i32, i64, i128, u32, u64, u128);

impl Add<CryptoQuantity> for CryptoQuantity {
    type Output = CryptoQuantity;

    fn add(self, rhs: CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units + &rhs.units,
            precision: self.precision,
        }
    }
}

impl Add<CryptoQuantity> for &CryptoQuantity {
    type Output = CryptoQuantity;

    fn add(self, rhs: CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units + &rhs.units,
            precision: self.precision,
        }
    }
}

impl Add<&CryptoQuantity> for CryptoQuantity {
    type Output = CryptoQuantity;

    fn add(self, rhs: &CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units + &rhs.units,
            precision: self.precision,
        }
    }
}

impl Add<&CryptoQuantity> for &CryptoQuantity {
    type Output = CryptoQuantity;

    fn add(self, rhs: &CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units + &rhs.units,
            precision: self.precision,
        }
    }
}

impl Sub<CryptoQuantity> for CryptoQuantity {
    type Output = CryptoQuantity;

    fn sub(self, rhs: CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units - &rhs.units,
            precision: self.precision,
        }
    }
}

impl Sub<CryptoQuantity> for &CryptoQuantity {
    type Output = CryptoQuantity;

    fn sub(self, rhs: CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units - &rhs.units,
            precision: self.precision,
        }
    }
}

impl Sub<&CryptoQuantity> for CryptoQuantity {
    type Output = CryptoQuantity;

    fn sub(self, rhs: &CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units - &rhs.units,
            precision: self.precision,
        }
    }
}

impl Sub<&CryptoQuantity> for &CryptoQuantity {
    type Output = CryptoQuantity;

    fn sub(self, rhs: &CryptoQuantity) -> Self::Output {
        CryptoQuantity {
            units: &self.units - &rhs.units,
            precision: self.precision,
        }
    }
}

impl Mul<u64> for CryptoQuantity {
    type Output = CryptoQuantity;

    fn mul(self, rhs: u64) -> Self::Output {
        CryptoQuantity {
            units: &self.units * rhs,
            precision: self.precision,
        }
    }
}

impl Mul<u64> for &CryptoQuantity {
    type Output = CryptoQuantity;

    fn mul(self, rhs: u64) -> Self::Output {
        CryptoQuantity {
            units: &self.units * rhs,
            precision: self.precision,
        }
    }
}

impl Serialize for CryptoQuantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_serialized().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CryptoQuantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let serialized = SerializedQuantity::deserialize(deserializer)?;
        Self::from_serialized(serialized).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for CryptoQuantity {
    fn schema_name() -> String {
        "CryptoQuantity".to_string()
    }

    fn schema_id() -> Cow<'static, str> {
        Cow::Borrowed(concat!(module_path!(), "::CryptoQuantity"))
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        SerializedQuantity::json_schema(gen)
    }
}
