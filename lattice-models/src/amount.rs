// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::ModelsError;
use lattice_serialization::{
    Deserializer, SerializeError, Serializer, U128BeDeserializer, U128BeSerializer,
};
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde::de::Unexpected;
use std::fmt;
use std::str::FromStr;

/// Width of the binary form of an amount
pub const AMOUNT_SIZE_BYTES: usize = 16;

/// An unsigned 128-bit quantity of raw units.
/// Arithmetic is only exposed through checked and saturating operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Ord, PartialOrd, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    /// The widest representable amount, which is the genesis supply
    pub const MAX: Amount = Amount(u128::MAX);

    /// Create a zero Amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Obtains the underlying raw `u128`
    pub fn to_raw(&self) -> u128 {
        self.0
    }

    /// constructs an `Amount` from a raw `u128`
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// safely add self to another amount, returning None on overflow
    /// ```
    /// # use lattice_models::amount::Amount;
    /// let res = Amount::from_raw(42).checked_add(Amount::from_raw(7)).unwrap();
    /// assert_eq!(res, Amount::from_raw(49));
    /// assert!(Amount::MAX.checked_add(Amount::from_raw(1)).is_none());
    /// ```
    pub fn checked_add(self, amount: Amount) -> Option<Self> {
        self.0.checked_add(amount.0).map(Amount)
    }

    /// safely subtract another amount from self, returning None on underflow
    pub fn checked_sub(self, amount: Amount) -> Option<Self> {
        self.0.checked_sub(amount.0).map(Amount)
    }

    /// safely add self to another amount, saturating the result on overflow
    #[must_use]
    pub fn saturating_add(self, amount: Amount) -> Self {
        Amount(self.0.saturating_add(amount.0))
    }

    /// safely subtract another amount from self, saturating the result on underflow
    #[must_use]
    pub fn saturating_sub(self, amount: Amount) -> Self {
        Amount(self.0.saturating_sub(amount.0))
    }

    /// 32 uppercase hexadecimal characters, the form used by send blocks in json
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0.to_be_bytes())
    }

    /// Parses exactly 32 hexadecimal characters
    pub fn from_hex(data: &str) -> Result<Amount, ModelsError> {
        let mut bytes = [0u8; AMOUNT_SIZE_BYTES];
        hex::decode_to_slice(data, &mut bytes)
            .map_err(|err| ModelsError::AmountParseError(format!("{}: {}", data, err)))?;
        Ok(Amount(u128::from_be_bytes(bytes)))
    }
}

/// display an Amount in decimal form
///
/// ```
/// # use lattice_models::amount::Amount;
/// assert_eq!(Amount::MAX.to_string(), "340282366920938463463374607431768211455");
/// ```
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u128::from_str(s)
            .map(Amount)
            .map_err(|err| ModelsError::AmountParseError(format!("{}: {}", s, err)))
    }
}

impl<'de> serde::Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        deserializer.deserialize_str(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> serde::de::Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn visit_str<E>(self, value: &str) -> Result<Amount, E>
    where
        E: serde::de::Error,
    {
        Amount::from_str(value).map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a decimal string of raw units")
    }
}

impl serde::Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Serde helpers writing an amount as 32 hexadecimal characters
pub(crate) mod amount_hex {
    use super::Amount;

    pub fn serialize<S: serde::Serializer>(amount: &Amount, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&amount.to_hex())
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Amount, D::Error> {
        let text: String = serde::Deserialize::deserialize(d)?;
        Amount::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Serializer for `Amount`, 16 bytes big-endian
#[derive(Clone, Default)]
pub struct AmountSerializer {
    u128_serializer: U128BeSerializer,
}

impl AmountSerializer {
    /// Create a new `AmountSerializer`
    pub const fn new() -> Self {
        Self {
            u128_serializer: U128BeSerializer::new(),
        }
    }
}

impl Serializer<Amount> for AmountSerializer {
    fn serialize(&self, value: &Amount, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.u128_serializer.serialize(&value.0, buffer)
    }
}

/// Deserializer for `Amount`
#[derive(Clone, Default)]
pub struct AmountDeserializer {
    u128_deserializer: U128BeDeserializer,
}

impl AmountDeserializer {
    /// Create a new `AmountDeserializer`
    pub const fn new() -> Self {
        Self {
            u128_deserializer: U128BeDeserializer::new(),
        }
    }
}

impl Deserializer<Amount> for AmountDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Amount, E> {
        context("Failed Amount deserialization", |input: &'a [u8]| {
            self.u128_deserializer.deserialize(input)
        })(buffer)
        .map(|(rest, raw)| (rest, Amount(raw)))
    }
}
