//! The 32-bit tagged value encoding.
//!
//! Every word living in the heap — a payload slot, a header's forwarding
//! target, a root — is interpreted through this type. A [`Value`] wraps a
//! raw `u32` and classifies it as one of three kinds purely from its bit
//! pattern (see [`Value::get_type`]); there is no separate tag byte stored
//! anywhere.
//!
//! ```text
//! Number:  iiii iiii iiii iiii iiii iiii iiii iii1   (LSB = 1)
//! Pointer: pppp pppp pppp pppp pppp pppp pppp pp00   (low two bits = 00)
//! Boolean: xxxx xxxx xxxx xxxx xxxx xxxx xxx1 0110   (word == TRUE or FALSE)
//! ```
//!
//! Pointer arithmetic steps by whole machine words (4 bytes), not bytes —
//! this is part of the external contract, not an implementation detail.

use crate::error::MemoryManagerError;
use core::ops::{Add, Sub};

/// Size in bytes of a machine word. Pointer arithmetic steps by this unit.
pub const WORD_SIZE: u32 = 4;

const TRUE: u32 = 0b1_0110;
const FALSE: u32 = 0b0_0110;

/// The kind of payload a [`Value`] encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// An unsigned integer packed into the upper 31 bits.
    Number,
    /// A virtual byte address into the heap (or the null pointer, `0`).
    Pointer,
    /// One of the two fixed boolean bit patterns.
    Boolean,
}

/// A tagged 32-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value(u32);

impl Value {
    /// Wraps a raw 32-bit word without interpreting it.
    #[must_use]
    pub const fn from_raw(word: u32) -> Self {
        Self(word)
    }

    /// Returns the raw, still-encoded 32-bit word.
    #[must_use]
    pub const fn to_int(self) -> u32 {
        self.0
    }

    /// Builds a pointer value from a virtual address.
    ///
    /// Does not validate alignment; an address that is not 4-byte-aligned
    /// simply produces a `Value` whose low two bits are non-zero bits of the
    /// address itself, which would then misclassify under [`Self::get_type`].
    /// Callers are expected to only ever pass word-aligned addresses, per
    /// the heap's addressing contract.
    #[must_use]
    pub const fn pointer(address: u32) -> Self {
        Self(address)
    }

    /// The null pointer, encoded as the all-zero word.
    #[must_use]
    pub const fn null() -> Self {
        Self(0)
    }

    /// Encodes `raw` as `type_`, bit-packing per the tagged encoding.
    ///
    /// # Errors
    /// Returns [`MemoryManagerError::TypeError`] if `raw` does not fit the
    /// domain of `type_` (e.g. a boolean payload other than 0/1, or a
    /// number that does not fit in 31 bits).
    pub fn encode(raw: u32, type_: ValueType) -> Result<Self, MemoryManagerError> {
        match type_ {
            ValueType::Number => {
                if raw > u32::MAX >> 1 {
                    return Err(MemoryManagerError::TypeError(
                        "number payload does not fit in 31 bits",
                    ));
                }
                Ok(Self((raw << 1) | 1))
            }
            ValueType::Pointer => Ok(Self(raw)),
            ValueType::Boolean => match raw {
                0 => Ok(Self(FALSE)),
                1 => Ok(Self(TRUE)),
                _ => Err(MemoryManagerError::TypeError(
                    "boolean payload must be 0 or 1",
                )),
            },
        }
    }

    /// Extracts the logical payload, per the type's decoding rule.
    #[must_use]
    pub const fn decode(self) -> u32 {
        match self.get_type() {
            ValueType::Number => self.0 >> 1,
            ValueType::Boolean => (self.0 >> 4) & 1,
            ValueType::Pointer => self.0,
        }
    }

    /// Classifies the word per the discrimination rule in the crate docs.
    #[must_use]
    pub const fn get_type(self) -> ValueType {
        if self.0 & 1 == 1 {
            ValueType::Number
        } else if self.0 == TRUE || self.0 == FALSE {
            ValueType::Boolean
        } else {
            ValueType::Pointer
        }
    }

    /// True if this word decodes as a [`ValueType::Number`].
    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(self.get_type(), ValueType::Number)
    }

    /// True if this word decodes as a [`ValueType::Pointer`] (includes null).
    #[must_use]
    pub const fn is_pointer(self) -> bool {
        matches!(self.get_type(), ValueType::Pointer)
    }

    /// True if this word decodes as a [`ValueType::Boolean`].
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self.get_type(), ValueType::Boolean)
    }

    /// True if this is a pointer and its address is zero.
    #[must_use]
    pub const fn is_null_pointer(self) -> bool {
        self.is_pointer() && self.0 == 0
    }

    fn require_pointer(self) -> Result<u32, MemoryManagerError> {
        if self.is_pointer() {
            Ok(self.0)
        } else {
            Err(MemoryManagerError::TypeError(
                "pointer arithmetic on a non-pointer value",
            ))
        }
    }

    /// Pre-increment: steps the address forward by one word and returns the
    /// new value.
    ///
    /// # Errors
    /// [`MemoryManagerError::TypeError`] if `self` is not a pointer.
    pub fn pre_increment(&mut self) -> Result<Self, MemoryManagerError> {
        let addr = self.require_pointer()?;
        self.0 = addr.wrapping_add(WORD_SIZE);
        Ok(*self)
    }

    /// Post-increment: returns the value before stepping, then advances by
    /// one word.
    ///
    /// # Errors
    /// [`MemoryManagerError::TypeError`] if `self` is not a pointer.
    pub fn post_increment(&mut self) -> Result<Self, MemoryManagerError> {
        let before = *self;
        self.pre_increment()?;
        Ok(before)
    }

    /// Pre-decrement: steps the address back by one word and returns the
    /// new value.
    ///
    /// # Errors
    /// [`MemoryManagerError::TypeError`] if `self` is not a pointer.
    pub fn pre_decrement(&mut self) -> Result<Self, MemoryManagerError> {
        let addr = self.require_pointer()?;
        self.0 = addr.wrapping_sub(WORD_SIZE);
        Ok(*self)
    }

    /// Post-decrement: returns the value before stepping, then steps back by
    /// one word.
    ///
    /// # Errors
    /// [`MemoryManagerError::TypeError`] if `self` is not a pointer.
    pub fn post_decrement(&mut self) -> Result<Self, MemoryManagerError> {
        let before = *self;
        self.pre_decrement()?;
        Ok(before)
    }
}

impl Add<u32> for Value {
    type Output = Result<Value, MemoryManagerError>;

    /// `p + i` steps the pointer forward by `i` whole words.
    fn add(self, i: u32) -> Self::Output {
        let addr = self.require_pointer()?;
        Ok(Value(addr.wrapping_add(i.wrapping_mul(WORD_SIZE))))
    }
}

impl Sub<u32> for Value {
    type Output = Result<Value, MemoryManagerError>;

    /// `p - i` steps the pointer backward by `i` whole words.
    fn sub(self, i: u32) -> Self::Output {
        let addr = self.require_pointer()?;
        Ok(Value(addr.wrapping_sub(i.wrapping_mul(WORD_SIZE))))
    }
}

impl PartialEq<u32> for Value {
    /// Equality against a raw integer compares the encoded word, not the
    /// decoded payload.
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}
