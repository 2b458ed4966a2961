//! Storage types.
//!
//! The language has three scalar types and two compound shapes built on top
//! of them. Every type knows how many bytes of storage it occupies, which is
//! what the address allocator and the memory routines are keyed on.

use std::fmt;

/// A scalar storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// One byte, holds a character code.
    Char,
    /// Four bytes, 32-bit integer.
    Int,
    /// Four bytes, written in hexadecimal.
    Hex,
}

impl ScalarType {
    /// Size of one value in bytes.
    #[inline]
    pub const fn size(self) -> u32 {
        match self {
            ScalarType::Char => 1,
            ScalarType::Int | ScalarType::Hex => 4,
        }
    }

    /// Source-level name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Char => "char",
            ScalarType::Int => "int",
            ScalarType::Hex => "hex",
        }
    }

    /// Look up a scalar type by its source-level name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "char" => Some(ScalarType::Char),
            "int" | "int32" => Some(ScalarType::Int),
            "hex" => Some(ScalarType::Hex),
            _ => None,
        }
    }

    /// Whether `value` can be stored in this type without truncation.
    pub fn fits(self, value: i64) -> bool {
        match self {
            ScalarType::Char => (0..=i64::from(u8::MAX)).contains(&value),
            ScalarType::Int => (i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&value),
            ScalarType::Hex => (0..=i64::from(u32::MAX)).contains(&value),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A single scalar value.
    Scalar(ScalarType),
    /// A 32-bit cell holding the address of a value of the given type.
    Pointer(ScalarType),
    /// A fixed-length list. Elements are separate variables at consecutive addresses.
    List {
        /// Type of every element.
        element: ScalarType,
        /// Number of elements.
        len: u32,
    },
}

impl ValueType {
    /// Bytes allocated for the variable itself.
    ///
    /// List headers take no storage; their elements are allocated one by one.
    #[inline]
    pub const fn size(self) -> u32 {
        match self {
            ValueType::Scalar(scalar) => scalar.size(),
            ValueType::Pointer(_) => 4,
            ValueType::List { .. } => 0,
        }
    }

    /// The scalar type a load or store of this value moves.
    ///
    /// Pointers move a full word; lists move their element type.
    pub const fn cell(self) -> ScalarType {
        match self {
            ValueType::Scalar(scalar) => scalar,
            ValueType::Pointer(_) => ScalarType::Hex,
            ValueType::List { element, .. } => element,
        }
    }

    /// Whether this is a list.
    #[inline]
    pub const fn is_list(self) -> bool {
        matches!(self, ValueType::List { .. })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(scalar) => write!(f, "{scalar}"),
            ValueType::Pointer(target) => write!(f, "{target}*"),
            ValueType::List { element, len } => write!(f, "list<{element}>[{len}]"),
        }
    }
}

impl From<ScalarType> for ValueType {
    fn from(scalar: ScalarType) -> Self {
        ValueType::Scalar(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_sizes() {
        assert_eq!(ScalarType::Char.size(), 1);
        assert_eq!(ScalarType::Int.size(), 4);
        assert_eq!(ScalarType::Hex.size(), 4);
    }

    #[test]
    fn scalar_names_round_trip() {
        for scalar in [ScalarType::Char, ScalarType::Int, ScalarType::Hex] {
            assert_eq!(ScalarType::from_name(scalar.name()), Some(scalar));
        }
        assert_eq!(ScalarType::from_name("int32"), Some(ScalarType::Int));
        assert_eq!(ScalarType::from_name("float"), None);
    }

    #[test]
    fn scalar_ranges() {
        assert!(ScalarType::Char.fits(255));
        assert!(!ScalarType::Char.fits(256));
        assert!(!ScalarType::Char.fits(-1));
        assert!(ScalarType::Int.fits(-5));
        assert!(ScalarType::Int.fits(0xFFFF_FFFF));
        assert!(!ScalarType::Int.fits(0x1_0000_0000));
        assert!(!ScalarType::Hex.fits(-1));
    }

    #[test]
    fn value_type_sizes() {
        assert_eq!(ValueType::Pointer(ScalarType::Char).size(), 4);
        let list = ValueType::List {
            element: ScalarType::Int,
            len: 3,
        };
        assert_eq!(list.size(), 0);
        assert_eq!(list.cell(), ScalarType::Int);
        assert!(list.is_list());
    }

    #[test]
    fn value_type_display() {
        assert_eq!(ValueType::Scalar(ScalarType::Int).to_string(), "int");
        assert_eq!(ValueType::Pointer(ScalarType::Char).to_string(), "char*");
        let list = ValueType::List {
            element: ScalarType::Char,
            len: 4,
        };
        assert_eq!(list.to_string(), "list<char>[4]");
    }
}
