use std::fmt;

use rand::Rng;
use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Unsigned 1-bit integer.
    Bool,
    UInt8,
    UInt16,
    UInt32,
    Int8,
    Int16,
    Int32,
}

impl ElementType {
    pub const ALL: [ElementType; 7] = [
        ElementType::Bool,
        ElementType::UInt8,
        ElementType::UInt16,
        ElementType::UInt32,
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
    ];

    pub fn bits(self) -> u32 {
        match self {
            ElementType::Bool => 1,
            ElementType::UInt8 | ElementType::Int8 => 8,
            ElementType::UInt16 | ElementType::Int16 => 16,
            ElementType::UInt32 | ElementType::Int32 => 32,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, ElementType::Int8 | ElementType::Int16 | ElementType::Int32)
    }

    pub fn is_bool(self) -> bool {
        matches!(self, ElementType::Bool)
    }

    /// Smallest representable value.
    pub fn min(self) -> i64 {
        if self.is_signed() { -(1i64 << (self.bits() - 1)) } else { 0 }
    }

    /// Largest representable value.
    pub fn max(self) -> i64 {
        if self.is_signed() { (1i64 << (self.bits() - 1)) - 1 } else { (1i64 << self.bits()) - 1 }
    }

    /// Reduces `val` modulo 2^bits into the representable range of the type.
    pub fn wrap(self, val: i128) -> i64 {
        let bits = self.bits();
        let modulus = 1i128 << bits;
        let low = val.rem_euclid(modulus);
        let val = if self.is_signed() && low >= modulus / 2 { low - modulus } else { low };
        val as i64
    }

    pub fn contains(self, val: i128) -> bool {
        i128::from(self.min()) <= val && val <= i128::from(self.max())
    }

    pub fn vector_of(self, width: u32) -> VectorType {
        VectorType::new(self, width)
    }

    pub fn scalar(self) -> VectorType {
        VectorType::new(self, 1)
    }
}

/// Picks an element type uniformly from [`ElementType::ALL`].
pub fn random_element_type(rng: &mut impl Rng) -> ElementType {
    ElementType::ALL[rng.gen_range(0..ElementType::ALL.len())]
}

/// Picks a random element type and pairs it with `width`.
pub fn random_type(width: u32, rng: &mut impl Rng) -> VectorType {
    random_element_type(rng).vector_of(width)
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct VectorType {
    elem: ElementType,
    width: u32,
}

impl VectorType {
    pub fn new(elem: ElementType, width: u32) -> Self {
        simpfuzz_common::bug_unless!(width >= 1, "vector width must be positive");
        Self { elem, width }
    }

    pub fn elem(self) -> ElementType {
        self.elem
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn is_scalar(self) -> bool {
        self.width == 1
    }

    pub fn is_vector(self) -> bool {
        self.width > 1
    }

    pub fn is_bool(self) -> bool {
        self.elem.is_bool()
    }

    /// The scalar type of a single lane.
    pub fn element_of(self) -> VectorType {
        self.elem.scalar()
    }

    pub fn with_width(self, width: u32) -> VectorType {
        VectorType::new(self.elem, width)
    }

    /// The boolean type with the same width, i.e., the result type of a comparison.
    pub fn bool_of(self) -> VectorType {
        ElementType::Bool.vector_of(self.width)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Bool => write!(f, "bool"),
            ElementType::UInt8 => write!(f, "uint8"),
            ElementType::UInt16 => write!(f, "uint16"),
            ElementType::UInt32 => write!(f, "uint32"),
            ElementType::Int8 => write!(f, "int8"),
            ElementType::Int16 => write!(f, "int16"),
            ElementType::Int32 => write!(f, "int32"),
        }
    }
}

impl fmt::Display for VectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            write!(f, "{}", self.elem)
        } else {
            write!(f, "{}x{}", self.elem, self.width)
        }
    }
}
