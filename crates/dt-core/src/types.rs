//! Canonical column type system

use serde::{Deserialize, Serialize};

/// Valid bit widths for integer types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntBitWidth {
    /// 8-bit (TINYINT)
    I8,
    /// 16-bit (SMALLINT)
    I16,
    /// 32-bit (INT)
    I32,
    /// 64-bit (BIGINT)
    I64,
}

impl std::fmt::Display for IntBitWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntBitWidth::I8 => write!(f, "8"),
            IntBitWidth::I16 => write!(f, "16"),
            IntBitWidth::I32 => write!(f, "32"),
            IntBitWidth::I64 => write!(f, "64"),
        }
    }
}

/// Valid bit widths for floating-point types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FloatBitWidth {
    /// 32-bit (FLOAT / REAL)
    F32,
    /// 64-bit (DOUBLE)
    F64,
}

impl std::fmt::Display for FloatBitWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FloatBitWidth::F32 => write!(f, "32"),
            FloatBitWidth::F64 => write!(f, "64"),
        }
    }
}

/// Dialect-independent column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalType {
    /// BOOL / BOOLEAN / BIT
    Boolean,
    /// Integer family
    Integer { bits: IntBitWidth },
    /// Floating-point family
    Float { bits: FloatBitWidth },
    /// Fixed-precision decimal
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },
    /// Character data; `None` is unbounded
    String { max_length: Option<u32> },
    /// DATE
    Date,
    /// TIME
    Time,
    /// DATETIME / TIMESTAMP
    DateTime,
    /// Could not be mapped; needs manual resolution
    Unknown,
}

impl CanonicalType {
    /// 64-bit integer, the default for ambiguous integral tokens
    pub const WIDE_INTEGER: CanonicalType = CanonicalType::Integer {
        bits: IntBitWidth::I64,
    };

    /// Double precision, the default for ambiguous fractional tokens
    pub const WIDE_FLOAT: CanonicalType = CanonicalType::Float {
        bits: FloatBitWidth::F64,
    };

    /// Unbounded string, the widest type and the emit fallback for UNKNOWN
    pub const WIDE_STRING: CanonicalType = CanonicalType::String { max_length: None };

    /// Returns true if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CanonicalType::Integer { .. } | CanonicalType::Float { .. } | CanonicalType::Decimal { .. }
        )
    }

    /// Returns true if this is a string type
    pub fn is_string(&self) -> bool {
        matches!(self, CanonicalType::String { .. })
    }

    /// Returns true if this type is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, CanonicalType::Unknown)
    }

    /// Check if two types can sit on either side of a join predicate.
    ///
    /// Numeric types are mutually compatible, strings are compatible with each
    /// other, Date/DateTime are compatible, and Unknown is compatible with
    /// anything so unresolved columns never block a constraint.
    pub fn is_compatible_with(&self, other: &CanonicalType) -> bool {
        if self.is_unknown() || other.is_unknown() {
            return true;
        }
        if self.is_numeric() && other.is_numeric() {
            return true;
        }
        matches!(
            (self, other),
            (CanonicalType::Boolean, CanonicalType::Boolean)
                | (CanonicalType::String { .. }, CanonicalType::String { .. })
                | (CanonicalType::Date, CanonicalType::Date)
                | (CanonicalType::Time, CanonicalType::Time)
                | (CanonicalType::DateTime, CanonicalType::DateTime)
                | (CanonicalType::Date, CanonicalType::DateTime)
                | (CanonicalType::DateTime, CanonicalType::Date)
        )
    }

    /// Same type family, ignoring widths and declared lengths.
    ///
    /// Stricter than [`is_compatible_with`](Self::is_compatible_with): Unknown
    /// only matches Unknown and INT never matches DOUBLE.
    pub fn same_family(&self, other: &CanonicalType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Human-readable display name
    pub fn display_name(&self) -> String {
        match self {
            CanonicalType::Boolean => "BOOL".into(),
            CanonicalType::Integer {
                bits: IntBitWidth::I8,
            } => "TINYINT".into(),
            CanonicalType::Integer {
                bits: IntBitWidth::I16,
            } => "SMALLINT".into(),
            CanonicalType::Integer {
                bits: IntBitWidth::I32,
            } => "INT".into(),
            CanonicalType::Integer {
                bits: IntBitWidth::I64,
            } => "BIGINT".into(),
            CanonicalType::Float {
                bits: FloatBitWidth::F32,
            } => "FLOAT".into(),
            CanonicalType::Float {
                bits: FloatBitWidth::F64,
            } => "DOUBLE".into(),
            CanonicalType::Decimal {
                precision: Some(p),
                scale: Some(s),
            } => format!("DECIMAL({p},{s})"),
            CanonicalType::Decimal {
                precision: Some(p), ..
            } => format!("DECIMAL({p})"),
            CanonicalType::Decimal { .. } => "DECIMAL".into(),
            CanonicalType::String {
                max_length: Some(n),
            } => format!("VARCHAR({n})"),
            CanonicalType::String { .. } => "VARCHAR".into(),
            CanonicalType::Date => "DATE".into(),
            CanonicalType::Time => "TIME".into(),
            CanonicalType::DateTime => "DATETIME".into(),
            CanonicalType::Unknown => "UNKNOWN".into(),
        }
    }
}

impl std::fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How sure the type mapper is about a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Token matched a table entry exactly
    Exact,
    /// Ambiguous token resolved to a wide default
    Inferred,
    /// Nothing matched; the column is UNKNOWN
    Unresolved,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Exact => write!(f, "exact"),
            Confidence::Inferred => write!(f, "inferred"),
            Confidence::Unresolved => write!(f, "unresolved"),
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
