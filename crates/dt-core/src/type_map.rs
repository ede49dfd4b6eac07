//! Vendor type token to canonical type mapping
//!
//! Every dialect has a table of exact matches and a table of prefix matches.
//! Lookup order is dialect exact, shared exact, dialect prefix, shared prefix,
//! then a substring heuristic for ambiguous spellings. Mapping is total: a
//! token nothing recognizes becomes [`CanonicalType::Unknown`].

use crate::dialect::Dialect;
use crate::types::{CanonicalType, Confidence, FloatBitWidth, IntBitWidth};
use serde::{Deserialize, Serialize};

/// Result of mapping one vendor type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapping {
    /// Canonical type the token maps to
    pub ty: CanonicalType,
    /// How the mapping was reached
    pub confidence: Confidence,
}

impl TypeMapping {
    fn exact(ty: CanonicalType) -> Self {
        Self {
            ty,
            confidence: Confidence::Exact,
        }
    }

    fn inferred(ty: CanonicalType) -> Self {
        Self {
            ty,
            confidence: Confidence::Inferred,
        }
    }

    fn unresolved() -> Self {
        Self {
            ty: CanonicalType::Unknown,
            confidence: Confidence::Unresolved,
        }
    }
}

/// Largest decimal precision that is not treated as ambiguous
const MAX_EXACT_DECIMAL_PRECISION: u32 = 18;

/// Largest Oracle `NUMBER(p,0)` precision that fits a 32-bit integer
const MAX_INT32_DIGITS: u32 = 9;

/// What a table entry resolves to once precision/scale are known
#[derive(Debug, Clone, Copy)]
enum Rule {
    Fixed(CanonicalType),
    Ambiguous(CanonicalType),
    Unrepresentable,
    /// Character data; precision is the declared length
    Chars,
    /// Fixed-point with precision/scale
    FixedPoint,
    /// `FLOAT(n)`: n ≤ 24 is single precision
    FloatDigits,
    /// Oracle `NUMBER[(p[,s])]`
    OracleNumber,
    /// MySQL `TINYINT(1)` is the conventional boolean
    TinyInt,
    /// `BIT(1)` is boolean, wider bit strings are integers
    Bit,
}

const fn int(bits: IntBitWidth) -> Rule {
    Rule::Fixed(CanonicalType::Integer { bits })
}

const fn float(bits: FloatBitWidth) -> Rule {
    Rule::Fixed(CanonicalType::Float { bits })
}

const UNBOUNDED: Rule = Rule::Fixed(CanonicalType::WIDE_STRING);

/// ANSI types, consulted after the dialect tables
const COMMON_EXACT: &[(&str, Rule)] = &[
    ("BOOLEAN", Rule::Fixed(CanonicalType::Boolean)),
    ("BOOL", Rule::Fixed(CanonicalType::Boolean)),
    ("TINYINT", int(IntBitWidth::I8)),
    ("SMALLINT", int(IntBitWidth::I16)),
    ("INT", int(IntBitWidth::I32)),
    ("INTEGER", int(IntBitWidth::I32)),
    ("BIGINT", int(IntBitWidth::I64)),
    ("REAL", float(FloatBitWidth::F32)),
    ("FLOAT", Rule::FloatDigits),
    ("DOUBLE", float(FloatBitWidth::F64)),
    ("DOUBLE PRECISION", float(FloatBitWidth::F64)),
    ("DECIMAL", Rule::FixedPoint),
    ("DEC", Rule::FixedPoint),
    ("NUMERIC", Rule::FixedPoint),
    ("CHAR", Rule::Chars),
    ("CHARACTER", Rule::Chars),
    ("VARCHAR", Rule::Chars),
    ("CHARACTER VARYING", Rule::Chars),
    ("CHAR VARYING", Rule::Chars),
    ("NATIONAL CHARACTER", Rule::Chars),
    ("NATIONAL CHARACTER VARYING", Rule::Chars),
    ("NCHAR", Rule::Chars),
    ("NVARCHAR", Rule::Chars),
    ("TEXT", UNBOUNDED),
    ("CLOB", UNBOUNDED),
    ("DATE", Rule::Fixed(CanonicalType::Date)),
    ("TIME", Rule::Fixed(CanonicalType::Time)),
    ("TIMESTAMP", Rule::Fixed(CanonicalType::DateTime)),
    ("DATETIME", Rule::Fixed(CanonicalType::DateTime)),
    ("BLOB", Rule::Unrepresentable),
    ("BINARY", Rule::Unrepresentable),
    ("VARBINARY", Rule::Unrepresentable),
    ("BINARY VARYING", Rule::Unrepresentable),
];

const COMMON_PREFIX: &[(&str, Rule)] = &[
    ("TIMESTAMP", Rule::Fixed(CanonicalType::DateTime)),
    ("TIME ", Rule::Fixed(CanonicalType::Time)),
    ("VARCHAR", Rule::Chars),
    ("NVARCHAR", Rule::Chars),
    ("CHARACTER", Rule::Chars),
    ("INTERVAL", Rule::Unrepresentable),
];

const POSTGRES_EXACT: &[(&str, Rule)] = &[
    ("INT2", int(IntBitWidth::I16)),
    ("INT4", int(IntBitWidth::I32)),
    ("INT8", int(IntBitWidth::I64)),
    ("SMALLSERIAL", int(IntBitWidth::I16)),
    ("SERIAL2", int(IntBitWidth::I16)),
    ("SERIAL", int(IntBitWidth::I32)),
    ("SERIAL4", int(IntBitWidth::I32)),
    ("BIGSERIAL", int(IntBitWidth::I64)),
    ("SERIAL8", int(IntBitWidth::I64)),
    ("FLOAT4", float(FloatBitWidth::F32)),
    ("FLOAT8", float(FloatBitWidth::F64)),
    ("MONEY", float(FloatBitWidth::F64)),
    ("BPCHAR", Rule::Chars),
    ("CITEXT", UNBOUNDED),
    ("UUID", UNBOUNDED),
    ("JSON", UNBOUNDED),
    ("JSONB", UNBOUNDED),
    ("XML", UNBOUNDED),
    ("INET", UNBOUNDED),
    ("CIDR", UNBOUNDED),
    ("MACADDR", UNBOUNDED),
    ("TIMESTAMPTZ", Rule::Fixed(CanonicalType::DateTime)),
    ("TIMETZ", Rule::Fixed(CanonicalType::Time)),
    ("BYTEA", Rule::Unrepresentable),
];

const POSTGRES_PREFIX: &[(&str, Rule)] = &[("BIT VARYING", Rule::Unrepresentable)];

const MYSQL_EXACT: &[(&str, Rule)] = &[
    // BIGINT UNSIGNED has no canonical equivalent
    ("SERIAL", Rule::Ambiguous(CanonicalType::WIDE_INTEGER)),
    ("TINYINT", Rule::TinyInt),
    ("MEDIUMINT", int(IntBitWidth::I32)),
    ("BIT", Rule::Bit),
    ("YEAR", int(IntBitWidth::I16)),
    ("FLOAT", float(FloatBitWidth::F32)),
    ("TINYTEXT", UNBOUNDED),
    ("MEDIUMTEXT", UNBOUNDED),
    ("LONGTEXT", UNBOUNDED),
    ("ENUM", UNBOUNDED),
    ("SET", UNBOUNDED),
    ("JSON", UNBOUNDED),
    ("TINYBLOB", Rule::Unrepresentable),
    ("MEDIUMBLOB", Rule::Unrepresentable),
    ("LONGBLOB", Rule::Unrepresentable),
];

const MYSQL_PREFIX: &[(&str, Rule)] = &[("GEOMETRY", Rule::Unrepresentable)];

const SQLSERVER_EXACT: &[(&str, Rule)] = &[
    ("BIT", Rule::Fixed(CanonicalType::Boolean)),
    ("TINYINT", int(IntBitWidth::I16)),
    ("FLOAT", Rule::FloatDigits),
    ("MONEY", Rule::Fixed(CanonicalType::Decimal {
        precision: Some(19),
        scale: Some(4),
    })),
    ("SMALLMONEY", Rule::Fixed(CanonicalType::Decimal {
        precision: Some(10),
        scale: Some(4),
    })),
    ("NTEXT", UNBOUNDED),
    ("UNIQUEIDENTIFIER", UNBOUNDED),
    ("SYSNAME", UNBOUNDED),
    ("XML", UNBOUNDED),
    ("SQL_VARIANT", Rule::Unrepresentable),
    ("ROWVERSION", int(IntBitWidth::I32)),
    ("TIMESTAMP", int(IntBitWidth::I32)),
    ("DATETIME2", Rule::Fixed(CanonicalType::DateTime)),
    ("SMALLDATETIME", Rule::Fixed(CanonicalType::DateTime)),
    ("DATETIMEOFFSET", Rule::Fixed(CanonicalType::DateTime)),
    ("IMAGE", Rule::Unrepresentable),
    ("HIERARCHYID", Rule::Unrepresentable),
];

const SQLSERVER_PREFIX: &[(&str, Rule)] = &[];

const ORACLE_EXACT: &[(&str, Rule)] = &[
    ("NUMBER", Rule::OracleNumber),
    ("BINARY_FLOAT", float(FloatBitWidth::F32)),
    ("BINARY_DOUBLE", float(FloatBitWidth::F64)),
    ("VARCHAR2", Rule::Chars),
    ("NVARCHAR2", Rule::Chars),
    ("NCLOB", UNBOUNDED),
    ("LONG", UNBOUNDED),
    ("ROWID", UNBOUNDED),
    ("UROWID", UNBOUNDED),
    ("DATE", Rule::Fixed(CanonicalType::DateTime)),
    ("RAW", Rule::Unrepresentable),
    ("LONG RAW", Rule::Unrepresentable),
    ("BFILE", Rule::Unrepresentable),
];

const ORACLE_PREFIX: &[(&str, Rule)] = &[];

const GENERIC_EXACT: &[(&str, Rule)] = &[];

const GENERIC_PREFIX: &[(&str, Rule)] = &[];

const TQL_EXACT: &[(&str, Rule)] = &[
    ("INT", int(IntBitWidth::I32)),
    ("BIGINT", int(IntBitWidth::I64)),
    ("FLOAT", float(FloatBitWidth::F32)),
    ("DOUBLE", float(FloatBitWidth::F64)),
    ("BOOL", Rule::Fixed(CanonicalType::Boolean)),
];

const TQL_PREFIX: &[(&str, Rule)] = &[];

fn tables(dialect: Dialect) -> (&'static [(&'static str, Rule)], &'static [(&'static str, Rule)]) {
    match dialect {
        Dialect::Postgres => (POSTGRES_EXACT, POSTGRES_PREFIX),
        Dialect::MySql => (MYSQL_EXACT, MYSQL_PREFIX),
        Dialect::SqlServer => (SQLSERVER_EXACT, SQLSERVER_PREFIX),
        Dialect::Oracle => (ORACLE_EXACT, ORACLE_PREFIX),
        Dialect::Tql => (TQL_EXACT, TQL_PREFIX),
        Dialect::Generic | Dialect::Auto => (GENERIC_EXACT, GENERIC_PREFIX),
    }
}

/// Map a vendor type token to a canonical type.
///
/// `raw` is the type name without its parenthesised arguments, e.g.
/// `"NUMBER"` or `"INT UNSIGNED"`. Non-numeric arguments such as `MAX` or
/// `*` are passed as `None`.
pub fn map_type(
    dialect: Dialect,
    raw: &str,
    precision: Option<u32>,
    scale: Option<u32>,
) -> TypeMapping {
    let (token, unsigned) = normalize(raw);

    if token.is_empty() || token.ends_with("[]") || token.starts_with("ARRAY") {
        return TypeMapping::unresolved();
    }

    let (dialect_exact, dialect_prefix) = tables(dialect);
    let rule = lookup_exact(dialect_exact, &token)
        .or_else(|| lookup_exact(COMMON_EXACT, &token))
        .or_else(|| lookup_prefix(dialect_prefix, &token))
        .or_else(|| lookup_prefix(COMMON_PREFIX, &token));

    let mapping = match rule {
        Some(rule) => apply(rule, precision, scale),
        None => infer(&token),
    };

    if unsigned {
        widen_unsigned(mapping)
    } else {
        mapping
    }
}

/// Map a type written as text, e.g. `"DECIMAL(10, 2)"` or `"VARCHAR(MAX)"`.
///
/// Arguments that are not plain integers are passed on as `None`.
pub fn map_type_text(dialect: Dialect, text: &str) -> TypeMapping {
    let (base, args) = match text.find('(') {
        Some(open) => {
            let close = text.rfind(')').filter(|c| *c > open).unwrap_or(text.len());
            (&text[..open], &text[open + 1..close])
        }
        None => (text, ""),
    };
    let mut args = args.split(',').map(|a| a.trim().parse::<u32>().ok());
    let precision = args.next().flatten();
    let scale = args.next().flatten();
    map_type(dialect, base, precision, scale)
}

/// Uppercase, collapse whitespace, and strip sign/zerofill modifiers
fn normalize(raw: &str) -> (String, bool) {
    let mut unsigned = false;
    let words: Vec<String> = raw
        .split_whitespace()
        .map(|w| w.to_uppercase())
        .filter(|w| match w.as_str() {
            "UNSIGNED" => {
                unsigned = true;
                false
            }
            "SIGNED" | "ZEROFILL" => false,
            _ => true,
        })
        .collect();
    (words.join(" "), unsigned)
}

fn lookup_exact(table: &[(&str, Rule)], token: &str) -> Option<Rule> {
    table
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, rule)| *rule)
}

fn lookup_prefix(table: &[(&str, Rule)], token: &str) -> Option<Rule> {
    table
        .iter()
        .filter(|(name, _)| token.starts_with(name))
        .max_by_key(|(name, _)| name.len())
        .map(|(_, rule)| *rule)
}

fn apply(rule: Rule, precision: Option<u32>, scale: Option<u32>) -> TypeMapping {
    match rule {
        Rule::Fixed(ty) => TypeMapping::exact(ty),
        Rule::Ambiguous(ty) => TypeMapping::inferred(ty),
        Rule::Unrepresentable => TypeMapping::unresolved(),
        Rule::Chars => TypeMapping::exact(CanonicalType::String {
            max_length: precision.filter(|n| *n > 0),
        }),
        Rule::FixedPoint => match precision {
            Some(p) if p > MAX_EXACT_DECIMAL_PRECISION => {
                if scale.unwrap_or(0) == 0 {
                    TypeMapping::inferred(CanonicalType::WIDE_INTEGER)
                } else {
                    TypeMapping::inferred(CanonicalType::WIDE_FLOAT)
                }
            }
            _ => TypeMapping::exact(CanonicalType::Decimal {
                precision: precision.and_then(|p| u16::try_from(p).ok()),
                scale: scale.and_then(|s| u16::try_from(s).ok()),
            }),
        },
        Rule::FloatDigits => match precision {
            Some(p) if p <= 24 => TypeMapping::exact(CanonicalType::Float {
                bits: FloatBitWidth::F32,
            }),
            _ => TypeMapping::exact(CanonicalType::WIDE_FLOAT),
        },
        Rule::OracleNumber => oracle_number(precision, scale),
        Rule::TinyInt => match precision {
            Some(1) => TypeMapping::exact(CanonicalType::Boolean),
            _ => TypeMapping::exact(CanonicalType::Integer {
                bits: IntBitWidth::I8,
            }),
        },
        Rule::Bit => match precision {
            None | Some(1) => TypeMapping::exact(CanonicalType::Boolean),
            Some(_) => TypeMapping::inferred(CanonicalType::WIDE_INTEGER),
        },
    }
}

fn oracle_number(precision: Option<u32>, scale: Option<u32>) -> TypeMapping {
    match (precision, scale) {
        // NUMBER with no arguments holds any value
        (None, None) => TypeMapping::inferred(CanonicalType::WIDE_INTEGER),
        // NUMBER(*,0)
        (None, Some(0)) => TypeMapping::exact(CanonicalType::WIDE_INTEGER),
        (None, Some(_)) => TypeMapping::exact(CanonicalType::WIDE_FLOAT),
        (Some(p), None) | (Some(p), Some(0)) => {
            if p <= MAX_INT32_DIGITS {
                TypeMapping::exact(CanonicalType::Integer {
                    bits: IntBitWidth::I32,
                })
            } else {
                TypeMapping::exact(CanonicalType::WIDE_INTEGER)
            }
        }
        (Some(_), Some(_)) => TypeMapping::exact(CanonicalType::WIDE_FLOAT),
    }
}

/// Geometric and interval types have no canonical counterpart
const UNMAPPABLE_WORDS: &[&str] = &[
    "BOX", "CIRCLE", "GEOGRAPHY", "GEOMETRY", "INTERVAL", "LINE", "LINESTRING", "LSEG", "PATH",
    "POLYGON",
];

/// Word heuristics for spellings no table knows. Words are matched whole or
/// by prefix/suffix, never as arbitrary substrings, so `POINT` is not an
/// integer.
fn infer(token: &str) -> TypeMapping {
    let words: Vec<&str> = token
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let any = |test: fn(&str) -> bool| words.iter().any(|w| test(w));

    if any(|w| UNMAPPABLE_WORDS.contains(&w) || w.ends_with("POINT") || w.starts_with("MULTI")) {
        return TypeMapping::unresolved();
    }
    if any(|w| {
        w.ends_with("INT")
            || w == "INTEGER"
            || w
                .strip_prefix("INT")
                .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    }) {
        return TypeMapping::inferred(CanonicalType::WIDE_INTEGER);
    }
    if any(|w| {
        ["NUM", "DEC", "FLOAT", "DOUBLE", "REAL"]
            .iter()
            .any(|p| w.starts_with(p))
            || w.ends_with("MONEY")
    }) {
        return TypeMapping::inferred(CanonicalType::WIDE_FLOAT);
    }
    if any(|w| w.contains("CHAR") || w.ends_with("TEXT") || w.starts_with("STRING")) {
        return TypeMapping::inferred(CanonicalType::WIDE_STRING);
    }
    if any(|w| w.starts_with("TIMESTAMP") || w.starts_with("DATETIME")) {
        return TypeMapping::inferred(CanonicalType::DateTime);
    }
    if any(|w| w.starts_with("DATE")) {
        return TypeMapping::inferred(CanonicalType::Date);
    }
    if any(|w| w.starts_with("TIME")) {
        return TypeMapping::inferred(CanonicalType::Time);
    }
    if any(|w| w.starts_with("BOOL")) {
        return TypeMapping::inferred(CanonicalType::Boolean);
    }
    TypeMapping::unresolved()
}

/// Unsigned integers need the next width up to hold their range
fn widen_unsigned(mapping: TypeMapping) -> TypeMapping {
    match mapping.ty {
        CanonicalType::Integer { bits } => {
            let wider = match bits {
                IntBitWidth::I8 => IntBitWidth::I16,
                IntBitWidth::I16 => IntBitWidth::I32,
                IntBitWidth::I32 | IntBitWidth::I64 => IntBitWidth::I64,
            };
            let confidence = if bits == IntBitWidth::I64 {
                Confidence::Inferred
            } else {
                mapping.confidence
            };
            TypeMapping {
                ty: CanonicalType::Integer { bits: wider },
                confidence,
            }
        }
        _ => mapping,
    }
}

#[cfg(test)]
#[path = "type_map_test.rs"]
mod tests;
