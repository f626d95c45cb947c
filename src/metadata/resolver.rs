//! Backend type string resolution.
//!
//! [`resolve`] is total: a type string that does not parse, uses an
//! unsupported kind, or carries unusable parameters resolves to the generic
//! `String` classification with no parameters.

use crate::error::{Error, Result};
use crate::protocol::parser::{TypeAst, TypeParser};
use crate::protocol::types::DataSourceTypeId;

/// Largest Decimal precision the backend supports.
const MAX_DECIMAL_PRECISION: u64 = 76;
/// Largest DateTime64 sub-second precision the backend supports.
const MAX_DATETIME64_PRECISION: u64 = 9;

/// Structured description of one column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Resolved kind. Never `Unknown`.
    pub kind: DataSourceTypeId,
    /// The type string as received.
    pub type_name: String,
    /// Type name without parameters and wrappers (`Decimal`, `FixedString`).
    pub base_name: String,
    /// Declared size, for `FixedString`.
    pub fixed_size: Option<u32>,
    /// Precision, for `Decimal` (total digits) and `DateTime64` (sub-second digits).
    pub precision: Option<u16>,
    /// Scale, for `Decimal`.
    pub scale: Option<u16>,
    /// Timezone argument of `DateTime`/`DateTime64`.
    pub timezone: Option<String>,
    /// Whether the column admits NULL (`Nullable(...)`).
    pub is_nullable: bool,
    /// Normalized spelling that resolves back to this descriptor: Decimal
    /// aliases expanded, `LowCardinality` dropped. Fallbacks keep the
    /// received string.
    pub canonical_name: String,
}

impl TypeDescriptor {
    fn new(kind: DataSourceTypeId, type_name: &str, base_name: &str, is_nullable: bool) -> Self {
        Self {
            kind,
            type_name: type_name.to_string(),
            base_name: base_name.to_string(),
            fixed_size: None,
            precision: None,
            scale: None,
            timezone: None,
            is_nullable,
            canonical_name: type_name.to_string(),
        }
    }

    /// The generic variable-length string classification.
    pub fn generic_string(type_name: &str, is_nullable: bool) -> Self {
        Self::new(
            DataSourceTypeId::String,
            type_name,
            DataSourceTypeId::String.name(),
            is_nullable,
        )
    }
}

/// Resolve a backend type string.
///
/// # Example
///
/// ```
/// use clickhouse_odbc_core::metadata::resolve;
/// use clickhouse_odbc_core::protocol::types::DataSourceTypeId;
///
/// let d = resolve("Nullable(Decimal(18, 4))");
/// assert_eq!(d.kind, DataSourceTypeId::Decimal);
/// assert_eq!((d.precision, d.scale), (Some(18), Some(4)));
/// assert!(d.is_nullable);
///
/// assert_eq!(resolve("Foo((").kind, DataSourceTypeId::String);
/// ```
pub fn resolve(raw: &str) -> TypeDescriptor {
    let ast = match TypeParser::new(raw).parse() {
        Ok(ast) => ast,
        Err(e) => {
            tracing::debug!(type_name = raw, error = %e, "unparsable column type, using String");
            return TypeDescriptor::generic_string(raw, false);
        }
    };

    let (inner, is_nullable) = unwrap_wrappers(&ast);
    match classify(raw, inner, is_nullable) {
        Ok(mut descriptor) if descriptor.kind != DataSourceTypeId::Unknown => {
            descriptor.canonical_name = canonical_name(inner, &descriptor);
            descriptor
        }
        Ok(_) => {
            tracing::debug!(type_name = raw, "unsupported column type, using String");
            TypeDescriptor::generic_string(raw, is_nullable)
        }
        Err(e) => {
            tracing::debug!(type_name = raw, error = %e, "invalid column type parameters, using String");
            TypeDescriptor::generic_string(raw, is_nullable)
        }
    }
}

/// Strip `Nullable(...)` and `LowCardinality(...)`, in any nesting order.
fn unwrap_wrappers(ast: &TypeAst) -> (&TypeAst, bool) {
    let mut node = ast;
    let mut nullable = false;
    loop {
        match node {
            TypeAst::Type { name, args } if args.len() == 1 && matches!(args[0], TypeAst::Type { .. }) => {
                match name.as_str() {
                    "Nullable" => nullable = true,
                    "LowCardinality" => {}
                    _ => return (node, nullable),
                }
                node = &args[0];
            }
            _ => return (node, nullable),
        }
    }
}

fn canonical_name(inner: &TypeAst, descriptor: &TypeDescriptor) -> String {
    let inner = match (descriptor.kind, descriptor.precision, descriptor.scale) {
        (DataSourceTypeId::Decimal, Some(p), Some(s)) => format!("Decimal({p}, {s})"),
        _ => inner.to_string(),
    };
    if descriptor.is_nullable {
        format!("Nullable({inner})")
    } else {
        inner
    }
}

fn classify(raw: &str, ast: &TypeAst, is_nullable: bool) -> Result<TypeDescriptor> {
    let (name, args) = match ast {
        TypeAst::Type { name, args } => (name.as_str(), args.as_slice()),
        _ => return Err(invalid(raw, "expected a type")),
    };

    let kind = DataSourceTypeId::from_unparametrized(name);
    let base_name = match kind {
        DataSourceTypeId::Decimal => DataSourceTypeId::Decimal.name(),
        _ => name,
    };
    let mut descriptor = TypeDescriptor::new(kind, raw, base_name, is_nullable);

    match kind {
        DataSourceTypeId::FixedString => {
            let size = match args {
                [TypeAst::Number(n)] if *n >= 1 => u32::try_from(*n).ok(),
                _ => None,
            };
            descriptor.fixed_size = Some(size.ok_or_else(|| invalid(raw, "FixedString expects a positive size"))?);
        }
        DataSourceTypeId::Decimal => {
            let (precision, scale) = decimal_parameters(raw, name, args)?;
            descriptor.precision = Some(precision);
            descriptor.scale = Some(scale);
        }
        DataSourceTypeId::DateTime => match args {
            [] => {}
            [TypeAst::Literal(tz)] => descriptor.timezone = Some(tz.clone()),
            _ => return Err(invalid(raw, "DateTime expects an optional timezone")),
        },
        DataSourceTypeId::DateTime64 => {
            let (precision, tz) = match args {
                [TypeAst::Number(p)] => (*p, None),
                [TypeAst::Number(p), TypeAst::Literal(tz)] => (*p, Some(tz.clone())),
                _ => return Err(invalid(raw, "DateTime64 expects a precision and an optional timezone")),
            };
            if precision > MAX_DATETIME64_PRECISION {
                return Err(invalid(raw, "DateTime64 precision out of range"));
            }
            descriptor.precision = Some(precision as u16);
            descriptor.timezone = tz;
        }
        DataSourceTypeId::Array => {
            if !matches!(args, [TypeAst::Type { .. }]) {
                return Err(invalid(raw, "Array expects one element type"));
            }
        }
        DataSourceTypeId::Unknown => {}
        _ => {
            if !args.is_empty() {
                return Err(invalid(raw, "type takes no parameters"));
            }
        }
    }

    Ok(descriptor)
}

fn decimal_parameters(raw: &str, name: &str, args: &[TypeAst]) -> Result<(u16, u16)> {
    let (precision, scale) = match (name, args) {
        ("Decimal", [TypeAst::Number(p), TypeAst::Number(s)]) => (*p, *s),
        ("Decimal", [TypeAst::Number(p)]) => (*p, 0),
        ("Decimal32", [TypeAst::Number(s)]) => (9, *s),
        ("Decimal64", [TypeAst::Number(s)]) => (18, *s),
        ("Decimal128", [TypeAst::Number(s)]) => (38, *s),
        ("Decimal256", [TypeAst::Number(s)]) => (76, *s),
        _ => return Err(invalid(raw, "malformed Decimal parameters")),
    };
    if !(1..=MAX_DECIMAL_PRECISION).contains(&precision) || scale > precision {
        return Err(invalid(raw, "Decimal precision or scale out of range"));
    }
    Ok((precision as u16, scale as u16))
}

fn invalid(raw: &str, message: &str) -> Error {
    Error::type_parse(raw, 0, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        for (raw, canonical) in [
            ("Int32", "Int32"),
            ("Nullable(Int32)", "Nullable(Int32)"),
            ("Decimal64(2)", "Decimal(18, 2)"),
            ("Nullable(Decimal(10))", "Nullable(Decimal(10, 0))"),
            ("LowCardinality(Nullable(FixedString(16)))", "Nullable(FixedString(16))"),
            ("DateTime64(3,'UTC')", "DateTime64(3, 'UTC')"),
            ("Foo((", "Foo(("),
            ("Nullable(Foo)", "Nullable(Foo)"),
        ] {
            let d = resolve(raw);
            assert_eq!(d.canonical_name, canonical, "{raw}");
            let again = resolve(&d.canonical_name);
            let expected = TypeDescriptor {
                type_name: d.canonical_name.clone(),
                ..d
            };
            assert_eq!(again, expected, "{raw}");
        }
    }

    #[test]
    fn test_resolve_scalars() {
        let d = resolve("UInt32");
        assert_eq!(d.kind, DataSourceTypeId::UInt32);
        assert_eq!(d.base_name, "UInt32");
        assert!(!d.is_nullable);
        assert_eq!(d.precision, None);
    }

    #[test]
    fn test_resolve_fixed_string() {
        let d = resolve("FixedString(16)");
        assert_eq!(d.kind, DataSourceTypeId::FixedString);
        assert_eq!(d.base_name, "FixedString");
        assert_eq!(d.fixed_size, Some(16));
    }

    #[test]
    fn test_resolve_decimal_forms() {
        let d = resolve("Decimal(18,4)");
        assert_eq!((d.kind, d.precision, d.scale), (DataSourceTypeId::Decimal, Some(18), Some(4)));

        let d = resolve("Decimal(10)");
        assert_eq!((d.precision, d.scale), (Some(10), Some(0)));

        let d = resolve("Decimal64(3)");
        assert_eq!(d.base_name, "Decimal");
        assert_eq!((d.precision, d.scale), (Some(18), Some(3)));
    }

    #[test]
    fn test_resolve_datetimes() {
        let d = resolve("DateTime('UTC')");
        assert_eq!(d.kind, DataSourceTypeId::DateTime);
        assert_eq!(d.timezone.as_deref(), Some("UTC"));

        let d = resolve("DateTime64(3)");
        assert_eq!(d.kind, DataSourceTypeId::DateTime64);
        assert_eq!(d.precision, Some(3));

        let d = resolve("DateTime64(6, 'Asia/Tokyo')");
        assert_eq!(d.precision, Some(6));
        assert_eq!(d.timezone.as_deref(), Some("Asia/Tokyo"));
    }

    #[test]
    fn test_resolve_wrappers() {
        let d = resolve("LowCardinality(Nullable(String))");
        assert_eq!(d.kind, DataSourceTypeId::String);
        assert!(d.is_nullable);
        assert_eq!(d.type_name, "LowCardinality(Nullable(String))");

        let d = resolve("Nullable(FixedString(8))");
        assert_eq!(d.fixed_size, Some(8));
        assert!(d.is_nullable);
    }

    #[test]
    fn test_resolve_array() {
        let d = resolve("Array(Nullable(Int32))");
        assert_eq!(d.kind, DataSourceTypeId::Array);
        assert!(!d.is_nullable);
    }

    #[test]
    fn test_malformed_falls_back_to_string() {
        for raw in ["", "Foo((", "Decimal(18,", "Decimal(a,b)", "FixedString()", "FixedString(0)"] {
            let d = resolve(raw);
            assert_eq!(d, TypeDescriptor::generic_string(raw, false), "{raw:?}");
        }
    }

    #[test]
    fn test_bad_parameters_fall_back_to_string() {
        for raw in [
            "Decimal(100, 2)",
            "Decimal(4, 5)",
            "Decimal(0)",
            "DateTime64(12)",
            "DateTime(3)",
            "Int32(5)",
            "Array()",
        ] {
            let d = resolve(raw);
            assert_eq!(d.kind, DataSourceTypeId::String, "{raw:?}");
            assert_eq!(d.precision, None);
            assert_eq!(d.scale, None);
            assert_eq!(d.fixed_size, None);
        }
    }

    #[test]
    fn test_unknown_kind_keeps_nullability() {
        let d = resolve("Nullable(IPv4)");
        assert_eq!(d, TypeDescriptor::generic_string("Nullable(IPv4)", true));

        let d = resolve("Map(String, UInt64)");
        assert_eq!(d.kind, DataSourceTypeId::String);
    }

    #[test]
    fn test_never_unknown() {
        for raw in ["Tuple(a UInt8)", "Enum8('a' = 1)", "Nothing", "UUID", "Bool", "Date32"] {
            assert_ne!(resolve(raw).kind, DataSourceTypeId::Unknown, "{raw:?}");
        }
    }
}
