//! Path parameter declarations and binding.
//!
//! # Responsibilities
//! - Describe the semantic type of each path placeholder
//! - Provide the matching fragment for each type (used by the template compiler)
//! - Convert raw captures into typed values in declaration order
//!
//! # Design Decisions
//! - Types are a closed enum plus a `Custom` escape hatch for any `FromStr` type
//! - The fragment constrains shape; the binder enforces parse-ability.
//!   A capture can pass the fragment and still fail binding (e.g. i64 overflow).

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::jid::{BareJid, Jid};

/// Parse function backing a custom parameter type.
pub type ParseFn = fn(&str) -> Result<Arc<dyn Any + Send + Sync>, String>;

/// Semantic type of a path parameter.
#[derive(Clone)]
pub enum ParamType {
    /// Decimal digits, bound as `i64`.
    Integer,
    /// Any single path segment.
    String,
    /// A bare identifier, `[local@]domain`.
    BareJid,
    /// A full identifier; may span one extra `/resource` segment.
    Jid,
    /// Any type with a string parse capability. Matches a single segment.
    Custom { type_name: &'static str, parse: ParseFn },
}

impl ParamType {
    /// Declare a parameter backed by `T::from_str`.
    pub fn custom<T>() -> Self
    where
        T: FromStr + Send + Sync + 'static,
        T::Err: fmt::Display,
    {
        ParamType::Custom {
            type_name: std::any::type_name::<T>(),
            parse: parse_custom::<T>,
        }
    }

    /// Regex fragment matched by a placeholder of this type.
    pub fn fragment(&self) -> &'static str {
        match self {
            ParamType::Integer => "[0-9]+",
            ParamType::String | ParamType::BareJid | ParamType::Custom { .. } => "[^/]+",
            ParamType::Jid => "[^/]+(?:/[^/]+)?",
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::String => "string",
            ParamType::BareJid => "bare-jid",
            ParamType::Jid => "jid",
            ParamType::Custom { type_name, .. } => type_name,
        }
    }

    fn parse(&self, raw: &str) -> Result<ParamValue, String> {
        match self {
            ParamType::Integer => raw
                .parse::<i64>()
                .map(ParamValue::Integer)
                .map_err(|e| e.to_string()),
            ParamType::String => Ok(ParamValue::String(raw.to_string())),
            ParamType::BareJid => raw
                .parse::<BareJid>()
                .map(ParamValue::BareJid)
                .map_err(|e| e.to_string()),
            ParamType::Jid => raw
                .parse::<Jid>()
                .map(ParamValue::Jid)
                .map_err(|e| e.to_string()),
            ParamType::Custom { parse, .. } => parse(raw).map(ParamValue::Custom),
        }
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

fn parse_custom<T>(raw: &str) -> Result<Arc<dyn Any + Send + Sync>, String>
where
    T: FromStr + Send + Sync + 'static,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
        .map_err(|e| e.to_string())
}

/// A path parameter as declared by the handler author.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: String,
    pub ty: ParamType,
    /// A required parameter must appear as a placeholder in the route template.
    pub required: bool,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            required: false,
            ..Self::new(name, ty)
        }
    }
}

/// A placeholder bound into a compiled route, in template order.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub ty: ParamType,
}

/// A typed parameter value.
#[derive(Clone)]
pub enum ParamValue {
    Integer(i64),
    String(String),
    BareJid(BareJid),
    Jid(Jid),
    Custom(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "Integer({})", v),
            ParamValue::String(v) => write!(f, "String({:?})", v),
            ParamValue::BareJid(v) => write!(f, "BareJid({})", v),
            ParamValue::Jid(v) => write!(f, "Jid({})", v),
            ParamValue::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A capture that could not be converted into its declared type.
#[derive(Debug, Clone, Error)]
#[error("invalid value '{value}' for parameter '{name}': {reason}")]
pub struct BindError {
    pub name: String,
    pub value: String,
    pub reason: String,
}

/// Bound path parameters, in template order.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: Vec<(String, ParamValue)>,
}

impl Params {
    /// Convert each capture into the type of its spec. `raw` must line up with `specs`.
    pub fn bind(specs: &[ParameterSpec], raw: &[&str]) -> Result<Self, BindError> {
        let values = specs
            .iter()
            .zip(raw)
            .map(|(spec, value)| {
                spec.ty
                    .parse(value)
                    .map(|v| (spec.name.clone(), v))
                    .map_err(|reason| BindError {
                        name: spec.name.clone(),
                        value: value.to_string(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ParamValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParamValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn bare_jid(&self, name: &str) -> Option<&BareJid> {
        match self.get(name)? {
            ParamValue::BareJid(v) => Some(v),
            ParamValue::Jid(v) => Some(v.bare()),
            _ => None,
        }
    }

    pub fn jid(&self, name: &str) -> Option<&Jid> {
        match self.get(name)? {
            ParamValue::Jid(v) => Some(v),
            _ => None,
        }
    }

    pub fn custom<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        match self.get(name)? {
            ParamValue::Custom(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Color(String);

    impl FromStr for Color {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "red" | "green" | "blue" => Ok(Color(s.to_string())),
                other => Err(format!("unknown color {}", other)),
            }
        }
    }

    fn spec(name: &str, ty: ParamType) -> ParameterSpec {
        ParameterSpec {
            name: name.to_string(),
            ty,
        }
    }

    #[test]
    fn test_bind_typed_values_in_order() {
        let specs = vec![
            spec("id", ParamType::Integer),
            spec("user", ParamType::BareJid),
            spec("full", ParamType::Jid),
            spec("tag", ParamType::String),
        ];
        let params = Params::bind(&specs, &["42", "a@b.c", "a@b.c/res", "x"]).unwrap();

        assert_eq!(params.len(), 4);
        assert_eq!(params.integer("id"), Some(42));
        assert_eq!(params.bare_jid("user").unwrap().to_string(), "a@b.c");
        assert_eq!(params.jid("full").unwrap().resource(), Some("res"));
        assert_eq!(params.string("tag"), Some("x"));

        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["id", "user", "full", "tag"]);
    }

    #[test]
    fn test_integer_overflow_is_bind_error() {
        let specs = vec![spec("id", ParamType::Integer)];
        let err = Params::bind(&specs, &["99999999999999999999999"]).unwrap_err();
        assert_eq!(err.name, "id");
    }

    #[test]
    fn test_custom_type() {
        let specs = vec![spec("color", ParamType::custom::<Color>())];
        let params = Params::bind(&specs, &["red"]).unwrap();
        assert_eq!(params.custom::<Color>("color"), Some(&Color("red".into())));

        let err = Params::bind(&specs, &["mauve"]).unwrap_err();
        assert!(err.reason.contains("unknown color"));
    }

    #[test]
    fn test_fragments() {
        assert_eq!(ParamType::Integer.fragment(), "[0-9]+");
        assert_eq!(ParamType::String.fragment(), ParamType::BareJid.fragment());
        assert_eq!(ParamType::custom::<Color>().fragment(), "[^/]+");
        assert!(ParamType::Jid.fragment().contains("(?:/[^/]+)?"));
    }
}
