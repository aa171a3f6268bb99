//! C5: type descriptors produced by parsing a schema (spec §3, §4.4).

use crate::position::Position;
use crate::value::{OrderedMap, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Null,
    Any,
    Date,
    Time,
    DateTime,
    Timestamp,
    /// A scalar kind installed via [`crate::schema::registry::TypeRegistry::register_scalar`].
    Custom,
}

impl ScalarKind {
    pub fn builtin_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Null => "null",
            Self::Any => "any",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Custom => return None,
        })
    }

    pub fn from_builtin_name(name: &str) -> Option<Self> {
        Some(match name {
            "str" => Self::Str,
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "null" => Self::Null,
            "any" => Self::Any,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            _ => return None,
        })
    }
}

/// A constraint value, parsed with the data grammar (`STRING | INT |
/// FLOAT | BOOL | NULL | '[' ... ']'`, spec §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<ConstraintValue>),
}

impl ConstraintValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Self::Int(n) if *n >= 0 => Some(*n as usize),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConstraintValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

pub type Constraints = OrderedMap<ConstraintValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarT {
    pub kind: ScalarKind,
    /// Set when `kind == ScalarKind::Custom`; the registered name.
    pub custom_name: Option<String>,
    pub constraints: Constraints,
    pub has_default: bool,
    pub default: Option<Value>,
    pub optional: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionT {
    pub alts: Vec<TypeDescriptor>,
    pub has_default: bool,
    pub default: Option<Value>,
    pub optional: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListT {
    pub item: Box<TypeDescriptor>,
    pub constraints: Constraints,
    pub has_default: bool,
    pub default: Option<Value>,
    pub optional: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectT {
    Enumerated {
        fields: OrderedMap<TypeDescriptor>,
        constraints: Constraints,
        has_default: bool,
        default: Option<Value>,
        optional: bool,
        /// `ext=true` overrides strict-mode rejection of unknown keys for
        /// this object only (spec §9 open question, resolved: allowed).
        ext: bool,
        pos: Position,
    },
    Pattern {
        value_type: Box<TypeDescriptor>,
        constraints: Constraints,
        has_default: bool,
        default: Option<Value>,
        optional: bool,
        pos: Position,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Scalar(ScalarT),
    Union(UnionT),
    List(ListT),
    Object(ObjectT),
}

impl TypeDescriptor {
    pub fn optional(&self) -> bool {
        match self {
            Self::Scalar(t) => t.optional,
            Self::Union(t) => t.optional,
            Self::List(t) => t.optional,
            Self::Object(ObjectT::Enumerated { optional, .. } | ObjectT::Pattern { optional, .. }) => {
                *optional
            }
        }
    }

    pub fn has_default(&self) -> bool {
        match self {
            Self::Scalar(t) => t.has_default,
            Self::Union(t) => t.has_default,
            Self::List(t) => t.has_default,
            Self::Object(
                ObjectT::Enumerated { has_default, .. } | ObjectT::Pattern { has_default, .. },
            ) => *has_default,
        }
    }

    pub fn default(&self) -> Option<&Value> {
        match self {
            Self::Scalar(t) => t.default.as_ref(),
            Self::Union(t) => t.default.as_ref(),
            Self::List(t) => t.default.as_ref(),
            Self::Object(ObjectT::Enumerated { default, .. } | ObjectT::Pattern { default, .. }) => {
                default.as_ref()
            }
        }
    }

    pub fn pos(&self) -> Position {
        match self {
            Self::Scalar(t) => t.pos,
            Self::Union(t) => t.pos,
            Self::List(t) => t.pos,
            Self::Object(ObjectT::Enumerated { pos, .. } | ObjectT::Pattern { pos, .. }) => *pos,
        }
    }

    pub fn set_optional(&mut self, optional: bool) {
        match self {
            Self::Scalar(t) => t.optional = optional,
            Self::Union(t) => t.optional = optional,
            Self::List(t) => t.optional = optional,
            Self::Object(ObjectT::Enumerated { optional: o, .. } | ObjectT::Pattern { optional: o, .. }) => {
                *o = optional
            }
        }
    }

    pub fn set_default(&mut self, default: Value) {
        match self {
            Self::Scalar(t) => {
                t.has_default = true;
                t.default = Some(default);
            }
            Self::Union(t) => {
                t.has_default = true;
                t.default = Some(default);
            }
            Self::List(t) => {
                t.has_default = true;
                t.default = Some(default);
            }
            Self::Object(
                ObjectT::Enumerated { has_default, default: d, .. }
                | ObjectT::Pattern { has_default, default: d, .. },
            ) => {
                *has_default = true;
                *d = Some(default);
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(t) => t.custom_name.clone().unwrap_or_else(|| {
                t.kind.builtin_name().unwrap_or("custom").to_string()
            }),
            Self::Union(t) => t.alts.iter().map(Self::describe).collect::<Vec<_>>().join(" | "),
            Self::List(t) => format!("[{}]", t.item.describe()),
            Self::Object(ObjectT::Enumerated { .. }) => "object".to_string(),
            Self::Object(ObjectT::Pattern { value_type, .. }) => {
                format!("{{{}}}", value_type.describe())
            }
        }
    }
}
