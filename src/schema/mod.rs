//! C4/C5: schema parsing and the type model it produces.

pub mod parser;
pub mod registry;
pub mod temporal;
pub mod types;

use crate::error::{Error, SchemaError, ValidationError};
use crate::lexer::tokenize;
use crate::validator::{validate, ValidateOptions};
use crate::value::Value;
use registry::TypeRegistry;
use types::TypeDescriptor;

/// A parsed schema: the root type tree plus the registry it was parsed
/// against (scalar constraint validation at validate-time needs the
/// same registry used at parse-time).
#[derive(Clone)]
pub struct Schema {
    root: TypeDescriptor,
    registry: TypeRegistry,
}

impl Schema {
    /// Parses schema source text with the built-in scalar kinds.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_with_registry(text, TypeRegistry::with_builtins())
    }

    /// Parses schema source text with a caller-supplied registry,
    /// e.g. one extended via [`TypeRegistry::register_scalar`].
    pub fn parse_with_registry(text: &str, registry: TypeRegistry) -> Result<Self, Error> {
        let tokens = tokenize(text).map_err(SchemaError::Lex).map_err(Error::Schema)?;
        let root = parser::parse_schema(&tokens, &registry).map_err(Error::Schema)?;
        Ok(Self { root, registry })
    }

    /// Validates `value` against this schema's root type, optionally
    /// injecting defaults in place. Returns every accumulated error.
    pub fn validate(&self, value: &mut Value, opts: &ValidateOptions) -> Vec<ValidationError> {
        validate(value, &self.root, &self.registry, opts)
    }

    pub fn root(&self) -> &TypeDescriptor {
        &self.root
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}
