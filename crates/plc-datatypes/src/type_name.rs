//! Type name identifiers.
//!
//! Built-in types are named by their [`DataTypeId`]; every other name
//! (user types, qualified names) is interned in a [`StringDictionary`] and
//! referred to by a [`StringId`]. Used by diagnostics and engineering
//! tools, never on the value hot path.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use plc_common::error::{DataTypeError, DataTypeResult};
use plc_common::iec_types::DataTypeId;

/// Handle of an interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StringId(u32);

impl StringId {
    /// Raw index into the dictionary.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Name identifier of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNameId {
    /// A built-in type, named by its canonical IEC name.
    Builtin(DataTypeId),
    /// A name interned in a [`StringDictionary`].
    Interned(StringId),
}

impl TypeNameId {
    /// The name text, if known.
    #[must_use]
    pub fn resolve<'a>(&self, dictionary: &'a StringDictionary) -> Option<&'a str> {
        match self {
            Self::Builtin(id) => Some(id.name()),
            Self::Interned(id) => dictionary.resolve(*id),
        }
    }
}

impl fmt::Display for TypeNameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(id) => write!(f, "{id}"),
            Self::Interned(id) => write!(f, "<name {}>", id.0),
        }
    }
}

/// Interning table for type names.
#[derive(Debug, Default, Clone)]
pub struct StringDictionary {
    names: Vec<String>,
    index: HashMap<String, StringId>,
}

impl StringDictionary {
    /// Empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `name`, adding it if it is new.
    pub fn intern(&mut self, name: &str) -> StringId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        // Dictionaries hold type names, far below u32::MAX entries.
        let id = StringId(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), id);
        debug!(name, id = id.0, "interned type name");
        id
    }

    /// Id of `name` if it has been interned.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<StringId> {
        self.index.get(name).copied()
    }

    /// Text of an interned id.
    #[must_use]
    pub fn resolve(&self, id: StringId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A type name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTypeName<'a> {
    /// Namespace or package path before the simple name (`a::b` or `a.b`).
    pub qualifier: Option<&'a str>,
    /// Unqualified type name.
    pub simple: &'a str,
    /// Identifier of the full name.
    pub id: TypeNameId,
    /// Literal text after `#`, if the input was a typed literal.
    pub literal: Option<&'a str>,
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse `TYPE`, `ns::TYPE`, `pkg.sub.TYPE` or `TYPE#literal`.
///
/// Unqualified names of built-in types (including the literal prefixes
/// `T`, `DT`, ...) resolve to [`TypeNameId::Builtin`]. Everything else is
/// interned in `dictionary`, qualified names under their full text.
///
/// # Errors
///
/// Returns [`DataTypeError::UnknownTypeName`] when a name segment is not a
/// valid identifier.
pub fn parse_type_name<'a>(text: &'a str, dictionary: &mut StringDictionary) -> DataTypeResult<ParsedTypeName<'a>> {
    let text = text.trim();
    let (name, literal) = match text.split_once('#') {
        Some((name, literal)) => (name, Some(literal)),
        None => (text, None),
    };
    let invalid = || DataTypeError::UnknownTypeName(text.to_owned());

    let (qualifier, simple) = match name.rfind("::") {
        Some(pos) => (Some(&name[..pos]), &name[pos + 2..]),
        None => match name.rfind('.') {
            Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
            None => (None, name),
        },
    };
    if !is_identifier(simple) {
        return Err(invalid());
    }
    if let Some(qualifier) = qualifier {
        let segments_valid = qualifier
            .split("::")
            .flat_map(|part| part.split('.'))
            .all(is_identifier);
        if !segments_valid {
            return Err(invalid());
        }
    }

    let id = match (qualifier, DataTypeId::from_name(simple)) {
        (None, Some(builtin)) => TypeNameId::Builtin(builtin),
        _ => TypeNameId::Interned(dictionary.intern(name)),
    };
    Ok(ParsedTypeName {
        qualifier,
        simple,
        id,
        literal,
    })
}
