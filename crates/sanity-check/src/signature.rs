//! Explicit function signatures and argument binding.
//!
//! A [`Signature`] lists a function's parameters in declaration order.
//! [`Signature::bind`] maps one call's [`Args`] onto those parameters the
//! usual way: positional values fill parameters left to right, keyword
//! values fill by name, and defaults cover whatever is left.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use sanity_core::Value;

use crate::error::BindError;

/// Parameter name to bound value, in declaration order.
pub type Bindings = IndexMap<String, Value>;

/// What kind of value a parameter expects.
///
/// Only used to generate inputs for property tests; binding never checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValueKind {
    #[default]
    Any,
    Unit,
    Bool,
    Int,
    Float,
    Str,
    /// A list of `Int`s.
    IntList,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
    pub kind: ValueKind,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            default: None,
            kind: ValueKind::Any,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A function's name and ordered parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter; accepts a bare name or a full [`Param`].
    pub fn param(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// Binds one call's arguments to this signature's parameters.
    pub fn bind(&self, args: &Args) -> Result<Bindings, BindError> {
        if args.positional.len() > self.params.len() {
            return Err(BindError::TooManyPositional {
                function: self.name.clone(),
                max: self.params.len(),
                got: args.positional.len(),
            });
        }

        for name in args.keyword.keys() {
            match self.params.iter().position(|p| &p.name == name) {
                None => {
                    return Err(BindError::UnexpectedKeyword {
                        function: self.name.clone(),
                        name: name.clone(),
                    })
                }
                Some(idx) if idx < args.positional.len() => {
                    return Err(BindError::DuplicateArgument {
                        function: self.name.clone(),
                        name: name.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        let mut bindings = Bindings::with_capacity(self.params.len());
        for (idx, param) in self.params.iter().enumerate() {
            let value = args
                .positional
                .get(idx)
                .or_else(|| args.keyword.get(&param.name))
                .or(param.default.as_ref())
                .cloned()
                .ok_or_else(|| BindError::MissingArgument {
                    function: self.name.clone(),
                    name: param.name.clone(),
                })?;
            trace!(function = %self.name, param = %param.name, value = %value, "bound argument");
            bindings.insert(param.name.clone(), value);
        }
        Ok(bindings)
    }
}

impl From<&str> for Param {
    fn from(name: &str) -> Self {
        Param::new(name)
    }
}

impl From<String> for Param {
    fn from(name: String) -> Self {
        Param::new(name)
    }
}

/// The arguments of one call: positional values, then keyword values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keyword: IndexMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Args::default()
    }

    /// Positional arguments only.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Args {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: IndexMap::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clamp() -> Signature {
        Signature::new("clamp")
            .param("x")
            .param("lo")
            .param(Param::new("hi").with_default(100))
    }

    #[test]
    fn test_positional_then_default() {
        let b = clamp().bind(&Args::positional([5, 0])).unwrap();
        let got: Vec<_> = b.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        assert_eq!(
            got,
            vec![
                ("x", Value::Int(5)),
                ("lo", Value::Int(0)),
                ("hi", Value::Int(100))
            ]
        );
    }

    #[test]
    fn test_keywords_keep_declaration_order() {
        let args = Args::new().kwarg("hi", 9).kwarg("lo", 1).kwarg("x", 4);
        let b = clamp().bind(&args).unwrap();
        assert_eq!(b.keys().collect::<Vec<_>>(), vec!["x", "lo", "hi"]);
        assert_eq!(b["hi"], Value::Int(9));
    }

    #[test]
    fn test_too_many_positional() {
        let err = clamp().bind(&Args::positional([1, 2, 3, 4])).unwrap_err();
        assert_eq!(
            err,
            BindError::TooManyPositional {
                function: "clamp".into(),
                max: 3,
                got: 4
            }
        );
    }

    #[test]
    fn test_unexpected_and_duplicate_keywords() {
        let err = clamp()
            .bind(&Args::positional([1, 2]).kwarg("mid", 3))
            .unwrap_err();
        assert!(matches!(err, BindError::UnexpectedKeyword { name, .. } if name == "mid"));

        let err = clamp()
            .bind(&Args::positional([1, 2]).kwarg("x", 3))
            .unwrap_err();
        assert!(matches!(err, BindError::DuplicateArgument { name, .. } if name == "x"));
    }

    #[test]
    fn test_missing_required() {
        let err = clamp().bind(&Args::positional([1])).unwrap_err();
        assert_eq!(err.to_string(), "`clamp` is missing required argument `lo`");
    }
}
