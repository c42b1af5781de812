//! The slice of the type system member scopes need.
//!
//! Full type checking is somebody else's job. Scopes only compare member
//! signatures, render them in diagnostics and reach the class behind a
//! supertype or delegate type.

use crate::class_descriptor::LazyClassDescriptor;
use lzr_common::Name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

/// Dot-separated fully qualified name (`pkg.Outer.Nested`). The root
/// package is the empty string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FqName(Rc<str>);

impl FqName {
    pub fn root() -> FqName {
        FqName(Rc::from(""))
    }

    pub fn new(text: &str) -> FqName {
        FqName(Rc::from(text))
    }

    #[must_use]
    pub fn child(&self, name: Name) -> FqName {
        if self.0.is_empty() {
            FqName(Rc::from(&*name.as_str()))
        } else {
            FqName(Rc::from(format!("{}.{}", self.0, name)))
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FqName({})", self.0)
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in classifiers that resolve without a declaration.
pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    "Any", "Nothing", "Unit", "Boolean", "Char", "Byte", "Short", "Int", "Long", "Float",
    "Double", "String",
];

#[derive(Clone)]
pub enum Type {
    /// A class type. `descriptor` is `None` for built-ins.
    Class {
        fq_name: FqName,
        nullable: bool,
        descriptor: Option<Weak<LazyClassDescriptor>>,
    },
    TypeParameter {
        name: Name,
        nullable: bool,
    },
    /// Unresolvable type; the text says what could not be resolved.
    Error(Rc<str>),
}

impl Type {
    pub fn builtin(name: &str) -> Type {
        Type::Class {
            fq_name: FqName::new(name),
            nullable: false,
            descriptor: None,
        }
    }

    pub fn unit() -> Type {
        Self::builtin("Unit")
    }

    pub fn boolean() -> Type {
        Self::builtin("Boolean")
    }

    pub fn int() -> Type {
        Self::builtin("Int")
    }

    pub fn string() -> Type {
        Self::builtin("String")
    }

    pub fn nullable_any() -> Type {
        Self::builtin("Any").with_nullability(true)
    }

    pub fn error(what: &str) -> Type {
        Type::Error(Rc::from(what))
    }

    pub fn class(descriptor: &Rc<LazyClassDescriptor>) -> Type {
        Type::Class {
            fq_name: descriptor.fq_name().clone(),
            nullable: false,
            descriptor: Some(Rc::downgrade(descriptor)),
        }
    }

    #[must_use]
    pub fn with_nullability(self, nullable: bool) -> Type {
        match self {
            Type::Class {
                fq_name,
                descriptor,
                ..
            } => Type::Class {
                fq_name,
                nullable,
                descriptor,
            },
            Type::TypeParameter { name, .. } => Type::TypeParameter { name, nullable },
            error @ Type::Error(_) => error,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Class { nullable, .. } | Type::TypeParameter { nullable, .. } => *nullable,
            Type::Error(_) => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error(_))
    }

    /// The class behind this type, if it is a declared (non built-in) class.
    pub fn class_descriptor(&self) -> Option<Rc<LazyClassDescriptor>> {
        match self {
            Type::Class {
                descriptor: Some(descriptor),
                ..
            } => descriptor.upgrade(),
            _ => None,
        }
    }

    /// Platform erasure: nullability is dropped, type parameters erase to `Any`.
    pub fn erased(&self) -> String {
        match self {
            Type::Class { fq_name, .. } => fq_name.to_string(),
            Type::TypeParameter { .. } => "Any".to_string(),
            Type::Error(_) => "<error>".to_string(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Type::Class {
                    fq_name: a,
                    nullable: na,
                    ..
                },
                Type::Class {
                    fq_name: b,
                    nullable: nb,
                    ..
                },
            ) => a == b && na == nb,
            (
                Type::TypeParameter {
                    name: a,
                    nullable: na,
                },
                Type::TypeParameter {
                    name: b,
                    nullable: nb,
                },
            ) => a == b && na == nb,
            (Type::Error(a), Type::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Type::Class {
                fq_name, nullable, ..
            } => {
                fq_name.hash(state);
                nullable.hash(state);
            }
            Type::TypeParameter { name, nullable } => {
                name.hash(state);
                nullable.hash(state);
            }
            Type::Error(text) => text.hash(state),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (text, nullable) = match self {
            Type::Class {
                fq_name, nullable, ..
            } => (fq_name.to_string(), *nullable),
            Type::TypeParameter { name, nullable } => (name.to_string(), *nullable),
            Type::Error(what) => return write!(f, "[Error type: {what}]"),
        };
        if nullable {
            write!(f, "{text}?")
        } else {
            f.write_str(&text)
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}
