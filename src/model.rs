//! Declaration model.
//!
//! Structural nodes produced by the builders and read by the renderer and the
//! generators. Nothing here is mutated once a builder has finished with it.
pub mod annotation;
pub mod class;
pub mod member;

pub use annotation::Annotation;
pub use class::{ClassDecl, ClassKind, EnumEntry};
pub use member::{Constructor, Field, Method, Parameter};

use crate::types::{ClassType, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    PackagePrivate,
    Private,
}

impl Visibility {
    /// Keyword including its trailing space; empty for package-private.
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public ",
            Visibility::Protected => "protected ",
            Visibility::PackagePrivate => "",
            Visibility::Private => "private ",
        }
    }
}

/// Visibility plus the `static`/`final` flags shared by fields, methods and classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

impl Modifiers {
    pub fn code(&self) -> String {
        let mut out = self.visibility.keyword().to_string();
        if self.is_static {
            out.push_str("static ");
        }
        if self.is_final {
            out.push_str("final ");
        }
        out
    }
}

/// Anything that can carry annotations.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];

    fn has_annotation(&self, ty: &ClassType) -> bool {
        self.annotations().iter().any(|a| a.ty() == ty)
    }
}

/// Elements with a declared (or returned) type and a name.
pub trait Typed {
    fn name(&self) -> &str;
    fn ty(&self) -> &TypeRef;
}
