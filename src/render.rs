//! Class declaration → source text.
//!
//! Rendering is a pure function of the declaration, the extra imports and the
//! import policy. Layout: package line, sorted import block, then the class with
//! members in section order (enum entries, fields, constructors, methods,
//! nested classes), each followed by a blank line.
pub mod emitter;
pub mod imports;

use std::collections::BTreeSet;

pub use emitter::{Emitter, StringEmitter};
pub use imports::ImportScope;

use crate::config::ImportPolicy;
use crate::model::{Annotated, Annotation, ClassDecl, ClassKind, Constructor, Field, Method, Parameter};
use crate::types::{generics_code, ClassType};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    policy: ImportPolicy,
}

/// Renders one declaration against a resolved import scope.
struct ClassWriter<'a, E> {
    out: &'a mut E,
    scope: &'a ImportScope,
}

// ————————————————————————————————————————————————————————————————————————————
// API
// ————————————————————————————————————————————————————————————————————————————

impl Renderer {
    pub fn new(policy: ImportPolicy) -> Self {
        Self { policy }
    }

    /// `extra` names types that only appear inside code lines.
    pub fn render(&self, decl: &ClassDecl, extra: &BTreeSet<ClassType>) -> String {
        let scope = ImportScope::resolve(decl, extra, &self.policy);
        let mut out = StringEmitter::new();
        if !decl.ty().package().is_empty() {
            out.emit_line(0, &format!("package {};", decl.ty().package()));
            out.emit_newline();
        }
        if !scope.imports().is_empty() {
            for fqn in scope.imports() {
                out.emit_line(0, &format!("import {fqn};"));
            }
            out.emit_newline();
        }
        ClassWriter { out: &mut out, scope: &scope }.class(decl, 0);
        out.output()
    }
}

/// Render with the default import policy and no extra imports.
pub fn render(decl: &ClassDecl) -> String {
    Renderer::default().render(decl, &BTreeSet::new())
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<E: Emitter> ClassWriter<'_, E> {
    fn annotations(&mut self, annotations: &[Annotation], depth: usize) {
        for a in annotations {
            let line = a.code(self.scope);
            self.out.emit_line(depth, &line);
        }
    }

    fn class(&mut self, decl: &ClassDecl, depth: usize) {
        self.annotations(Annotated::annotations(decl), depth);
        let header = self.header(decl);
        self.out.emit_line(depth, &format!("{header} {{"));
        self.out.emit_newline();

        let inner = depth + 1;
        let entries = decl.kind().entries();
        let has_members = !decl.fields().is_empty()
            || !decl.constructors().is_empty()
            || !decl.methods().is_empty()
            || !decl.nested().is_empty();
        if !entries.is_empty() {
            let last = entries.len() - 1;
            for (i, e) in entries.iter().enumerate() {
                let sep = if i == last { ";" } else { "," };
                let entry = e.code(self.scope);
                self.out.emit_line(inner, &format!("{entry}{sep}"));
            }
            self.out.emit_newline();
        } else if decl.is_enum() && has_members {
            self.out.emit_line(inner, ";");
            self.out.emit_newline();
        }

        let member_of = MemberContext::of(decl);
        for f in decl.fields() {
            self.field(f, member_of, inner);
            self.out.emit_newline();
        }
        for c in decl.constructors() {
            self.constructor(c, decl.ty().simple_name(), inner);
            self.out.emit_newline();
        }
        for m in decl.methods() {
            self.method(m, member_of, inner);
            self.out.emit_newline();
        }
        for n in decl.nested() {
            self.class(n, inner);
            self.out.emit_newline();
        }
        self.out.emit_line(depth, "}");
    }

    fn header(&self, decl: &ClassDecl) -> String {
        let mods = decl.modifiers();
        let mut out = mods.visibility.keyword().to_string();
        if mods.is_static {
            out.push_str("static ");
        }
        if mods.is_final {
            out.push_str("final ");
        }
        out.push_str(match decl.kind() {
            ClassKind::Concrete { .. } => "class ",
            ClassKind::Abstract { .. } => "abstract class ",
            ClassKind::Interface { .. } => "interface ",
            ClassKind::Enum { .. } => "enum ",
            ClassKind::Annotation => "@interface ",
        });
        out.push_str(decl.ty().simple_name());
        out.push_str(&generics_code(decl.generics(), self.scope));

        let list = |types: &[ClassType]| -> String {
            types.iter().map(|t| t.code(self.scope)).collect::<Vec<_>>().join(", ")
        };
        if let Some(parent) = decl.kind().parent() {
            out.push_str(" extends ");
            out.push_str(&parent.code(self.scope));
        }
        let interfaces = decl.kind().interfaces();
        if !interfaces.is_empty() {
            let keyword = match decl.kind() {
                ClassKind::Interface { .. } => " extends ",
                _ => " implements ",
            };
            out.push_str(keyword);
            out.push_str(&list(interfaces));
        }
        out
    }

    fn field(&mut self, field: &Field, ctx: MemberContext, depth: usize) {
        self.annotations(&field.annotations, depth);
        let mods = match ctx {
            // constants: the modifiers are implied
            MemberContext::Interface | MemberContext::Annotation => String::new(),
            MemberContext::Class => field.modifiers.code(),
        };
        let mut line = format!("{mods}{} {}", field.ty.code(self.scope), field.name);
        if let Some(v) = &field.value {
            line.push_str(" = ");
            line.push_str(&v.code(self.scope));
        }
        line.push(';');
        self.out.emit_line(depth, &line);
    }

    fn constructor(&mut self, ctor: &Constructor, name: &str, depth: usize) {
        self.annotations(&ctor.annotations, depth);
        let params = self.parameters(&ctor.parameters);
        let visibility = ctor.modifiers.visibility.keyword();
        self.out.emit_line(depth, &format!("{visibility}{name}({params}) {{"));
        self.out.emit_lines(depth + 1, &ctor.body);
        self.out.emit_line(depth, "}");
    }

    fn method(&mut self, method: &Method, ctx: MemberContext, depth: usize) {
        self.annotations(&method.annotations, depth);
        let mods = &method.modifiers;
        let mut prefix = String::new();
        match ctx {
            MemberContext::Class => {
                prefix.push_str(&mods.code());
                if method.is_abstract() {
                    prefix.push_str("abstract ");
                }
            }
            MemberContext::Interface => {
                if mods.is_static {
                    prefix.push_str("static ");
                } else if !method.is_abstract() {
                    prefix.push_str("default ");
                }
            }
            MemberContext::Annotation => {}
        }
        let generics = generics_code(&method.generics, self.scope);
        if !generics.is_empty() {
            prefix.push_str(&generics);
            prefix.push(' ');
        }
        let signature = format!(
            "{prefix}{} {}({})",
            method.return_type.code(self.scope),
            method.name,
            self.parameters(&method.parameters)
        );
        match &method.body {
            None => {
                let default = match &method.default_value {
                    Some(v) => format!(" default {}", v.code(self.scope)),
                    None => String::new(),
                };
                self.out.emit_line(depth, &format!("{signature}{default};"));
            }
            Some(body) => {
                self.out.emit_line(depth, &format!("{signature} {{"));
                self.out.emit_lines(depth + 1, body);
                self.out.emit_line(depth, "}");
            }
        }
    }

    fn parameters(&self, params: &[Parameter]) -> String {
        params
            .iter()
            .map(|p| {
                let mut out = String::new();
                for a in &p.annotations {
                    out.push_str(&a.code(self.scope));
                    out.push(' ');
                }
                if p.is_final {
                    out.push_str("final ");
                }
                out.push_str(&p.ty.code(self.scope));
                out.push(' ');
                out.push_str(&p.name);
                out
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// How members of a declaration spell their modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberContext {
    Class,
    Interface,
    Annotation,
}

impl MemberContext {
    fn of(decl: &ClassDecl) -> Self {
        match decl.kind() {
            ClassKind::Interface { .. } => Self::Interface,
            ClassKind::Annotation => Self::Annotation,
            _ => Self::Class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ClassBuilder;
    use crate::model::Visibility;
    use crate::types::{Primitive, TypeRef};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_class_keeps_braces_and_a_blank_line() {
        let decl = ClassBuilder::for_concrete_class(ClassType::new("", "Bare"))
            .without_marker()
            .build()
            .unwrap();
        assert_eq!(render(&decl), "class Bare {\n\n}\n");
    }

    #[test]
    fn enum_entries_precede_members() {
        let decl = ClassBuilder::for_enum(ClassType::new("a.b", "Color"))
            .without_marker()
            .set_visibility(Visibility::Public)
            .build_enumeration("RED")
            .add_argument(1)
            .finish()
            .unwrap()
            .build_enumeration("GREEN")
            .add_argument(2)
            .finish()
            .unwrap()
            .build_field(Primitive::Int, "code")
            .set_visibility(Visibility::Private)
            .set_final(true)
            .finish()
            .unwrap()
            .build_constructor()
            .build_parameter(Primitive::Int, "code")
            .finish()
            .unwrap()
            .add_code(["this.code = code;"])
            .finish()
            .unwrap()
            .build()
            .unwrap();
        let expected = "\
package a.b;

public enum Color {

    RED(1),
    GREEN(2);

    private final int code;

    Color(int code) {
        this.code = code;
    }

}
";
        assert_eq!(render(&decl), expected);
    }

    #[test]
    fn interface_members_drop_implied_modifiers() {
        let decl = ClassBuilder::for_interface(ClassType::new("a.b", "Shape"))
            .without_marker()
            .set_visibility(Visibility::Public)
            .implements_interface(ClassType::new("x.y", "Named"))
            .unwrap()
            .build_field(Primitive::Int, "SIDES")
            .set_value(4)
            .finish()
            .unwrap()
            .build_method(Primitive::Double, "area")
            .set_visibility(Visibility::Public)
            .finish()
            .unwrap()
            .build_method(TypeRef::class("java.lang", "String"), "label")
            .add_code(["return \"shape\";"])
            .finish()
            .unwrap()
            .build()
            .unwrap();
        let expected = "\
package a.b;

import x.y.Named;

public interface Shape extends Named {

    int SIDES = 4;

    double area();

    default String label() {
        return \"shape\";
    }

}
";
        assert_eq!(render(&decl), expected);
    }

    #[test]
    fn annotation_attributes_render_defaults() {
        let decl = ClassBuilder::for_annotation(ClassType::new("a.b", "Tag"))
            .without_marker()
            .set_visibility(Visibility::Public)
            .build_method(TypeRef::class("java.lang", "String"), "value")
            .finish()
            .unwrap()
            .build_method(Primitive::Int, "weight")
            .set_default(Value::from(1))
            .finish()
            .unwrap()
            .build()
            .unwrap();
        let expected = "\
package a.b;

public @interface Tag {

    String value();

    int weight() default 1;

}
";
        assert_eq!(render(&decl), expected);
    }

    #[test]
    fn nested_classes_indent_one_more_level() {
        let inner = ClassBuilder::for_concrete_class(ClassType::new("a.b", "Inner"))
            .without_marker()
            .set_static(true)
            .build_field(TypeRef::class("q.r", "Dep"), "dep")
            .finish()
            .unwrap()
            .build()
            .unwrap();
        let outer = ClassBuilder::for_concrete_class(ClassType::new("a.b", "Outer"))
            .without_marker()
            .add_nested(inner)
            .build()
            .unwrap();
        let expected = "\
package a.b;

import q.r.Dep;

class Outer {

    static class Inner {

        Dep dep;

    }

}
";
        assert_eq!(render(&outer), expected);
    }
}
