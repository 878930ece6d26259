//! Import resolution.
//!
//! Every class reference reachable from a declaration is spelled either by its
//! simple name (imported, implicit, same package or declared here) or fully
//! qualified. A simple name shared by two different types is never shortened.
use std::collections::{BTreeMap, BTreeSet};

use crate::config::ImportPolicy;
use crate::model::ClassDecl;
use crate::types::{ClassType, TypeNamer};

#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    /// Fully-qualified names that may be written by simple name.
    short: BTreeSet<String>,
    imports: Vec<String>,
}

impl ImportScope {
    pub fn resolve(decl: &ClassDecl, extra: &BTreeSet<ClassType>, policy: &ImportPolicy) -> Self {
        let declared: BTreeSet<String> = decl
            .declared_types()
            .into_iter()
            .map(|t| t.fully_qualified_name())
            .collect();

        let mut reachable: BTreeMap<String, ClassType> = BTreeMap::new();
        let mut collect = |c: &ClassType| {
            reachable.entry(c.fully_qualified_name()).or_insert_with(|| c.erased());
        };
        decl.visit_classes(&mut collect);
        for c in extra {
            c.visit_classes(&mut collect);
        }

        // simple name -> every fully-qualified name spelled with it
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for t in decl.declared_types() {
            groups
                .entry(t.simple_name().to_string())
                .or_default()
                .insert(t.fully_qualified_name());
        }
        for (fqn, c) in &reachable {
            groups.entry(c.simple_name().to_string()).or_default().insert(fqn.clone());
        }

        let mut short = BTreeSet::new();
        for fqns in groups.values() {
            if fqns.len() == 1 {
                short.extend(fqns.iter().cloned());
            } else {
                // own types win their name; everybody else is qualified
                short.extend(fqns.iter().filter(|f| declared.contains(*f)).cloned());
            }
        }

        let own_package = decl.ty().package();
        let imports = reachable
            .iter()
            .filter(|(fqn, c)| {
                short.contains(*fqn)
                    && !declared.contains(*fqn)
                    && c.package() != own_package
                    && !policy.is_implicit(c.package())
            })
            .map(|(fqn, _)| fqn.clone())
            .collect();

        Self { short, imports }
    }

    /// Import lines in lexicographic order of fully-qualified name.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }
}

impl TypeNamer for ImportScope {
    fn name_of(&self, ty: &ClassType) -> String {
        let fqn = ty.fully_qualified_name();
        if self.short.contains(&fqn) {
            ty.simple_name().to_string()
        } else {
            fqn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ClassBuilder;
    use crate::types::TypeRef;

    fn scope_for(decl: &ClassDecl, extra: &[ClassType]) -> ImportScope {
        let extra = extra.iter().cloned().collect();
        ImportScope::resolve(decl, &extra, &ImportPolicy::default())
    }

    #[test]
    fn clashing_simple_names_stay_qualified() {
        let decl = ClassBuilder::for_concrete_class(ClassType::new("app", "Holder"))
            .without_marker()
            .build_field(TypeRef::class("a.one", "Thing"), "first")
            .finish()
            .unwrap()
            .build_field(TypeRef::class("a.two", "Thing"), "second")
            .finish()
            .unwrap()
            .build()
            .unwrap();
        let scope = scope_for(&decl, &[]);
        assert!(scope.imports().is_empty());
        assert_eq!(scope.name_of(&ClassType::new("a.one", "Thing")), "a.one.Thing");
    }

    #[test]
    fn implicit_and_local_types_are_not_imported() {
        let decl = ClassBuilder::for_concrete_class(ClassType::new("app", "Holder"))
            .without_marker()
            .build_field(TypeRef::class("java.lang", "String"), "name")
            .finish()
            .unwrap()
            .build_field(TypeRef::class("app", "Sibling"), "sibling")
            .finish()
            .unwrap()
            .build()
            .unwrap();
        let scope = scope_for(&decl, &[ClassType::new("z.last", "Extra"), ClassType::new("b.first", "Other")]);
        assert_eq!(scope.imports(), ["b.first.Other", "z.last.Extra"]);
        assert_eq!(scope.name_of(&ClassType::new("app", "Sibling")), "Sibling");
    }

    #[test]
    fn own_name_wins_over_a_foreign_namesake() {
        let decl = ClassBuilder::for_concrete_class(ClassType::new("app", "Widget"))
            .without_marker()
            .build_field(TypeRef::class("lib", "Widget"), "delegate")
            .finish()
            .unwrap()
            .build()
            .unwrap();
        let scope = scope_for(&decl, &[]);
        assert!(scope.imports().is_empty());
        assert_eq!(scope.name_of(&ClassType::new("app", "Widget")), "Widget");
        assert_eq!(scope.name_of(&ClassType::new("lib", "Widget")), "lib.Widget");
    }
}
