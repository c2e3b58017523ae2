//! Dialect renderers.
//!
//! Each renderer takes the [`TypeRegistry`](crate::registry::TypeRegistry)
//! and produces one source file. All renderers implement the
//! [`Renderer`](crate::traits::Renderer) trait and are selected through
//! [`Dialect`](crate::traits::Dialect).

pub mod naming;

// TypeScript
#[cfg(feature = "dialect-typescript")]
pub mod typescript;

#[cfg(feature = "dialect-typescript")]
pub use typescript::TypeScriptRenderer;

// Flow
#[cfg(feature = "dialect-flow")]
pub mod flow;

#[cfg(feature = "dialect-flow")]
pub use flow::FlowRenderer;

// Elm
#[cfg(feature = "dialect-elm")]
pub mod elm;

#[cfg(feature = "dialect-elm")]
pub use elm::ElmRenderer;

use crate::diagnostics::{Diagnostics, Warning};
use crate::ir::{PackageKind, bare_name};
use crate::registry::TypeRegistry;

/// First line of every generated file, in each dialect's comment syntax.
pub const GENERATED_NOTICE: &str = "Code generated by typewriter. DO NOT EDIT.";

/// Report references to types that are not rendered. Renderers write
/// `fallback` in their place.
pub(crate) fn warn_hidden_references(
    registry: &TypeRegistry,
    diags: &mut Diagnostics,
    fallback: &str,
) {
    for ty in registry.exported() {
        let mut hidden: Vec<String> = Vec::new();
        let mut visit = |name: &str| {
            let rendered = registry.get(name).is_some_and(|t| t.exported);
            if !rendered && !hidden.iter().any(|h| h == name) {
                hidden.push(name.to_string());
            }
        };
        match &ty.kind {
            PackageKind::Struct(fields) => {
                for field in fields.iter().filter(|f| !f.skip) {
                    field.ty.for_each_named(&mut visit);
                }
            }
            PackageKind::Alias(target) => target.for_each_named(&mut visit),
        }
        for name in hidden {
            diags.warn(Warning::UnsupportedShape {
                owner: ty.qualified_name(),
                detail: format!(
                    "`{}` is not exported, rendered as `{}`",
                    bare_name(&name),
                    fallback
                ),
            });
        }
    }
}

/// Write a JSDoc-style block comment at `indent`.
#[allow(dead_code)]
pub(crate) fn write_js_doc(output: &mut String, docs: Option<&str>, indent: &str) {
    let Some(docs) = docs.map(str::trim).filter(|d| !d.is_empty()) else {
        return;
    };
    let docs = docs.replace("*/", "*\\/");
    let lines: Vec<&str> = docs.lines().collect();
    if let [line] = lines.as_slice() {
        output.push_str(&format!("{}/** {} */\n", indent, line.trim_end()));
        return;
    }
    output.push_str(indent);
    output.push_str("/**\n");
    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            output.push_str(&format!("{} *\n", indent));
        } else {
            output.push_str(&format!("{} * {}\n", indent, line));
        }
    }
    output.push_str(indent);
    output.push_str(" */\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Field, PackageType, TypeRef};

    #[test]
    fn hidden_references_warn_once_per_owner() {
        let mut registry = TypeRegistry::new();
        registry.insert(PackageType::structure(
            "models",
            "Holder",
            vec![
                Field::required("Cache", TypeRef::named("models", "cache")),
                Field::required("Backup", TypeRef::pointer(TypeRef::named("models", "cache"))),
                Field::required("Next", TypeRef::pointer(TypeRef::named("models", "Holder"))),
            ],
        ));
        registry.insert(PackageType::structure("models", "cache", vec![]));

        let mut diags = Diagnostics::new(true);
        warn_hidden_references(&registry, &mut diags, "any");
        assert_eq!(
            diags.warnings(),
            &[Warning::UnsupportedShape {
                owner: "models.Holder".into(),
                detail: "`cache` is not exported, rendered as `any`".into(),
            }]
        );
    }

    #[test]
    fn js_doc_single_and_multi_line() {
        let mut out = String::new();
        write_js_doc(&mut out, Some("A user."), "");
        write_js_doc(&mut out, Some("First.\n\nSecond."), "  ");
        write_js_doc(&mut out, None, "");
        write_js_doc(&mut out, Some("Ends */ early"), "");
        assert_eq!(
            out,
            "/** A user. */\n  /**\n   * First.\n   *\n   * Second.\n   */\n/** Ends *\\/ early */\n"
        );
    }
}
