//! Flow renderer.

use super::naming::property_key;
use super::{GENERATED_NOTICE, write_js_doc};
use crate::diagnostics::Diagnostics;
use crate::error::RenderError;
use crate::ir::{Field, PackageKind, PackageType, Primitive, TypeRef};
use crate::registry::TypeRegistry;
use crate::traits::{RenderOptions, Renderer};

/// Flow renderer implementing the Renderer trait.
#[derive(Debug, Clone)]
pub struct FlowRenderer {
    /// Exact object types for every record, not only `strict` ones.
    exact: bool,
}

impl FlowRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            exact: options.exact,
        }
    }
}

impl Renderer for FlowRenderer {
    fn dialect(&self) -> &'static str {
        "flow"
    }

    fn extension(&self) -> &'static str {
        "js"
    }

    fn render(
        &self,
        registry: &TypeRegistry,
        diags: &mut Diagnostics,
    ) -> Result<String, RenderError> {
        super::warn_hidden_references(registry, diags, "any");
        let mut writer = FlowWriter {
            registry,
            exact: self.exact,
            output: format!("// @flow\n// {}\n", GENERATED_NOTICE),
        };
        for ty in registry.exported() {
            writer.output.push('\n');
            writer.write_type(ty);
        }
        Ok(writer.output)
    }
}

struct FlowWriter<'r> {
    registry: &'r TypeRegistry,
    exact: bool,
    output: String,
}

impl FlowWriter<'_> {
    fn write_type(&mut self, ty: &PackageType) {
        write_js_doc(&mut self.output, ty.docs.as_deref(), "");
        match &ty.kind {
            PackageKind::Struct(fields) => {
                let (open, close) = if self.exact || ty.strict {
                    ("{|", "|}")
                } else {
                    ("{", "}")
                };
                let fields: Vec<&Field> = fields.iter().filter(|f| !f.skip).collect();
                if fields.is_empty() {
                    self.output
                        .push_str(&format!("export type {} = {}{};\n", ty.name, open, close));
                    return;
                }
                self.output
                    .push_str(&format!("export type {} = {}\n", ty.name, open));
                for field in fields {
                    self.write_field(field);
                }
                self.output.push_str(&format!("{};\n", close));
            }
            PackageKind::Alias(target) => {
                let target = self.type_expr(target);
                self.output
                    .push_str(&format!("export type {} = {};\n", ty.name, target));
            }
        }
    }

    fn write_field(&mut self, field: &Field) {
        write_js_doc(&mut self.output, field.docs.as_deref(), "  ");
        let mut ty = self.type_expr(&field.ty);
        if field.optional && !field.omit_empty && !matches!(field.ty, TypeRef::Pointer(_)) {
            ty.insert(0, '?');
        }
        let marker = if field.omit_empty { "?" } else { "" };
        self.output.push_str(&format!(
            "  {}{}: {},\n",
            property_key(&field.output_name),
            marker,
            ty
        ));
    }

    fn type_expr(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(p) => primitive(*p).to_string(),
            TypeRef::Named(name) | TypeRef::Embedded(name) => self
                .registry
                .get(name)
                .filter(|t| t.exported)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "any".to_string()),
            TypeRef::External(_) | TypeRef::Interface => "any".to_string(),
            TypeRef::Pointer(inner) => {
                let mut inner = inner.as_ref();
                while let TypeRef::Pointer(next) = inner {
                    inner = next;
                }
                format!("?{}", self.type_expr(inner))
            }
            TypeRef::Slice(_) if ty.is_byte_slice() => "string".to_string(),
            TypeRef::Slice(inner) => format!("Array<{}>", self.type_expr(inner)),
            TypeRef::Map { key, value } => {
                let key = if self
                    .registry
                    .primitive_of(key)
                    .is_some_and(Primitive::is_integer)
                {
                    "number"
                } else {
                    "string"
                };
                format!("{{ [key: {}]: {} }}", key, self.type_expr(value))
            }
            TypeRef::Opaque => "{ [key: string]: any }".to_string(),
        }
    }
}

fn primitive(p: Primitive) -> &'static str {
    match p {
        Primitive::Int { .. } | Primitive::Float { .. } | Primitive::Byte => "number",
        Primitive::Bool => "boolean",
        Primitive::String => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(registry: &TypeRegistry, exact: bool) -> String {
        let options = RenderOptions {
            exact,
            ..Default::default()
        };
        FlowRenderer::new(&options)
            .render(registry, &mut Diagnostics::new(false))
            .unwrap()
    }

    fn user() -> PackageType {
        PackageType::structure(
            "models",
            "User",
            vec![
                Field::required("ID", TypeRef::int()),
                Field::required("Name", TypeRef::string()),
                Field::required("Manager", TypeRef::pointer(TypeRef::named("models", "User"))),
            ],
        )
    }

    #[test]
    fn test_user_record() {
        let mut registry = TypeRegistry::new();
        registry.insert(user());
        assert_eq!(
            render(&registry, false),
            "// @flow\n\
             // Code generated by typewriter. DO NOT EDIT.\n\
             \n\
             export type User = {\n\
             \x20 ID: number,\n\
             \x20 Name: string,\n\
             \x20 Manager: ?User,\n\
             };\n"
        );
    }

    #[test]
    fn test_exact_records() {
        let mut registry = TypeRegistry::new();
        registry.insert(user());
        let out = render(&registry, true);
        assert!(out.contains("export type User = {|\n"));
        assert!(out.ends_with("|};\n"));

        let mut strict = PackageType::structure("m", "Strict", vec![]);
        strict.strict = true;
        let mut registry = TypeRegistry::new();
        registry.insert(strict);
        assert!(render(&registry, false).contains("export type Strict = {||};\n"));
    }

    #[test]
    fn test_optional_shapes() {
        let mut nullable = Field::required("Note", TypeRef::string());
        nullable.optional = true;
        let mut registry = TypeRegistry::new();
        registry.insert(PackageType::structure(
            "m",
            "A",
            vec![
                nullable,
                Field::omittable("Tags", TypeRef::slice(TypeRef::string())),
                Field::omittable("Parent", TypeRef::pointer(TypeRef::int())),
                Field::required("Lead", TypeRef::pointer(TypeRef::slice(TypeRef::string()))),
            ],
        ));
        let out = render(&registry, false);
        assert!(out.contains("  Note: ?string,\n"));
        assert!(out.contains("  Tags?: Array<string>,\n"));
        assert!(out.contains("  Parent?: ?number,\n"));
        assert!(out.contains("  Lead: ?Array<string>,\n"));
    }
}
