//! TypeScript renderer.
//!
//! Structs become interfaces, every other declared shape a type alias.

use super::naming::property_key;
use super::{GENERATED_NOTICE, write_js_doc};
use crate::diagnostics::Diagnostics;
use crate::error::RenderError;
use crate::ir::{Field, PackageKind, PackageType, Primitive, TypeRef};
use crate::registry::TypeRegistry;
use crate::traits::{RenderOptions, Renderer};

/// TypeScript renderer implementing the Renderer trait.
#[derive(Debug, Clone)]
pub struct TypeScriptRenderer {
    export: bool,
}

impl TypeScriptRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            export: options.export,
        }
    }
}

impl Renderer for TypeScriptRenderer {
    fn dialect(&self) -> &'static str {
        "typescript"
    }

    fn extension(&self) -> &'static str {
        "ts"
    }

    fn render(
        &self,
        registry: &TypeRegistry,
        diags: &mut Diagnostics,
    ) -> Result<String, RenderError> {
        super::warn_hidden_references(registry, diags, "any");
        Ok(TypeScriptWriter::emit(registry, self.export))
    }
}

/// Emits the registry as TypeScript declarations.
struct TypeScriptWriter<'r> {
    registry: &'r TypeRegistry,
    export: &'static str,
    output: String,
}

impl<'r> TypeScriptWriter<'r> {
    fn emit(registry: &'r TypeRegistry, export: bool) -> String {
        let mut writer = Self {
            registry,
            export: if export { "export " } else { "" },
            output: format!("// {}\n", GENERATED_NOTICE),
        };
        for ty in registry.exported() {
            writer.output.push('\n');
            writer.write_type(ty);
        }
        writer.output
    }

    fn write_type(&mut self, ty: &PackageType) {
        write_js_doc(&mut self.output, ty.docs.as_deref(), "");
        match &ty.kind {
            PackageKind::Struct(fields) => {
                let fields: Vec<&Field> = fields.iter().filter(|f| !f.skip).collect();
                if fields.is_empty() {
                    self.output
                        .push_str(&format!("{}interface {} {{}}\n", self.export, ty.name));
                    return;
                }
                self.output
                    .push_str(&format!("{}interface {} {{\n", self.export, ty.name));
                for field in fields {
                    self.write_field(field);
                }
                self.output.push_str("}\n");
            }
            PackageKind::Alias(target) => {
                let target = self.type_expr(target);
                self.output
                    .push_str(&format!("{}type {} = {};\n", self.export, ty.name, target));
            }
        }
    }

    fn write_field(&mut self, field: &Field) {
        write_js_doc(&mut self.output, field.docs.as_deref(), "  ");
        let mut ty = self.type_expr(&field.ty);
        if field.optional && !field.omit_empty && !matches!(field.ty, TypeRef::Pointer(_)) {
            ty.push_str(" | null");
        }
        let marker = if field.omit_empty { "?" } else { "" };
        self.output.push_str(&format!(
            "  {}{}: {};\n",
            property_key(&field.output_name),
            marker,
            ty
        ));
    }

    fn type_expr(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(p) => primitive(*p).to_string(),
            TypeRef::Named(name) | TypeRef::Embedded(name) => self.name_ref(name),
            TypeRef::External(_) | TypeRef::Interface => "any".to_string(),
            TypeRef::Pointer(inner) => {
                let mut inner = inner.as_ref();
                while let TypeRef::Pointer(next) = inner {
                    inner = next;
                }
                format!("{} | null", self.type_expr(inner))
            }
            TypeRef::Slice(_) if ty.is_byte_slice() => "string".to_string(),
            TypeRef::Slice(inner) => {
                let element = self.type_expr(inner);
                if matches!(inner.as_ref(), TypeRef::Pointer(_)) {
                    format!("({})[]", element)
                } else {
                    format!("{}[]", element)
                }
            }
            TypeRef::Map { key, value } => {
                format!("{{ [key: {}]: {} }}", self.key_type(key), self.type_expr(value))
            }
            TypeRef::Opaque => "{ [key: string]: any }".to_string(),
        }
    }

    fn name_ref(&self, qualified: &str) -> String {
        self.registry
            .get(qualified)
            .filter(|t| t.exported)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "any".to_string())
    }

    fn key_type(&self, key: &TypeRef) -> &'static str {
        if self
            .registry
            .primitive_of(key)
            .is_some_and(Primitive::is_integer)
        {
            "number"
        } else {
            "string"
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
