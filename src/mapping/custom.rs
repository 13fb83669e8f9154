//! Shader material mapping: parameters become uniforms of the generated
//! program. Render state is left to the program itself.

use super::{uv_note, MapContext, ShaderBinding};
use crate::godot::{PropertyList, ResourceRef};
use crate::source::MaterialDescriptor;
use crate::util::format::{display_path, strip_prefix};
use crate::util::Error;

pub(super) fn map(material: &MaterialDescriptor, ctx: &MapContext<'_>) -> PropertyList {
    let mut props = PropertyList::new();
    props.set("resource_name", material.name.as_str());

    match ctx.shader {
        ShaderBinding::Resolved { path, .. } => {
            props.set("shader", ResourceRef::shader(path));
            props.comment(format!(
                "Original shader: {}",
                display_path(path, ctx.project_root)
            ));
        }
        ShaderBinding::Unresolved { reference, .. } => {
            props.comment(format!("MISSING: shader {} could not be resolved", reference));
            props.warn(Error::UnresolvedReference(reference.clone()));
        }
        ShaderBinding::None => props.comment("MISSING: material has no shader"),
    }

    for (name, color) in &material.colors {
        props.uniform(strip_prefix(name), *color);
    }
    for (name, value) in &material.scalars {
        props.uniform(strip_prefix(name), *value);
    }

    for (slot, binding) in &material.textures {
        let uniform = strip_prefix(slot);
        match ctx.resolver.resolve(&binding.texture).filter(|p| p.is_file()) {
            Some(path) => {
                props.uniform(uniform, ResourceRef::texture(path));
                if binding.has_uv_transform() {
                    props.comment(uv_note(slot, binding.scale, binding.offset));
                }
            }
            None => {
                props.comment(format!(
                    "MISSING: {} texture {} could not be resolved",
                    slot, binding.texture
                ));
                props.comment(format!(
                    "shader_parameter/{} = ExtResource(\"<id>\")  # missing",
                    uniform
                ));
                props.warn(Error::UnresolvedReference(binding.texture.to_string()));
            }
        }
    }

    props
}
