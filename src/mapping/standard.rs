//! Built-in material mapping.

use std::collections::BTreeMap;

use tracing::trace;

use super::tables::{self, IGNORED_SCALARS, MAPPED_COLORS, MAPPED_SCALARS};
use super::{uv_note, MapContext, ShaderBinding};
use crate::godot::{PropertyList, PropertyValue, ResourceRef};
use crate::source::{Color, MaterialDescriptor, ShaderDirectiveSet};
use crate::util::format::{display_path, fmt_float, strip_prefix};
use crate::util::Error;

/// Material parameters keyed by name without the leading underscore.
struct Params<'m> {
    scalars: BTreeMap<&'m str, f64>,
    colors: BTreeMap<&'m str, Color>,
}

impl<'m> Params<'m> {
    fn new(material: &'m MaterialDescriptor) -> Self {
        Self {
            scalars: material
                .scalars
                .iter()
                .map(|(k, v)| (strip_prefix(k), *v))
                .collect(),
            colors: material
                .colors
                .iter()
                .map(|(k, v)| (strip_prefix(k), *v))
                .collect(),
        }
    }

    fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars.get(name).copied()
    }

    fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

pub(super) fn map(
    material: &MaterialDescriptor,
    directives: &ShaderDirectiveSet,
    ctx: &MapContext<'_>,
) -> PropertyList {
    let mut props = PropertyList::new();
    let params = Params::new(material);

    props.set("resource_name", material.name.as_str());
    map_colors(&params, &mut props);
    map_scalars(&params, &mut props);
    map_cull(&params, directives, &mut props);
    map_directives(directives, &mut props);

    if params.scalar("VertexColorUseAsAlbedo").is_some_and(|v| v > 0.0) {
        props.set("vertex_color_use_as_albedo", true);
        props.set("vertex_color_is_srgb", false);
    }
    if let Some(gain) = params.scalar("EmissionGain") {
        props.set("emission_enabled", true);
        props.set("emission_energy_multiplier", gain);
    }

    if let Some(settings) = ctx
        .shader
        .name()
        .and_then(|n| tables::preset(n.rsplit('/').next().unwrap_or(n)))
    {
        for (name, value) in settings {
            props.set(*name, *value);
        }
    }

    preserve_custom(material, &mut props);
    map_textures(material, ctx, &mut props);

    match ctx.shader {
        ShaderBinding::Resolved { path, .. } => props.comment(format!(
            "Replaced source shader with StandardMaterial3D: {}",
            display_path(path, ctx.project_root)
        )),
        ShaderBinding::Unresolved { reference, .. } => {
            props.comment(format!("MISSING: shader {} could not be resolved", reference));
            props.warn(Error::UnresolvedReference(reference.clone()));
        }
        ShaderBinding::None => {}
    }

    trace!("mapped {} to {} entries", material.name, props.len());
    props
}

/// Leave a marker for a value without a translation rule.
fn todo(props: &mut PropertyList, what: &str, value: &str) {
    props.comment(format!("TODO: {} {}", what, value));
    props.warn(Error::UnmappedProperty(format!("{} {}", what, value)));
}

fn map_colors(params: &Params<'_>, props: &mut PropertyList) {
    if let Some(c) = params.color("Color") {
        props.set("albedo_color", c);
    }
    if let Some(e) = params.color("EmissionColor").filter(Color::has_rgb) {
        props.set("emission_enabled", true);
        props.set("emission_color", Color::new(e.r, e.g, e.b, 1.0));
    }
    // No specular tint on the built-in material; keep its strength.
    if let Some(s) = params.color("SpecColor") {
        props.set("metallic_specular", (s.r + s.g + s.b) / 3.0);
    }
}

fn map_scalars(params: &Params<'_>, props: &mut PropertyList) {
    if let Some(v) = params.scalar("Metallic") {
        props.set("metallic", v);
    }
    if let Some(g) = params.scalar("Glossiness").or_else(|| params.scalar("Shininess")) {
        props.set("roughness", 1.0 - g);
    }
    if let Some(v) = params.scalar("BumpScale") {
        props.set("normal_scale", v);
    }
    if let Some(v) = params.scalar("OcclusionStrength") {
        props.set("ao_light_affect", v);
    }
    if let Some(v) = params.scalar("Cutoff") {
        props.set("alpha_scissor_threshold", v);
    }
    if let Some(mode) = params.scalar("Mode") {
        match tables::render_mode(mode) {
            Some(t) => props.set("transparency", t),
            None => todo(props, "_Mode", &fmt_float(mode)),
        }
    }
    if params.scalar("AlphaToMask").is_some_and(|v| v > 0.0) {
        props.set("alpha_antialiasing_mode", 1i64);
    }
}

/// Material `_Cull` wins over the shader's directive.
fn map_cull(params: &Params<'_>, directives: &ShaderDirectiveSet, props: &mut PropertyList) {
    if let Some(v) = params.scalar("Cull") {
        match tables::cull_from_scalar(v) {
            Some(mode) => props.set("cull_mode", mode),
            None => todo(props, "_Cull", &fmt_float(v)),
        }
    } else if let Some(c) = &directives.cull {
        match tables::cull_from_directive(c) {
            Some(mode) => props.set("cull_mode", mode),
            None => todo(props, "Cull", c),
        }
    }
}

fn map_directives(d: &ShaderDirectiveSet, props: &mut PropertyList) {
    if let Some(v) = &d.depth_write {
        match v.to_ascii_lowercase().as_str() {
            "off" => props.set("depth_draw_mode", 2i64),
            "on" => props.set("depth_draw_mode", 1i64),
            _ => todo(props, "ZWrite", v),
        }
    }

    if let Some(v) = &d.depth_test {
        match v.to_ascii_lowercase().as_str() {
            "always" | "off" => props.set("no_depth_test", true),
            "less" | "lequal" => {}
            _ => todo(props, "ZTest", v),
        }
    }

    if let Some(v) = &d.queue {
        let q = v.to_ascii_lowercase();
        if q.starts_with("transparent") {
            props.set_if_absent("transparency", 1i64);
        } else if q.starts_with("overlay") {
            props.set("disable_receive_shadows", true);
        } else if !["geometry", "background", "alphatest"].iter().any(|p| q.starts_with(p)) {
            todo(props, "Queue", v);
        }
    }

    if let Some(v) = &d.render_type {
        match v.to_ascii_lowercase().as_str() {
            "transparent" => props.set_if_absent("transparency", 1i64),
            "transparentcutout" => props.set_if_absent("transparency", 2i64),
            "opaque" => {}
            _ => todo(props, "RenderType", v),
        }
    }

    if let Some(v) = &d.alpha_to_mask {
        match v.to_ascii_lowercase().as_str() {
            "on" => props.set("alpha_antialiasing_mode", 1i64),
            "off" => {}
            _ => todo(props, "AlphaToMask", v),
        }
    }

    if let Some(b) = &d.blend {
        match &b.dst {
            None if b.src.eq_ignore_ascii_case("off") => {}
            None => todo(props, "Blend", &b.src),
            Some(dst) => match tables::blend(&b.src, dst) {
                Some(settings) => {
                    for (name, value) in settings {
                        if *name == "transparency" {
                            props.set_if_absent(*name, *value);
                        } else {
                            props.set(*name, *value);
                        }
                    }
                }
                None => todo(props, "Blend", &format!("{} {}", b.src, dst)),
            },
        }
    }

    if let Some(v) = &d.blend_op {
        match v.to_ascii_lowercase().as_str() {
            "add" => {}
            "revsub" => props.set("blend_mode", 2i64),
            _ => todo(props, "BlendOp", v),
        }
    }

    if let Some(v) = &d.color_mask {
        if !v.eq_ignore_ascii_case("rgba") {
            todo(props, "ColorMask", v);
        }
    }
}

/// Keep parameters without a rule as comments.
fn preserve_custom(material: &MaterialDescriptor, props: &mut PropertyList) {
    for (name, value) in &material.scalars {
        let key = strip_prefix(name);
        if MAPPED_SCALARS.contains(&key) || IGNORED_SCALARS.contains(&key) {
            continue;
        }
        props.comment(format!("Custom: {} = {}", name, fmt_float(*value)));
        props.warn(Error::UnmappedProperty(name.clone()));
    }
    for (name, color) in &material.colors {
        if MAPPED_COLORS.contains(&strip_prefix(name)) {
            continue;
        }
        let value = PropertyValue::Color(*color).literal().unwrap_or_default();
        props.comment(format!("Custom: {} = {}", name, value));
        props.warn(Error::UnmappedProperty(name.clone()));
    }
}

fn map_textures(material: &MaterialDescriptor, ctx: &MapContext<'_>, props: &mut PropertyList) {
    for (slot, binding) in &material.textures {
        let key = strip_prefix(slot);
        let target = tables::texture_slot(key);
        let path = ctx
            .resolver
            .resolve(&binding.texture)
            .filter(|p| p.is_file());

        let Some(path) = path else {
            props.comment(format!(
                "MISSING: {} texture {} could not be resolved",
                slot, binding.texture
            ));
            if let Some(t) = target {
                props.comment(format!("{} = ExtResource(\"<id>\")  # missing", t.property));
            }
            props.warn(Error::UnresolvedReference(binding.texture.to_string()));
            continue;
        };

        let Some(target) = target else {
            props.unmapped_texture(slot.as_str(), &path);
            props.warn(Error::UnmappedProperty(slot.clone()));
            continue;
        };

        if let Some(flag) = target.enable {
            props.set(flag, true);
        }
        props.set(target.property, ResourceRef::texture(path));

        if !binding.has_uv_transform() {
            continue;
        }
        if key == "MainTex" {
            let [sx, sy] = binding.scale;
            let [ox, oy] = binding.offset;
            props.set("uv1_scale", PropertyValue::Vector3([sx, sy, 1.0]));
            props.set("uv1_offset", PropertyValue::Vector3([ox, oy, 0.0]));
        } else {
            props.comment(uv_note(slot, binding.scale, binding.offset));
        }
    }
}
