//! Fixed translation tables.
//!
//! Names are matched without the source engine's leading underscore, so
//! `_MainTex` and `MainTex` hit the same row.

/// Shaders replaceable by the built-in material, with the settings each
/// one implies.
pub const KNOWN_SHADERS: &[(&str, &[(&str, i64)])] = &[
    ("DiffuseOpaqueDoubleSided", &[("cull_mode", 2)]),
    ("DiffuseOpaqueSingleSided", &[]),
    ("DiffuseDoubleSided", &[("cull_mode", 2)]),
    ("DiffuseSingleSided", &[]),
    ("StandardSingleSided", &[]),
    ("StandardDoubleSided", &[("cull_mode", 2)]),
    ("Unlit", &[("shading_mode", 0), ("cull_mode", 2)]),
    ("Additive", &[("blend_mode", 1), ("transparency", 1), ("cull_mode", 2)]),
    ("Multiplicative", &[("blend_mode", 3), ("transparency", 1)]),
];

/// Preset settings of a known shader, `None` if the shader is not known.
pub fn preset(shader_name: &str) -> Option<&'static [(&'static str, i64)]> {
    KNOWN_SHADERS
        .iter()
        .find(|(name, _)| *name == shader_name)
        .map(|(_, settings)| *settings)
}

/// A texture slot with a target property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSlot {
    pub property: &'static str,
    /// Flag that must be enabled for the property to take effect.
    pub enable: Option<&'static str>,
}

const fn slot(property: &'static str, enable: Option<&'static str>) -> TextureSlot {
    TextureSlot { property, enable }
}

pub const TEXTURE_SLOTS: &[(&str, TextureSlot)] = &[
    ("MainTex", slot("albedo_texture", None)),
    ("BumpMap", slot("normal_texture", Some("normal_enabled"))),
    ("EmissionMap", slot("emission_texture", Some("emission_enabled"))),
    ("Illum", slot("emission_texture", Some("emission_enabled"))),
    ("MetallicGlossMap", slot("metallic_texture", None)),
    ("MetallicMap", slot("metallic_texture", None)),
    ("GlossMap", slot("roughness_texture", None)),
    ("OcclusionMap", slot("ao_texture", Some("ao_enabled"))),
    ("ParallaxMap", slot("heightmap_texture", Some("heightmap_enabled"))),
    ("DisplaceTex", slot("heightmap_texture", Some("heightmap_enabled"))),
    ("DetailMask", slot("detail_mask", None)),
    ("DetailAlbedoMap", slot("detail_albedo", Some("detail_enabled"))),
    ("SecondaryTex", slot("detail_albedo", Some("detail_enabled"))),
    ("DetailNormalMap", slot("detail_normal", None)),
];

pub fn texture_slot(name: &str) -> Option<TextureSlot> {
    TEXTURE_SLOTS
        .iter()
        .find(|(slot, _)| *slot == name)
        .map(|(_, s)| *s)
}

/// Scalars consumed by the built-in material mapping.
pub const MAPPED_SCALARS: &[&str] = &[
    "Metallic",
    "Glossiness",
    "Shininess",
    "BumpScale",
    "OcclusionStrength",
    "Cutoff",
    "Mode",
    "AlphaToMask",
    "Cull",
    "VertexColorUseAsAlbedo",
    "EmissionGain",
];

/// Scalars that only drive source-engine pipeline state and are dropped.
pub const IGNORED_SCALARS: &[&str] = &["Parallax", "DstBlend", "SrcBlend", "ZWrite"];

pub const MAPPED_COLORS: &[&str] = &["Color", "EmissionColor", "SpecColor"];

/// Opaque/Cutout/Fade/Transparent → transparency enum.
pub fn render_mode(mode: f64) -> Option<i64> {
    match mode {
        m if m == 0.0 => Some(0),
        m if m == 1.0 => Some(2),
        m if m == 2.0 || m == 3.0 => Some(1),
        _ => None,
    }
}

/// Material `_Cull` value (0 off, 1 front, 2 back) → cull_mode.
pub fn cull_from_scalar(value: f64) -> Option<i64> {
    match value {
        v if v == 0.0 => Some(2),
        v if v == 1.0 => Some(1),
        v if v == 2.0 => Some(0),
        _ => None,
    }
}

/// `Cull` directive → cull_mode.
pub fn cull_from_directive(value: &str) -> Option<i64> {
    match value.to_ascii_lowercase().as_str() {
        "off" => Some(2),
        "front" => Some(1),
        "back" => Some(0),
        _ => None,
    }
}

/// Settings implied by a `Blend src dst` pair. An empty slice means the
/// pair is the default and needs nothing.
pub fn blend(src: &str, dst: &str) -> Option<&'static [(&'static str, i64)]> {
    let (src, dst) = (src.to_ascii_lowercase(), dst.to_ascii_lowercase());
    let settings: &'static [(&'static str, i64)] = match (src.as_str(), dst.as_str()) {
        ("srcalpha", "oneminussrcalpha") => &[("transparency", 1)],
        ("one", "one") | ("srcalpha", "one") => &[("blend_mode", 1), ("transparency", 1)],
        ("dstcolor", "zero") | ("zero", "srccolor") => &[("blend_mode", 3), ("transparency", 1)],
        ("one", "oneminussrcalpha") => &[("blend_mode", 4), ("transparency", 1)],
        ("one", "zero") => &[],
        _ => return None,
    };
    Some(settings)
}
