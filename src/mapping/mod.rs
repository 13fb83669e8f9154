//! Property mapping engine.
//!
//! Decides how a material is represented on the target side and turns its
//! parameters into an ordered [`PropertyList`]:
//! - [`TranslationStrategy::StandardEquivalent`] maps a fixed set of
//!   parameters and render-state directives onto the built-in material.
//! - [`TranslationStrategy::CustomProgram`] forwards every parameter as a
//!   uniform of a generated shader program.
//!
//! Nothing here fails. Parameters without a rule and references that do not
//! resolve leave comment markers in the list and a warning next to them.

mod custom;
mod standard;
pub mod tables;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::godot::{PropertyList, ResourceType};
use crate::index::ResolveAsset;
use crate::source::{MaterialDescriptor, ShaderDirectiveSet};

/// Target representation of a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TranslationStrategy {
    /// Built-in material with equivalent settings.
    StandardEquivalent,
    /// Shader material backed by a generated program.
    CustomProgram,
}

impl TranslationStrategy {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::StandardEquivalent => ResourceType::StandardMaterial3D,
            Self::CustomProgram => ResourceType::ShaderMaterial,
        }
    }
}

impl fmt::Display for TranslationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_type().as_str())
    }
}

/// Pick a strategy from a shader name.
///
/// Only the last `/` segment is compared against the known-equivalents
/// table. No shader at all means the built-in material.
pub fn choose_strategy(shader_name: Option<&str>) -> TranslationStrategy {
    match shader_name {
        None => TranslationStrategy::StandardEquivalent,
        Some(name) => {
            let base = name.rsplit('/').next().unwrap_or(name);
            if tables::preset(base).is_some() {
                TranslationStrategy::StandardEquivalent
            } else {
                TranslationStrategy::CustomProgram
            }
        }
    }
}

/// What a material's shader reference turned into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShaderBinding {
    /// Material names no shader.
    None,
    /// Reference that is not in the index.
    Unresolved {
        reference: String,
        name: Option<String>,
    },
    /// Shader source found on disk.
    Resolved { path: PathBuf, name: String },
}

impl ShaderBinding {
    /// Binding for a resolved shader file, named after its stem.
    pub fn resolved(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::Resolved { path, name }
    }

    /// Shader name, known even when the file is missing.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Unresolved { name, .. } => name.as_deref(),
            Self::Resolved { name, .. } => Some(name),
        }
    }

    /// Shader name of a resolved binding only. This is what drives
    /// [`choose_strategy`]: a program that cannot be found cannot back a
    /// shader material.
    pub fn resolved_name(&self) -> Option<&str> {
        match self {
            Self::Resolved { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolved { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Everything the mapping needs besides the material itself.
#[derive(Clone, Copy)]
pub struct MapContext<'a> {
    pub resolver: &'a dyn ResolveAsset,
    pub shader: &'a ShaderBinding,
    /// Root for paths shown in comments.
    pub project_root: Option<&'a Path>,
}

/// Map a material to target property assignments.
pub fn map(
    material: &MaterialDescriptor,
    directives: &ShaderDirectiveSet,
    strategy: TranslationStrategy,
    ctx: &MapContext<'_>,
) -> PropertyList {
    match strategy {
        TranslationStrategy::StandardEquivalent => standard::map(material, directives, ctx),
        TranslationStrategy::CustomProgram => custom::map(material, ctx),
    }
}

/// Render a texture UV transform for note comments.
fn uv_note(slot: &str, scale: [f64; 2], offset: [f64; 2]) -> String {
    use crate::util::format::fmt_float;
    format!(
        "Note: {} has UV scale ({}, {}) offset ({}, {})",
        slot,
        fmt_float(scale[0]),
        fmt_float(scale[1]),
        fmt_float(offset[0]),
        fmt_float(offset[1])
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_strategy() {
        use TranslationStrategy::*;
        assert_eq!(choose_strategy(None), StandardEquivalent);
        assert_eq!(choose_strategy(Some("StandardDoubleSided")), StandardEquivalent);
        assert_eq!(choose_strategy(Some("Brush/Special/Unlit")), StandardEquivalent);
        assert_eq!(choose_strategy(Some("Brush/Special/Rainbow")), CustomProgram);
        // Same name, same answer.
        assert_eq!(choose_strategy(Some("Ink")), choose_strategy(Some("Ink")));
    }

    #[test]
    fn test_binding_names() {
        let b = ShaderBinding::resolved("Assets/Shaders/Ink.shader");
        assert_eq!(b.name(), Some("Ink"));
        assert_eq!(b.resolved_name(), Some("Ink"));

        let u = ShaderBinding::Unresolved {
            reference: "Unlit.shader".into(),
            name: Some("Brush/Unlit".into()),
        };
        assert_eq!(u.name(), Some("Brush/Unlit"));
        assert_eq!(u.resolved_name(), None);
        assert_eq!(ShaderBinding::None.name(), None);
    }

    #[test]
    fn test_uv_note() {
        assert_eq!(
            uv_note("_BumpMap", [2.0, 2.0], [0.0, 0.5]),
            "Note: _BumpMap has UV scale (2.0, 2.0) offset (0.0, 0.5)"
        );
    }
}
