//! Pre-synthesized brush catalog.
//!
//! The catalog is a JSON document with one record per brush: default
//! parameter tables, texture file names, blend/cull settings and a list of
//! material variants. It is an alternate entry path that bypasses `.mat`
//! parsing entirely.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::directives::{BlendFactors, ShaderDirectiveSet};
use super::material::{Color, MaterialDescriptor, TextureBinding};
use crate::index::AssetRef;
use crate::util::format::strip_prefix;
use crate::util::{Error, Result};

/// Root of the catalog document.
#[derive(Clone, Debug, Deserialize)]
pub struct BrushCatalog {
    pub brushes: BTreeMap<String, CatalogBrush>,
}

/// One logical brush.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBrush {
    pub name: String,
    /// 0 opaque, 1 alpha, 2 additive, 3 multiply.
    #[serde(default)]
    pub blend_mode: u8,
    #[serde(default = "default_true")]
    pub enable_cull: bool,
    #[serde(default)]
    pub default_params: CatalogParams,
    #[serde(default)]
    pub textures: CatalogTextures,
    #[serde(default, rename = "unityMaterials")]
    pub variants: Vec<CatalogVariant>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub floats: BTreeMap<String, f64>,
    #[serde(default)]
    pub colors: BTreeMap<String, CatalogColor>,
}

/// Colors appear both as `[r, g, b, a]` lists and `{r, g, b, a}` maps.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogColor {
    List(Vec<f64>),
    Map(Color),
}

impl CatalogColor {
    pub fn to_color(&self) -> Color {
        match self {
            Self::List(v) => Color::new(
                v.first().copied().unwrap_or(1.0),
                v.get(1).copied().unwrap_or(1.0),
                v.get(2).copied().unwrap_or(1.0),
                v.get(3).copied().unwrap_or(1.0),
            ),
            Self::Map(c) => *c,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogTextures {
    /// Slot name → texture file name.
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

/// A concrete material variant of a brush.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVariant {
    pub name: String,
    #[serde(default)]
    pub shader_name: Option<String>,
    #[serde(default)]
    pub float_overrides: BTreeMap<String, f64>,
    #[serde(default)]
    pub color_overrides: BTreeMap<String, CatalogColor>,
}

/// A material synthesized from the catalog, ready for mapping.
#[derive(Clone, Debug)]
pub struct CatalogMaterial {
    pub material: MaterialDescriptor,
    /// Shader name as recorded in the catalog.
    pub shader_name: Option<String>,
}

impl BrushCatalog {
    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }
}

impl CatalogBrush {
    /// Output folder name: spaces become underscores, parentheses are dropped.
    pub fn folder_name(&self) -> String {
        self.name
            .chars()
            .filter(|c| !matches!(c, '(' | ')'))
            .map(|c| if c == ' ' { '_' } else { c })
            .collect()
    }

    /// Render state implied by the brush's blend mode and cull flag.
    pub fn directives(&self) -> ShaderDirectiveSet {
        let blend = |src: &str, dst: &str| {
            Some(BlendFactors {
                src: src.to_string(),
                dst: Some(dst.to_string()),
            })
        };
        ShaderDirectiveSet {
            blend: match self.blend_mode {
                1 => blend("SrcAlpha", "OneMinusSrcAlpha"),
                2 => blend("One", "One"),
                3 => blend("DstColor", "Zero"),
                _ => None,
            },
            cull: (!self.enable_cull).then(|| "Off".to_string()),
            ..Default::default()
        }
    }

    /// One material per variant, or a single default-named material built
    /// from the catalog defaults when the brush has no variants.
    pub fn materials(&self) -> Vec<CatalogMaterial> {
        if self.variants.is_empty() {
            return vec![CatalogMaterial {
                material: self.synthesize(&self.name, None, &BTreeMap::new(), &BTreeMap::new()),
                shader_name: None,
            }];
        }
        self.variants
            .iter()
            .map(|v| CatalogMaterial {
                material: self.synthesize(
                    &v.name,
                    v.shader_name.as_deref(),
                    &v.float_overrides,
                    &v.color_overrides,
                ),
                shader_name: v.shader_name.clone(),
            })
            .collect()
    }

    fn synthesize(
        &self,
        name: &str,
        shader_name: Option<&str>,
        float_overrides: &BTreeMap<String, f64>,
        color_overrides: &BTreeMap<String, CatalogColor>,
    ) -> MaterialDescriptor {
        let mut scalars: BTreeMap<String, f64> = self
            .default_params
            .floats
            .iter()
            .map(|(k, v)| (strip_prefix(k).to_string(), *v))
            .collect();
        for (k, v) in float_overrides {
            scalars.insert(strip_prefix(k).to_string(), *v);
        }

        let mut colors: BTreeMap<String, Color> = self
            .default_params
            .colors
            .iter()
            .map(|(k, c)| (strip_prefix(k).to_string(), c.to_color()))
            .collect();
        for (k, c) in color_overrides {
            colors.insert(strip_prefix(k).to_string(), c.to_color());
        }

        let textures = self
            .textures
            .names
            .iter()
            .map(|(slot, file)| (slot.clone(), TextureBinding::new(AssetRef::File(file.clone()))))
            .collect();

        MaterialDescriptor {
            name: name.to_string(),
            shader: shader_name.map(|s| AssetRef::File(shader_file_name(s))),
            scalars,
            colors,
            textures,
        }
    }
}

/// File name a catalog shader name resolves to (`Brush/Special/Ink` → `Ink.shader`).
pub fn shader_file_name(shader_name: &str) -> String {
    format!("{}.shader", shader_base_name(shader_name))
}

/// Last path segment of a shader name.
pub fn shader_base_name(shader_name: &str) -> &str {
    shader_name.rsplit('/').next().unwrap_or(shader_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
  "brushes": {
    "c8313697-2563-47fc-832e-290f4c04b901": {
      "name": "Oil Paint (Wet)",
      "blendMode": 1,
      "enableCull": false,
      "defaultParams": {
        "floats": {"Cutoff": 0.5, "Glossiness": 0.3},
        "colors": {"Color": [1, 0.5, 0.5, 1]}
      },
      "textures": {"names": {"MainTex": "OilPaint-MainTex.png"}},
      "unityMaterials": [
        {"name": "OilPaint", "shaderName": "Brush/StandardDoubleSided",
         "floatOverrides": {"_Glossiness": 0.9},
         "colorOverrides": {"_Color": {"r": 0.1, "g": 0.2, "b": 0.3, "a": 1}}},
        {"name": "OilPaintFx", "shaderName": "Brush/Special/Rainbow"}
      ]
    },
    "0e87b49c-6546-3a34-3a44-8a556d7d6c3e": {
      "name": "Marker",
      "defaultParams": {"floats": {}, "colors": {}}
    }
  }
}"#;

    #[test]
    fn test_load_catalog() {
        let catalog = BrushCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);

        let oil = &catalog.brushes["c8313697-2563-47fc-832e-290f4c04b901"];
        assert_eq!(oil.folder_name(), "Oil_Paint_Wet");
        assert!(!oil.enable_cull);

        let mats = oil.materials();
        assert_eq!(mats.len(), 2);
        let m = &mats[0].material;
        assert_eq!(m.name, "OilPaint");
        assert_eq!(m.scalar("Glossiness"), Some(0.9));
        assert_eq!(m.scalar("Cutoff"), Some(0.5));
        assert_eq!(m.color("Color"), Some(Color::new(0.1, 0.2, 0.3, 1.0)));
        assert_eq!(m.shader, Some(AssetRef::File("StandardDoubleSided.shader".into())));
        assert_eq!(
            m.textures["MainTex"].texture,
            AssetRef::File("OilPaint-MainTex.png".into())
        );

        // Defaults only for the second variant.
        assert_eq!(mats[1].material.color("Color"), Some(Color::new(1.0, 0.5, 0.5, 1.0)));
    }

    #[test]
    fn test_default_material_without_variants() {
        let catalog = BrushCatalog::from_json_str(CATALOG).unwrap();
        let marker = &catalog.brushes["0e87b49c-6546-3a34-3a44-8a556d7d6c3e"];
        assert!(marker.enable_cull);
        let mats = marker.materials();
        assert_eq!(mats.len(), 1);
        assert_eq!(mats[0].material.name, "Marker");
        assert!(mats[0].shader_name.is_none());
        assert!(marker.directives().is_empty());
    }

    #[test]
    fn test_directives_from_blend_mode() {
        let catalog = BrushCatalog::from_json_str(CATALOG).unwrap();
        let d = catalog.brushes["c8313697-2563-47fc-832e-290f4c04b901"].directives();
        assert_eq!(d.cull.as_deref(), Some("Off"));
        assert_eq!(d.blend.unwrap().dst.as_deref(), Some("OneMinusSrcAlpha"));
    }

    #[test]
    fn test_shader_names() {
        assert_eq!(shader_base_name("Brush/Special/Ink"), "Ink");
        assert_eq!(shader_file_name("Unlit"), "Unlit.shader");
    }
}
