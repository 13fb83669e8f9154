//! Unity material document parser.
//!
//! A `.mat` file is a multi-document YAML stream with Unity-specific tags
//! (`--- !u!21 &2100000`). Only the document whose top-level key is
//! `Material` is used.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::trace;

use crate::index::{AssetId, AssetRef};
use crate::util::{Error, Result};

/// RGBA color parameter.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Color {
    #[serde(default = "one")]
    pub r: f64,
    #[serde(default = "one")]
    pub g: f64,
    #[serde(default = "one")]
    pub b: f64,
    #[serde(default = "one")]
    pub a: f64,
}

fn one() -> f64 {
    1.0
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// True if any of r, g, b is non-zero.
    pub fn has_rgb(&self) -> bool {
        self.r != 0.0 || self.g != 0.0 || self.b != 0.0
    }
}

/// A texture bound to a named material slot.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureBinding {
    pub texture: AssetRef,
    pub scale: [f64; 2],
    pub offset: [f64; 2],
}

impl TextureBinding {
    /// Binding with the identity UV transform.
    pub fn new(texture: AssetRef) -> Self {
        Self {
            texture,
            scale: [1.0, 1.0],
            offset: [0.0, 0.0],
        }
    }

    /// True if scale or offset differ from the identity transform.
    pub fn has_uv_transform(&self) -> bool {
        self.scale != [1.0, 1.0] || self.offset != [0.0, 0.0]
    }
}

/// Parsed source material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialDescriptor {
    pub name: String,
    pub shader: Option<AssetRef>,
    pub scalars: BTreeMap<String, f64>,
    pub colors: BTreeMap<String, Color>,
    pub textures: BTreeMap<String, TextureBinding>,
}

impl MaterialDescriptor {
    /// Parse a material file.
    pub fn parse(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Parse { reason, .. } => Error::parse(path, reason),
            Error::Yaml(y) => Error::parse(path, y.to_string()),
            other => other,
        })
    }

    /// Parse material text. Parse errors carry an empty path.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cleaned = strip_unity_tags(text);

        for document in serde_yaml::Deserializer::from_str(&cleaned) {
            let value = Value::deserialize(document)?;
            if let Some(block) = value.get("Material") {
                return Ok(Self::from_block(block));
            }
            trace!("skipping non-material YAML document");
        }
        Err(Error::parse("", "no Material block found"))
    }

    fn from_block(block: &Value) -> Self {
        let name = block
            .get("m_Name")
            .and_then(scalar_string)
            .unwrap_or_default();
        let shader = block
            .get("m_Shader")
            .and_then(|s| s.get("guid"))
            .and_then(scalar_string)
            .and_then(|g| AssetId::parse(&g))
            .map(AssetRef::Id);

        let props = block.get("m_SavedProperties");
        let sub = |key: &str| props.and_then(|p| p.get(key));

        let scalars = entries(sub("m_Floats"))
            .filter_map(|(k, v)| v.as_f64().map(|f| (k, f)))
            .collect();
        let colors = entries(sub("m_Colors"))
            .filter_map(|(k, v)| serde_yaml::from_value::<Color>(v.clone()).ok().map(|c| (k, c)))
            .collect();
        let textures = entries(sub("m_TexEnvs"))
            .filter_map(|(k, v)| texture_binding(v).map(|b| (k, b)))
            .collect();

        Self {
            name,
            shader,
            scalars,
            colors,
            textures,
        }
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars.get(name).copied()
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

/// Parse a material file.
pub fn parse_material(path: &Path) -> Result<MaterialDescriptor> {
    MaterialDescriptor::parse(path)
}

/// Drop `%` directives and the class/anchor tags on document separators,
/// and quote identifiers so they stay text.
fn strip_unity_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.starts_with('%') {
            continue;
        }
        if line.starts_with("---") {
            out.push_str("---\n");
            continue;
        }
        out.push_str(&quote_guids(line));
        out.push('\n');
    }
    out
}

/// `guid: 1234` → `guid: "1234"`. All-digit identifiers overflow YAML
/// integers and `0000000000000000e000000000000000` reads as a float.
fn quote_guids(line: &str) -> String {
    const KEY: &str = "guid: ";
    let mut out = String::with_capacity(line.len() + 4);
    let mut rest = line;
    while let Some(at) = rest.find(KEY) {
        let (head, tail) = rest.split_at(at + KEY.len());
        out.push_str(head);
        let end = tail
            .find(|c: char| c == ',' || c == '}' || c.is_whitespace())
            .unwrap_or(tail.len());
        let token = &tail[..end];
        if token.is_empty() || token.starts_with(['"', '\'']) {
            out.push_str(token);
        } else {
            out.push('"');
            out.push_str(token);
            out.push('"');
        }
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

/// Flatten a Unity property list into `(name, value)` pairs.
///
/// Handles the modern layout (`- _Name: value`) and the legacy one
/// (`- first: {name: _Name}` / `second: value`).
fn entries<'a>(list: Option<&'a Value>) -> impl Iterator<Item = (String, &'a Value)> + 'a {
    list.and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(Value::as_mapping)
        .flat_map(|map| {
            let legacy = map
                .get("first")
                .and_then(|f| f.get("name"))
                .and_then(scalar_string)
                .zip(map.get("second"));
            let pairs: Vec<(String, &Value)> = match legacy {
                Some(pair) => vec![pair],
                None => map
                    .iter()
                    .filter_map(|(k, v)| scalar_string(k).map(|k| (k, v)))
                    .collect(),
            };
            pairs
        })
}

fn texture_binding(env: &Value) -> Option<TextureBinding> {
    let id = env
        .get("m_Texture")
        .and_then(|t| t.get("guid"))
        .and_then(scalar_string)
        .and_then(|g| AssetId::parse(&g))?;
    let mut binding = TextureBinding::new(AssetRef::Id(id));
    if let Some(s) = env.get("m_Scale") {
        binding.scale = [axis(s, "x", 1.0), axis(s, "y", 1.0)];
    }
    if let Some(o) = env.get("m_Offset") {
        binding.offset = [axis(o, "x", 0.0), axis(o, "y", 0.0)];
    }
    Some(binding)
}

fn axis(v: &Value, key: &str, default: f64) -> f64 {
    v.get(key).and_then(Value::as_f64).unwrap_or(default)
}

/// Render a YAML scalar as a string (identifiers may parse as numbers).
fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
