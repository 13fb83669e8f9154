//! Text resource (`.tres`) document model and serializer.
//!
//! A document is built once from a [`PropertyList`] and serialized once.
//! External resource declarations are derived from the resource values in
//! the body while it is built, so every declared id is referenced and every
//! referenced id is declared.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::property::{Entry, PropertyList, PropertyValue, ResourceKind, ResourceRef};
use crate::util::Result;

/// Top-level resource type of a material document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceType {
    StandardMaterial3D,
    ShaderMaterial,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardMaterial3D => "StandardMaterial3D",
            Self::ShaderMaterial => "ShaderMaterial",
        }
    }
}

/// One `[ext_resource]` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtResource {
    pub kind: ResourceKind,
    /// `res://` path.
    pub path: String,
    pub id: usize,
}

/// One body line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Assign { key: String, value: String },
    Comment(String),
}

/// A complete material document.
#[derive(Clone, Debug)]
pub struct Document {
    resource_type: ResourceType,
    ext_resources: Vec<ExtResource>,
    body: Vec<Line>,
}

impl Document {
    /// Build a document from mapped properties.
    ///
    /// `place` materializes a source asset in the output tree (copy or
    /// generate) and returns its `res://` path. Resources are deduplicated
    /// by that path and numbered from 1 in first-use order. Uniforms are
    /// written after all other lines.
    pub fn build<F>(resource_type: ResourceType, props: &PropertyList, mut place: F) -> Result<Self>
    where
        F: FnMut(&ResourceRef) -> Result<String>,
    {
        let mut doc = Self {
            resource_type,
            ext_resources: Vec::new(),
            body: Vec::new(),
        };
        let mut ids: HashMap<String, usize> = HashMap::new();

        let (uniforms, rest): (Vec<&Entry>, Vec<&Entry>) = props
            .entries()
            .iter()
            .partition(|e| matches!(e, Entry::Uniform { .. }));

        for entry in rest.into_iter().chain(uniforms) {
            match entry {
                Entry::Property { name, value } => {
                    let value = doc.render(value, &mut ids, &mut place)?;
                    doc.body.push(Line::Assign {
                        key: name.clone(),
                        value,
                    });
                }
                Entry::Uniform { name, value } => {
                    let value = doc.render(value, &mut ids, &mut place)?;
                    doc.body.push(Line::Assign {
                        key: format!("shader_parameter/{}", name),
                        value,
                    });
                }
                Entry::Comment(text) => doc.body.push(Line::Comment(text.clone())),
                Entry::UnmappedTexture { slot, source } => {
                    let res = place(&ResourceRef::texture(source))?;
                    doc.body.push(Line::Comment(format!(
                        "TODO: {} -> {} (no matching material slot)",
                        slot, res
                    )));
                }
            }
        }
        Ok(doc)
    }

    fn render<F>(
        &mut self,
        value: &PropertyValue,
        ids: &mut HashMap<String, usize>,
        place: &mut F,
    ) -> Result<String>
    where
        F: FnMut(&ResourceRef) -> Result<String>,
    {
        if let Some(literal) = value.literal() {
            return Ok(literal);
        }
        let PropertyValue::Resource(reference) = value else {
            return Ok(String::new());
        };
        let path = place(reference)?;
        let id = match ids.get(&path) {
            Some(id) => *id,
            None => {
                let id = self.ext_resources.len() + 1;
                ids.insert(path.clone(), id);
                self.ext_resources.push(ExtResource {
                    kind: reference.kind,
                    path,
                    id,
                });
                id
            }
        };
        Ok(format!("ExtResource(\"{}\")", id))
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn ext_resources(&self) -> &[ExtResource] {
        &self.ext_resources
    }

    pub fn body(&self) -> &[Line] {
        &self.body
    }

    /// Serialize to `.tres` text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[gd_resource type=\"{}\" format=3]", self.resource_type.as_str());
        out.push('\n');

        if !self.ext_resources.is_empty() {
            for ext in &self.ext_resources {
                let _ = writeln!(
                    out,
                    "[ext_resource type=\"{}\" path=\"{}\" id=\"{}\"]",
                    ext.kind.type_name(),
                    ext.path,
                    ext.id
                );
            }
            out.push('\n');
        }

        out.push_str("[resource]\n");
        for line in &self.body {
            match line {
                Line::Assign { key, value } => {
                    let _ = writeln!(out, "{} = {}", key, value);
                }
                Line::Comment(text) => {
                    let _ = writeln!(out, "# {}", text);
                }
            }
        }
        out
    }
}
