//! Ordered property assignments produced by the mapping engine.

use std::path::{Path, PathBuf};

use crate::source::Color;
use crate::util::format::{fmt_float, quote};
use crate::util::Error;

/// Kind of an external resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture2D,
    Shader,
}

impl ResourceKind {
    /// Type name written into `[ext_resource]` declarations.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Texture2D => "Texture2D",
            Self::Shader => "Shader",
        }
    }
}

/// A reference to a source asset that becomes an external resource once
/// the emitter has copied or generated it.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub source: PathBuf,
}

impl ResourceRef {
    pub fn texture(source: impl Into<PathBuf>) -> Self {
        Self {
            kind: ResourceKind::Texture2D,
            source: source.into(),
        }
    }

    pub fn shader(source: impl Into<PathBuf>) -> Self {
        Self {
            kind: ResourceKind::Shader,
            source: source.into(),
        }
    }
}

/// Value of one assignment.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Float(f64),
    Int(i64),
    Str(String),
    Color(Color),
    Vector3([f64; 3]),
    Resource(ResourceRef),
}

impl PropertyValue {
    /// Render an inline value. Resources render as `None`; they need a
    /// document-local id.
    pub fn literal(&self) -> Option<String> {
        Some(match self {
            Self::Bool(b) => b.to_string(),
            Self::Float(f) => fmt_float(*f),
            Self::Int(i) => i.to_string(),
            Self::Str(s) => quote(s),
            Self::Color(c) => format!(
                "Color({}, {}, {}, {})",
                fmt_float(c.r),
                fmt_float(c.g),
                fmt_float(c.b),
                fmt_float(c.a)
            ),
            Self::Vector3([x, y, z]) => {
                format!("Vector3({}, {}, {})", fmt_float(*x), fmt_float(*y), fmt_float(*z))
            }
            Self::Resource(_) => return None,
        })
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Color> for PropertyValue {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<ResourceRef> for PropertyValue {
    fn from(v: ResourceRef) -> Self {
        Self::Resource(v)
    }
}

/// One line of a material body.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// `name = value`
    Property { name: String, value: PropertyValue },
    /// `shader_parameter/name = value`
    Uniform { name: String, value: PropertyValue },
    /// `# text`
    Comment(String),
    /// A texture whose slot has no target property. The emitter still
    /// copies it and leaves a note with its target path.
    UnmappedTexture { slot: String, source: PathBuf },
}

/// Ordered assignments plus the non-fatal issues found while mapping.
#[derive(Debug, Default)]
pub struct PropertyList {
    entries: Vec<Entry>,
    warnings: Vec<Error>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an earlier assignment of the same name in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();

        for entry in &mut self.entries {
            if let Entry::Property { name: n, value: v } = entry {
                if *n == name {
                    *v = value;
                    return;
                }
            }
        }
        self.entries.push(Entry::Property { name, value });
    }

    /// Set a property only if it has not been assigned yet.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        if !self.contains(&name) {
            self.set(name, value);
        }
    }

    /// Add a shader uniform; later values replace earlier ones.
    pub fn uniform(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();

        for entry in &mut self.entries {
            if let Entry::Uniform { name: n, value: v } = entry {
                if *n == name {
                    *v = value;
                    return;
                }
            }
        }
        self.entries.push(Entry::Uniform { name, value });
    }

    /// Add a comment line (without the leading `#`).
    pub fn comment(&mut self, text: impl Into<String>) {
        self.entries.push(Entry::Comment(text.into()));
    }

    pub fn unmapped_texture(&mut self, slot: impl Into<String>, source: &Path) {
        self.entries.push(Entry::UnmappedTexture {
            slot: slot.into(),
            source: source.to_path_buf(),
        });
    }

    /// Record a non-fatal issue.
    pub fn warn(&mut self, warning: Error) {
        self.warnings.push(warning);
    }

    /// Value of a property by name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.iter().find_map(|e| match e {
            Entry::Property { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// Value of a uniform by name.
    pub fn get_uniform(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.iter().find_map(|e| match e {
            Entry::Uniform { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over comment texts.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Comment(c) => Some(c.as_str()),
            _ => None,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn warnings(&self) -> &[Error] {
        &self.warnings
    }

    /// Take the collected warnings, leaving none behind.
    pub fn take_warnings(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.warnings)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
