//! Export configuration.
//!
//! Loaded from an optional JSON file; every field has a default matching the
//! usual Unity project layout so an empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::{Error, Result};

/// Paths and switches for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Root of the source asset tree (scanned for `.meta` sidecars).
    pub assets_root: PathBuf,
    /// Subtree holding the brush materials to convert.
    pub brush_root: PathBuf,
    /// Output directory; its name becomes the first `res://` segment.
    pub output_root: PathBuf,
    /// Brush catalog used by the catalog entry path.
    pub catalog: PathBuf,
    /// Extra roots searched by file name before the assets root
    /// (catalog textures and shaders).
    pub search_roots: Vec<PathBuf>,
    /// Write a `.import` sidecar next to every newly copied texture.
    pub write_import_files: bool,
    /// Extension of material documents.
    pub material_extension: String,
    /// Extension of identifier sidecars.
    pub metadata_extension: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let assets_root = PathBuf::from("Assets");
        Self {
            brush_root: assets_root.join("Resources").join("Brushes"),
            assets_root,
            output_root: PathBuf::from("godot_brush_materials"),
            catalog: PathBuf::from("canonical_brushes.json"),
            search_roots: Vec::new(),
            write_import_files: true,
            material_extension: "mat".to_string(),
            metadata_extension: "meta".to_string(),
        }
    }
}

impl ExportConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.output_root.file_name().is_none() {
            return Err(Error::Config(format!(
                "output_root must name a directory: {}",
                self.output_root.display()
            )));
        }
        if self.material_extension.is_empty() || self.metadata_extension.is_empty() {
            return Err(Error::Config("file extensions must not be empty".into()));
        }
        Ok(())
    }

    /// First segment of every emitted `res://` path.
    pub fn res_root_name(&self) -> String {
        self.output_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "materials".to_string())
    }

    /// Directory that source paths are displayed relative to.
    pub fn project_root(&self) -> Option<&Path> {
        self.assets_root.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// Roots searched by file name, in priority order.
    pub fn file_search_roots(&self) -> Vec<PathBuf> {
        let mut roots = self.search_roots.clone();
        if !roots.contains(&self.assets_root) {
            roots.push(self.assets_root.clone());
        }
        roots
    }
}
