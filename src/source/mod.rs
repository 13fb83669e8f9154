//! Source-engine asset readers.
//!
//! This module provides:
//! - [`MaterialDescriptor`] - parsed `.mat` material documents
//! - [`ShaderDirectiveSet`] - render state declared in shader sources
//! - [`BrushCatalog`] - the pre-synthesized brush catalog

mod catalog;
mod directives;
mod material;

pub use catalog::{
    shader_base_name, shader_file_name, BrushCatalog, CatalogBrush, CatalogColor,
    CatalogMaterial, CatalogParams, CatalogTextures, CatalogVariant,
};
pub use directives::{BlendFactors, ShaderDirectiveSet};
pub use material::{parse_material, Color, MaterialDescriptor, TextureBinding};
