//! # brushport
//!
//! Converts Unity brush materials and shaders into Godot 4 resources.
//!
//! The source side is a Unity asset tree: `.meta` sidecars carrying asset
//! identifiers, YAML `.mat` material documents and ShaderLab `.shader`
//! sources. The target side is a directory of `.tres` material documents
//! with copied textures, `.import` sidecars and best-effort `.gdshader`
//! programs. Translation is partial by nature: anything without a rule is
//! kept as a comment marker in the emitted document.
//!
//! ## Modules
//!
//! - [`util`] - Errors and text formatting
//! - [`config`] - Run configuration
//! - [`index`] - Identifier and file-name resolution
//! - [`source`] - Material, shader directive and catalog readers
//! - [`mapping`] - Strategy choice and property mapping
//! - [`godot`] - Target document model
//! - [`emit`] - Document, texture and shader output
//! - [`pipeline`] - Batch driver and run summary
//!
//! ## Example
//!
//! ```ignore
//! use brushport::prelude::*;
//!
//! let mut pipeline = Pipeline::new(ExportConfig::default())?;
//! let summary = pipeline.run();
//! println!("{}", summary);
//! ```

pub mod util;
pub mod config;
pub mod index;
pub mod source;
pub mod mapping;
pub mod godot;
pub mod emit;
pub mod pipeline;

// Re-export commonly used types
pub use util::{Error, Result};
pub use shader_port::transpile;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::config::ExportConfig;
    pub use crate::index::{AssetId, AssetRef, FileNameIndex, IdentifierIndex, ResolveAsset, Resolver};
    pub use crate::source::{BrushCatalog, MaterialDescriptor, ShaderDirectiveSet};
    pub use crate::mapping::{choose_strategy, map, MapContext, ShaderBinding, TranslationStrategy};
    pub use crate::godot::{Document, PropertyList, PropertyValue};
    pub use crate::emit::{EmitReport, Emitter, ShaderCache};
    pub use crate::pipeline::{Failure, Pipeline, RunSummary, Stage};
}
