//! Target-engine document model.
//!
//! This module provides:
//! - [`PropertyList`] - ordered assignments built by the mapping engine
//! - [`Document`] - a `.tres` resource with derived external declarations
//! - [`ImportSidecar`] - `.import` settings for copied textures

mod document;
mod import;
mod property;

pub use document::{Document, ExtResource, Line, ResourceType};
pub use import::ImportSidecar;
pub use property::{Entry, PropertyList, PropertyValue, ResourceKind, ResourceRef};
