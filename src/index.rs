//! Identifier resolution.
//!
//! Unity names assets by opaque identifiers stored in `.meta` sidecars next
//! to each asset. [`IdentifierIndex`] maps those identifiers back to paths;
//! [`FileNameIndex`] does the same for bare file names, which is how the
//! brush catalog refers to textures and shaders.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};
use walkdir::WalkDir;

/// Opaque project-unique asset identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(String);

impl AssetId {
    /// Parse an identifier token. Returns `None` for empty or malformed input.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a source asset, either by identifier or by file name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssetRef {
    Id(AssetId),
    File(String),
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::File(name) => f.write_str(name),
        }
    }
}

/// Anything that can turn an [`AssetRef`] into a filesystem path.
pub trait ResolveAsset {
    /// Resolve a reference; `None` means unresolved.
    fn resolve(&self, reference: &AssetRef) -> Option<PathBuf>;
}

/// Identifier → asset path mapping, built once per run.
#[derive(Clone, Debug, Default)]
pub struct IdentifierIndex {
    entries: BTreeMap<AssetId, PathBuf>,
}

impl IdentifierIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `assets_root` for `.meta` sidecars.
    pub fn build(assets_root: &Path) -> Self {
        Self::build_with_extension(assets_root, "meta")
    }

    /// Scan `assets_root` for sidecars with the given extension.
    ///
    /// Unreadable or malformed sidecars are skipped. When two sidecars
    /// declare the same identifier the one visited last wins.
    pub fn build_with_extension(assets_root: &Path, extension: &str) -> Self {
        let mut index = Self::new();
        let mut scanned = 0usize;

        for entry in WalkDir::new(assets_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(extension)
            {
                continue;
            }
            scanned += 1;

            let Some(id) = read_sidecar_id(path) else {
                debug!("skipping sidecar without identifier: {}", path.display());
                continue;
            };
            let asset_path = path.with_extension("");
            if let Some(previous) = index.entries.insert(id.clone(), asset_path) {
                debug!("duplicate identifier {} (was {})", id, previous.display());
            }
        }

        info!("Indexed {} identifiers from {} sidecars", index.len(), scanned);
        index
    }

    /// Record an identifier; returns the path it replaced, if any.
    pub fn insert(&mut self, id: AssetId, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.entries.insert(id, path.into())
    }

    /// Look up an identifier.
    pub fn get(&self, id: &AssetId) -> Option<&Path> {
        self.entries.get(id).map(|p| p.as_path())
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResolveAsset for IdentifierIndex {
    fn resolve(&self, reference: &AssetRef) -> Option<PathBuf> {
        match reference {
            AssetRef::Id(id) => self.get(id).map(Path::to_path_buf),
            AssetRef::File(_) => None,
        }
    }
}

/// Extract the first `guid:` line of a sidecar.
fn read_sidecar_id(path: &Path) -> Option<AssetId> {
    let bytes = std::fs::read(path).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    text.lines()
        .find_map(|line| line.strip_prefix("guid: "))
        .and_then(AssetId::parse)
}

/// Bare file name → first path found under a list of roots.
#[derive(Clone, Debug, Default)]
pub struct FileNameIndex {
    entries: BTreeMap<String, PathBuf>,
}

impl FileNameIndex {
    /// Walk each root in order; earlier roots take priority.
    pub fn build(roots: &[PathBuf]) -> Self {
        let mut entries = BTreeMap::new();
        for root in roots {
            for entry in WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                entries.entry(name).or_insert_with(|| entry.into_path());
            }
            trace!("file index now holds {} names after {}", entries.len(), root.display());
        }
        Self { entries }
    }

    pub fn get(&self, file_name: &str) -> Option<&Path> {
        self.entries.get(file_name).map(|p| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResolveAsset for FileNameIndex {
    fn resolve(&self, reference: &AssetRef) -> Option<PathBuf> {
        match reference {
            AssetRef::File(name) => self.get(name).map(Path::to_path_buf),
            AssetRef::Id(_) => None,
        }
    }
}

/// Combined resolver over both indices.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    ids: &'a IdentifierIndex,
    files: Option<&'a FileNameIndex>,
}

impl<'a> Resolver<'a> {
    pub fn new(ids: &'a IdentifierIndex) -> Self {
        Self { ids, files: None }
    }

    pub fn with_files(mut self, files: &'a FileNameIndex) -> Self {
        self.files = Some(files);
        self
    }
}

impl ResolveAsset for Resolver<'_> {
    fn resolve(&self, reference: &AssetRef) -> Option<PathBuf> {
        match reference {
            AssetRef::Id(_) => self.ids.resolve(reference),
            AssetRef::File(_) => self.files.and_then(|f| f.resolve(reference)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn id(s: &str) -> AssetId {
        AssetId::parse(s).unwrap()
    }

    #[test]
    fn test_asset_id_parse() {
        assert_eq!(id(" 3b2f0c ").as_str(), "3b2f0c");
        assert!(AssetId::parse("").is_none());
        assert!(AssetId::parse("not an id").is_none());
    }

    #[test]
    fn test_build_skips_malformed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Textures")).unwrap();
        fs::write(
            root.join("Textures/ink.png.meta"),
            "fileFormatVersion: 2\nguid: aaaa1111\nTextureImporter:\n",
        )
        .unwrap();
        fs::write(root.join("Textures/broken.png.meta"), "fileFormatVersion: 2\n").unwrap();
        fs::write(root.join("Textures/binary.meta"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(root.join("Textures/ink.png"), b"png").unwrap();

        let index = IdentifierIndex::build(root);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&id("aaaa1111")), Some(root.join("Textures/ink.png").as_path()));
    }

    #[test]
    fn test_duplicate_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("a.shader.meta"), "guid: dup\n").unwrap();
        fs::write(root.join("b.shader.meta"), "guid: dup\n").unwrap();

        let index = IdentifierIndex::build(root);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&id("dup")), Some(root.join("b.shader").as_path()));
    }

    #[test]
    fn test_first_guid_line_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.mat.meta"), "guid: first\nguid: second\n").unwrap();
        let index = IdentifierIndex::build(dir.path());
        assert!(index.contains(&id("first")));
        assert!(!index.contains(&id("second")));
    }

    #[test]
    fn test_file_name_index_priority() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(a.join("nested")).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(b.join("tex.png"), b"b").unwrap();
        fs::write(a.join("nested/tex.png"), b"a").unwrap();

        let files = FileNameIndex::build(&[a.clone(), b]);
        assert_eq!(files.get("tex.png"), Some(a.join("nested/tex.png").as_path()));

        let ids = IdentifierIndex::new();
        let resolver = Resolver::new(&ids).with_files(&files);
        assert!(resolver.resolve(&AssetRef::File("tex.png".into())).is_some());
        assert!(resolver.resolve(&AssetRef::Id(id("ffff"))).is_none());
        assert!(Resolver::new(&ids).resolve(&AssetRef::File("tex.png".into())).is_none());
    }
}
