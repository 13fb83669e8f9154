//! Output side of the pipeline.
//!
//! [`Emitter`] turns a [`PropertyList`] into a `.tres` document on disk,
//! copying textures next to it and generating shader programs on first use
//! through the run-scoped [`ShaderCache`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::godot::{Document, ImportSidecar, PropertyList, ResourceKind, ResourceRef};
use crate::mapping::TranslationStrategy;
use crate::util::format::{display_path, slash_path};
use crate::util::{Error, Result};

/// Result of emitting one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Written `.tres` file.
    pub path: PathBuf,
    /// Number of external resource declarations.
    pub ext_resources: usize,
    pub textures_copied: usize,
}

/// Outcome of a shader request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderOutput {
    pub path: PathBuf,
    /// False when an earlier material or run already produced the file.
    pub generated: bool,
}

/// Generated shader programs of one run, keyed by source path.
#[derive(Debug)]
pub struct ShaderCache {
    output_root: PathBuf,
    brush_root: PathBuf,
    assets_root: PathBuf,
    project_root: Option<PathBuf>,
    entries: BTreeMap<PathBuf, PathBuf>,
    generated: usize,
    reused: usize,
}

impl ShaderCache {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            output_root: config.output_root.clone(),
            brush_root: config.brush_root.clone(),
            assets_root: config.assets_root.clone(),
            project_root: config.project_root().map(Path::to_path_buf),
            entries: BTreeMap::new(),
            generated: 0,
            reused: 0,
        }
    }

    /// Target path for a shader source: mirrored under the output root
    /// relative to the brush root, else the assets root.
    pub fn target_for(&self, source: &Path) -> PathBuf {
        let rel = source
            .strip_prefix(&self.brush_root)
            .or_else(|_| source.strip_prefix(&self.assets_root))
            .ok()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "shader".to_string());
        self.output_root.join(rel).join(format!("{}.gdshader", stem))
    }

    /// Return the program for `source`, transpiling it only if neither this
    /// run nor an earlier one produced it.
    pub fn ensure(&mut self, source: &Path) -> Result<ShaderOutput> {
        if let Some(path) = self.entries.get(source) {
            return Ok(ShaderOutput {
                path: path.clone(),
                generated: false,
            });
        }

        let target = self.target_for(source);
        let generated = if target.exists() {
            debug!("reusing existing shader {}", target.display());
            self.reused += 1;
            false
        } else {
            let bytes = std::fs::read(source).map_err(|e| Error::io(source, e))?;
            let code = shader_port::transpile(&String::from_utf8_lossy(&bytes));
            let text = format!(
                "// Converted from Unity shader: {}\n// Auto-converted with some manual TODOs remaining\n\n{}",
                display_path(source, self.project_root.as_deref()),
                code
            );
            write_atomic(&target, &text)?;
            info!("Generated shader {}", target.display());
            self.generated += 1;
            true
        };

        self.entries.insert(source.to_path_buf(), target.clone());
        Ok(ShaderOutput {
            path: target,
            generated,
        })
    }

    /// Programs transpiled by this cache.
    pub fn generated(&self) -> usize {
        self.generated
    }

    /// Programs an earlier run left on disk. Repeat requests within this
    /// run are not counted.
    pub fn reused(&self) -> usize {
        self.reused
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Writes material documents and their side files.
#[derive(Debug)]
pub struct Emitter {
    output_root: PathBuf,
    res_root: String,
    write_import_files: bool,
    shaders: ShaderCache,
}

impl Emitter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            output_root: config.output_root.clone(),
            res_root: config.res_root_name(),
            write_import_files: config.write_import_files,
            shaders: ShaderCache::new(config),
        }
    }

    pub fn shaders(&self) -> &ShaderCache {
        &self.shaders
    }

    /// Generate (or reuse) the program for a shader source.
    pub fn generate_shader(&mut self, source: &Path) -> Result<ShaderOutput> {
        self.shaders.ensure(source)
    }

    /// `res://` path of a file inside the output tree.
    pub fn res_path(&self, dest: &Path) -> String {
        res_path(&self.output_root, &self.res_root, dest)
    }

    /// Write `<out_dir>/<name>.tres`.
    pub fn emit(
        &mut self,
        name: &str,
        strategy: TranslationStrategy,
        props: &PropertyList,
        out_dir: &Path,
    ) -> Result<EmitReport> {
        std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;

        let mut copied = 0usize;
        let output_root = &self.output_root;
        let res_root = &self.res_root;
        let write_import_files = self.write_import_files;
        let shaders = &mut self.shaders;

        let doc = Document::build(strategy.resource_type(), props, |r: &ResourceRef| {
            let dest = match r.kind {
                ResourceKind::Texture2D => {
                    let (dest, fresh) = copy_texture(&r.source, out_dir)?;
                    if fresh {
                        copied += 1;
                        if write_import_files {
                            let file_name = dest
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_default();
                            ImportSidecar::new(file_name, res_path(output_root, res_root, &dest))
                                .write_next_to(&dest)?;
                        }
                    }
                    dest
                }
                ResourceKind::Shader => shaders.ensure(&r.source)?.path,
            };
            Ok(res_path(output_root, res_root, &dest))
        })?;

        let path = out_dir.join(format!("{}.tres", file_stem_for(name)));
        write_atomic(&path, &doc.serialize())?;
        debug!("wrote {}", path.display());

        Ok(EmitReport {
            path,
            ext_resources: doc.ext_resources().len(),
            textures_copied: copied,
        })
    }
}

/// `res://<output root name>/<dest relative to the output root>`.
fn res_path(output_root: &Path, res_root: &str, dest: &Path) -> String {
    match dest.strip_prefix(output_root) {
        Ok(rel) => format!("res://{}/{}", res_root, slash_path(rel)),
        Err(_) => {
            let name = dest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("res://{}/{}", res_root, name)
        }
    }
}

/// Material names may contain path separators; documents may not.
fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    if stem.is_empty() {
        "material".to_string()
    } else {
        stem
    }
}

/// Copy a texture into `out_dir` unless a file of that name is already
/// there. Returns the destination and whether a copy happened.
pub fn copy_texture(source: &Path, out_dir: &Path) -> Result<(PathBuf, bool)> {
    let file_name = source
        .file_name()
        .ok_or_else(|| Error::UnresolvedReference(source.display().to_string()))?;
    let dest = out_dir.join(file_name);
    if dest.exists() {
        return Ok((dest, false));
    }
    std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
    std::fs::copy(source, &dest).map_err(|e| Error::io(source, e))?;
    debug!("copied {} -> {}", source.display(), dest.display());
    Ok((dest, true))
}

/// Write through a temporary sibling and rename, so a document is either
/// fully written or absent.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents).map_err(|e| Error::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::godot::PropertyValue;
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &Path) -> ExportConfig {
        let assets_root = root.join("Assets");
        ExportConfig {
            brush_root: assets_root.join("Resources").join("Brushes"),
            assets_root,
            output_root: root.join("out"),
            ..Default::default()
        }
    }

    #[test]
    fn test_copy_texture_idempotent() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("ink.png");
        fs::write(&src, b"first").unwrap();
        let out = dir.path().join("out");

        let (dest, fresh) = copy_texture(&src, &out).unwrap();
        assert!(fresh);
        fs::write(&src, b"second").unwrap();
        let (again, fresh) = copy_texture(&src, &out).unwrap();
        assert!(!fresh);
        assert_eq!(dest, again);
        assert_eq!(fs::read(&dest).unwrap(), b"first");
    }

    #[test]
    fn test_shader_target_paths() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path());
        let cache = ShaderCache::new(&c);
        assert_eq!(
            cache.target_for(&c.brush_root.join("Special/Ink/Ink.shader")),
            c.output_root.join("Special/Ink/Ink.gdshader")
        );
        assert_eq!(
            cache.target_for(&c.assets_root.join("Shaders/Glow.shader")),
            c.output_root.join("Shaders/Glow.gdshader")
        );
    }

    #[test]
    fn test_shader_generated_once() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path());
        let src = c.assets_root.join("Shaders/Glow.shader");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, "Shader \"Glow\" { }").unwrap();

        let mut cache = ShaderCache::new(&c);
        let first = cache.ensure(&src).unwrap();
        let second = cache.ensure(&src).unwrap();
        assert!(first.generated);
        assert!(!second.generated);
        assert_eq!(first.path, second.path);
        assert_eq!((cache.generated(), cache.reused()), (1, 0));

        let text = fs::read_to_string(&first.path).unwrap();
        assert!(text.starts_with("// Converted from Unity shader: "));
        assert!(text.contains("shader_type spatial;"));

        // A fresh run finds the file and leaves it alone.
        fs::write(&first.path, "// edited by hand\n").unwrap();
        let mut next_run = ShaderCache::new(&c);
        assert!(!next_run.ensure(&src).unwrap().generated);
        assert!(!next_run.ensure(&src).unwrap().generated);
        assert_eq!((next_run.generated(), next_run.reused()), (0, 1));
        assert_eq!(fs::read_to_string(&first.path).unwrap(), "// edited by hand\n");
    }

    #[test]
    fn test_emit_document() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path());
        let tex = dir.path().join("ink.png");
        fs::write(&tex, b"png").unwrap();

        let mut props = PropertyList::new();
        props.set("resource_name", "Ink");
        props.set("albedo_texture", ResourceRef::texture(&tex));
        props.set("emission_texture", ResourceRef::texture(&tex));
        props.set("metallic", PropertyValue::Float(0.2));

        let mut emitter = Emitter::new(&c);
        let out_dir = c.output_root.join("Ink");
        let report = emitter
            .emit("Ink", TranslationStrategy::StandardEquivalent, &props, &out_dir)
            .unwrap();

        assert_eq!(report.path, out_dir.join("Ink.tres"));
        assert_eq!(report.ext_resources, 1);
        assert_eq!(report.textures_copied, 1);
        assert!(out_dir.join("ink.png.import").exists());

        let text = fs::read_to_string(&report.path).unwrap();
        assert!(text.contains("[ext_resource type=\"Texture2D\" path=\"res://out/Ink/ink.png\" id=\"1\"]"));
        assert!(text.contains("albedo_texture = ExtResource(\"1\")"));
        assert!(text.contains("emission_texture = ExtResource(\"1\")"));
        assert!(!out_dir.join("Ink.tres.tmp").exists());
    }

    #[test]
    fn test_file_stem_for() {
        assert_eq!(file_stem_for("Ink"), "Ink");
        assert_eq!(file_stem_for("a/b"), "a_b");
        assert_eq!(file_stem_for(""), "material");
    }
}
