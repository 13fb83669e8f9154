//! Batch driver.
//!
//! Every material runs through `Parsed → StrategyChosen → PropertiesMapped
//! → [ShaderGenerated] → Emitted`. A failure stops that material only; it is
//! logged and recorded in the [`RunSummary`] with the stage it failed at.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ExportConfig;
use crate::emit::{EmitReport, Emitter};
use crate::index::{AssetRef, FileNameIndex, IdentifierIndex, ResolveAsset, Resolver};
use crate::mapping::{self, choose_strategy, MapContext, ShaderBinding, TranslationStrategy};
use crate::source::{BrushCatalog, MaterialDescriptor, ShaderDirectiveSet};
use crate::util::{Error, Result};

/// Processing stage of one material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Parsed,
    StrategyChosen,
    PropertiesMapped,
    ShaderGenerated,
    Emitted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parsed => "parse",
            Self::StrategyChosen => "strategy",
            Self::PropertiesMapped => "mapping",
            Self::ShaderGenerated => "shader generation",
            Self::Emitted => "emit",
        };
        f.write_str(s)
    }
}

/// A material that could not be converted.
#[derive(Debug)]
pub struct Failure {
    /// Source document, or `brush/variant` for catalog materials.
    pub source: PathBuf,
    /// Stage that did not complete.
    pub stage: Stage,
    pub error: Error,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} failed): {}", self.source.display(), self.stage, self.error)
    }
}

/// Aggregate counts of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Documents written.
    pub processed: usize,
    pub failures: Vec<Failure>,
    /// Non-fatal issues left as markers in the documents.
    pub warnings: usize,
    pub unmapped: usize,
    pub missing_shaders: BTreeSet<String>,
    pub missing_textures: BTreeSet<String>,
    pub shaders_generated: usize,
    pub shaders_reused: usize,
    pub textures_copied: usize,
    /// Materials per source shader name (catalog runs).
    pub shader_usage: BTreeMap<String, usize>,
    pub by_strategy: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn errors(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Materials converted: {}", self.processed)?;
        for (strategy, count) in &self.by_strategy {
            writeln!(f, "  {}: {}", strategy, count)?;
        }
        writeln!(f, "Errors: {}", self.failures.len())?;
        writeln!(f, "Warnings: {} ({} unmapped)", self.warnings, self.unmapped)?;
        writeln!(
            f,
            "Shaders generated: {} (reused {})",
            self.shaders_generated, self.shaders_reused
        )?;
        writeln!(f, "Textures copied: {}", self.textures_copied)?;

        if !self.missing_shaders.is_empty() {
            writeln!(f, "Missing shaders ({}):", self.missing_shaders.len())?;
            for s in &self.missing_shaders {
                writeln!(f, "  {}", s)?;
            }
        }
        if !self.missing_textures.is_empty() {
            writeln!(f, "Missing textures ({}):", self.missing_textures.len())?;
            for t in &self.missing_textures {
                writeln!(f, "  {}", t)?;
            }
        }
        if !self.shader_usage.is_empty() {
            let mut usage: Vec<_> = self.shader_usage.iter().collect();
            usage.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            writeln!(f, "Top shaders:")?;
            for (name, count) in usage.into_iter().take(10) {
                writeln!(f, "  {}: {} materials", name, count)?;
            }
        }
        for failure in self.failures.iter().take(10) {
            writeln!(f, "  - {}", failure)?;
        }
        Ok(())
    }
}

/// One material ready for translation.
struct Job {
    source: PathBuf,
    material: MaterialDescriptor,
    directives: ShaderDirectiveSet,
    binding: ShaderBinding,
    out_dir: PathBuf,
    /// Catalog brushes are vertex-colored; enable it on built-in materials.
    vertex_color_albedo: bool,
}

/// Conversion run over one asset tree.
pub struct Pipeline {
    config: ExportConfig,
    index: IdentifierIndex,
    emitter: Emitter,
    summary: RunSummary,
}

impl Pipeline {
    /// Build the identifier index and set up a run.
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        let index = IdentifierIndex::build_with_extension(&config.assets_root, &config.metadata_extension);
        Ok(Self::with_index(config, index))
    }

    /// Set up a run over a prebuilt index.
    pub fn with_index(config: ExportConfig, index: IdentifierIndex) -> Self {
        let emitter = Emitter::new(&config);
        Self {
            config,
            index,
            emitter,
            summary: RunSummary::default(),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn index(&self) -> &IdentifierIndex {
        &self.index
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    /// Material documents under the brush root, sorted.
    pub fn discover(&self) -> Vec<PathBuf> {
        let ext = self.config.material_extension.as_str();
        WalkDir::new(&self.config.brush_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some(ext))
            .map(|e| e.into_path())
            .collect()
    }

    /// Convert every material under the brush root.
    pub fn run(&mut self) -> &RunSummary {
        let materials = self.discover();
        info!(
            "Converting {} materials from {}",
            materials.len(),
            self.config.brush_root.display()
        );
        for path in materials {
            // Failures are already recorded in the summary.
            let _ = self.convert_material(&path);
        }
        self.finish()
    }

    /// Convert one material document.
    pub fn convert_material(&mut self, path: &Path) -> Option<EmitReport> {
        let material = match MaterialDescriptor::parse(path) {
            Ok(m) => m,
            Err(error) => {
                self.fail(path.to_path_buf(), Stage::Parsed, error);
                return None;
            }
        };
        debug!("parsed {} ({})", material.name, path.display());

        let binding = match &material.shader {
            None => ShaderBinding::None,
            Some(reference) => match self.index.resolve(reference).filter(|p| p.is_file()) {
                Some(p) => ShaderBinding::resolved(p),
                None => ShaderBinding::Unresolved {
                    reference: reference.to_string(),
                    name: None,
                },
            },
        };
        let directives = ShaderDirectiveSet::extract(binding.path());
        let out_dir = self.direct_out_dir(path);

        let job = Job {
            source: path.to_path_buf(),
            material,
            directives,
            binding,
            out_dir,
            vertex_color_albedo: false,
        };
        let resolver = Resolver::new(&self.index);
        translate(job, &resolver, &self.config, &mut self.emitter, &mut self.summary)
    }

    /// Output directory of a material: its folder relative to the brush
    /// root, mirrored under the output root. Generated shaders use the same
    /// layout, so a brush's document and program end up side by side.
    fn direct_out_dir(&self, path: &Path) -> PathBuf {
        let rel = path
            .parent()
            .and_then(|p| p.strip_prefix(&self.config.brush_root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.config.output_root.join(rel)
    }

    /// Convert every brush of a catalog.
    pub fn run_catalog(&mut self, catalog: &BrushCatalog) -> &RunSummary {
        let files = FileNameIndex::build(&self.config.file_search_roots());
        info!(
            "Converting {} catalog brushes ({} searchable files)",
            catalog.len(),
            files.len()
        );
        let resolver = Resolver::new(&self.index).with_files(&files);

        for (id, brush) in &catalog.brushes {
            let out_dir = self.config.output_root.join(brush.folder_name());
            let directives = brush.directives();
            debug!("brush {} ({})", brush.name, id);

            for variant in brush.materials() {
                if let Some(name) = &variant.shader_name {
                    *self.summary.shader_usage.entry(name.clone()).or_default() += 1;
                }
                let binding = match (&variant.material.shader, &variant.shader_name) {
                    (Some(reference), name) => match resolver.resolve(reference).filter(|p| p.is_file()) {
                        Some(path) => ShaderBinding::Resolved {
                            path,
                            name: name.clone().unwrap_or_default(),
                        },
                        None => ShaderBinding::Unresolved {
                            reference: reference.to_string(),
                            name: name.clone(),
                        },
                    },
                    (None, _) => ShaderBinding::None,
                };
                let job = Job {
                    source: PathBuf::from(&brush.name).join(&variant.material.name),
                    material: variant.material,
                    directives: directives.clone(),
                    binding,
                    out_dir: out_dir.clone(),
                    vertex_color_albedo: true,
                };
                translate(job, &resolver, &self.config, &mut self.emitter, &mut self.summary);
            }
        }
        self.finish()
    }

    fn fail(&mut self, source: PathBuf, stage: Stage, error: Error) {
        record_failure(&mut self.summary, source, stage, error);
    }

    fn finish(&mut self) -> &RunSummary {
        self.summary.shaders_generated = self.emitter.shaders().generated();
        self.summary.shaders_reused = self.emitter.shaders().reused();
        info!(
            "Done: {} converted, {} failed",
            self.summary.processed,
            self.summary.failures.len()
        );
        &self.summary
    }
}

fn record_failure(summary: &mut RunSummary, source: PathBuf, stage: Stage, error: Error) {
    warn!("{} failed at {}: {}", source.display(), stage, error);
    summary.failures.push(Failure { source, stage, error });
}

/// Strategy, mapping, shader generation and emission for one material.
fn translate(
    mut job: Job,
    resolver: &dyn ResolveAsset,
    config: &ExportConfig,
    emitter: &mut Emitter,
    summary: &mut RunSummary,
) -> Option<EmitReport> {
    let strategy = choose_strategy(job.binding.resolved_name());
    debug!("{}: {}", job.source.display(), strategy);

    if strategy == TranslationStrategy::StandardEquivalent && job.vertex_color_albedo {
        job.material
            .scalars
            .insert("VertexColorUseAsAlbedo".to_string(), 1.0);
    }

    if let ShaderBinding::Unresolved { reference, .. } = &job.binding {
        summary.missing_shaders.insert(reference.clone());
    }
    for binding in job.material.textures.values() {
        if resolver.resolve(&binding.texture).filter(|p| p.is_file()).is_none() {
            summary.missing_textures.insert(match &binding.texture {
                AssetRef::Id(id) => id.to_string(),
                AssetRef::File(name) => name.clone(),
            });
        }
    }

    let ctx = MapContext {
        resolver,
        shader: &job.binding,
        project_root: config.project_root(),
    };
    let mut props = mapping::map(&job.material, &job.directives, strategy, &ctx);
    for warning in props.take_warnings() {
        debug!("{}: {}", job.source.display(), warning);
        summary.warnings += 1;
        if matches!(warning, Error::UnmappedProperty(_)) {
            summary.unmapped += 1;
        }
    }

    if strategy == TranslationStrategy::CustomProgram {
        if let Some(path) = job.binding.path() {
            if let Err(error) = emitter.generate_shader(path) {
                record_failure(summary, job.source, Stage::ShaderGenerated, error);
                return None;
            }
        }
    }

    match emitter.emit(&job.material.name, strategy, &props, &job.out_dir) {
        Ok(report) => {
            summary.processed += 1;
            summary.textures_copied += report.textures_copied;
            *summary.by_strategy.entry(strategy.to_string()).or_default() += 1;
            info!("[OK] {}", report.path.display());
            Some(report)
        }
        Err(error) => {
            record_failure(summary, job.source, Stage::Emitted, error);
            None
        }
    }
}
