//! End-to-end conversion of a small synthetic asset tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use brushport::prelude::*;
use tempfile::TempDir;
use walkdir::WalkDir;

const GLOW_SHADER: &str = r#"Shader "Brush/Special/Glow" {
Properties {
    _MainTex ("Texture", 2D) = "white" {}
    _EmissionGain ("Emission Gain", Range(0, 1)) = 0.5
}
SubShader {
    Tags { "Queue"="Transparent" }
    Cull Off ZWrite Off
    Blend One One
    CGPROGRAM
    #pragma vertex vert
    #pragma fragment frag
    v2f vert (appdata_t v) { v2f o; o.vertex = UnityObjectToClipPos(v.vertex); return o; }
    fixed4 frag (v2f i) : COLOR { return tex2D(_MainTex, i.texcoord) * _EmissionGain; }
    ENDCG
}
}
"#;

const STANDARD_SHADER: &str = "Shader \"Brush/StandardDoubleSided\" {\nSubShader {\nCull Off\n}\n}\n";

const GLOW_ID: &str = "a0000000000000000000000000000001";
const STANDARD_ID: &str = "a0000000000000000000000000000002";
const INK_TEX_ID: &str = "b0000000000000000000000000000001";

fn meta(path: &Path, id: &str) {
    let mut sidecar = path.as_os_str().to_owned();
    sidecar.push(".meta");
    fs::write(PathBuf::from(sidecar), format!("fileFormatVersion: 2\nguid: {}\n", id)).unwrap();
}

fn write(path: &Path, contents: impl AsRef<[u8]>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn material(name: &str, shader_id: &str, floats: &[(&str, f64)]) -> String {
    let mut text = format!(
        "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n--- !u!21 &2100000\nMaterial:\n  m_Name: {}\n  m_Shader: {{fileID: 4800000, guid: {}, type: 3}}\n  m_SavedProperties:\n    m_TexEnvs:\n    - _MainTex:\n        m_Texture: {{fileID: 2800000, guid: {}, type: 3}}\n        m_Scale: {{x: 1, y: 1}}\n        m_Offset: {{x: 0, y: 0}}\n    m_Floats:\n",
        name, shader_id, INK_TEX_ID
    );
    for (key, value) in floats {
        text.push_str(&format!("    - {}: {}\n", key, value));
    }
    text.push_str("    m_Colors:\n    - _Color: {r: 1, g: 1, b: 1, a: 1}\n");
    text
}

/// Two glow brushes sharing one shader, a standard brush, a brush whose
/// shader is missing and one unparseable document.
fn fixture(root: &Path) -> ExportConfig {
    let assets = root.join("Assets");
    let brushes = assets.join("Resources").join("Brushes");

    let glow = assets.join("Shaders/Glow.shader");
    write(&glow, GLOW_SHADER);
    meta(&glow, GLOW_ID);
    let standard = assets.join("Shaders/StandardDoubleSided.shader");
    write(&standard, STANDARD_SHADER);
    meta(&standard, STANDARD_ID);
    let tex = assets.join("Textures/ink.png");
    write(&tex, b"\x89PNG fake");
    meta(&tex, INK_TEX_ID);

    write(&brushes.join("Special/Glow/Glow.mat"), material("Glow", GLOW_ID, &[("_EmissionGain", 0.5)]));
    write(&brushes.join("Special/Neon/Neon.mat"), material("Neon", GLOW_ID, &[]));
    write(
        &brushes.join("Basic/Ink/Ink.mat"),
        material("Ink", STANDARD_ID, &[("_Glossiness", 0.8), ("_Metallic", 0.2)]),
    );
    write(
        &brushes.join("Basic/Lost/Lost.mat"),
        material("Lost", "deadbeefdeadbeefdeadbeefdeadbeef", &[]),
    );
    write(&brushes.join("Basic/Broken/Broken.mat"), "not: a material\n");

    ExportConfig {
        brush_root: brushes,
        assets_root: assets,
        output_root: root.join("out"),
        ..Default::default()
    }
}

fn run(config: ExportConfig) -> RunSummary {
    let mut pipeline = Pipeline::new(config).unwrap();
    pipeline.run();
    pipeline.into_summary()
}

fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_run_summary() {
    let dir = TempDir::new().unwrap();
    let summary = run(fixture(dir.path()));

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.errors(), 1);
    assert_eq!(summary.failures[0].stage, Stage::Parsed);
    assert!(summary.failures[0].source.ends_with("Broken.mat"));
    assert_eq!(summary.by_strategy["ShaderMaterial"], 2);
    assert_eq!(summary.by_strategy["StandardMaterial3D"], 2);
    assert!(summary.missing_shaders.contains("deadbeefdeadbeefdeadbeefdeadbeef"));
    assert!(summary.missing_textures.is_empty());
    assert_eq!(summary.shaders_generated, 1);
    assert_eq!(summary.shaders_reused, 0);
}

#[test]
fn test_shader_generated_once() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    let out = config.output_root.clone();
    let summary = run(config);

    assert_eq!(summary.shaders_generated, 1);
    let program = fs::read_to_string(out.join("Shaders/Glow.gdshader")).unwrap();
    assert!(program.starts_with("// Converted from Unity shader: Assets/Shaders/Glow.shader\n"));
    assert!(program.contains("shader_type spatial;"));
    assert!(program.contains("render_mode cull_disabled, depth_draw_never, blend_add;"));

    for name in ["Special/Glow/Glow.tres", "Special/Neon/Neon.tres"] {
        let text = fs::read_to_string(out.join(name)).unwrap();
        assert!(text.starts_with("[gd_resource type=\"ShaderMaterial\" format=3]\n"));
        assert!(text.contains("[ext_resource type=\"Shader\" path=\"res://out/Shaders/Glow.gdshader\" id=\"1\"]"));
        assert!(text.contains("shader = ExtResource(\"1\")"));
        assert!(text.contains("shader_parameter/MainTex = ExtResource(\"2\")"));
    }
}

#[test]
fn test_gloss_metal() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    let out = config.output_root.clone();
    run(config);

    let text = fs::read_to_string(out.join("Basic/Ink/Ink.tres")).unwrap();
    assert!(text.starts_with("[gd_resource type=\"StandardMaterial3D\" format=3]\n"));
    assert!(text.contains("resource_name = \"Ink\"\n"));
    assert!(text.contains("metallic = 0.2\n"));
    assert!(text.contains("roughness = 0.2\n"));
    assert!(text.contains("cull_mode = 2\n"));
    assert!(text.contains("albedo_texture = ExtResource(\"1\")\n"));
    assert!(text.contains("[ext_resource type=\"Texture2D\" path=\"res://out/Basic/Ink/ink.png\" id=\"1\"]"));
    assert!(out.join("Basic/Ink/ink.png").is_file());
    assert!(out.join("Basic/Ink/ink.png.import").is_file());
}

#[test]
fn test_missing_shader_degrades_to_standard() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    let out = config.output_root.clone();
    let summary = run(config);

    let text = fs::read_to_string(out.join("Basic/Lost/Lost.tres")).unwrap();
    assert!(text.starts_with("[gd_resource type=\"StandardMaterial3D\" format=3]\n"));
    assert!(text.contains("# MISSING: shader deadbeefdeadbeefdeadbeefdeadbeef could not be resolved\n"));
    assert!(text.contains("albedo_texture = ExtResource(\"1\")"));
    assert!(summary.warnings >= 1);
}

#[test]
fn test_reference_integrity() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    let out = config.output_root.clone();
    run(config);

    for (path, bytes) in read_tree(&out) {
        if path.extension().and_then(|e| e.to_str()) != Some("tres") {
            continue;
        }
        let text = String::from_utf8(bytes).unwrap();
        let mut declared = BTreeSet::new();
        for line in text.lines().filter(|l| l.starts_with("[ext_resource ")) {
            let id = line.split("id=\"").nth(1).unwrap().trim_end_matches("\"]");
            assert!(declared.insert(id.to_string()), "duplicate id in {}", path.display());
            let res = line.split("path=\"res://out/").nth(1).unwrap().split('"').next().unwrap();
            assert!(out.join(res).is_file(), "{} declares missing {}", path.display(), res);
        }
        for used in text.split("ExtResource(\"").skip(1) {
            let id = used.split('"').next().unwrap();
            if id != "<id>" {
                assert!(declared.contains(id), "{} uses undeclared {}", path.display(), id);
            }
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = fixture(&dir.path().join("a"));
    let second = fixture(&dir.path().join("b"));
    let (first_out, second_out) = (first.output_root.clone(), second.output_root.clone());
    run(first);
    run(second);

    let a = read_tree(&first_out);
    let b = read_tree(&second_out);
    assert!(!a.is_empty());
    assert_eq!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
    for (path, bytes) in &a {
        assert_eq!(Some(bytes), b.get(path), "{} differs", path.display());
    }
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    let out = config.output_root.clone();

    run(config.clone());
    let before = read_tree(&out);
    let again = run(config);
    let after = read_tree(&out);

    assert_eq!(again.textures_copied, 0);
    assert_eq!(again.shaders_generated, 0);
    assert_eq!(again.shaders_reused, 1);
    assert_eq!(again.processed, 4);
    assert_eq!(before, after);
}

#[test]
fn test_material_and_program_colocated() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    let rainbow = config.brush_root.join("Special/Rainbow");
    let shader = rainbow.join("Rainbow.shader");
    write(&shader, GLOW_SHADER);
    meta(&shader, "a0000000000000000000000000000003");
    write(
        &rainbow.join("Rainbow.mat"),
        material("Rainbow", "a0000000000000000000000000000003", &[]),
    );
    let out = config.output_root.clone();
    run(config);

    let text = fs::read_to_string(out.join("Special/Rainbow/Rainbow.tres")).unwrap();
    assert!(text.contains("[ext_resource type=\"Shader\" path=\"res://out/Special/Rainbow/Rainbow.gdshader\" id=\"1\"]"));
    assert!(out.join("Special/Rainbow/Rainbow.gdshader").is_file());
    assert!(!out.join("Brushes").exists());
}

#[test]
fn test_unrecognized_directive_still_emits() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    write(
        &config.assets_root.join("Shaders/StandardDoubleSided.shader"),
        "Shader \"Brush/StandardDoubleSided\" {\nSubShader {\nCull Off\nZTest Greater\n}\n}\n",
    );
    let out = config.output_root.clone();
    let summary = run(config);

    assert_eq!(summary.processed, 4);
    assert!(summary.unmapped >= 1);
    let text = fs::read_to_string(out.join("Basic/Ink/Ink.tres")).unwrap();
    assert!(text.starts_with("[gd_resource type=\"StandardMaterial3D\" format=3]\n"));
    assert!(text.contains("[resource]\n"));
    assert!(text.contains("# TODO: ZTest Greater\n"));
    assert!(text.contains("cull_mode = 2\n"));
    assert!(text.contains("metallic = 0.2\n"));
    assert!(text.contains("albedo_texture = ExtResource(\"1\")\n"));
}

#[test]
fn test_builtin_and_numeric_identifiers() {
    let dir = TempDir::new().unwrap();
    let config = fixture(dir.path());
    write(
        &config.brush_root.join("Basic/Builtin/Builtin.mat"),
        "%YAML 1.1\n--- !u!21 &2100000\nMaterial:\n  m_Name: Builtin\n  m_Shader: {fileID: 46, guid: 0000000000000000e000000000000000, type: 0}\n  m_SavedProperties:\n    m_TexEnvs:\n    - _MainTex:\n        m_Texture: {fileID: 2800000, guid: 11111111111111112222222222222222, type: 3}\n        m_Scale: {x: 1, y: 1}\n        m_Offset: {x: 0, y: 0}\n",
    );
    let out = config.output_root.clone();
    let summary = run(config);

    assert_eq!(summary.processed, 5);
    assert_eq!(summary.errors(), 1);
    assert!(summary.missing_shaders.contains("0000000000000000e000000000000000"));
    assert!(summary.missing_textures.contains("11111111111111112222222222222222"));

    let text = fs::read_to_string(out.join("Basic/Builtin/Builtin.tres")).unwrap();
    assert!(text.contains("# MISSING: shader 0000000000000000e000000000000000 could not be resolved\n"));
    assert!(text.contains("# MISSING: _MainTex texture 11111111111111112222222222222222 could not be resolved\n"));
    assert!(!text.contains("[ext_resource"));
}
