//! Vertex and fragment stage recognition.
//!
//! Each stage looks for the function the source names in its `#pragma`,
//! emits what it can translate and keeps the original body as a comment.

use crate::properties::PropertyBlock;
use crate::scan::{contains_word, function_body, neutralize, pragma};

const INDENT: &str = "    ";

/// `void vertex()` for the source vertex function, if there is one.
pub fn vertex(code: &str) -> Option<String> {
    let name = pragma(code, "vertex").unwrap_or_else(|| "vert".to_string());
    let body = function_body(code, &name)?;
    let mut lines = Vec::new();

    if body.contains("UnityObjectToClipPos") || body.contains("UNITY_MATRIX_MVP") {
        lines.push("// Clip-space transform is applied by the engine; VERTEX stays in model space.".to_string());
    }
    if body.contains("TRANSFORM_TEX") {
        let tex = transform_tex_target(body).unwrap_or_else(|| "MainTex".to_string());
        lines.push(format!(
            "// UV = UV * {tex}_ST.xy + {tex}_ST.zw; (declare uniform vec4 {tex}_ST)",
            tex = tex
        ));
    }
    if ["TbVertToNative", "TbVertToSrgb", "TbVertToLinear", "GammaToLinearSpace", "LinearToGammaSpace"]
        .iter()
        .any(|f| body.contains(f))
    {
        lines.push("COLOR = COLOR; // vertex color space was converted here".to_string());
    }
    if body.contains("_Time") || body.contains("GetTime()") {
        lines.push("float anim_time = TIME;".to_string());
    }
    if lines.is_empty() {
        lines.push("// No recognized vertex idioms".to_string());
    }

    Some(render_stage("vertex", &name, &lines, body))
}

/// `void fragment()` for the source fragment or surface function.
pub fn fragment(code: &str, props: &PropertyBlock) -> Option<String> {
    let (name, body) = [
        pragma(code, "fragment"),
        pragma(code, "surface"),
        Some("frag".to_string()),
        Some("surf".to_string()),
    ]
    .into_iter()
    .flatten()
    .find_map(|name| function_body(code, &name).map(|body| (name, body)))?;

    let mut lines: Vec<String> = Vec::new();
    let refers = |name: &str| contains_word(body, &format!("_{}", name)) && props.has(name);

    let sampled = body.contains("tex2D") && refers("MainTex");
    if sampled {
        lines.push("vec4 main_tex = texture(MainTex, UV);".to_string());
        lines.push("ALBEDO = main_tex.rgb;".to_string());
    } else if body.contains("tex2D") {
        lines.push("// tex2D(sampler, uv) -> texture(sampler, uv)".to_string());
    }

    if refers("TintColor") {
        lines.push("ALBEDO *= TintColor.rgb;".to_string());
    } else if refers("Color") {
        lines.push("ALBEDO *= Color.rgb;".to_string());
    }

    if body.contains("o.Alpha") || body.contains(".a;") || body.contains(".a =") {
        lines.push(if sampled {
            "ALPHA = main_tex.a;".to_string()
        } else {
            "// ALPHA = <alpha expression>;".to_string()
        });
    }

    if body.contains("o.Emission") || refers("EmissionGain") {
        lines.push(if props.has("EmissionGain") {
            "EMISSION = ALBEDO * EmissionGain;".to_string()
        } else {
            "// EMISSION = <emission expression>;".to_string()
        });
    }

    if contains_word(body, "discard") || contains_word(body, "clip") {
        lines.push(if props.has("Cutoff") {
            "ALPHA_SCISSOR_THRESHOLD = Cutoff;".to_string()
        } else {
            "// TODO: discard/clip -> write ALPHA and ALPHA_SCISSOR_THRESHOLD".to_string()
        });
    }

    if refers("Opacity") {
        lines.push("ALPHA *= Opacity;".to_string());
    }

    if lines.is_empty() {
        lines.push("ALBEDO = vec3(1.0);".to_string());
    }

    Some(render_stage("fragment", &name, &lines, body))
}

/// Texture named by the first `TRANSFORM_TEX(uv, _Tex)` call.
fn transform_tex_target(body: &str) -> Option<String> {
    let at = body.find("TRANSFORM_TEX")?;
    let args = &body[at..];
    let open = args.find('(')?;
    let close = args.find(')')?;
    let (_, tex) = args.get(open + 1..close)?.split_once(',')?;
    Some(tex.trim().trim_start_matches('_').to_string())
}

fn render_stage(stage: &str, source_name: &str, lines: &[String], body: &str) -> String {
    let mut out = format!("void {}() {{\n", stage);
    for line in lines {
        out.push_str(INDENT);
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!("{}// TODO: port the remaining {} logic\n", INDENT, stage));
    out.push_str(&format!("{}/* Original {} code:\n", INDENT, source_name));
    for line in neutralize(body.trim()).lines() {
        let line = line.trim();
        if !line.is_empty() {
            out.push_str(INDENT);
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str(INDENT);
    out.push_str("*/\n}");
    out
}
