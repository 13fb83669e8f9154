//! # shader-port
//!
//! Best-effort translation of ShaderLab/Cg shader source into Godot 4
//! shading language.
//!
//! There is no parser here. The source is scanned for the handful of
//! idioms brush shaders share: the `Properties` block, fixed-function
//! state, the vertex and fragment functions and a few built-ins. What is
//! recognized is translated; everything else is carried along as comments
//! so the output always compiles as a starting point for a manual port.
//!
//! ```
//! let out = shader_port::transpile("Shader \"Glow\" { }");
//! assert!(out.starts_with("shader_type spatial;"));
//! ```

pub mod builtins;
pub mod properties;
pub mod render_mode;
pub mod scan;
pub mod stages;

use tracing::debug;

pub use properties::{PropertyBlock, Uniform};

const HEADER: &str = "shader_type spatial;";

/// Translate shader source into Godot shading language text.
///
/// Never fails: source with no recognizable structure yields a white
/// unlit stub with the original embedded in a trailing comment.
pub fn transpile(source: &str) -> String {
    let code = scan::strip_comments(source);

    let props = properties::convert(&code);
    let modes = render_mode::infer(&code);
    let vertex = stages::vertex(&code);
    let fragment = stages::fragment(&code, &props);
    let glossary = builtins::glossary(&code);

    debug!(
        uniforms = props.uniforms.len(),
        todos = props.todos.len(),
        render_modes = modes.len(),
        vertex = vertex.is_some(),
        fragment = fragment.is_some(),
        "transpiled shader"
    );

    let recognized = !props.is_empty()
        || !modes.is_empty()
        || vertex.is_some()
        || fragment.is_some()
        || !glossary.is_empty();
    if !recognized {
        return stub(source);
    }

    let mut parts = vec![HEADER.to_string(), render_mode::render(&modes), props.render()];
    if !glossary.is_empty() {
        parts.push(format!("// Built-in equivalents:\n{}", glossary.join("\n")));
    }
    parts.extend(vertex);
    parts.extend(fragment);

    let mut out = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

fn stub(source: &str) -> String {
    format!(
        "{}\n\nvoid fragment() {{\n    ALBEDO = vec3(1.0);\n}}\n\n/* Original source:\n{}\n*/\n",
        HEADER,
        scan::neutralize(source.trim())
    )
}
