//! `Properties { }` block → uniform declarations.

use crate::scan::{is_ident_char, keyword_block};

/// One converted property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uniform {
    /// Uniform name, without the leading underscore.
    pub name: String,
    pub decl: String,
}

/// Uniforms plus the property lines that could not be converted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyBlock {
    pub uniforms: Vec<Uniform>,
    pub todos: Vec<String>,
}

impl PropertyBlock {
    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty() && self.todos.is_empty()
    }

    pub fn has(&self, name: &str) -> bool {
        self.uniforms.iter().any(|u| u.name == name)
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.uniforms.iter().map(|u| u.decl.clone()).collect();
        lines.extend(self.todos.iter().map(|t| format!("// TODO: convert property: {}", t)));
        lines.join("\n")
    }
}

/// Convert the first `Properties` block of comment-free source.
pub fn convert(code: &str) -> PropertyBlock {
    let mut block = PropertyBlock::default();
    let Some(body) = keyword_block(code, "Properties") else {
        return block;
    };

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_entry(line).and_then(|e| e.declare()) {
            Some(u) if !block.has(&u.name) => block.uniforms.push(u),
            Some(_) => {}
            None => block.todos.push(line.to_string()),
        }
    }
    block
}

struct Entry<'a> {
    name: &'a str,
    display: &'a str,
    kind: &'a str,
    default: &'a str,
}

fn parse_entry(line: &str) -> Option<Entry<'_>> {
    let mut rest = line;
    // Attributes: [HDR], [Toggle(FOO)], [NoScaleOffset] ...
    while rest.starts_with('[') {
        let close = rest.find(']')?;
        rest = rest[close + 1..].trim_start();
    }

    let name_len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = rest[..name_len].trim_start_matches('_');
    rest = rest[name_len..].trim_start().strip_prefix('(')?.trim_start();

    rest = rest.strip_prefix('"')?;
    let quote = rest.find('"')?;
    let display = &rest[..quote];
    rest = rest[quote + 1..].trim_start().strip_prefix(',')?.trim_start();

    // Type runs to the parenthesis closing the declaration.
    let mut depth = 0i32;
    let close = rest.char_indices().find_map(|(i, c)| match c {
        '(' => {
            depth += 1;
            None
        }
        ')' if depth == 0 => Some(i),
        ')' => {
            depth -= 1;
            None
        }
        _ => None,
    })?;
    let kind = rest[..close].trim();
    rest = rest[close + 1..].trim_start().strip_prefix('=')?.trim();
    let default = rest.trim_end_matches("{}").trim();

    Some(Entry {
        name,
        display,
        kind,
        default,
    })
}

impl Entry<'_> {
    fn declare(&self) -> Option<Uniform> {
        let kind = self.kind.to_ascii_lowercase();
        let name = self.name;
        let decl = match kind.as_str() {
            "color" => format!(
                "uniform vec4 {} : source_color = vec4({});",
                name,
                tuple(self.default, "1.0")?
            ),
            "vector" => format!("uniform vec4 {} = vec4({});", name, tuple(self.default, "0.0")?),
            "float" => format!("uniform float {} = {};", name, float_lit(self.default)?),
            "int" | "integer" => format!("uniform int {} = {};", name, int_lit(self.default)?),
            "2d" => format!("uniform sampler2D {}{};", name, texture_hint(self.default)),
            "3d" => format!("uniform sampler3D {};", name),
            "cube" => format!("uniform samplerCube {};", name),
            k if k.starts_with("range") => {
                let args = k.trim_start_matches("range").trim();
                let args = args.strip_prefix('(')?.strip_suffix(')')?;
                let (lo, hi) = args.split_once(',')?;
                format!(
                    "uniform float {} : hint_range({}, {}) = {};",
                    name,
                    float_lit(lo)?,
                    float_lit(hi)?,
                    float_lit(self.default)?
                )
            }
            _ => return None,
        };
        let decl = if self.display.is_empty() {
            decl
        } else {
            format!("{} // {}", decl, self.display)
        };
        Some(Uniform {
            name: name.to_string(),
            decl,
        })
    }
}

fn texture_hint(default: &str) -> &'static str {
    match default.trim_matches('"').to_ascii_lowercase().as_str() {
        "white" => " : source_color, hint_default_white",
        "black" => " : source_color, hint_default_black",
        "bump" => " : hint_normal",
        _ => " : source_color",
    }
}

/// Float literal with a fractional part (`1` → `1.0`).
fn float_lit(s: &str) -> Option<String> {
    let v: f64 = s.trim().parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    })
}

fn int_lit(s: &str) -> Option<String> {
    let v: f64 = s.trim().parse().ok()?;
    Some(format!("{}", v.trunc() as i64))
}

/// `(a, b, c)` → `a, b, c, fill` padded to four components.
fn tuple(s: &str, fill: &str) -> Option<String> {
    let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner
        .split(',')
        .map(float_lit)
        .collect::<Option<Vec<_>>>()?;
    if parts.len() > 4 {
        return None;
    }
    while parts.len() < 4 {
        parts.push(fill.to_string());
    }
    Some(parts.join(", "))
}
