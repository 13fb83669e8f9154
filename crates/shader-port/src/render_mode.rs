//! Render modes inferred from fixed-function state in the source.

/// Render mode flags in declaration order, deduplicated.
pub fn infer(code: &str) -> Vec<&'static str> {
    let words: Vec<String> = code
        .split(|c: char| c.is_whitespace() || c == '{' || c == '}')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect();
    let mut modes: Vec<&'static str> = Vec::new();
    let mut push = |mode: &'static str| {
        let blend_taken = mode.starts_with("blend_") && modes.iter().any(|m| m.starts_with("blend_"));
        if !blend_taken && !modes.contains(&mode) {
            modes.push(mode);
        }
    };

    for (i, w) in words.iter().enumerate() {
        let arg = |n: usize| words.get(i + n).map(String::as_str);
        match w.as_str() {
            "cull" if arg(1) == Some("off") => push("cull_disabled"),
            "cull" if arg(1) == Some("front") => push("cull_front"),
            "zwrite" if arg(1) == Some("off") => push("depth_draw_never"),
            "blend" => match (arg(1), arg(2)) {
                (Some("srcalpha"), Some("oneminussrcalpha")) => push("blend_mix"),
                (Some("one"), Some("one")) | (Some("srcalpha"), Some("one")) => push("blend_add"),
                (Some("dstcolor"), Some("zero")) | (Some("zero"), Some("srccolor")) => push("blend_mul"),
                (Some("one"), Some("oneminussrcalpha")) => push("blend_premul_alpha"),
                _ => {}
            },
            _ => {}
        }
    }

    let tags: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    // One blend mode at most; an explicit Blend wins over the queue.
    if tags.contains("\"Queue\"=\"Transparent") && !modes.iter().any(|m| m.starts_with("blend_")) {
        modes.push("blend_mix");
    }
    modes
}

/// `render_mode a, b;` or an empty string.
pub fn render(modes: &[&str]) -> String {
    if modes.is_empty() {
        String::new()
    } else {
        format!("render_mode {};", modes.join(", "))
    }
}
