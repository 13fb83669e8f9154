//! Source built-ins with a known Godot counterpart.

/// (source identifier, Godot expression)
pub const BUILTINS: &[(&str, &str)] = &[
    ("_Time", "TIME"),
    ("GetTime()", "TIME"),
    ("unity_ObjectToWorld", "MODEL_MATRIX"),
    ("UNITY_MATRIX_VP", "PROJECTION_MATRIX * VIEW_MATRIX"),
    ("_ScreenParams", "SCREEN_PIXEL_SIZE"),
    ("_WorldSpaceCameraPos", "CAMERA_POSITION_WORLD"),
];

/// `// name -> expression` for each built-in the code uses.
pub fn glossary(code: &str) -> Vec<String> {
    BUILTINS
        .iter()
        .filter(|(name, _)| code.contains(name))
        .map(|(name, godot)| format!("// {} -> {}", name, godot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glossary() {
        let lines = glossary("float t = _Time.y; float3 c = _WorldSpaceCameraPos;");
        assert_eq!(
            lines,
            vec!["// _Time -> TIME", "// _WorldSpaceCameraPos -> CAMERA_POSITION_WORLD"]
        );
        assert!(glossary("return 1;").is_empty());
    }
}
