//! Text scanning helpers over ShaderLab/Cg source.

/// Replace `//` and `/* */` comments with spaces, keeping line breaks and
/// string literals intact.
pub fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '"' || c == '\n' {
                in_string = false;
            }
            continue;
        }
        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte offsets of `word` where it is not part of a longer identifier.
pub fn word_positions<'a>(text: &'a str, word: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(word).filter_map(move |(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        let bounded = !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char);
        bounded.then_some(at)
    })
}

pub fn contains_word(text: &str, word: &str) -> bool {
    word_positions(text, word).next().is_some()
}

/// Content between the brace at `open` and its matching close brace.
pub fn balanced_block(text: &str, open: usize) -> Option<&str> {
    if text.as_bytes().get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open + 1..open + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Offset of the first non-whitespace character at or after `from`.
pub fn skip_ws(text: &str, from: usize) -> usize {
    text[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Body of the block introduced by keyword `word` (`Properties { .. }`).
pub fn keyword_block<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    word_positions(text, word).find_map(|at| {
        let open = skip_ws(text, at + word.len());
        balanced_block(text, open)
    })
}

/// Function name given to `#pragma <stage>` (`#pragma surface surf Lambert` → `surf`).
pub fn pragma(text: &str, stage: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let mut words = line.split_whitespace();
        if words.next()? != "#pragma" || words.next()? != stage {
            return None;
        }
        words.next().map(str::to_string)
    })
}

/// Body of the function definition named `name`.
///
/// Calls and prototypes are skipped: a definition is a name followed by a
/// parameter list, an optional semantic (`: SV_Target`) and a brace.
pub fn function_body<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    word_positions(text, name).find_map(|at| {
        let open_paren = skip_ws(text, at + name.len());
        if text.as_bytes().get(open_paren) != Some(&b'(') {
            return None;
        }
        let close_paren = matching_paren(text, open_paren)?;
        let rest = &text[close_paren + 1..];
        let brace = rest.find(|c: char| c == '{' || c == ';')?;
        if rest.as_bytes()[brace] != b'{' {
            return None;
        }
        balanced_block(text, close_paren + 1 + brace)
    })
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Make text safe to embed in a block comment.
pub fn neutralize(text: &str) -> String {
    text.replace("*/", "* /")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let s = strip_comments("a // b\nc /* d\ne */ f \"//x\"");
        assert_eq!(s.lines().count(), 3);
        assert!(!s.contains('b'));
        assert!(!s.contains('d'));
        assert!(s.contains("\"//x\""));
    }

    #[test]
    fn test_word_positions() {
        assert!(contains_word("float4 vert (v)", "vert"));
        assert!(!contains_word("float4 vertex (v)", "vert"));
        assert!(!contains_word("_vert(v)", "vert"));
    }

    #[test]
    fn test_function_body() {
        let src = "v2f vert(appdata v);\nfloat4 x = vert(v);\nv2f vert (appdata v) { if (a) { b; } return o; }\n";
        assert_eq!(function_body(src, "vert").unwrap().trim(), "if (a) { b; } return o;");

        let frag = "fixed4 frag (v2f i) : SV_Target {\n return c;\n}";
        assert_eq!(function_body(frag, "frag").unwrap().trim(), "return c;");
        assert!(function_body(frag, "surf").is_none());
    }

    #[test]
    fn test_pragma_and_block() {
        let src = "Properties { _A (\"A\", Float) = 1 }\nCGPROGRAM\n#pragma vertex myvert\n#pragma surface surf Lambert\n";
        assert_eq!(pragma(src, "vertex").as_deref(), Some("myvert"));
        assert_eq!(pragma(src, "surface").as_deref(), Some("surf"));
        assert!(pragma(src, "fragment").is_none());
        assert_eq!(keyword_block(src, "Properties").unwrap().trim(), "_A (\"A\", Float) = 1");
    }

    #[test]
    fn test_neutralize() {
        assert_eq!(neutralize("/* a */"), "/* a * /");
    }
}
