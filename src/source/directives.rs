//! Fixed-function render state declared in ShaderLab source.
//!
//! The extractor is a token scan, not a ShaderLab parser. Code blocks
//! (`CGPROGRAM` .. `ENDCG` and friends) and comments are skipped; the first
//! occurrence of each directive wins.

use std::path::Path;

use tracing::{debug, trace};

/// Blend factors from a `Blend` directive. `Blend Off` has no destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlendFactors {
    pub src: String,
    pub dst: Option<String>,
}

/// Render-state directives of one shader. `None` means not declared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderDirectiveSet {
    pub cull: Option<String>,
    pub depth_write: Option<String>,
    pub depth_test: Option<String>,
    pub blend: Option<BlendFactors>,
    pub blend_op: Option<String>,
    pub color_mask: Option<String>,
    pub queue: Option<String>,
    pub render_type: Option<String>,
    pub alpha_to_mask: Option<String>,
}

impl ShaderDirectiveSet {
    /// Extract directives from a shader file.
    ///
    /// An absent or unreadable path yields an empty set.
    pub fn extract(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match std::fs::read(path) {
            Ok(bytes) => Self::from_source(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                debug!("shader {} unreadable, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Extract directives from ShaderLab text.
    pub fn from_source(source: &str) -> Self {
        let tokens = tokenize(source);
        let mut set = Self::default();
        let mut i = 0;

        while i < tokens.len() {
            let Some(kw) = tokens[i].keyword() else {
                i += 1;
                continue;
            };
            if is_code_block_start(&kw) {
                i = skip_code_block(&tokens, i);
                continue;
            }
            match kw.as_str() {
                "cull" => first(&mut set.cull, &tokens, i),
                "zwrite" => first(&mut set.depth_write, &tokens, i),
                "ztest" => first(&mut set.depth_test, &tokens, i),
                "blendop" => first(&mut set.blend_op, &tokens, i),
                "colormask" => first(&mut set.color_mask, &tokens, i),
                "alphatomask" => first(&mut set.alpha_to_mask, &tokens, i),
                "blend" if set.blend.is_none() => {
                    set.blend = blend_factors(&same_line_words(&tokens, i));
                }
                "tags" => {
                    let (queue, render_type) = read_tags(&tokens, i + 1);
                    if set.queue.is_none() {
                        set.queue = queue;
                    }
                    if set.render_type.is_none() {
                        set.render_type = render_type;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        trace!("extracted directives: {:?}", set);
        set
    }

    /// True if no directive was found.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Record the first argument of the directive at `at` unless already set.
fn first(slot: &mut Option<String>, tokens: &[Token], at: usize) {
    if slot.is_none() {
        *slot = same_line_words(tokens, at).into_iter().next();
    }
}

fn blend_factors(args: &[String]) -> Option<BlendFactors> {
    // `Blend 1 One One` addresses a render target; drop the index.
    let args = match args {
        [target, rest @ ..] if rest.len() >= 2 && target.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => args,
    };
    let src = args.first()?.clone();
    Some(BlendFactors {
        dst: args.get(1).cloned(),
        src,
    })
}

#[derive(Clone, Debug, PartialEq)]
enum TokenKind {
    Word,
    Str,
    Punct,
}

#[derive(Clone, Debug)]
struct Token {
    text: String,
    line: usize,
    kind: TokenKind,
}

impl Token {
    fn keyword(&self) -> Option<String> {
        (self.kind == TokenKind::Word).then(|| self.text.to_ascii_lowercase())
    }
}

fn is_code_block_start(kw: &str) -> bool {
    matches!(
        kw,
        "cgprogram" | "cginclude" | "hlslprogram" | "hlslinclude" | "glslprogram" | "glslinclude"
    )
}

fn is_code_block_end(kw: &str) -> bool {
    matches!(kw, "endcg" | "endhlsl" | "endglsl")
}

/// Index just past the end marker of the code block starting at `start`.
fn skip_code_block(tokens: &[Token], start: usize) -> usize {
    tokens[start + 1..]
        .iter()
        .position(|t| t.keyword().is_some_and(|k| is_code_block_end(&k)))
        .map(|p| start + 1 + p + 1)
        .unwrap_or(tokens.len())
}

/// Word arguments following `tokens[at]` on the same line, up to a
/// separator or the next directive.
fn same_line_words(tokens: &[Token], at: usize) -> Vec<String> {
    let line = tokens[at].line;
    tokens[at + 1..]
        .iter()
        .take_while(|t| t.line == line && t.kind == TokenKind::Word)
        .take_while(|t| !is_directive_keyword(&t.text))
        .map(|t| t.text.clone())
        .collect()
}

fn is_directive_keyword(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "cull" | "zwrite" | "ztest" | "blend" | "blendop" | "colormask" | "alphatomask" | "tags" | "lighting" | "fog" | "offset"
    )
}

/// Read `"Key" = "Value"` pairs of a `Tags { }` block starting at `at`.
fn read_tags(tokens: &[Token], at: usize) -> (Option<String>, Option<String>) {
    let mut queue = None;
    let mut render_type = None;
    if tokens.get(at).map(|t| t.text.as_str()) != Some("{") {
        return (queue, render_type);
    }
    let mut i = at + 1;
    while i < tokens.len() && tokens[i].text != "}" {
        let is_pair = tokens[i].kind == TokenKind::Str
            && tokens.get(i + 1).is_some_and(|t| t.text == "=")
            && tokens.get(i + 2).is_some_and(|t| t.kind == TokenKind::Str);
        if is_pair {
            let value = tokens[i + 2].text.clone();
            match tokens[i].text.as_str() {
                "Queue" if queue.is_none() => queue = Some(value),
                "RenderType" if render_type.is_none() => render_type = Some(value),
                _ => {}
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    (queue, render_type)
}

/// Split ShaderLab text into words, strings and punctuation, dropping comments.
fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    i += 1;
                }
                i += 2;
            }
            '"' => {
                let start = i + 1;
                i = start;
                while i < chars.len() && chars[i] != '"' && chars[i] != '\n' {
                    i += 1;
                }
                tokens.push(Token {
                    text: chars[start..i].iter().collect(),
                    line,
                    kind: TokenKind::Str,
                });
                if chars.get(i) == Some(&'"') {
                    i += 1;
                }
            }
            '{' | '}' | '=' | '(' | ')' | ',' | ';' => {
                tokens.push(Token {
                    text: c.to_string(),
                    line,
                    kind: TokenKind::Punct,
                });
                i += 1;
            }
            '[' => {
                let start = i;
                while i < chars.len() && chars[i] != ']' && chars[i] != '\n' {
                    i += 1;
                }
                // Unterminated brackets stop before the newline so it is
                // still counted.
                let end = if chars.get(i) == Some(&']') { i + 1 } else { i };
                tokens.push(Token {
                    text: chars[start..end].iter().collect(),
                    line,
                    kind: TokenKind::Word,
                });
                i = end;
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !matches!(chars[i], '{' | '}' | '=' | '(' | ')' | ',' | ';' | '"' | '[')
                    && !(chars[i] == '/' && matches!(chars.get(i + 1), Some('/') | Some('*')))
                {
                    i += 1;
                }
                tokens.push(Token {
                    text: chars[start..i].iter().collect(),
                    line,
                    kind: TokenKind::Word,
                });
            }
        }
    }
    tokens
}
