//! Glob-style matching of whole keys.
//!
//! Supported syntax:
//!
//! - `?` matches exactly one character
//! - `*` matches zero or more characters
//! - `[abc]`, `[a-z]`, `[^a-z]` match one character against a class
//! - `\x` matches `x` literally, inside or outside a class
//!
//! Matching is anchored at both ends. When the text runs out, the pattern must
//! be exhausted or hold exactly one `*` more; `"h"` does not match `"h**"` even
//! though `"hx"` does. A run of two or more trailing stars therefore behaves
//! like `?*`, and that is how it is compiled.
//!
//! The matcher is iterative and remembers only the most recent star, so its
//! stack use is constant and its time is bounded by `text * pattern`.

use crate::error::PatternError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyOne,
    Star,
    Class(CharClass),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CharClass {
    negated: bool,
    members: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassMember {
    Single(char),
    Range(char, char),
}

impl Token {
    /// Whether a single-character token accepts `c`; a star consumes nothing here
    fn accepts(&self, c: char) -> bool {
        match self {
            Token::Literal(l) => *l == c,
            Token::AnyOne => true,
            Token::Class(class) => class.accepts(c),
            Token::Star => false,
        }
    }
}

impl CharClass {
    fn accepts(&self, c: char) -> bool {
        let hit = self.members.iter().any(|member| match *member {
            ClassMember::Single(m) => m == c,
            ClassMember::Range(lo, hi) => lo <= c && c <= hi,
        });
        hit != self.negated
    }
}

/// A compiled glob pattern
///
/// # Example
///
/// ```rust
/// use tinycache_core::Pattern;
///
/// let pattern = Pattern::compile("user:[0-9]*").unwrap();
/// assert!(pattern.matches("user:42"));
/// assert!(!pattern.matches("user:x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    /// Parses `pattern` into a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnterminatedClass`] when a `[` has no closing `]`.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::with_capacity(chars.len());
        let mut pos = 0;

        while pos < chars.len() {
            match chars[pos] {
                '*' => {
                    tokens.push(Token::Star);
                    pos += 1;
                }
                '?' => {
                    tokens.push(Token::AnyOne);
                    pos += 1;
                }
                '[' => {
                    let (class, next) = parse_class(&chars, pos)?;
                    tokens.push(Token::Class(class));
                    pos = next;
                }
                // a trailing backslash has nothing to escape and stands for itself
                '\\' if pos + 1 < chars.len() => {
                    tokens.push(Token::Literal(chars[pos + 1]));
                    pos += 2;
                }
                c => {
                    tokens.push(Token::Literal(c));
                    pos += 1;
                }
            }
        }

        Ok(Self {
            tokens: normalize_stars(tokens),
        })
    }

    /// Returns `true` if the whole of `text` matches this pattern
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        match_tokens(&self.tokens, &text)
    }
}

/// Compiles `pattern` and matches it against `text` in one step
pub fn glob_match(text: &str, pattern: &str) -> Result<bool, PatternError> {
    Ok(Pattern::compile(pattern)?.matches(text))
}

/// Parses a class whose `[` sits at `open`; returns the class and the index after `]`.
fn parse_class(chars: &[char], open: usize) -> Result<(CharClass, usize), PatternError> {
    let unterminated = PatternError::UnterminatedClass { offset: open };
    let mut pos = open + 1;

    let negated = chars.get(pos) == Some(&'^');
    if negated {
        pos += 1;
    }

    let mut members = Vec::new();
    loop {
        let lo = match chars.get(pos) {
            None => return Err(unterminated),
            Some(']') => return Ok((CharClass { negated, members }, pos + 1)),
            Some('\\') => {
                pos += 1;
                *chars.get(pos).ok_or_else(|| unterminated.clone())?
            }
            Some(&c) => c,
        };
        pos += 1;

        // `-` only forms a range when something other than `]` follows it
        let is_range = chars.get(pos) == Some(&'-')
            && matches!(chars.get(pos + 1), Some(&c) if c != ']');
        if !is_range {
            members.push(ClassMember::Single(lo));
            continue;
        }

        pos += 1;
        let hi = match chars[pos] {
            '\\' => {
                pos += 1;
                *chars.get(pos).ok_or_else(|| unterminated.clone())?
            }
            c => c,
        };
        pos += 1;

        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        members.push(ClassMember::Range(lo, hi));
    }
}

/// Collapses runs of stars; a trailing run of two or more becomes `?*`.
fn normalize_stars(mut tokens: Vec<Token>) -> Vec<Token> {
    let trailing = tokens.iter().rev().take_while(|t| **t == Token::Star).count();
    tokens.truncate(tokens.len() - trailing);
    tokens.dedup_by(|a, b| *a == Token::Star && *b == Token::Star);

    match trailing {
        0 => {}
        1 => tokens.push(Token::Star),
        _ => tokens.extend([Token::AnyOne, Token::Star]),
    }
    tokens
}

fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
    let (mut ti, mut pi) = (0, 0);
    // last star seen and the text position it would resume from
    let mut star: Option<(usize, usize)> = None;

    while ti < text.len() {
        match tokens.get(pi) {
            Some(Token::Star) => {
                star = Some((pi, ti));
                pi += 1;
                continue;
            }
            Some(token) if token.accepts(text[ti]) => {
                pi += 1;
                ti += 1;
                continue;
            }
            _ => {}
        }

        // let the last star swallow one more character and retry
        let Some((star_pi, star_ti)) = star else {
            return false;
        };
        star = Some((star_pi, star_ti + 1));
        pi = star_pi + 1;
        ti = star_ti + 1;
    }

    tokens[pi..].iter().all(|t| *t == Token::Star)
}
