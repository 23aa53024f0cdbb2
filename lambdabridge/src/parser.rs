//! Parser for the parenthesized program language.
//!
//! Two stages:
//! 1) Tokenisation with chumsky into `(`, `#(`, `)` and atoms, each with its byte span.
//! 2) An explicit stack of partially built lists turns the token stream into an [`Expr`].
//!
//! Accepted syntax:
//! - Atoms: any run of characters without whitespace or parentheses.
//! - Applications: `(f x y)`; the empty list `()` is rejected.
//! - Inline abstractions: `#(lambda ...)`; the marker must open a parenthesized form.
//! - Positional parameters `#0`, `#1`, ... are atoms.
use std::ops::Range;
use std::str::FromStr;

use chumsky::prelude::*;
use smallvec::SmallVec;

use crate::error::SyntaxError;
use crate::expr::{Expr, MARKER};

pub type Spanned<T> = (T, SimpleSpan);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'src> {
    Open,
    MarkerOpen,
    Close,
    Atom(&'src str),
}

// ---------------- Lexer ----------------

fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<Spanned<Token<'src>>>, extra::Err<Rich<'src, char>>>
{
    let marker_open = just(MARKER).then(just('(')).to(Token::MarkerOpen);
    let open = just('(').to(Token::Open);
    let close = just(')').to(Token::Close);
    // `#(` always starts a new token, even when glued to the preceding text.
    let atom = any()
        .and_is(just(MARKER).then(just('(')).not())
        .filter(|c: &char| !c.is_whitespace() && *c != '(' && *c != ')')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(Token::Atom);

    choice((marker_open, open, close, atom))
        .map_with(|tok, e| (tok, e.span()))
        .padded()
        .repeated()
        .collect()
        .then_ignore(end())
}

/// Reject markers that neither open an inline abstraction nor start a positional parameter.
///
/// Every `#` must be followed by `(`, or start a token made of `#` and digits only.
fn check_markers(src: &str) -> Result<(), SyntaxError> {
    let bytes = src.as_bytes();
    let is_delimiter = |b: u8| b == b'(' || b == b')' || b.is_ascii_whitespace();
    for (i, c) in src.char_indices() {
        if c != MARKER {
            continue;
        }
        if bytes.get(i + 1) == Some(&b'(') {
            continue;
        }
        let at_token_start = i == 0 || is_delimiter(bytes[i - 1]);
        let rest = &bytes[i + 1..];
        let len = rest.iter().position(|b| is_delimiter(*b)).unwrap_or(rest.len());
        let positional = len > 0 && rest[..len].iter().all(u8::is_ascii_digit);
        if !(at_token_start && positional) {
            return Err(SyntaxError::DanglingMarker { span: i..i + 1 });
        }
    }
    Ok(())
}

// ---------------- Tree building ----------------

/// Deepest parenthesis nesting accepted by [`parse`].
///
/// Printing and the tree passes recurse on nesting depth, so trees are kept
/// shallow enough for them to run on a default thread stack.
pub const MAX_NESTING: usize = 1024;

struct Frame {
    items: Vec<Expr>,
    inline: bool,
    open: Range<usize>,
}

fn build_tree(tokens: &[Spanned<Token<'_>>], src_len: usize) -> Result<Expr, SyntaxError> {
    let Some((first, first_span)) = tokens.first() else {
        return Err(SyntaxError::Empty { span: 0..src_len });
    };
    let first_span = first_span.into_range();

    match first {
        Token::Close => return Err(SyntaxError::UnexpectedClose { span: first_span }),
        Token::Atom(s) => {
            return match tokens.get(1) {
                None => Ok(Expr::atom(*s)),
                Some((_, next)) => Err(SyntaxError::TrailingCharacters {
                    span: next.into_range().start..src_len,
                }),
            };
        }
        Token::Open | Token::MarkerOpen => {}
    }

    let mut stack: SmallVec<[Frame; 16]> = SmallVec::new();
    for (idx, (tok, span)) in tokens.iter().enumerate() {
        let span = span.into_range();
        match tok {
            Token::Open | Token::MarkerOpen => {
                if stack.len() >= MAX_NESTING {
                    return Err(SyntaxError::TooDeep {
                        limit: MAX_NESTING,
                        span,
                    });
                }
                stack.push(Frame {
                    items: Vec::new(),
                    inline: matches!(tok, Token::MarkerOpen),
                    open: span,
                })
            }
            Token::Atom(s) => match stack.last_mut() {
                Some(top) => top.items.push(Expr::atom(*s)),
                None => {
                    return Err(SyntaxError::TrailingCharacters {
                        span: span.start..src_len,
                    });
                }
            },
            Token::Close => {
                let Some(frame) = stack.pop() else {
                    return Err(SyntaxError::UnexpectedClose { span });
                };
                if frame.items.is_empty() {
                    return Err(SyntaxError::EmptyList {
                        span: frame.open.start..span.end,
                    });
                }

                let list = Expr::List {
                    items: frame.items,
                    inline: frame.inline,
                };
                match stack.last_mut() {
                    Some(parent) => parent.items.push(list),
                    None => {
                        if let Some((_, trailing)) = tokens.get(idx + 1) {
                            return Err(SyntaxError::TrailingCharacters {
                                span: trailing.into_range().start..src_len,
                            });
                        }
                        return Ok(list);
                    }
                }
            }
        }
    }

    // Report the innermost parenthesis still open.
    let open = stack.last().map(|f| f.open.clone()).unwrap_or(0..src_len);
    Err(SyntaxError::Unclosed { span: open })
}

// ---------------- Public API ----------------

/// Parse program text into an [`Expr`].
///
/// A lone atom is returned as is; anything else must be a single, balanced,
/// parenthesized expression with nothing but whitespace after it.
///
/// Example
/// ```
/// use lambdabridge::parser::parse;
/// let e = parse("#(lambda (lambda ($1 $0)))").unwrap();
/// assert!(e.is_inline_abstraction());
/// assert_eq!(e.to_string(), "#(lambda (lambda ($1 $0)))");
/// ```
pub fn parse(src: &str) -> Result<Expr, SyntaxError> {
    if src.trim().is_empty() {
        return Err(SyntaxError::Empty { span: 0..src.len() });
    }
    check_markers(src)?;

    // Every character lexes, so the only way to fail is stopping short of the end.
    let (tokens, errs) = lexer().parse(src).into_output_errors();
    if let Some(err) = errs.into_iter().next() {
        return Err(SyntaxError::TrailingCharacters {
            span: err.span().into_range().start..src.len(),
        });
    }
    let tokens = tokens.unwrap_or_default();
    build_tree(&tokens, src.len())
}

impl FromStr for Expr {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
