//! Whole-token substitution over program text.
//!
//! Program text is split into parentheses, whitespace runs and atoms, substituted
//! atom by atom and joined back. Whitespace is preserved byte for byte, and a name is
//! only ever matched as a complete atom, so `fn_1` never matches inside `fn_10`.
use crate::error::InvariantViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Open,
    Close,
    Space(&'a str),
    Atom(&'a str),
}

impl<'a> Piece<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Piece::Open => "(",
            Piece::Close => ")",
            Piece::Space(s) | Piece::Atom(s) => s,
        }
    }
}

fn pieces(text: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let (piece, len) = match c {
            '(' => (Piece::Open, 1),
            ')' => (Piece::Close, 1),
            c if c.is_whitespace() => {
                let len = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
                (Piece::Space(&rest[..len]), len)
            }
            _ => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                    .unwrap_or(rest.len());
                (Piece::Atom(&rest[..len]), len)
            }
        };
        out.push(piece);
        rest = &rest[len..];
    }
    out
}

/// Replace every atom of `text` equal to `from` by `to`.
pub fn replace_atoms(text: &str, from: &str, to: &str) -> String {
    pieces(text)
        .into_iter()
        .map(|p| match p {
            Piece::Atom(a) if a == from => to,
            other => other.as_str(),
        })
        .collect()
}

/// Whether `name` occurs in `text` as a standalone atom.
pub fn contains_atom(text: &str, name: &str) -> bool {
    pieces(text).iter().any(|p| *p == Piece::Atom(name))
}

/// Respell a binder keyword: an atom `from` directly after `(` becomes `to`.
pub fn respell_binder_tokens(text: &str, from: &str, to: &str) -> String {
    let ps = pieces(text);
    let mut out = String::with_capacity(text.len());
    for (i, p) in ps.iter().enumerate() {
        match p {
            Piece::Atom(a) if *a == from && i > 0 && ps[i - 1] == Piece::Open => out.push_str(to),
            other => out.push_str(other.as_str()),
        }
    }
    out
}

/// Replace every standalone occurrence of `name` in `text` by `replacement`.
///
/// An occurrence is standalone when it forms a whole atom, i.e. it is delimited on
/// both sides by a parenthesis, whitespace or the ends of the text. Longer names
/// having `name` as a prefix are left alone, and adjacent repeats are all replaced.
///
/// Postconditions, checked on the result:
/// - the result is not exactly `name`;
/// - `name` is neither the leading nor the trailing atom outside parentheses;
/// - `name` no longer occurs as a standalone atom.
///
/// Any of these failing means `replacement` itself reintroduces `name`.
pub fn safe_replace(text: &str, name: &str, replacement: &str) -> Result<String, InvariantViolation> {
    let replaced = replace_atoms(text, name, replacement);

    if replaced.trim() == name {
        return Err(InvariantViolation::UnreplacedWhole(name.to_string()));
    }

    let ps = pieces(&replaced);
    let mut meaningful = ps.iter().filter(|p| !matches!(p, Piece::Space(_)));
    let first = meaningful.next();
    let last = meaningful.last().or(first);
    if first == Some(&Piece::Atom(name)) || last == Some(&Piece::Atom(name)) {
        return Err(InvariantViolation::BareTopLevelName {
            name: name.to_string(),
            text: replaced,
        });
    }

    if ps.contains(&Piece::Atom(name)) {
        return Err(InvariantViolation::ResidualName {
            name: name.to_string(),
            text: replaced,
        });
    }

    Ok(replaced)
}
