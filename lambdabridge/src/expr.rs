//! Untyped symbolic syntax trees.
//!
//! Role
//! - Represent a program as either a bare symbol or an ordered list of children.
//! - Carry the inline-abstraction flag as metadata of a list node rather than as a
//!   sentinel child, so consumers never need to filter it out.
//!
//! Variable conventions (read from atoms, never stored separately)
//! - `$k`: de Bruijn reference, `k` binders outward from the point of use.
//! - `#k`: positional parameter `k` of the enclosing named abstraction.
use strum::EnumIs;

/// Prefix of a de Bruijn variable reference.
pub const DE_BRUIJN_SIGIL: char = '$';

/// Prefix of a positional parameter, and of an inline abstraction when followed by `(`.
pub const MARKER: char = '#';

/// A node of a program tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Expr {
    /// An atomic, non-empty token without whitespace or parentheses.
    Atom(String),

    /// An ordered sequence of children.
    ///
    /// `inline` is set when the list was written with the inline-abstraction
    /// marker, i.e. `#(lambda ...)`.
    List { items: Vec<Expr>, inline: bool },
}

/// Classification of an atom with respect to the variable conventions above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum VarRef {
    /// `$k`
    DeBruijn(usize),
    /// `#k`
    Positional(usize),
}

impl Expr {
    /// Build an atom from anything string-like.
    pub fn atom(s: impl Into<String>) -> Self {
        Expr::Atom(s.into())
    }

    /// Build an ordinary list node.
    pub fn list(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::List {
            items: items.into_iter().collect(),
            inline: false,
        }
    }

    /// Build a list node flagged as an inline abstraction.
    pub fn inline(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::List {
            items: items.into_iter().collect(),
            inline: true,
        }
    }

    /// Build the unary binder node `(binder body)`.
    pub fn binder(keyword: &str, body: Expr) -> Self {
        Expr::list([Expr::atom(keyword), body])
    }

    /// The symbol of an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Expr::Atom(s) => Some(s),
            Expr::List { .. } => None,
        }
    }

    /// Children of a list node, empty for atoms.
    pub fn items(&self) -> &[Expr] {
        match self {
            Expr::Atom(_) => &[],
            Expr::List { items, .. } => items,
        }
    }

    /// Whether this node carries the inline-abstraction flag.
    pub fn is_inline_abstraction(&self) -> bool {
        matches!(self, Expr::List { inline: true, .. })
    }

    /// If this node is `(kw body)` with `kw` one of `keywords`, return the body.
    pub fn binder_body(&self, keywords: &[&str]) -> Option<&Expr> {
        match self {
            Expr::List { items, .. } if items.len() == 2 => match items[0].as_atom() {
                Some(kw) if keywords.contains(&kw) => Some(&items[1]),
                _ => None,
            },
            _ => None,
        }
    }

    /// Read the variable reference an atom denotes, if any.
    ///
    /// Returns `Ok(None)` for atoms that are not variables and an error for atoms
    /// that carry a variable sigil followed by something other than digits.
    pub fn var_ref(&self) -> Result<Option<VarRef>, String> {
        let Some(s) = self.as_atom() else {
            return Ok(None);
        };
        VarRef::parse(s)
    }

    /// Total number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Expr::Atom(_) => 1,
            Expr::List { items, .. } => 1 + items.iter().map(Expr::size).sum::<usize>(),
        }
    }
}

impl VarRef {
    /// Parse `$k` or `#k`. Any other symbol is not a variable.
    pub fn parse(s: &str) -> Result<Option<Self>, String> {
        let mut chars = s.chars();
        let ctor: fn(usize) -> VarRef = match chars.next() {
            Some(DE_BRUIJN_SIGIL) => VarRef::DeBruijn,
            Some(MARKER) => VarRef::Positional,
            _ => return Ok(None),
        };

        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(s.to_string());
        }
        digits
            .parse::<usize>()
            .map(|k| Some(ctor(k)))
            .map_err(|_| s.to_string())
    }

    /// Render back to an atom.
    pub fn to_atom(self) -> Expr {
        match self {
            VarRef::DeBruijn(k) => Expr::Atom(format!("{DE_BRUIJN_SIGIL}{k}")),
            VarRef::Positional(k) => Expr::Atom(format!("{MARKER}{k}")),
        }
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::atom(s)
    }
}
