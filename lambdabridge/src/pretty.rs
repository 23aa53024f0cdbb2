//! Printing of program trees.
//!
//! Role
//! - `Display` for [`Expr`] is the exact inverse of [`crate::parser::parse`]: atoms verbatim,
//!   lists as `(` + space-joined children + `)`, inline abstractions prefixed with `#`.
//! - [`PrettyExpr`] builds an annotated RcDoc for width-aware, colored terminal output.
//!   Its layout may break lines and is meant for humans, not for the engine.
use std::fmt;
use std::io::{self, Write};

use pretty::{RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::{DEFAULT_ANONYMOUS_BINDER, DEFAULT_NAMED_BINDER, TranslatorConfig};
use crate::expr::{Expr, MARKER, VarRef};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(s) => f.write_str(s),
            Expr::List { items, inline } => {
                if *inline {
                    write!(f, "{MARKER}")?;
                }
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Styles used to annotate parts of the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Parentheses are colored by nesting depth so matching pairs share a color.
    Paren(u8),
    Marker,   // `#(`
    Binder,   // lambda, lam
    Variable, // $k, #k
    Ident,    // every other symbol
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Paren(depth) => {
                let fg = match depth % 6 {
                    0 => Color::Blue,
                    1 => Color::Green,
                    2 => Color::White,
                    3 => Color::Yellow,
                    4 => Color::Red,
                    _ => Color::Magenta,
                };
                s.set_fg(Some(fg)).set_dimmed(true);
            }
            Style::Marker => {
                s.set_fg(Some(Color::Magenta)).set_bold(true);
            }
            Style::Binder => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Variable => {
                s.set_fg(Some(Color::Green)).set_bold(true);
            }
            Style::Ident => {}
        }
        s
    }
}

fn atom_doc(s: &str, head_of_binder: bool) -> RcDoc<'static, Style> {
    let style = if head_of_binder {
        Style::Binder
    } else if matches!(VarRef::parse(s), Ok(Some(_))) {
        Style::Variable
    } else {
        Style::Ident
    };
    RcDoc::as_string(s.to_string()).annotate(style)
}

fn to_doc_with_depth(e: &Expr, depth: u8, binders: &[&str]) -> RcDoc<'static, Style> {
    match e {
        Expr::Atom(s) => atom_doc(s, false),
        Expr::List { items, inline } => {
            let is_binder = e.binder_body(binders).is_some();
            let children = items.iter().enumerate().map(|(i, item)| match item {
                Expr::Atom(s) => atom_doc(s, is_binder && i == 0),
                _ => to_doc_with_depth(item, depth.wrapping_add(1), binders),
            });

            let open = if *inline {
                RcDoc::as_string(MARKER.to_string())
                    .annotate(Style::Marker)
                    .append(RcDoc::as_string("(").annotate(Style::Paren(depth)))
            } else {
                RcDoc::as_string("(").annotate(Style::Paren(depth))
            };

            open.append(RcDoc::intersperse(children, RcDoc::line()).nest(2).group())
                .append(RcDoc::as_string(")").annotate(Style::Paren(depth)))
                .group()
        }
    }
}

struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

/// Retrieve the width of the terminal, or 80 if it cannot be determined.
fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Pretty-printing conveniences for program trees.
///
/// Binders are recognised with the spellings of the given [`TranslatorConfig`].
pub trait PrettyExpr {
    /// Build an RcDoc representation with style annotations.
    fn pretty_doc(&self, config: &TranslatorConfig) -> RcDoc<'static, Style>;

    /// Render with colors to any termcolor writer at the given width.
    fn pretty_render_to<W: WriteColor + Write>(
        &self,
        config: &TranslatorConfig,
        width: usize,
        out: &mut W,
    ) -> io::Result<()>;

    /// Print to stdout with colors (TTY-aware), at auto-detected width.
    fn pretty_print(&self, config: &TranslatorConfig) -> io::Result<()>;

    /// Format into a plain string (no colors), wrapping at `width` columns.
    fn pretty_string(&self, width: usize) -> String;
}

impl PrettyExpr for Expr {
    fn pretty_doc(&self, config: &TranslatorConfig) -> RcDoc<'static, Style> {
        to_doc_with_depth(self, 0, &[config.anonymous_binder.as_str(), config.named_binder.as_str()])
    }

    fn pretty_render_to<W: WriteColor + Write>(
        &self,
        config: &TranslatorConfig,
        width: usize,
        out: &mut W,
    ) -> io::Result<()> {
        let mut cw = ColorWriter { out };
        self.pretty_doc(config).render_raw(width, &mut cw)
    }

    fn pretty_print(&self, config: &TranslatorConfig) -> io::Result<()> {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        self.pretty_render_to(config, terminal_width(), &mut stdout)?;
        writeln!(stdout)
    }

    fn pretty_string(&self, width: usize) -> String {
        // Annotations are dropped here, so the binder spellings do not matter.
        let doc = to_doc_with_depth(self, 0, &[DEFAULT_ANONYMOUS_BINDER, DEFAULT_NAMED_BINDER]);
        let mut buf = String::new();
        let _ = doc.render_fmt(width, &mut buf);
        buf
    }
}
