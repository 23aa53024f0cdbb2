//! Conversion between de Bruijn references and abstraction-relative positional parameters.
//!
//! An anonymous abstraction `#(lambda (lambda ($1 $0)))` has its parameters bound by
//! the leading binders. Stripping those binders and rewriting every reference that
//! escapes the remaining body yields the named form `(#0 #1)`: the outermost stripped
//! binder becomes `#0`, the innermost `#(n-1)`.
use crate::error::InvalidAbstraction;
use crate::expr::{Expr, VarRef};

/// Peel leading unary binder nodes, returning the innermost body and how many were removed.
///
/// `binders` lists the accepted binder spellings. Stops at the first node that is
/// not `(binder body)`.
pub fn strip_binders<'e>(expr: &'e Expr, binders: &[&str]) -> (&'e Expr, usize) {
    let mut inner = expr;
    let mut n = 0;
    while let Some(body) = inner.binder_body(binders) {
        inner = body;
        n += 1;
    }
    (inner, n)
}

/// Wrap `body` in `n` binders, flagging the outermost as an inline abstraction.
///
/// With `n == 0` the body itself is flagged when it is a list; an atom cannot carry
/// the flag and is returned unchanged.
pub fn wrap_binders(body: Expr, n: usize, keyword: &str) -> Expr {
    let mut expr = body;
    for _ in 0..n {
        expr = Expr::binder(keyword, expr);
    }
    match expr {
        Expr::List { items, .. } => Expr::List {
            items,
            inline: true,
        },
        atom => atom,
    }
}

fn read_var(expr: &Expr) -> Result<Option<VarRef>, InvalidAbstraction> {
    expr.var_ref().map_err(InvalidAbstraction::MalformedVariable)
}

/// Rewrite de Bruijn references escaping `depth` binders into positional parameters.
///
/// `depth` counts binders entered since the walk began (start at 0) and `n` is the
/// number of binders stripped above the walked body. A reference `$k` with `k < depth`
/// is bound inside the body and kept. Otherwise it refers to stripped binder
/// `k - depth` counted outward and becomes `#(n - (k - depth) - 1)`.
pub fn reindex(
    expr: &Expr,
    depth: usize,
    n: usize,
    binders: &[&str],
) -> Result<Expr, InvalidAbstraction> {
    match expr {
        Expr::Atom(_) => match read_var(expr)? {
            Some(VarRef::DeBruijn(k)) if k >= depth => {
                let escaped = k - depth;
                if escaped >= n {
                    return Err(InvalidAbstraction::UnboundVariable {
                        index: k,
                        depth,
                        arity: n,
                    });
                }
                Ok(VarRef::Positional(n - escaped - 1).to_atom())
            }
            _ => Ok(expr.clone()),
        },
        Expr::List { items, inline } => {
            let inner_depth = if expr.binder_body(binders).is_some() {
                depth + 1
            } else {
                depth
            };
            let items = items
                .iter()
                .map(|item| reindex(item, inner_depth, n, binders))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::List {
                items,
                inline: *inline,
            })
        }
    }
}

/// Inverse of [`reindex`]: rewrite positional parameter `#i` at binder depth `depth`
/// into `$(depth + n - 1 - i)`.
pub fn unindex(
    expr: &Expr,
    depth: usize,
    n: usize,
    binders: &[&str],
) -> Result<Expr, InvalidAbstraction> {
    match expr {
        Expr::Atom(_) => match read_var(expr)? {
            Some(VarRef::Positional(i)) => {
                if i >= n {
                    return Err(InvalidAbstraction::ParameterOutOfRange { index: i, arity: n });
                }
                Ok(VarRef::DeBruijn(depth + n - 1 - i).to_atom())
            }
            _ => Ok(expr.clone()),
        },
        Expr::List { items, inline } => {
            let inner_depth = if expr.binder_body(binders).is_some() {
                depth + 1
            } else {
                depth
            };
            let items = items
                .iter()
                .map(|item| unindex(item, inner_depth, n, binders))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::List {
                items,
                inline: *inline,
            })
        }
    }
}

/// Respell every binder keyword `from` as `to`, in binder position only.
pub fn respell_binders(expr: &Expr, from: &str, to: &str) -> Expr {
    match expr {
        Expr::Atom(_) => expr.clone(),
        Expr::List { items, inline } => {
            let is_binder = expr.binder_body(&[from]).is_some();
            let items = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if is_binder && i == 0 {
                        Expr::atom(to)
                    } else {
                        respell_binders(item, from, to)
                    }
                })
                .collect();
            Expr::List {
                items,
                inline: *inline,
            }
        }
    }
}

/// Check that every parameter `#0..#(arity-1)` occurs in `body`.
pub fn check_parameters_used(body: &Expr, arity: usize) -> Result<(), InvalidAbstraction> {
    fn visit(e: &Expr, seen: &mut [bool]) -> Result<(), InvalidAbstraction> {
        match e {
            Expr::Atom(_) => {
                if let Some(VarRef::Positional(i)) = read_var(e)? {
                    let arity = seen.len();
                    match seen.get_mut(i) {
                        Some(slot) => *slot = true,
                        None => {
                            return Err(InvalidAbstraction::ParameterOutOfRange { index: i, arity });
                        }
                    }
                }
                Ok(())
            }
            Expr::List { items, .. } => items.iter().try_for_each(|item| visit(item, seen)),
        }
    }

    let mut seen = vec![false; arity];
    visit(body, &mut seen)?;
    match seen.iter().position(|used| !used) {
        Some(index) => Err(InvalidAbstraction::UnusedParameter { index, arity }),
        None => Ok(()),
    }
}
