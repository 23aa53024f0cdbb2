//! Named abstractions with positional parameters.
//!
//! A learned abstraction is stored as a body using `#0..#(arity-1)` for its
//! parameters. Converting it to the anonymous encoding re-introduces `arity`
//! leading binders and turns every parameter back into a de Bruijn index.
use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::TranslatorConfig;
use crate::error::{BridgeResult, InvalidAbstraction};
use crate::expr::Expr;
use crate::mapping::NameMapping;
use crate::parser::parse;
use crate::reindex::{
    check_parameters_used, reindex, respell_binders, strip_binders, unindex, wrap_binders,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Abstraction {
    pub name: String,
    /// Body text, using `#i` for the i-th parameter.
    pub body: String,
    pub arity: usize,
}

impl Abstraction {
    pub fn new(name: impl Into<String>, body: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            arity,
        }
    }

    /// Build the named form of the inline abstraction `text`, registered as `name`.
    ///
    /// Inline abstractions nested in the body must already be named by `mapping`;
    /// they are looked up by their printed form.
    pub fn from_anonymous(
        name: &str,
        text: &str,
        mapping: &NameMapping,
        config: &TranslatorConfig,
    ) -> BridgeResult<Self> {
        let expr = parse(text)?;
        let Expr::List { items, inline: true } = expr else {
            return Err(InvalidAbstraction::NotAnAbstraction(text.to_string()).into());
        };

        let mut root = Expr::List {
            items,
            inline: false,
        };
        root = name_nested(&root, mapping)?;

        let binders = config.binders();
        let (inner, arity) = strip_binders(&root, &binders);
        let body = reindex(inner, 0, arity, &binders)?;
        let body = respell_binders(&body, &config.anonymous_binder, &config.named_binder);
        check_parameters_used(&body, arity)?;

        trace!("abstraction {name}: `{text}` -> {body} (arity {arity})");
        Ok(Self {
            name: name.to_string(),
            body: body.to_string(),
            arity,
        })
    }

    /// Anonymous form of this abstraction.
    ///
    /// Names of `mapping` occurring in the body are expanded into their anonymous
    /// forms, so the result contains no reference to a mapped name.
    pub fn to_anonymous(&self, mapping: &NameMapping, config: &TranslatorConfig) -> BridgeResult<String> {
        let body = parse(&self.body)?;
        let binders = config.binders();
        let body = unindex(&body, 0, self.arity, &binders)?;
        let body = expand_names(&body, mapping)?;
        let body = respell_binders(&body, &config.named_binder, &config.anonymous_binder);
        let anonymous = wrap_binders(body, self.arity, &config.anonymous_binder).to_string();

        trace!("abstraction {}: {} -> `{anonymous}`", self.name, self.body);
        Ok(anonymous)
    }
}

impl fmt::Display for Abstraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for i in 0..self.arity {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "#{i}")?;
        }
        write!(f, ") := {}", self.body)
    }
}

/// Replace every nested inline abstraction by the name `mapping` gives it.
fn name_nested(expr: &Expr, mapping: &NameMapping) -> Result<Expr, InvalidAbstraction> {
    match expr {
        Expr::Atom(_) => Ok(expr.clone()),
        Expr::List { inline: true, .. } => {
            let printed = expr.to_string();
            match mapping.name_of(&printed) {
                Some(name) => Ok(Expr::atom(name)),
                None => Err(InvalidAbstraction::NestedMarker(printed)),
            }
        }
        Expr::List { items, .. } => Ok(Expr::list(
            items
                .iter()
                .map(|item| name_nested(item, mapping))
                .collect::<Result<Vec<_>, _>>()?,
        )),
    }
}

/// Replace every atom naming a mapping entry by the parsed anonymous form.
fn expand_names(expr: &Expr, mapping: &NameMapping) -> BridgeResult<Expr> {
    match expr {
        Expr::Atom(s) => match mapping.anonymous_of(s) {
            Some(anonymous) => Ok(parse(anonymous)?),
            None => Ok(expr.clone()),
        },
        Expr::List { items, inline } => Ok(Expr::List {
            items: items
                .iter()
                .map(|item| expand_names(item, mapping))
                .collect::<BridgeResult<Vec<_>>>()?,
            inline: *inline,
        }),
    }
}

impl NameMapping {
    /// Extend the mapping with learned abstractions, in order.
    ///
    /// Each abstraction's anonymous form is computed against the mapping built so
    /// far, so an abstraction may refer to any that precedes it.
    pub fn with_learned(&self, learned: &[Abstraction], config: &TranslatorConfig) -> BridgeResult<NameMapping> {
        let mut mapping = self.clone();
        for abstraction in learned {
            let anonymous = abstraction.to_anonymous(&mapping, config)?;
            mapping.push(abstraction.name.clone(), anonymous)?;
        }
        debug!(
            "Extended name mapping with {} learned abstraction(s), now {} entries",
            learned.len(),
            mapping.len()
        );
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> TranslatorConfig {
        TranslatorConfig::default()
    }

    #[test]
    fn two_parameter_roundtrip() {
        let mapping = NameMapping::new();
        let a = Abstraction::from_anonymous("fn_0", "#(lambda (lambda ($1 $0)))", &mapping, &config()).unwrap();
        assert_eq!(a, Abstraction::new("fn_0", "(#0 #1)", 2));
        assert_eq!(a.to_anonymous(&mapping, &config()).unwrap(), "#(lambda (lambda ($1 $0)))");
    }

    #[test]
    fn display_lists_parameters() {
        assert_eq!(Abstraction::new("fn_0", "(#0 #1)", 2).to_string(), "fn_0(#0,#1) := (#0 #1)");
        assert_eq!(Abstraction::new("k", "(f x)", 0).to_string(), "k() := (f x)");
    }

    #[test]
    fn inner_binders_are_respelled() {
        let mapping = NameMapping::new();
        let text = "#(lambda (map (lambda (+ $0 $1)) $0))";
        let a = Abstraction::from_anonymous("fn_0", text, &mapping, &config()).unwrap();
        assert_eq!(a.body, "(map (lam (+ $0 #0)) #0)");
        assert_eq!(a.to_anonymous(&mapping, &config()).unwrap(), text);
    }

    #[test]
    fn nested_abstractions_use_mapped_names() {
        let mapping = NameMapping::from_pairs([("dc_0", "#(lambda (+ $0 1))")]).unwrap();
        let text = "#(lambda (map #(lambda (+ $0 1)) $0))";
        let a = Abstraction::from_anonymous("fn_0", text, &mapping, &config()).unwrap();
        assert_eq!(a.body, "(map dc_0 #0)");
        assert_eq!(a.to_anonymous(&mapping, &config()).unwrap(), text);

        let err = Abstraction::from_anonymous("fn_0", text, &NameMapping::new(), &config()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::BridgeError::InvalidAbstraction(InvalidAbstraction::NestedMarker(_))
        ));
    }

    #[test]
    fn rejects_non_abstractions() {
        let mapping = NameMapping::new();
        for text in ["(lambda $0)", "f"] {
            let err = Abstraction::from_anonymous("fn_0", text, &mapping, &config()).unwrap_err();
            assert!(err.is_invalid_abstraction(), "{text}");
        }
        assert!(Abstraction::from_anonymous("fn_0", "#(lambda", &mapping, &config())
            .unwrap_err()
            .is_syntax());
    }

    #[test]
    fn unused_parameter_is_rejected() {
        let err = Abstraction::from_anonymous("fn_0", "#(lambda (lambda (f $0)))", &NameMapping::new(), &config())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::BridgeError::InvalidAbstraction(InvalidAbstraction::UnusedParameter { index: 0, arity: 2 })
        ));
    }

    #[test]
    fn out_of_range_parameter_is_rejected() {
        let err = Abstraction::new("fn_0", "(f #0 #1)", 1)
            .to_anonymous(&NameMapping::new(), &config())
            .unwrap_err();
        assert!(err.is_invalid_abstraction());
    }

    #[test]
    fn learned_abstractions_may_call_earlier_ones() {
        let base = NameMapping::build(["#(lambda (+ $0 1))"], "dc_");
        let learned = [
            Abstraction::new("fn_0", "(dc_0 (dc_0 #0))", 1),
            Abstraction::new("fn_1", "(map (lam (fn_0 $0)) #0)", 1),
        ];
        let mapping = base.with_learned(&learned, &config()).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.anonymous_of("fn_0"),
            Some("#(lambda (#(lambda (+ $0 1)) (#(lambda (+ $0 1)) $0)))")
        );
        assert_eq!(
            mapping.anonymous_of("fn_1"),
            Some("#(lambda (map (lambda (#(lambda (#(lambda (+ $0 1)) (#(lambda (+ $0 1)) $0))) $0)) $0))")
        );
        assert_eq!(mapping.last_generation(), Some(2));
        assert!(base.with_learned(&[Abstraction::new("dc_0", "#0", 1)], &config()).is_err());
    }
}
