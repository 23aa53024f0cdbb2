//! Whole-program translation between the anonymous and named encodings.
//!
//! Role
//! - `forward`: anonymous → named. Substitutes each inline abstraction's text with its
//!   name, latest entry first, then respells the binder keyword.
//! - `reverse`: named → anonymous. Respells the binder keyword back, then substitutes
//!   each name (as a whole token) with its anonymous text, latest entry first.
//!
//! Neither direction parses the program; both are linear passes per mapping entry.
//! A mapping is read-only here, so one [`Translator`] can serve concurrent callers.
use log::trace;

use crate::abstraction::Abstraction;
use crate::config::TranslatorConfig;
use crate::error::{BridgeResult, InvariantViolation};
use crate::expr::MARKER;
use crate::mapping::NameMapping;
use crate::replace::{contains_atom, respell_binder_tokens, safe_replace};

/// Whether `text` still contains an inline-abstraction marker `#(`.
pub fn contains_marker(text: &str) -> bool {
    text.char_indices()
        .any(|(i, c)| c == MARKER && text[i + c.len_utf8()..].starts_with('('))
}

/// Translate an anonymous program into the named encoding.
///
/// Fails with [`InvariantViolation::ResidualMarker`] if an inline abstraction is left,
/// i.e. the mapping does not cover every anonymous form present in `text`.
pub fn forward(
    text: &str,
    mapping: &NameMapping,
    config: &TranslatorConfig,
) -> Result<String, InvariantViolation> {
    let mut out = text.to_string();
    for entry in mapping.iter_latest_first() {
        if out.contains(entry.anonymous.as_str()) {
            trace!("forward: `{}` -> {}", entry.anonymous, entry.name);
            out = out.replace(entry.anonymous.as_str(), &entry.name);
        }
    }
    let out = respell_binder_tokens(&out, &config.anonymous_binder, &config.named_binder);

    if contains_marker(&out) {
        return Err(InvariantViolation::ResidualMarker(out));
    }
    Ok(out)
}

/// Translate a named program back into the anonymous encoding.
pub fn reverse(
    text: &str,
    mapping: &NameMapping,
    config: &TranslatorConfig,
) -> Result<String, InvariantViolation> {
    let mut out = respell_binder_tokens(text, &config.named_binder, &config.anonymous_binder);
    for entry in mapping.iter_latest_first() {
        if contains_atom(&out, &entry.name) {
            trace!("reverse: {} -> `{}`", entry.name, entry.anonymous);
        }
        out = safe_replace(&out, &entry.name, &entry.anonymous)?;
    }
    Ok(out)
}

/// A mapping bundled with the configuration it is used under.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    mapping: NameMapping,
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(mapping: NameMapping, config: TranslatorConfig) -> Self {
        Self { mapping, config }
    }

    /// Name every marker-prefixed form of `anonymous_forms` using the configured prefix.
    pub fn from_anonymous_forms<I, S>(anonymous_forms: I, config: TranslatorConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mapping = NameMapping::build(anonymous_forms, &config.mapping_prefix);
        Self { mapping, config }
    }

    pub fn mapping(&self) -> &NameMapping {
        &self.mapping
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn forward(&self, text: &str) -> Result<String, InvariantViolation> {
        forward(text, &self.mapping, &self.config)
    }

    pub fn reverse(&self, text: &str) -> Result<String, InvariantViolation> {
        reverse(text, &self.mapping, &self.config)
    }

    /// Translate a batch, stopping at the first failure.
    pub fn forward_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>, InvariantViolation> {
        texts.iter().map(|t| self.forward(t.as_ref())).collect()
    }

    /// Translate a batch back, stopping at the first failure.
    pub fn reverse_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>, InvariantViolation> {
        texts.iter().map(|t| self.reverse(t.as_ref())).collect()
    }

    /// Named form of the abstraction registered under `name`.
    pub fn abstraction(&self, name: &str) -> BridgeResult<Abstraction> {
        let anonymous = self
            .mapping
            .anonymous_of(name)
            .ok_or_else(|| InvariantViolation::UnknownName(name.to_string()))?;
        Abstraction::from_anonymous(name, anonymous, &self.mapping, &self.config)
    }

    /// Anonymous form of a named abstraction.
    pub fn anonymous(&self, abstraction: &Abstraction) -> BridgeResult<String> {
        abstraction.to_anonymous(&self.mapping, &self.config)
    }

    /// New translator whose mapping also names `learned`, in order.
    pub fn with_learned(&self, learned: &[Abstraction]) -> BridgeResult<Translator> {
        Ok(Translator {
            mapping: self.mapping.with_learned(learned, &self.config)?,
            config: self.config.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn translator() -> Translator {
        Translator::from_anonymous_forms(
            ["#(lambda (lambda (+ $0 $1)))", "#(lambda (#(lambda (lambda (+ $0 $1))) $0 1))"],
            TranslatorConfig {
                mapping_prefix: "fn_".into(),
                ..TranslatorConfig::default()
            },
        )
    }

    #[test]
    fn marker_detection() {
        assert!(contains_marker("(f #(lambda $0))"));
        assert!(!contains_marker("(f #0 #1)"));
        assert!(!contains_marker("#"));
    }

    #[test]
    fn forward_names_largest_first() {
        let t = translator();
        let program = "(lambda (map #(lambda (#(lambda (lambda (+ $0 $1))) $0 1)) (#(lambda (lambda (+ $0 $1))) $0 2)))";
        assert_eq!(
            t.forward(program).unwrap(),
            "(lam (map fn_1 (fn_0 $0 2)))"
        );
    }

    #[test]
    fn forward_reverse_inverse() {
        let t = translator();
        let program = "(lambda (map #(lambda (#(lambda (lambda (+ $0 $1))) $0 1)) (#(lambda (lambda (+ $0 $1))) $0 2)))";
        let named = t.forward(program).unwrap();
        assert_eq!(t.reverse(&named).unwrap(), program);
    }

    #[test]
    fn forward_reports_uncovered_marker() {
        let t = translator();
        let err = t.forward("(f #(lambda (g $0)))").unwrap_err();
        assert!(err.is_residual_marker());
    }

    #[test]
    fn reverse_leaves_longer_names_alone() {
        let t = Translator::new(
            NameMapping::from_pairs([("fn_1", "#(lambda $0)"), ("fn_10", "#(lambda (f $0))")]).unwrap(),
            TranslatorConfig::default(),
        );
        assert_eq!(
            t.reverse("(lam (fn_10 (fn_1 fn_1)))").unwrap(),
            "(lambda (#(lambda (f $0)) (#(lambda $0) #(lambda $0))))"
        );
    }

    #[test]
    fn unknown_abstraction_name() {
        let err = translator().abstraction("fn_9").unwrap_err();
        assert!(err.is_invariant());
    }
}
