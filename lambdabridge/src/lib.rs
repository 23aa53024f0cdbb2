//! Lambdabridge: translation between two encodings of lambda-calculus programs.
//!
//! - Anonymous: library abstractions appear inline as `#(lambda ...)` and variables
//!   are de Bruijn indices `$k`.
//! - Named: library abstractions are referenced by name (`fn_0`), their bodies use
//!   positional parameters `#0..#(arity-1)` and the binder is spelled `lam`.
//!
//! Whole programs are translated textually through a [`mapping::NameMapping`];
//! single abstractions go through a parsed [`expr::Expr`] tree.
//!
//! Example
//! ```
//! use lambdabridge::prelude::*;
//!
//! let translator = Translator::from_anonymous_forms(
//!     ["#(lambda (lambda ($1 $0)))"],
//!     TranslatorConfig::default(),
//! );
//! let named = translator.forward("(lambda (#(lambda (lambda ($1 $0))) f $0))").unwrap();
//! assert_eq!(named, "(lam (dreamcoder_abstraction_0 f $0))");
//! assert_eq!(
//!     translator.reverse(&named).unwrap(),
//!     "(lambda (#(lambda (lambda ($1 $0))) f $0))"
//! );
//!
//! let abs = translator.abstraction("dreamcoder_abstraction_0").unwrap();
//! assert_eq!(abs.body, "(#0 #1)");
//! assert_eq!(abs.arity, 2);
//! ```

/// Named abstractions with positional parameters.
pub mod abstraction;
/// Translator configuration and its TOML persistence.
pub mod config;
/// DreamCoder JSON import.
pub mod dreamcoder;
/// Compression engine boundary and export back to DreamCoder.
pub mod engine;
pub mod error;
/// Syntax trees.
pub mod expr;
/// Ordered name/anonymous-form registry.
pub mod mapping;
/// Parser for program text.
pub mod parser;
/// Canonical and pretty printing.
pub mod pretty;
/// De Bruijn and positional variable conversion.
pub mod reindex;
/// Whole-token text substitution.
pub mod replace;
pub mod translate;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::abstraction::Abstraction;
    pub use crate::config::TranslatorConfig;
    pub use crate::error::{
        BridgeError, BridgeResult, InvalidAbstraction, InvariantViolation, SyntaxError,
    };
    pub use crate::expr::{Expr, VarRef};
    pub use crate::mapping::NameMapping;
    pub use crate::pretty::PrettyExpr;
    pub use crate::translate::{Translator, forward, reverse};

    // Parser entrypoint
    pub use crate::parser::parse;
}
