//! Boundary with an external compression engine.
//!
//! The engine only ever sees named programs. It answers with the abstractions it
//! learned, in the order it learned them, and the programs rewritten to use them.
//! [`to_dreamcoder`] maps that answer back into the anonymous encoding.
use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::abstraction::Abstraction;
use crate::config::TranslatorConfig;
use crate::dreamcoder::{DreamCoderInput, from_dreamcoder};
use crate::error::{BridgeError, BridgeResult, InvariantViolation};
use crate::mapping::NameMapping;
use crate::translate::reverse;

/// Named programs handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionRequest {
    pub programs: Vec<String>,
    /// Task of each program, parallel to `programs`.
    pub tasks: Vec<String>,
    /// Names given to the inline abstractions of the input.
    pub mapping: NameMapping,
}

/// What the engine hands back. Extra fields of the engine's JSON are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionOutput {
    #[serde(default)]
    pub abstractions: Vec<Abstraction>,
    #[serde(default)]
    pub rewritten: Vec<String>,
}

/// A learned abstraction in both encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamCoderAbstraction {
    pub name: String,
    pub body: String,
    pub arity: usize,
    /// Anonymous form, ready to be added to a DreamCoder library.
    pub dreamcoder: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamCoderResult {
    pub abstractions: Vec<DreamCoderAbstraction>,
    pub rewritten_dreamcoder: Vec<String>,
}

pub trait CompressionEngine {
    type Error: fmt::Display;

    fn compress(&self, request: &CompressionRequest) -> Result<CompressionOutput, Self::Error>;

    /// Rewrite named `programs` in terms of already learned `abstractions`,
    /// without learning new ones.
    fn rewrite(&self, programs: &[String], abstractions: &[Abstraction]) -> Result<Vec<String>, Self::Error>;
}

macro_rules! json_io {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                pub fn from_json_str(json: &str) -> BridgeResult<Self> {
                    Ok(serde_json::from_str(json)?)
                }

                pub fn load(path: &Path) -> BridgeResult<Self> {
                    let json = std::fs::read_to_string(path)?;
                    Self::from_json_str(&json)
                }

                pub fn to_json_pretty(&self) -> BridgeResult<String> {
                    Ok(serde_json::to_string_pretty(self)?)
                }
            }
        )*
    };
}

json_io!(CompressionRequest, CompressionOutput, DreamCoderResult);

/// Translate an engine answer back into the anonymous encoding.
///
/// `mapping` is the one the request was built with. Learned abstractions are
/// added to it in order, so later ones may refer to earlier ones.
pub fn to_dreamcoder(
    output: &CompressionOutput,
    mapping: &NameMapping,
    config: &TranslatorConfig,
) -> BridgeResult<DreamCoderResult> {
    let full = mapping.with_learned(&output.abstractions, config)?;

    let abstractions = output
        .abstractions
        .iter()
        .map(|a| {
            let dreamcoder = full
                .anonymous_of(&a.name)
                .ok_or_else(|| InvariantViolation::UnknownName(a.name.clone()))?;
            Ok(DreamCoderAbstraction {
                name: a.name.clone(),
                body: a.body.clone(),
                arity: a.arity,
                dreamcoder: dreamcoder.to_string(),
            })
        })
        .collect::<BridgeResult<Vec<_>>>()?;

    let rewritten_dreamcoder = output
        .rewritten
        .iter()
        .map(|p| reverse(p, &full, config))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Exported {} abstraction(s) and {} rewritten program(s)",
        abstractions.len(),
        rewritten_dreamcoder.len()
    );
    Ok(DreamCoderResult {
        abstractions,
        rewritten_dreamcoder,
    })
}

/// Import `input`, run `engine` on it and export its answer.
pub fn run<E: CompressionEngine>(
    engine: &E,
    input: &DreamCoderInput,
    config: &TranslatorConfig,
) -> BridgeResult<DreamCoderResult> {
    let request = from_dreamcoder(input, config)?;
    let output = engine
        .compress(&request)
        .map_err(|e| BridgeError::Engine(e.to_string()))?;
    to_dreamcoder(&output, &request.mapping, config)
}

/// Rewrite the programs of `request` with `abstractions` and export the result.
///
/// The abstractions typically come from an earlier [`CompressionEngine::compress`]
/// on other programs. They are added to the request's mapping in order, as in
/// [`to_dreamcoder`].
pub fn rewrite_to_dreamcoder<E: CompressionEngine>(
    engine: &E,
    request: &CompressionRequest,
    abstractions: &[Abstraction],
    config: &TranslatorConfig,
) -> BridgeResult<Vec<String>> {
    let rewritten = engine
        .rewrite(&request.programs, abstractions)
        .map_err(|e| BridgeError::Engine(e.to_string()))?;
    let full = request.mapping.with_learned(abstractions, config)?;
    let programs = rewritten
        .iter()
        .map(|p| reverse(p, &full, config))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Rewrote {} program(s) with {} abstraction(s)", programs.len(), abstractions.len());
    Ok(programs)
}
