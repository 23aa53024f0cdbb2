//! Import of DreamCoder-style JSON.
//!
//! DreamCoder stores its library as a list of productions, where learned
//! abstractions appear inline as `#(lambda ...)` expressions, and its programs
//! grouped in per-task frontiers. Only the fields read below are modelled; any
//! other field is ignored on input.
use std::path::Path;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::TranslatorConfig;
use crate::engine::CompressionRequest;
use crate::error::BridgeResult;
use crate::expr::MARKER;
use crate::mapping::NameMapping;
use crate::translate::forward;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamCoderInput {
    #[serde(rename = "DSL")]
    pub dsl: Dsl,
    #[serde(default)]
    pub frontiers: Vec<Frontier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dsl {
    #[serde(default)]
    pub productions: Vec<Production>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Production {
    pub expression: String,
    #[serde(rename = "logProbability", default, skip_serializing_if = "Option::is_none")]
    pub log_probability: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default)]
    pub programs: Vec<FrontierProgram>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierProgram {
    pub program: String,
}

impl DreamCoderInput {
    pub fn from_json_str(json: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> BridgeResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Productions written as inline abstractions.
    pub fn anonymous_abstractions(&self) -> impl Iterator<Item = &str> {
        self.dsl
            .productions
            .iter()
            .map(|p| p.expression.as_str())
            .filter(|e| e.starts_with(MARKER))
    }
}

/// Turn a DreamCoder input into a request for the compression engine.
///
/// Inline abstractions of the library are named `{mapping_prefix}{i}`, shortest
/// first, and every frontier program is translated to the named encoding. A
/// frontier without a task name is identified by its index.
pub fn from_dreamcoder(input: &DreamCoderInput, config: &TranslatorConfig) -> BridgeResult<CompressionRequest> {
    let mapping = NameMapping::build(input.anonymous_abstractions(), &config.mapping_prefix);
    debug!(
        "DreamCoder library: {} production(s), {} inline abstraction(s)",
        input.dsl.productions.len(),
        mapping.len()
    );

    let mut programs = Vec::new();
    let mut tasks = Vec::new();
    for (i, frontier) in input.frontiers.iter().enumerate() {
        let task = frontier.task.clone().unwrap_or_else(|| i.to_string());
        for program in &frontier.programs {
            let named = forward(&program.program, &mapping, config)?;
            trace!("task {task}: {named}");
            programs.push(named);
            tasks.push(task.clone());
        }
    }

    Ok(CompressionRequest {
        programs,
        tasks,
        mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INPUT: &str = r##"{
        "DSL": {
            "logVariable": 0.0,
            "productions": [
                {"expression": "map", "logProbability": 0.0},
                {"expression": "#(lambda (lambda (+ $0 $1)))", "logProbability": -1.5},
                {"expression": "#(lambda (#(lambda (lambda (+ $0 $1))) $0 1))"}
            ]
        },
        "frontiers": [
            {"task": "incr", "request": "int -> int", "programs": [
                {"program": "(lambda (#(lambda (#(lambda (lambda (+ $0 $1))) $0 1)) $0))", "logLikelihood": 0.0}
            ]},
            {"programs": [
                {"program": "(lambda (#(lambda (lambda (+ $0 $1))) $0 $0))"},
                {"program": "(lambda (map (lambda $0) $0))"}
            ]}
        ]
    }"##;

    #[test]
    fn import_names_library_and_programs() {
        let input = DreamCoderInput::from_json_str(INPUT).unwrap();
        let request = from_dreamcoder(&input, &TranslatorConfig::default()).unwrap();

        let pairs: Vec<_> = request.mapping.pairs().collect();
        assert_eq!(
            pairs,
            vec![
                ("dreamcoder_abstraction_0", "#(lambda (lambda (+ $0 $1)))"),
                (
                    "dreamcoder_abstraction_1",
                    "#(lambda (#(lambda (lambda (+ $0 $1))) $0 1))"
                ),
            ]
        );
        assert_eq!(
            request.programs,
            vec![
                "(lam (dreamcoder_abstraction_1 $0))",
                "(lam (dreamcoder_abstraction_0 $0 $0))",
                "(lam (map (lam $0) $0))",
            ]
        );
        assert_eq!(request.tasks, vec!["incr", "1", "1"]);
    }

    #[test]
    fn missing_dsl_is_an_error() {
        assert!(DreamCoderInput::from_json_str(r#"{"frontiers": []}"#).unwrap_err().is_json());
    }

    #[test]
    fn uncovered_abstraction_is_reported() {
        let input = DreamCoderInput {
            dsl: Dsl::default(),
            frontiers: vec![Frontier {
                task: None,
                programs: vec![FrontierProgram {
                    program: "(#(lambda $0) 1)".into(),
                }],
            }],
        };
        assert!(from_dreamcoder(&input, &TranslatorConfig::default()).unwrap_err().is_invariant());
    }
}
