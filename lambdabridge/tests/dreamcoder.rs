use std::convert::Infallible;

use lambdabridge::dreamcoder::{DreamCoderInput, from_dreamcoder};
use lambdabridge::engine::{
    CompressionEngine, CompressionOutput, CompressionRequest, rewrite_to_dreamcoder, run, to_dreamcoder,
};
use lambdabridge::prelude::*;
use pretty_assertions::assert_eq;

const INPUT: &str = r##"{
    "DSL": {
        "productions": [
            {"expression": "+", "logProbability": 0.0},
            {"expression": "map", "logProbability": 0.0},
            {"expression": "#(lambda (+ $0 1))", "logProbability": -0.3}
        ]
    },
    "frontiers": [
        {"task": "add-two", "programs": [{"program": "(lambda (#(lambda (+ $0 1)) (#(lambda (+ $0 1)) $0)))"}]},
        {"task": "map-add-two", "programs": [{"program": "(lambda (map (lambda (#(lambda (+ $0 1)) (#(lambda (+ $0 1)) $0))) $0))"}]}
    ]
}"##;

/// Pretends to have learned `fn_0 := (dc_0 (dc_0 #0))` and uses it wherever it fits.
struct Twice;

impl CompressionEngine for Twice {
    type Error = Infallible;

    fn compress(&self, request: &CompressionRequest) -> Result<CompressionOutput, Infallible> {
        let inc = request.mapping.entries()[0].name.clone();
        let pattern = format!("({inc} ({inc} $0))");
        Ok(CompressionOutput {
            abstractions: vec![Abstraction::new("fn_0", format!("({inc} ({inc} #0))"), 1)],
            rewritten: request
                .programs
                .iter()
                .map(|p| p.replace(&pattern, "(fn_0 $0)"))
                .collect(),
        })
    }

    /// Folds the first instance of each single-parameter abstraction whose
    /// argument is one of the program's atoms.
    fn rewrite(&self, programs: &[String], abstractions: &[Abstraction]) -> Result<Vec<String>, Infallible> {
        let mut programs = programs.to_vec();
        for a in abstractions.iter().filter(|a| a.arity == 1) {
            for program in &mut programs {
                let atoms: Vec<String> = program
                    .split(|c: char| c == '(' || c == ')' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                let instance = atoms
                    .iter()
                    .map(|x| (x, a.body.replace("#0", x)))
                    .find(|(_, body)| program.contains(body.as_str()));
                if let Some((x, body)) = instance {
                    *program = program.replace(&body, &format!("({} {x})", a.name));
                }
            }
        }
        Ok(programs)
    }
}

fn config() -> TranslatorConfig {
    TranslatorConfig {
        mapping_prefix: "dc_".to_string(),
        ..TranslatorConfig::default()
    }
}

#[test]
fn import_request() {
    let _ = env_logger::builder().is_test(true).try_init();
    let input = DreamCoderInput::from_json_str(INPUT).unwrap();
    let request = from_dreamcoder(&input, &config()).unwrap();
    assert_eq!(
        request.programs,
        vec![
            "(lam (dc_0 (dc_0 $0)))",
            "(lam (map (lam (dc_0 (dc_0 $0))) $0))",
        ]
    );
    assert_eq!(request.tasks, vec!["add-two", "map-add-two"]);

    let json = request.to_json_pretty().unwrap();
    assert_eq!(CompressionRequest::from_json_str(&json).unwrap(), request);
}

#[test]
fn full_pipeline() {
    let _ = env_logger::builder().is_test(true).try_init();
    let input = DreamCoderInput::from_json_str(INPUT).unwrap();
    let result = run(&Twice, &input, &config()).unwrap();

    assert_eq!(result.abstractions.len(), 1);
    let learned = &result.abstractions[0];
    assert_eq!(learned.body, "(dc_0 (dc_0 #0))");
    assert_eq!(
        learned.dreamcoder,
        "#(lambda (#(lambda (+ $0 1)) (#(lambda (+ $0 1)) $0)))"
    );
    assert_eq!(
        result.rewritten_dreamcoder,
        vec![
            "(lambda (#(lambda (#(lambda (+ $0 1)) (#(lambda (+ $0 1)) $0))) $0))",
            "(lambda (map (lambda (#(lambda (#(lambda (+ $0 1)) (#(lambda (+ $0 1)) $0))) $0)) $0))",
        ]
    );
}

#[test]
fn export_from_files() {
    let dir = std::env::temp_dir().join(format!("lambdabridge-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let input = DreamCoderInput::from_json_str(INPUT).unwrap();
    let request = from_dreamcoder(&input, &config()).unwrap();
    let output = Twice.compress(&request).unwrap();

    let request_path = dir.join("request.json");
    let output_path = dir.join("output.json");
    std::fs::write(&request_path, request.to_json_pretty().unwrap()).unwrap();
    std::fs::write(&output_path, output.to_json_pretty().unwrap()).unwrap();

    let request = CompressionRequest::load(&request_path).unwrap();
    let output = CompressionOutput::load(&output_path).unwrap();
    let result = to_dreamcoder(&output, &request.mapping, &config()).unwrap();
    assert_eq!(result, run(&Twice, &input, &config()).unwrap());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn self_referential_mapping_is_rejected() {
    let output = CompressionOutput {
        abstractions: vec![],
        rewritten: vec!["(fn_0 fn_0)".to_string()],
    };
    let mapping = NameMapping::from_pairs([("fn_0", "(g fn_0)")]).unwrap();
    let err = to_dreamcoder(&output, &mapping, &config()).unwrap_err();
    assert!(matches!(err, BridgeError::Invariant(InvariantViolation::ResidualName { .. })));
}

#[test]
fn rewrite_with_learned_abstraction() {
    let request = CompressionRequest {
        programs: vec!["(c c c)".to_string(), "(d d d)".to_string()],
        tasks: vec!["c".to_string(), "d".to_string()],
        mapping: NameMapping::new(),
    };
    let learned = [Abstraction::new("fn_0", "(#0 #0 #0)", 1)];
    assert_eq!(
        Twice.rewrite(&request.programs, &learned).unwrap(),
        vec!["(fn_0 c)", "(fn_0 d)"]
    );
    assert_eq!(
        rewrite_to_dreamcoder(&Twice, &request, &learned, &config()).unwrap(),
        vec!["(#(lambda ($0 $0 $0)) c)", "(#(lambda ($0 $0 $0)) d)"]
    );
}

#[test]
fn rewrite_matches_compression() {
    let input = DreamCoderInput::from_json_str(INPUT).unwrap();
    let request = from_dreamcoder(&input, &config()).unwrap();
    let output = Twice.compress(&request).unwrap();

    let rewritten = rewrite_to_dreamcoder(&Twice, &request, &output.abstractions, &config()).unwrap();
    assert_eq!(rewritten, run(&Twice, &input, &config()).unwrap().rewritten_dreamcoder);
}
