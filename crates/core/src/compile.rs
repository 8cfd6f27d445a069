//! Compilation pipeline: combo source -> executable ast + validation report.
//!
//! A thin orchestrator over the parser, the mappers and the validator.
//! Two pipelines run over independent copies of the plain ast:
//!
//! - execution: extract holds, drop nops, dedupe pushes, flatten, lift ors;
//! - validation: drop nops, dedupe pushes, flatten, branch every or, then
//!   extract holds per branch and check each branch.

use crate::action::{Arena, TextGroup};
use crate::ast::{Ast, Branches};
use crate::config::CompileOptions;
use crate::error::{ActionError, CompileError, ErrorCode, ValidationError};
use crate::mapper::{
    BrancheOr, ExtractHoldAction, FilterNopAction, FlattenActionSet, LiftOrActions,
    UniquePushActionSet,
};
use crate::parser;
use crate::validate::ErrorChecker;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Output of [`compile`]. Never a failure: problems are in `errors`.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub ast: Ast,
    pub errors: Vec<ValidationError>,
    /// Number of validation branches that were checked.
    pub branch_count: usize,
}

impl CompileResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "ast": self.ast.to_json_value(),
            "errors": self.errors.iter().map(ValidationError::to_json_value).collect::<Vec<_>>(),
            "branch_count": self.branch_count,
        })
    }
}

/// Parse `source` with no rewriting.
pub fn compile_plain_ast(source: &str) -> Result<Ast, CompileError> {
    parser::parse(source)
}

/// The validation view of `ast`: one Or-free, hold-free sequence per
/// combination of alternatives, capped at `options.max_branches`.
pub fn create_debug_branches(ast: Ast, options: &CompileOptions) -> Result<Branches, ActionError> {
    let mut brancher = BrancheOr::new(options.max_branches);
    let mut branches = ast
        .map(&mut FilterNopAction)?
        .map(&mut UniquePushActionSet)?
        .map(&mut FlattenActionSet)?
        .branches(&mut brancher, options.max_branches)?;
    branches.truncated |= brancher.truncated();
    branches.map(&mut ExtractHoldAction)
}

/// The execution view of `ast`: holds extracted, nops dropped, sets
/// normalized and top-level Ands with Or members lifted into Ors of at
/// most `options.max_branches` alternatives.
pub fn optimize_ast(ast: Ast, options: &CompileOptions) -> Result<Ast, ActionError> {
    optimize(ast, options).map(|(ast, _)| ast)
}

fn optimize(ast: Ast, options: &CompileOptions) -> Result<(Ast, bool), ActionError> {
    let mut lifter = LiftOrActions::new(options.max_branches);
    let ast = ast
        .map(&mut ExtractHoldAction)?
        .map(&mut FilterNopAction)?
        .map(&mut UniquePushActionSet)?
        .map(&mut FlattenActionSet)?
        .map(&mut lifter)?;
    if lifter.truncated() {
        warn!(
            max_branches = options.max_branches,
            "alternatives cut at the branch limit; executable ast is partial"
        );
    }
    Ok((ast, lifter.truncated()))
}

/// Check every branch independently, tagging findings with the branch index.
/// A truncated enumeration adds one trailing `E_BRANCH_LIMIT`.
pub fn validate_branches(branches: &Branches) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, branch) in branches.branches.iter().enumerate() {
        let ctx = ErrorChecker::new(Some(i)).check(&branches.arena, branch);
        errors.extend(ctx.errors);
    }
    if branches.truncated {
        errors.push(ValidationError::new(
            None,
            ErrorCode::BranchLimit,
            format!(
                "branch enumeration stopped at {} branches; remaining branches were not validated",
                branches.len()
            ),
        ));
    }
    errors
}

/// Compile with default options.
pub fn compile(source: &str) -> CompileResult {
    compile_with(source, &CompileOptions::default())
}

/// Compile `source`. Parse failures and rewrite contract violations are
/// reported as a single `E_SYNTAX` error alongside an ast holding one
/// error-group text action with the same message.
pub fn compile_with(source: &str, options: &CompileOptions) -> CompileResult {
    match try_compile(source, options) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "compilation failed");
            failure(e.to_string())
        }
    }
}

fn try_compile(source: &str, options: &CompileOptions) -> Result<CompileResult, CompileError> {
    let plain = compile_plain_ast(source)?;
    debug!(actions = plain.len(), "parsed source");

    let mut branches = create_debug_branches(plain.clone(), options)?;
    if branches.truncated {
        warn!(
            max_branches = options.max_branches,
            "branch limit reached; validation is partial"
        );
    }
    let (ast, lift_truncated) = optimize(plain, options)?;
    branches.truncated |= lift_truncated;
    let errors = validate_branches(&branches);
    debug!(
        branches = branches.len(),
        errors = errors.len(),
        "validated branches"
    );

    Ok(CompileResult {
        ast,
        errors,
        branch_count: branches.len(),
    })
}

fn failure(message: String) -> CompileResult {
    let mut arena = Arena::new();
    let text = arena.text(message.clone(), TextGroup::Error);
    CompileResult {
        ast: Ast::new(arena, vec![text]),
        errors: vec![ValidationError::syntax(message)],
        branch_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    #[test]
    fn syntax_error_becomes_error_text() {
        let result = compile("(a, b");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::Syntax);
        assert_eq!(result.ast.len(), 1);
        match result.ast.arena.kind(result.ast.actions[0]) {
            ActionKind::Text { text, group } => {
                assert_eq!(*group, TextGroup::Error);
                assert_eq!(text, &result.errors[0].message);
            }
            other => panic!("expected error text, got {:?}", other),
        }
    }

    #[test]
    fn unholdable_hold_is_reported_as_syntax() {
        let result = compile("moveL(0, 90) { a }");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::Syntax);
        assert!(result.errors[0].message.contains("not a holdable action"));
    }

    #[test]
    fn optimized_ast_is_hold_free() {
        let result = compile("(a, b) { c }, d");
        assert!(result.is_ok());
        assert_eq!(
            result.ast.lines(),
            ["(pushDown(a), pushDown(b))", "c", "(pushUp(a), pushUp(b))", "d"]
        );
    }

    #[test]
    fn json_report_shape() {
        let result = compile("pushUp(a)");
        let json = result.to_json_value();
        assert_eq!(json["branch_count"], 1);
        assert_eq!(json["errors"][0]["code"], "E_PUSH_UP");
        assert_eq!(json["errors"][0]["branch"], 0);
        assert_eq!(json["ast"][0]["kind"], "pushup");
    }

    #[test]
    fn truncation_adds_branch_limit_error() {
        let options = CompileOptions { max_branches: 3 };
        let result = compile_with("or(a, b), or(c, d)", &options);
        assert_eq!(result.branch_count, 3);
        let last = result.errors.last().unwrap();
        assert_eq!(last.code, ErrorCode::BranchLimit);
        assert_eq!(last.branch, None);
    }
}
