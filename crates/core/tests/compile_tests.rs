//! End-to-end compilation tests: source text in, optimized ast and
//! validation report out.

use combo_core::{
    compile, compile_plain_ast, compile_with, create_debug_branches, ActionKind, CompileOptions,
    ErrorCode,
};
use std::path::{Path, PathBuf};

fn error_codes(src: &str) -> Vec<ErrorCode> {
    compile(src).errors.iter().map(|e| e.code).collect()
}

// ──────────────────────────────────────────────
// Validation scenarios
// ──────────────────────────────────────────────

#[test]
fn duplicate_stick_operation_in_one_group() {
    assert_eq!(error_codes("(setL(90), setL(45))"), [ErrorCode::ActionSet]);
}

#[test]
fn held_button_cannot_be_pushed_inside_its_hold() {
    assert_eq!(error_codes("left { left }"), [ErrorCode::Push]);
}

#[test]
fn push_after_push_down_without_comma() {
    assert_eq!(error_codes("pushDown(left) left"), [ErrorCode::Push]);
}

#[test]
fn push_up_needs_a_prior_push_down() {
    assert_eq!(error_codes("pushUp(a)"), [ErrorCode::PushUp]);
    assert!(error_codes("pushDown(a), pushUp(a)").is_empty());
}

#[test]
fn zero_length_stick_motion() {
    assert_eq!(error_codes("rotateL(0, 0)"), [ErrorCode::Rotate]);
    assert_eq!(error_codes("moveL(0, 0)"), [ErrorCode::Move]);
}

#[test]
fn errors_are_found_per_branch() {
    let result = compile("(a, or(pushDown(x), y)), x");
    assert_eq!(result.branch_count, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorCode::Push);
    assert_eq!(result.errors[0].branch, Some(0));
}

#[test]
fn alternatives_under_a_hold_are_clean_when_disjoint() {
    let result = compile("(a, or(x, y)){ L1 }");
    assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
}

#[test]
fn alternatives_under_a_hold_conflict_with_children() {
    let src = "(a, or(x, y)){ y }";
    let branches = create_debug_branches(compile_plain_ast(src).unwrap(), &CompileOptions::default())
        .unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(
        branches.lines(1),
        ["(pushDown(y), pushDown(a))", "y", "(pushUp(y), pushUp(a))"]
    );

    let result = compile(src);
    assert!(!result.errors.is_empty());
    assert!(result.errors.iter().all(|e| e.branch == Some(1)));
}

#[test]
fn syntax_error_is_reported_not_raised() {
    let result = compile("a,\n(b, c");
    assert_eq!(result.branch_count, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorCode::Syntax);
    assert!(result.errors[0].message.starts_with("line 2: parse error"));
}

#[test]
fn runaway_nesting_is_reported_not_raised() {
    let src = format!("{}a{}", "(".repeat(200_000), ")".repeat(200_000));
    let result = compile(&src);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorCode::Syntax);
    assert!(result.errors[0].message.contains("nesting too deep"));
}

// ──────────────────────────────────────────────
// Execution ast shape
// ──────────────────────────────────────────────

#[test]
fn execution_ast_lifts_alternatives_to_the_top() {
    let result = compile("(a, b, or(x, y)), nop(), (c)");
    assert_eq!(result.ast.lines(), ["or((x, a, b), (y, a, b))", "c"]);
}

#[test]
fn execution_ast_has_no_holds_or_nops() {
    let result = compile("(a, nop()) { setR(45), (b, b) } nop()");
    assert_eq!(result.ast.lines(), ["pushDown(a)", "setR(45)", "b", "pushUp(a)"]);
    for id in &result.ast.actions {
        let kind = result.ast.arena.kind(*id);
        assert!(!matches!(kind, ActionKind::Hold { .. } | ActionKind::Nop));
    }
}

#[test]
fn empty_source_compiles_cleanly() {
    let result = compile("");
    assert!(result.is_ok());
    assert!(result.ast.is_empty());
    assert_eq!(result.branch_count, 1);
}

// ──────────────────────────────────────────────
// Branch limit
// ──────────────────────────────────────────────

#[test]
fn branch_limit_is_reported_and_partial_results_kept() {
    let src = "or(a, b), or(c, d), or(e, f), or(g, pushUp(z))";
    let full = compile(src);
    assert_eq!(full.branch_count, 16);
    assert_eq!(full.errors.len(), 8);

    let limited = compile_with(src, &CompileOptions { max_branches: 4 });
    assert_eq!(limited.branch_count, 4);
    let codes: Vec<ErrorCode> = limited.errors.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        [ErrorCode::PushUp, ErrorCode::PushUp, ErrorCode::BranchLimit]
    );
}

#[test]
fn branch_limit_bounds_or_lifting_in_both_pipelines() {
    let ors: Vec<String> = (0..25).map(|i| format!("or(a{}, b{})", i, i)).collect();
    let src = format!("({})", ors.join(", "));

    let result = compile_with(&src, &CompileOptions { max_branches: 4 });
    assert_eq!(result.branch_count, 4);
    let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, [ErrorCode::BranchLimit]);

    assert_eq!(result.ast.len(), 1);
    let top = result.ast.actions[0];
    assert!(matches!(result.ast.arena.kind(top), ActionKind::Or(_)));
    assert_eq!(result.ast.arena.members(top).len(), 4);
    assert!(result.ast.arena.len() < 10_000);
}

// ──────────────────────────────────────────────
// Fixtures
// ──────────────────────────────────────────────

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn collect_fixtures(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "combo"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn fixtures_match_expected_reports() {
    let mut tested = 0usize;
    let mut failures = Vec::new();

    for path in collect_fixtures(&fixtures_dir()) {
        let src = std::fs::read_to_string(&path).unwrap();
        let expected_path = path.with_extension("expected.json");
        let expected: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&expected_path)
                .unwrap_or_else(|e| panic!("missing {}: {}", expected_path.display(), e)),
        )
        .unwrap();

        let result = compile(&src);
        let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
        let expected_codes: Vec<&str> = expected["error_codes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        if codes != expected_codes {
            failures.push(format!(
                "{}: error codes {:?}, expected {:?}",
                path.display(),
                codes,
                expected_codes
            ));
        }
        if expected["branch_count"] != result.branch_count {
            failures.push(format!(
                "{}: {} branches, expected {}",
                path.display(),
                result.branch_count,
                expected["branch_count"]
            ));
        }
        tested += 1;
    }

    assert!(tested > 0, "no fixtures found in {}", fixtures_dir().display());
    assert!(
        failures.is_empty(),
        "{} of {} fixtures failed:\n{}",
        failures.len(),
        tested,
        failures.join("\n")
    );
}
