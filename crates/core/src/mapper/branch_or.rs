use super::{apply, ActionMapper, LiftOrActions};
use crate::action::{ActionId, ActionKind, Arena};
use crate::branch;
use crate::error::ActionError;

/// Explodes Or groups into alternatives.
///
/// Used with [`Ast::branches`](crate::ast::Ast::branches): the list returned
/// for each top-level action is the set of mutually exclusive ways it can
/// run, none of which contains an Or. Ors nested in Ands are lifted first,
/// and holds branch over both their held action and their children.
#[derive(Debug, Clone)]
pub struct BrancheOr {
    max_branches: usize,
    truncated: bool,
    lifter: LiftOrActions,
}

impl BrancheOr {
    pub fn new(max_branches: usize) -> Self {
        BrancheOr {
            max_branches: max_branches.max(1),
            truncated: false,
            lifter: LiftOrActions::new(max_branches),
        }
    }

    /// Some alternative list was cut at the limit.
    pub fn truncated(&self) -> bool {
        self.truncated || self.lifter.truncated()
    }

    fn limit(&mut self, mut alternatives: Vec<ActionId>) -> Vec<ActionId> {
        if alternatives.len() > self.max_branches {
            alternatives.truncate(self.max_branches);
            self.truncated = true;
        }
        alternatives
    }

    fn branch_hold(
        &mut self,
        arena: &mut Arena,
        hold: ActionId,
        action: ActionId,
    ) -> Result<Vec<ActionId>, ActionError> {
        let held = self.visit(arena, action)?;
        let children = arena.get(hold).children().to_vec();
        let max = self.max_branches;
        let enumerated = branch::enumerate(arena, &children, self, max)?;
        self.truncated |= enumerated.truncated;

        if held == [action] && enumerated.branches == [children] {
            return Ok(vec![hold]);
        }

        let mut out = Vec::with_capacity(held.len() * enumerated.branches.len());
        'outer: for alternative in &held {
            for sequence in &enumerated.branches {
                if out.len() >= max {
                    self.truncated = true;
                    break 'outer;
                }
                let inner = arena.deep_clone(*alternative);
                let children = sequence.iter().map(|c| arena.deep_clone(*c)).collect();
                out.push(arena.hold(inner, children)?);
            }
        }
        Ok(out)
    }
}

impl ActionMapper for BrancheOr {
    fn visit(&mut self, arena: &mut Arena, id: ActionId) -> Result<Vec<ActionId>, ActionError> {
        match arena.kind(id) {
            ActionKind::Or(members) => {
                let members = members.clone();
                let alternatives = apply(arena, &members, self)?;
                Ok(self.limit(alternatives))
            }
            ActionKind::And(_) => match self.lifter.lift(arena, id)? {
                Some(or) => self.visit(arena, or),
                None => Ok(vec![id]),
            },
            &ActionKind::Hold { action } => self.branch_hold(arena, id, action),
            _ => Ok(vec![id]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn branches(src: &str, max: usize) -> (Vec<Vec<String>>, bool) {
        let mut brancher = BrancheOr::new(max);
        let branches = parse(src).unwrap().branches(&mut brancher, max).unwrap();
        let lines = (0..branches.len()).map(|i| branches.lines(i)).collect();
        (lines, branches.truncated || brancher.truncated())
    }

    #[test]
    fn top_level_ors_multiply() {
        let (lines, truncated) = branches("a, or(x, y), or(b, c)", 100);
        assert_eq!(
            lines,
            [
                ["a", "x", "b"],
                ["a", "x", "c"],
                ["a", "y", "b"],
                ["a", "y", "c"],
            ]
        );
        assert!(!truncated);
    }

    #[test]
    fn or_inside_and_is_lifted() {
        let (lines, _) = branches("(a, or(x, y))", 100);
        assert_eq!(lines, [["(x, a)"], ["(y, a)"]]);
    }

    #[test]
    fn nested_alternatives_are_exploded() {
        let (lines, _) = branches("or(a, (b, or(c, d)))", 100);
        assert_eq!(lines, [["a"], ["(c, b)"], ["(d, b)"]]);
    }

    #[test]
    fn hold_branches_over_action_and_children() {
        let (lines, _) = branches("or(x, y) { a, or(b, c) }", 100);
        assert_eq!(
            lines,
            [
                ["x { a, b }"],
                ["x { a, c }"],
                ["y { a, b }"],
                ["y { a, c }"],
            ]
        );
    }

    #[test]
    fn or_free_hold_is_kept_as_is() {
        let mut ast = parse("x { a }").unwrap();
        let hold = ast.actions[0];
        let mut brancher = BrancheOr::new(10);
        let alternatives = brancher.visit(&mut ast.arena, hold).unwrap();
        assert_eq!(alternatives, [hold]);
    }

    #[test]
    fn limit_truncates_and_flags() {
        let (lines, truncated) = branches("or(a, b), or(c, d), or(e, f)", 5);
        assert_eq!(lines.len(), 5);
        assert!(truncated);
    }

    #[test]
    fn lifting_inside_an_and_respects_the_limit() {
        let (lines, truncated) = branches("(or(a, b), or(c, d), or(e, f))", 2);
        assert_eq!(lines, [["(e, c, a)"], ["(e, c, b)"]]);
        assert!(truncated);
    }
}
