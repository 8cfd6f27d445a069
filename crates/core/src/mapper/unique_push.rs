use super::ActionMapper;
use crate::action::{ActionId, ActionKind, Arena};
use crate::error::ActionError;

/// Removes repeated push-family members of a set.
///
/// Within one And/Or, a Push, PushDown or PushUp is dropped when an earlier
/// member of the same variant targets the same button. Only the direct
/// members of top-level sets are considered.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniquePushActionSet;

fn same_push(a: &ActionKind, b: &ActionKind) -> bool {
    match (a, b) {
        (ActionKind::Push { target: x }, ActionKind::Push { target: y })
        | (ActionKind::PushDown { target: x }, ActionKind::PushDown { target: y })
        | (ActionKind::PushUp { target: x }, ActionKind::PushUp { target: y }) => x == y,
        _ => false,
    }
}

impl ActionMapper for UniquePushActionSet {
    fn visit(&mut self, arena: &mut Arena, id: ActionId) -> Result<Vec<ActionId>, ActionError> {
        if !arena.kind(id).is_set() {
            return Ok(vec![id]);
        }
        let mut kept: Vec<ActionId> = Vec::new();
        for member in arena.members(id) {
            let kind = arena.kind(*member);
            if !kept.iter().any(|k| same_push(arena.kind(*k), kind)) {
                kept.push(*member);
            }
        }
        arena.replace_members(id, kept);
        Ok(vec![id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn first_occurrence_wins() {
        let ast = parse("(a, b, a, pushDown(a), pushDown(a), pushUp(b), pushUp(b))").unwrap();
        let ast = ast.map(&mut UniquePushActionSet).unwrap();
        assert_eq!(ast.lines(), ["(a, b, pushDown(a), pushUp(b))"]);
    }

    #[test]
    fn or_members_are_deduplicated_too() {
        let ast = parse("or(x, x, y)").unwrap();
        let ast = ast.map(&mut UniquePushActionSet).unwrap();
        assert_eq!(ast.lines(), ["or(x, y)"]);
    }

    #[test]
    fn top_level_repeats_survive() {
        let ast = parse("a, a").unwrap();
        let ast = ast.map(&mut UniquePushActionSet).unwrap();
        assert_eq!(ast.lines(), ["a", "a"]);
    }

    #[test]
    fn nested_sets_are_not_inspected() {
        let ast = parse("(a, or(x, x))").unwrap();
        let ast = ast.map(&mut UniquePushActionSet).unwrap();
        assert_eq!(ast.lines(), ["(a, or(x, x))"]);
    }
}
