use super::ActionMapper;
use crate::action::{ActionId, ActionKind, Arena};
use crate::error::ActionError;

/// Expands `hold { children }` into `start, children..., end`, where start
/// and end are the press and release halves of the held action.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractHoldAction;

impl ActionMapper for ExtractHoldAction {
    fn visit(&mut self, arena: &mut Arena, id: ActionId) -> Result<Vec<ActionId>, ActionError> {
        let &ActionKind::Hold { action } = arena.kind(id) else {
            return Ok(vec![id]);
        };
        let children = arena.get(id).children().to_vec();
        if children.iter().any(|c| arena.kind(*c).is_hold()) {
            return Err(ActionError::RecursiveHold);
        }
        let start = arena.as_hold_start(action, &children)?;
        let end = arena.as_hold_end(action, &children)?;

        let mut out = Vec::with_capacity(children.len() + 2);
        out.push(start);
        out.extend(children);
        out.push(end);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn extracted(src: &str) -> Vec<String> {
        parse(src).unwrap().map(&mut ExtractHoldAction).unwrap().lines()
    }

    #[test]
    fn hold_becomes_start_children_end() {
        assert_eq!(
            extracted("a, x { b, c }, d"),
            ["a", "pushDown(x)", "b", "c", "pushUp(x)", "d"]
        );
    }

    #[test]
    fn composite_hold_splits_member_wise() {
        assert_eq!(
            extracted("(x, setR(90), touchL()) { b }"),
            [
                "(pushDown(x), setR(90, hold), touchL())",
                "b",
                "(pushUp(x), unsetR(90), unsetL(0))"
            ]
        );
    }

    #[test]
    fn empty_hold_is_press_then_release() {
        assert_eq!(extracted("x {}"), ["pushDown(x)", "pushUp(x)"]);
    }

    #[test]
    fn unholdable_action_is_an_error() {
        let err = parse("rotateL(0, 90) { a }")
            .unwrap()
            .map(&mut ExtractHoldAction)
            .unwrap_err();
        assert!(matches!(err, ActionError::NotHoldable { .. }));
    }
}
