use super::{apply, ActionMapper};
use crate::action::{ActionId, Arena};
use crate::error::ActionError;

/// Normalizes set shape bottom-up: empty sets vanish, single-member sets
/// are replaced by their member, and same-kind nesting exposed by either
/// step is spliced. Running it twice changes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlattenActionSet;

impl ActionMapper for FlattenActionSet {
    fn visit(&mut self, arena: &mut Arena, id: ActionId) -> Result<Vec<ActionId>, ActionError> {
        if !arena.kind(id).is_set() {
            return Ok(vec![id]);
        }
        let members = arena.members(id).to_vec();
        let flattened = apply(arena, &members, self)?;
        arena.replace_members(id, flattened);
        match arena.members(id).len() {
            0 => Ok(Vec::new()),
            1 => {
                let single = arena.members(id)[0];
                arena.transplant_bindings(id, single);
                Ok(vec![single])
            }
            _ => Ok(vec![id]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn empty_and_singleton_sets_collapse() {
        let ast = parse("(), or(), (a), or(b), (c, d)").unwrap();
        let ast = ast.map(&mut FlattenActionSet).unwrap();
        assert_eq!(ast.lines(), ["a", "b", "(c, d)"]);
    }

    #[test]
    fn unwrapped_member_is_spliced_into_parent() {
        let ast = parse("or((or(x, y)), z), (a, or((b, c)))").unwrap();
        let ast = ast.map(&mut FlattenActionSet).unwrap();
        assert_eq!(ast.lines(), ["or(x, y, z)", "(a, b, c)"]);
        for id in &ast.actions {
            for member in ast.arena.members(*id) {
                assert_eq!(ast.arena.get(*member).owner(), Some(*id));
            }
        }
    }

    #[test]
    fn flatten_is_idempotent() {
        let once = parse("(a, or((b)), ((c)), or(or(x), (y, (z))))")
            .unwrap()
            .map(&mut FlattenActionSet)
            .unwrap();
        let first = once.lines();
        let twice = once.map(&mut FlattenActionSet).unwrap();
        assert_eq!(twice.lines(), first);
    }

    #[test]
    fn survivor_takes_the_collapsed_set_owner() {
        let ast = parse("or(x, (y))").unwrap();
        let ast = ast.map(&mut FlattenActionSet).unwrap();
        let or = ast.actions[0];
        let y = ast.arena.members(or)[1];
        assert_eq!(ast.arena.get(y).owner(), Some(or));
    }
}
