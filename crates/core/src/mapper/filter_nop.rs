use super::{apply, ActionMapper};
use crate::action::{ActionId, ActionKind, Arena};
use crate::error::ActionError;

/// Drops every Nop, at the top level and inside And/Or sets.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterNopAction;

impl ActionMapper for FilterNopAction {
    fn visit(&mut self, arena: &mut Arena, id: ActionId) -> Result<Vec<ActionId>, ActionError> {
        match arena.kind(id) {
            ActionKind::Nop => Ok(Vec::new()),
            ActionKind::And(members) | ActionKind::Or(members) => {
                let members = members.clone();
                let kept = apply(arena, &members, self)?;
                arena.replace_members(id, kept);
                Ok(vec![id])
            }
            _ => Ok(vec![id]),
        }
    }
}
