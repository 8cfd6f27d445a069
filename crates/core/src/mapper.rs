//! Tree rewrites.
//!
//! A mapper visits one action and returns the list that replaces it: empty
//! to delete, one id to keep or substitute, several to splice. What a
//! multi-element list means depends on the caller. [`Ast::map`] splices it
//! into the sequence; [`Ast::branches`] treats it as alternatives.
//!
//! [`Ast::map`]: crate::ast::Ast::map
//! [`Ast::branches`]: crate::ast::Ast::branches

use crate::action::{ActionId, Arena};
use crate::error::ActionError;

mod branch_or;
mod extract_hold;
mod filter_nop;
mod flatten;
mod lift_or;
mod unique_push;

pub use branch_or::BrancheOr;
pub use extract_hold::ExtractHoldAction;
pub use filter_nop::FilterNopAction;
pub use flatten::FlattenActionSet;
pub use lift_or::LiftOrActions;
pub use unique_push::UniquePushActionSet;

pub trait ActionMapper {
    fn visit(&mut self, arena: &mut Arena, id: ActionId) -> Result<Vec<ActionId>, ActionError>;
}

/// Visit each of `actions` in order and concatenate the replacements.
pub fn apply<M: ActionMapper + ?Sized>(
    arena: &mut Arena,
    actions: &[ActionId],
    mapper: &mut M,
) -> Result<Vec<ActionId>, ActionError> {
    let mut out = Vec::with_capacity(actions.len());
    for id in actions {
        out.extend(mapper.visit(arena, *id)?);
    }
    Ok(out)
}
