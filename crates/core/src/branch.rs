//! Branch enumeration: the cross product of per-action alternatives.

use crate::action::{ActionId, Arena};
use crate::error::ActionError;
use crate::mapper::ActionMapper;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enumerated {
    pub branches: Vec<Vec<ActionId>>,
    /// The product exceeded the limit and later branches were dropped.
    pub truncated: bool,
}

/// Expand `actions` into every linear sequence obtained by picking one
/// alternative per action, in left-major order. `mapper` supplies the
/// alternatives; an action mapped to nothing is dropped from every branch.
///
/// An empty sequence yields a single empty branch. At most `max_branches`
/// sequences are produced.
pub fn enumerate<M: ActionMapper + ?Sized>(
    arena: &mut Arena,
    actions: &[ActionId],
    mapper: &mut M,
    max_branches: usize,
) -> Result<Enumerated, ActionError> {
    let max_branches = max_branches.max(1);
    let mut branches: Vec<Vec<ActionId>> = vec![Vec::new()];
    let mut truncated = false;

    for id in actions {
        let alternatives = mapper.visit(arena, *id)?;
        match alternatives.len() {
            0 => {}
            1 => {
                for branch in &mut branches {
                    branch.push(alternatives[0]);
                }
            }
            n => {
                let capacity = branches.len().saturating_mul(n).min(max_branches);
                let mut next = Vec::with_capacity(capacity);
                'outer: for branch in &branches {
                    for alternative in &alternatives {
                        if next.len() >= max_branches {
                            truncated = true;
                            break 'outer;
                        }
                        let mut extended = branch.clone();
                        extended.push(*alternative);
                        next.push(extended);
                    }
                }
                branches = next;
            }
        }
    }

    debug!(branches = branches.len(), truncated, "enumerated branches");
    Ok(Enumerated {
        branches,
        truncated,
    })
}
