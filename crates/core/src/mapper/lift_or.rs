use super::ActionMapper;
use crate::action::{ActionId, ActionKind, Arena};
use crate::error::ActionError;

/// Lifts Or members out of an And, turning `(a, or(x, y))` into
/// `or((x, a), (y, a))`. Only direct members of top-level Ands are
/// considered; nested Ands keep their Or members.
///
/// Each lifted Or holds at most `max_alternatives` alternatives. Anything
/// past that is never built and [`truncated`](Self::truncated) is set.
#[derive(Debug, Clone)]
pub struct LiftOrActions {
    max_alternatives: usize,
    truncated: bool,
}

impl Default for LiftOrActions {
    fn default() -> Self {
        LiftOrActions::new(usize::MAX)
    }
}

impl LiftOrActions {
    pub fn new(max_alternatives: usize) -> Self {
        LiftOrActions {
            max_alternatives: max_alternatives.max(1),
            truncated: false,
        }
    }

    /// Some lifted Or was cut at the limit.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Distribute the non-Or members of the And `id` over each of its Or
    /// members. `None` when `id` is not an And or has no Or member.
    ///
    /// The resulting Or takes `id`'s place: it inherits `id`'s owner,
    /// holder and children.
    pub(crate) fn lift(
        &mut self,
        arena: &mut Arena,
        id: ActionId,
    ) -> Result<Option<ActionId>, ActionError> {
        let ActionKind::And(members) = arena.kind(id) else {
            return Ok(None);
        };
        let (ors, others): (Vec<ActionId>, Vec<ActionId>) = members
            .iter()
            .copied()
            .partition(|m| arena.kind(*m).is_or());
        if ors.is_empty() {
            return Ok(None);
        }

        let mut acc = match others.len() {
            0 => arena.nop(),
            1 => others[0],
            _ => arena.and(others),
        };
        for or in ors {
            let (lifted, truncated) = arena.distribute_capped(or, acc, self.max_alternatives)?;
            self.truncated |= truncated;
            acc = lifted;
        }
        arena.transplant_bindings(id, acc);
        Ok(Some(acc))
    }
}

impl ActionMapper for LiftOrActions {
    fn visit(&mut self, arena: &mut Arena, id: ActionId) -> Result<Vec<ActionId>, ActionError> {
        Ok(vec![self.lift(arena, id)?.unwrap_or(id)])
    }
}
