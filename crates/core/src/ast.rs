//! Top-level action sequences.
//!
//! An [`Ast`] is the unit every mapper consumes and produces: an arena plus
//! the ordered ids of its top-level actions. [`Branches`] is the result of
//! exploding an ast into alternative-free linear sequences that share one
//! arena.

use crate::action::{ActionId, ActionKind, Arena};
use crate::branch;
use crate::error::ActionError;
use crate::mapper::{self, ActionMapper};
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Ast {
    pub arena: Arena,
    pub actions: Vec<ActionId>,
}

impl Ast {
    pub fn new(arena: Arena, actions: Vec<ActionId>) -> Self {
        Ast { arena, actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Rewrite every top-level action with `mapper` and concatenate the
    /// replacement lists in order.
    pub fn map<M: ActionMapper + ?Sized>(mut self, mapper: &mut M) -> Result<Ast, ActionError> {
        let actions = mapper::apply(&mut self.arena, &self.actions, mapper)?;
        debug!(
            mapper = std::any::type_name::<M>(),
            before = self.actions.len(),
            after = actions.len(),
            "mapped ast"
        );
        Ok(Ast {
            arena: self.arena,
            actions,
        })
    }

    /// Treat each replacement list produced by `mapper` as mutually
    /// exclusive alternatives and expand them into complete branches.
    pub fn branches<M: ActionMapper + ?Sized>(
        mut self,
        mapper: &mut M,
        max_branches: usize,
    ) -> Result<Branches, ActionError> {
        let enumerated = branch::enumerate(&mut self.arena, &self.actions, mapper, max_branches)?;
        Ok(Branches {
            arena: self.arena,
            branches: enumerated.branches,
            truncated: enumerated.truncated,
        })
    }

    /// Render each top-level action in DSL-like form.
    pub fn lines(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|id| self.arena.display(*id).to_string())
            .collect()
    }

    pub fn to_json_value(&self) -> Value {
        sequence_to_json(&self.arena, &self.actions)
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join(", "))
    }
}

/// Alternative-free linear sequences over a shared arena.
#[derive(Debug, Clone, Default)]
pub struct Branches {
    pub arena: Arena,
    pub branches: Vec<Vec<ActionId>>,
    /// Enumeration stopped at the configured limit.
    pub truncated: bool,
}

impl Branches {
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Apply `mapper` to every branch independently.
    pub fn map<M: ActionMapper + ?Sized>(
        mut self,
        mapper: &mut M,
    ) -> Result<Branches, ActionError> {
        let mut branches = Vec::with_capacity(self.branches.len());
        for branch in &self.branches {
            branches.push(mapper::apply(&mut self.arena, branch, mapper)?);
        }
        Ok(Branches {
            arena: self.arena,
            branches,
            truncated: self.truncated,
        })
    }

    pub fn lines(&self, index: usize) -> Vec<String> {
        self.branches
            .get(index)
            .map(|branch| {
                branch
                    .iter()
                    .map(|id| self.arena.display(*id).to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_json_value(&self) -> Value {
        Value::Array(
            self.branches
                .iter()
                .map(|branch| sequence_to_json(&self.arena, branch))
                .collect(),
        )
    }
}

fn sequence_to_json(arena: &Arena, actions: &[ActionId]) -> Value {
    Value::Array(actions.iter().map(|id| action_to_json(arena, *id)).collect())
}

/// Serialize one action (and everything under it) to interchange JSON.
pub fn action_to_json(arena: &Arena, id: ActionId) -> Value {
    let node = arena.get(id);
    let kind = node.kind().name();
    match node.kind() {
        ActionKind::Nop => json!({ "kind": kind }),
        ActionKind::Push { target }
        | ActionKind::PushDown { target }
        | ActionKind::PushUp { target } => json!({ "kind": kind, "target": target }),
        ActionKind::And(members) | ActionKind::Or(members) => json!({
            "kind": kind,
            "actions": sequence_to_json(arena, members),
        }),
        ActionKind::Hold { action } => json!({
            "kind": kind,
            "action": action_to_json(arena, *action),
            "children": sequence_to_json(arena, node.children()),
        }),
        ActionKind::RotateStick { stick, from, to } | ActionKind::MoveStick { stick, from, to } => {
            json!({ "kind": kind, "stick": stick, "from": from, "to": to })
        }
        ActionKind::SetStick { stick, to, holding } => {
            json!({ "kind": kind, "stick": stick, "to": to, "holding": holding })
        }
        ActionKind::UnsetStick { stick, from } => {
            json!({ "kind": kind, "stick": stick, "from": from })
        }
        ActionKind::TouchStick { stick } => json!({ "kind": kind, "stick": stick }),
        ActionKind::Text { text, group } => json!({ "kind": kind, "text": text, "group": group }),
        ActionKind::Plugin { name, args }
        | ActionKind::PluginHoldStart { name, args }
        | ActionKind::PluginHoldEnd { name, args } => {
            json!({ "kind": kind, "name": name, "args": args })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Stick, TextGroup};

    #[test]
    fn json_shape_for_nested_actions() {
        let mut arena = Arena::new();
        let a = arena.push("a");
        let rotate = arena.rotate(Stick::Left, 0, 90);
        let and = arena.and(vec![a, rotate]);
        let text = arena.text("go", TextGroup::Info);
        let ast = Ast::new(arena, vec![and, text]);

        let json = ast.to_json_value();
        assert_eq!(
            json,
            json!([
                {
                    "kind": "and",
                    "actions": [
                        { "kind": "push", "target": "a" },
                        { "kind": "rotate", "stick": "lstick", "from": 0, "to": 90 }
                    ]
                },
                { "kind": "text", "text": "go", "group": "info" }
            ])
        );
    }

    #[test]
    fn hold_serializes_action_and_children() {
        let mut arena = Arena::new();
        let x = arena.push("x");
        let c = arena.push("c");
        let hold = arena.hold(x, vec![c]).unwrap();
        let json = action_to_json(&arena, hold);
        assert_eq!(json["kind"], "hold");
        assert_eq!(json["action"]["target"], "x");
        assert_eq!(json["children"][0]["target"], "c");
    }

    #[test]
    fn display_joins_top_level_actions() {
        let mut arena = Arena::new();
        let a = arena.push_down("a");
        let b = arena.push_up("a");
        let ast = Ast::new(arena, vec![a, b]);
        assert_eq!(ast.to_string(), "pushDown(a), pushUp(a)");
        assert_eq!(ast.lines(), vec!["pushDown(a)", "pushUp(a)"]);
    }
}
