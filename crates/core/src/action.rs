//! Action model.
//!
//! Every action lives in an [`Arena`] and is addressed by a stable
//! [`ActionId`]. Owner and holder back-references are ids into the same
//! arena, so replacing a subtree never leaves a dangling pointer: the old
//! nodes simply stop being reachable from any top-level sequence.
//!
//! And/Or sets are built through [`Arena::and`] / [`Arena::or`], which
//! splice same-kind members in place and rebind every member's owner to
//! the new set. Nothing may be a live member of two sets at once; callers
//! that need the same logical action under two parents go through
//! [`Arena::deep_clone`] first.

use crate::error::ActionError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ButtonName = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stick {
    #[serde(rename = "lstick")]
    Left,
    #[serde(rename = "rstick")]
    Right,
}

impl Stick {
    pub fn as_str(self) -> &'static str {
        match self {
            Stick::Left => "lstick",
            Stick::Right => "rstick",
        }
    }

    /// Suffix used by the DSL call names (`rotateL`, `setR`, ...).
    fn suffix(self) -> &'static str {
        match self {
            Stick::Left => "L",
            Stick::Right => "R",
        }
    }
}

impl fmt::Display for Stick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextGroup {
    Normal,
    Info,
    Warn,
    Error,
}

impl TextGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            TextGroup::Normal => "normal",
            TextGroup::Info => "info",
            TextGroup::Warn => "warn",
            TextGroup::Error => "error",
        }
    }
}

/// Stable index of an action inside its [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ActionId(usize);

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One variant per controller action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Nop,
    Push {
        target: ButtonName,
    },
    PushDown {
        target: ButtonName,
    },
    PushUp {
        target: ButtonName,
    },
    /// Members run simultaneously.
    And(Vec<ActionId>),
    /// Exactly one member runs.
    Or(Vec<ActionId>),
    /// Press `action`, run the node's children, release `action`.
    Hold {
        action: ActionId,
    },
    RotateStick {
        stick: Stick,
        from: i64,
        to: i64,
    },
    MoveStick {
        stick: Stick,
        from: i64,
        to: i64,
    },
    SetStick {
        stick: Stick,
        to: i64,
        holding: bool,
    },
    UnsetStick {
        stick: Stick,
        from: i64,
    },
    TouchStick {
        stick: Stick,
    },
    Text {
        text: String,
        group: TextGroup,
    },
    Plugin {
        name: String,
        args: Vec<String>,
    },
    PluginHoldStart {
        name: String,
        args: Vec<String>,
    },
    PluginHoldEnd {
        name: String,
        args: Vec<String>,
    },
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Nop => "nop",
            ActionKind::Push { .. } => "push",
            ActionKind::PushDown { .. } => "pushdown",
            ActionKind::PushUp { .. } => "pushup",
            ActionKind::And(_) => "and",
            ActionKind::Or(_) => "or",
            ActionKind::Hold { .. } => "hold",
            ActionKind::RotateStick { .. } => "rotate",
            ActionKind::MoveStick { .. } => "move",
            ActionKind::SetStick { .. } => "set",
            ActionKind::UnsetStick { .. } => "unset",
            ActionKind::TouchStick { .. } => "touch",
            ActionKind::Text { .. } => "text",
            ActionKind::Plugin { .. } => "plugin",
            ActionKind::PluginHoldStart { .. } => "plugin_hold_start",
            ActionKind::PluginHoldEnd { .. } => "plugin_hold_end",
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, ActionKind::And(_) | ActionKind::Or(_))
    }

    pub fn is_or(&self) -> bool {
        matches!(self, ActionKind::Or(_))
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, ActionKind::Hold { .. })
    }

    /// Direct members of an And/Or; empty for every other variant.
    pub fn members(&self) -> &[ActionId] {
        match self {
            ActionKind::And(members) | ActionKind::Or(members) => members,
            _ => &[],
        }
    }
}

/// An arena node: the variant plus its tree bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    kind: ActionKind,
    /// The And/Or directly containing this action.
    owner: Option<ActionId>,
    /// The Hold enclosing this action (informational).
    holder: Option<ActionId>,
    /// Actions to run while this action is held.
    children: Vec<ActionId>,
}

impl Action {
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn owner(&self) -> Option<ActionId> {
        self.owner
    }

    pub fn holder(&self) -> Option<ActionId> {
        self.holder
    }

    pub fn children(&self) -> &[ActionId] {
        &self.children
    }
}

/// Derived view of an action's position in the tree. Never cached.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub arena: &'a Arena,
    pub id: ActionId,
    pub owner: Option<ActionId>,
    /// Index of the action in its owner's member list.
    pub position: Option<usize>,
    pub holder: Option<ActionId>,
    pub children: &'a [ActionId],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetKind {
    And,
    Or,
}

impl SetKind {
    fn of(kind: &ActionKind) -> Option<SetKind> {
        match kind {
            ActionKind::And(_) => Some(SetKind::And),
            ActionKind::Or(_) => Some(SetKind::Or),
            _ => None,
        }
    }

    fn wrap(self, members: Vec<ActionId>) -> ActionKind {
        match self {
            SetKind::And => ActionKind::And(members),
            SetKind::Or => ActionKind::Or(members),
        }
    }
}

/// Index-addressed storage for every action of one compilation.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<Action>,
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ActionId) -> &Action {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: ActionId) -> &ActionKind {
        &self.get(id).kind
    }

    pub fn members(&self, id: ActionId) -> &[ActionId] {
        self.kind(id).members()
    }

    pub fn context(&self, id: ActionId) -> ActionContext<'_> {
        let node = self.get(id);
        let position = node
            .owner
            .and_then(|owner| self.members(owner).iter().position(|m| *m == id));
        ActionContext {
            arena: self,
            id,
            owner: node.owner,
            position,
            holder: node.holder,
            children: &node.children,
        }
    }

    pub fn display(&self, id: ActionId) -> DisplayAction<'_> {
        DisplayAction { arena: self, id }
    }

    fn insert(&mut self, node: Action) -> ActionId {
        let id = ActionId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn leaf(&mut self, kind: ActionKind) -> ActionId {
        debug_assert!(!kind.is_set(), "sets must go through and()/or()");
        self.insert(Action {
            kind,
            owner: None,
            holder: None,
            children: Vec::new(),
        })
    }

    // ── Leaf constructors ───────────────────────────────────────────

    pub fn nop(&mut self) -> ActionId {
        self.leaf(ActionKind::Nop)
    }

    pub fn push(&mut self, target: impl Into<ButtonName>) -> ActionId {
        self.leaf(ActionKind::Push {
            target: target.into(),
        })
    }

    pub fn push_down(&mut self, target: impl Into<ButtonName>) -> ActionId {
        self.leaf(ActionKind::PushDown {
            target: target.into(),
        })
    }

    pub fn push_up(&mut self, target: impl Into<ButtonName>) -> ActionId {
        self.leaf(ActionKind::PushUp {
            target: target.into(),
        })
    }

    pub fn rotate(&mut self, stick: Stick, from: i64, to: i64) -> ActionId {
        self.leaf(ActionKind::RotateStick { stick, from, to })
    }

    pub fn move_stick(&mut self, stick: Stick, from: i64, to: i64) -> ActionId {
        self.leaf(ActionKind::MoveStick { stick, from, to })
    }

    pub fn set_stick(&mut self, stick: Stick, to: i64) -> ActionId {
        self.leaf(ActionKind::SetStick {
            stick,
            to,
            holding: false,
        })
    }

    pub fn unset_stick(&mut self, stick: Stick, from: i64) -> ActionId {
        self.leaf(ActionKind::UnsetStick { stick, from })
    }

    pub fn touch(&mut self, stick: Stick) -> ActionId {
        self.leaf(ActionKind::TouchStick { stick })
    }

    pub fn text(&mut self, text: impl Into<String>, group: TextGroup) -> ActionId {
        self.leaf(ActionKind::Text {
            text: text.into(),
            group,
        })
    }

    pub fn plugin(&mut self, name: impl Into<String>, args: Vec<String>) -> ActionId {
        self.leaf(ActionKind::Plugin {
            name: name.into(),
            args,
        })
    }

    // ── Composite constructors ──────────────────────────────────────

    /// `And(members)`, with same-kind members spliced in.
    pub fn and(&mut self, members: Vec<ActionId>) -> ActionId {
        self.new_set(SetKind::And, members, None, Vec::new(), None)
    }

    /// `Or(members)`, with same-kind members spliced in.
    pub fn or(&mut self, members: Vec<ActionId>) -> ActionId {
        self.new_set(SetKind::Or, members, None, Vec::new(), None)
    }

    /// `Hold(action, children)`. Children become statement-level actions
    /// whose holder is the new node.
    pub fn hold(
        &mut self,
        action: ActionId,
        children: Vec<ActionId>,
    ) -> Result<ActionId, ActionError> {
        if self.kind(action).is_hold() {
            return Err(ActionError::DuplicateHold);
        }
        if children.iter().any(|c| self.kind(*c).is_hold()) {
            return Err(ActionError::RecursiveHold);
        }
        let id = self.insert(Action {
            kind: ActionKind::Hold { action },
            owner: None,
            holder: None,
            children,
        });
        for child in self.nodes[id.0].children.clone() {
            self.nodes[child.0].holder = Some(id);
        }
        Ok(id)
    }

    /// Splice direct members that are sets of the same kind. One pass is
    /// enough: those members were flattened when they were built.
    fn flatten_members(&self, kind: SetKind, members: Vec<ActionId>) -> Vec<ActionId> {
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match &self.nodes[member.0].kind {
                ActionKind::And(inner) if kind == SetKind::And => flat.extend_from_slice(inner),
                ActionKind::Or(inner) if kind == SetKind::Or => flat.extend_from_slice(inner),
                _ => flat.push(member),
            }
        }
        flat
    }

    fn new_set(
        &mut self,
        kind: SetKind,
        members: Vec<ActionId>,
        owner: Option<ActionId>,
        children: Vec<ActionId>,
        holder: Option<ActionId>,
    ) -> ActionId {
        let members = self.flatten_members(kind, members);
        let id = self.insert(Action {
            kind: kind.wrap(members),
            owner,
            holder,
            children,
        });
        self.rebind_members(id);
        id
    }

    fn rebind_members(&mut self, set: ActionId) {
        let members = self.members(set).to_vec();
        for member in members {
            self.nodes[member.0].owner = Some(set);
        }
    }

    /// Replace the member list of an existing set in place, keeping the
    /// no-same-kind-nesting invariant and rebinding owners.
    /// Does nothing when `set` is not an And/Or.
    pub(crate) fn replace_members(&mut self, set: ActionId, members: Vec<ActionId>) {
        let Some(kind) = SetKind::of(self.kind(set)) else {
            return;
        };
        let members = self.flatten_members(kind, members);
        self.nodes[set.0].kind = kind.wrap(members);
        self.rebind_members(set);
    }

    /// Move `from`'s owner, holder and children onto `to`.
    pub(crate) fn transplant_bindings(&mut self, from: ActionId, to: ActionId) {
        let source = &self.nodes[from.0];
        let (owner, holder, children) = (source.owner, source.holder, source.children.clone());
        let target = &mut self.nodes[to.0];
        target.owner = owner;
        target.holder = holder;
        target.children = children;
    }

    /// Structurally independent copy of `id`. Sets are copied member by
    /// member so the copy's members point at the copy; children stay shared
    /// references because they are not owned by the action.
    pub fn deep_clone(&mut self, id: ActionId) -> ActionId {
        let node = self.get(id).clone();
        let kind = match node.kind {
            ActionKind::And(members) => {
                ActionKind::And(members.into_iter().map(|m| self.deep_clone(m)).collect())
            }
            ActionKind::Or(members) => {
                ActionKind::Or(members.into_iter().map(|m| self.deep_clone(m)).collect())
            }
            ActionKind::Hold { action } => ActionKind::Hold {
                action: self.deep_clone(action),
            },
            other => other,
        };
        let copy = self.insert(Action {
            kind,
            owner: node.owner,
            holder: node.holder,
            children: node.children,
        });
        self.rebind_members(copy);
        copy
    }

    /// `Or.and(other)`: boolean distribution of `other` over the
    /// alternatives of `or`.
    ///
    /// - `Or.and(Nop)` returns `or` unchanged;
    /// - `Or([A, B]).and(X)` is `Or([And([A, X]), And([B, X])])`;
    /// - `Or([A, B]).and(And([C, D]))` is `Or([And([A, C, D]), And([B, C, D])])`;
    /// - `Or([A, B]).and(Or([C, D]))` is the cross product, left-major.
    ///
    /// Every attached operand is a fresh clone. The new Or takes the
    /// bindings of `or`'s owner, whose place it is about to take.
    pub fn distribute(&mut self, or: ActionId, other: ActionId) -> Result<ActionId, ActionError> {
        self.distribute_capped(or, other, usize::MAX).map(|(id, _)| id)
    }

    /// [`distribute`](Self::distribute) that builds at most `limit`
    /// alternatives, in left-major order. The flag is set when the full
    /// product was larger and the rest were never built.
    pub fn distribute_capped(
        &mut self,
        or: ActionId,
        other: ActionId,
        limit: usize,
    ) -> Result<(ActionId, bool), ActionError> {
        let limit = limit.max(1);
        let alternatives = match self.kind(or) {
            ActionKind::Or(members) => members.clone(),
            _ => {
                return Err(ActionError::NotAnOr {
                    action: self.display(or).to_string(),
                })
            }
        };
        let operands: Vec<Vec<ActionId>> = match self.kind(other) {
            ActionKind::Nop => return Ok((or, false)),
            ActionKind::And(members) => vec![members.clone()],
            ActionKind::Or(members) => members.iter().map(|m| vec![*m]).collect(),
            _ => vec![vec![other]],
        };

        let product = alternatives.len().saturating_mul(operands.len());
        let truncated = product > limit;
        let mut ands = Vec::with_capacity(product.min(limit));
        'outer: for alternative in &alternatives {
            for operand in &operands {
                if ands.len() >= limit {
                    break 'outer;
                }
                let mut members = Vec::with_capacity(operand.len() + 1);
                members.push(self.deep_clone(*alternative));
                for m in operand {
                    members.push(self.deep_clone(*m));
                }
                ands.push(self.and(members));
            }
        }

        let (owner, children, holder) = match self.get(or).owner {
            Some(parent) => {
                let parent = self.get(parent);
                (parent.owner, parent.children.clone(), parent.holder)
            }
            None => (None, Vec::new(), None),
        };
        Ok((self.new_set(SetKind::Or, ands, owner, children, holder), truncated))
    }

    fn not_holdable(&self, id: ActionId) -> ActionError {
        ActionError::NotHoldable {
            action: self.display(id).to_string(),
        }
    }

    /// Split every member of a set with `split`, rebuilding a set of the
    /// same kind under the given owner and holder.
    fn split_set(
        &mut self,
        kind: SetKind,
        members: Vec<ActionId>,
        owner: Option<ActionId>,
        holder: Option<ActionId>,
        children: &[ActionId],
        split: fn(&mut Arena, ActionId, &[ActionId]) -> Result<ActionId, ActionError>,
    ) -> Result<ActionId, ActionError> {
        let parts = members
            .into_iter()
            .map(|m| split(self, m, children))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.new_set(kind, parts, owner, children.to_vec(), holder))
    }

    /// The "press" half of holding `id` while `children` run.
    pub fn as_hold_start(
        &mut self,
        id: ActionId,
        children: &[ActionId],
    ) -> Result<ActionId, ActionError> {
        let node = self.get(id).clone();
        let kind = match node.kind {
            ActionKind::Nop => ActionKind::Nop,
            ActionKind::Push { target } | ActionKind::PushDown { target } => {
                ActionKind::PushDown { target }
            }
            ActionKind::PushUp { .. }
            | ActionKind::RotateStick { .. }
            | ActionKind::MoveStick { .. }
            | ActionKind::UnsetStick { .. }
            | ActionKind::PluginHoldEnd { .. } => return Err(self.not_holdable(id)),
            ActionKind::Hold { .. } => return Err(ActionError::DuplicateHold),
            ActionKind::And(members) => {
                return self.split_set(
                    SetKind::And,
                    members,
                    node.owner,
                    node.holder,
                    children,
                    Self::as_hold_start,
                )
            }
            ActionKind::Or(members) => {
                return self.split_set(
                    SetKind::Or,
                    members,
                    node.owner,
                    node.holder,
                    children,
                    Self::as_hold_start,
                )
            }
            ActionKind::SetStick { stick, to, .. } => ActionKind::SetStick {
                stick,
                to,
                holding: true,
            },
            ActionKind::TouchStick { stick } => ActionKind::TouchStick { stick },
            ActionKind::Text { text, group } => ActionKind::Text { text, group },
            ActionKind::Plugin { name, args } | ActionKind::PluginHoldStart { name, args } => {
                ActionKind::PluginHoldStart { name, args }
            }
        };
        Ok(self.insert(Action {
            kind,
            owner: node.owner,
            holder: node.holder,
            children: children.to_vec(),
        }))
    }

    /// The "release" half of holding `id`. Instantaneous actions release
    /// as a Nop.
    pub fn as_hold_end(
        &mut self,
        id: ActionId,
        children: &[ActionId],
    ) -> Result<ActionId, ActionError> {
        let node = self.get(id).clone();
        let kind = match node.kind {
            ActionKind::Nop
            | ActionKind::RotateStick { .. }
            | ActionKind::MoveStick { .. }
            | ActionKind::UnsetStick { .. }
            | ActionKind::Text { .. } => ActionKind::Nop,
            ActionKind::Push { target }
            | ActionKind::PushDown { target }
            | ActionKind::PushUp { target } => ActionKind::PushUp { target },
            ActionKind::Hold { .. } => return Err(ActionError::DuplicateHold),
            ActionKind::And(members) => {
                return self.split_set(
                    SetKind::And,
                    members,
                    node.owner,
                    node.holder,
                    children,
                    Self::as_hold_end,
                )
            }
            ActionKind::Or(members) => {
                return self.split_set(
                    SetKind::Or,
                    members,
                    node.owner,
                    node.holder,
                    children,
                    Self::as_hold_end,
                )
            }
            ActionKind::SetStick { stick, to, .. } => ActionKind::UnsetStick { stick, from: to },
            ActionKind::TouchStick { stick } => ActionKind::UnsetStick { stick, from: 0 },
            ActionKind::Plugin { name, args }
            | ActionKind::PluginHoldStart { name, args }
            | ActionKind::PluginHoldEnd { name, args } => ActionKind::PluginHoldEnd { name, args },
        };
        Ok(self.insert(Action {
            kind,
            owner: node.owner,
            holder: node.holder,
            children: children.to_vec(),
        }))
    }
}

/// DSL-like rendering of one action, from [`Arena::display`].
pub struct DisplayAction<'a> {
    arena: &'a Arena,
    id: ActionId,
}

impl DisplayAction<'_> {
    fn list(&self, f: &mut fmt::Formatter<'_>, ids: &[ActionId]) -> fmt::Result {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.arena.display(*id))?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.arena.get(self.id);
        match &node.kind {
            ActionKind::Nop => f.write_str("nop()"),
            ActionKind::Push { target } => f.write_str(target),
            ActionKind::PushDown { target } => write!(f, "pushDown({})", target),
            ActionKind::PushUp { target } => write!(f, "pushUp({})", target),
            ActionKind::And(members) => {
                f.write_str("(")?;
                self.list(f, members)?;
                f.write_str(")")
            }
            ActionKind::Or(members) => {
                f.write_str("or(")?;
                self.list(f, members)?;
                f.write_str(")")
            }
            ActionKind::Hold { action } => {
                write!(f, "{} {{ ", self.arena.display(*action))?;
                self.list(f, &node.children)?;
                f.write_str(" }")
            }
            ActionKind::RotateStick { stick, from, to } => {
                write!(f, "rotate{}({}, {})", stick.suffix(), from, to)
            }
            ActionKind::MoveStick { stick, from, to } => {
                write!(f, "move{}({}, {})", stick.suffix(), from, to)
            }
            ActionKind::SetStick { stick, to, holding } => {
                if *holding {
                    write!(f, "set{}({}, hold)", stick.suffix(), to)
                } else {
                    write!(f, "set{}({})", stick.suffix(), to)
                }
            }
            ActionKind::UnsetStick { stick, from } => {
                write!(f, "unset{}({})", stick.suffix(), from)
            }
            ActionKind::TouchStick { stick } => write!(f, "touch{}()", stick.suffix()),
            ActionKind::Text { text, group } => match group {
                TextGroup::Normal => write!(f, "{:?}", text),
                other => write!(f, "{}({:?})", other.as_str(), text),
            },
            ActionKind::Plugin { name, args } => write!(f, "{}({})", name, args.join(", ")),
            ActionKind::PluginHoldStart { name, args } => {
                write!(f, "{}.start({})", name, args.join(", "))
            }
            ActionKind::PluginHoldEnd { name, args } => {
                write!(f, "{}.end({})", name, args.join(", "))
            }
        }
    }
}
