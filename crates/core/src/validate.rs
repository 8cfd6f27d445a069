//! Per-branch validation.
//!
//! Walks one Or-free, hold-free branch in order, tracking which buttons are
//! held down, and reports controller actions that cannot be performed.

use crate::action::{ActionId, ActionKind, Arena, ButtonName, Stick};
use crate::error::{ErrorCode, ValidationError};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// State threaded through one branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationContext {
    /// Buttons currently held down.
    pub pushed: BTreeSet<ButtonName>,
    /// Last angle each stick was left at. A missing stick is unset.
    pub stick_angles: BTreeMap<Stick, i64>,
    pub errors: Vec<ValidationError>,
}

impl ValidationContext {
    pub fn new() -> Self {
        ValidationContext::default()
    }
}

pub struct ErrorChecker {
    branch: Option<usize>,
}

impl ErrorChecker {
    /// Checker whose findings are tagged with `branch`.
    pub fn new(branch: Option<usize>) -> Self {
        ErrorChecker { branch }
    }

    /// Validate `actions` in order from a fresh context.
    pub fn check(&self, arena: &Arena, actions: &[ActionId]) -> ValidationContext {
        let mut ctx = ValidationContext::new();
        for id in actions {
            self.visit(arena, *id, &mut ctx);
        }
        ctx
    }

    fn report(&self, ctx: &mut ValidationContext, code: ErrorCode, message: String) {
        ctx.errors.push(ValidationError::new(self.branch, code, message));
    }

    pub fn visit(&self, arena: &Arena, id: ActionId, ctx: &mut ValidationContext) {
        match arena.kind(id) {
            ActionKind::And(members) => self.visit_and(arena, members, ctx),
            ActionKind::Or(_) => {
                warn!(action = %arena.display(id), "or group reached the validator unbranched");
            }
            ActionKind::Push { target } => {
                if ctx.pushed.contains(target) {
                    self.report(
                        ctx,
                        ErrorCode::Push,
                        format!(
                            "Double push for \"{}\" can't be done(\"{}\" is already pushed).",
                            target, target
                        ),
                    );
                }
            }
            ActionKind::PushDown { target } => {
                if ctx.pushed.contains(target) {
                    self.report(
                        ctx,
                        ErrorCode::Push,
                        format!(
                            "Double pushDown for \"{}\" can't be done(\"{}\" is already pushed).",
                            target, target
                        ),
                    );
                } else {
                    ctx.pushed.insert(target.clone());
                }
            }
            ActionKind::PushUp { target } => {
                if !ctx.pushed.remove(target) {
                    self.report(
                        ctx,
                        ErrorCode::PushUp,
                        format!("Non pushed button \"{}\" can't be pushed up.", target),
                    );
                }
            }
            ActionKind::RotateStick { stick, from, to } => {
                ctx.stick_angles.insert(*stick, *to);
                if from == to {
                    self.report(
                        ctx,
                        ErrorCode::Rotate,
                        format!("Stick can't be rotated from {} to {}", from, to),
                    );
                }
            }
            ActionKind::MoveStick { stick, from, to } => {
                ctx.stick_angles.insert(*stick, *to);
                if from == to {
                    self.report(
                        ctx,
                        ErrorCode::Move,
                        format!("Stick can't be moved from {} to {}", from, to),
                    );
                }
            }
            ActionKind::SetStick { stick, to, .. } => {
                ctx.stick_angles.insert(*stick, *to);
            }
            ActionKind::UnsetStick { stick, .. } => {
                ctx.stick_angles.remove(stick);
            }
            ActionKind::Nop
            | ActionKind::Hold { .. }
            | ActionKind::TouchStick { .. }
            | ActionKind::Text { .. }
            | ActionKind::Plugin { .. }
            | ActionKind::PluginHoldStart { .. }
            | ActionKind::PluginHoldEnd { .. } => {}
        }
    }

    /// Simultaneous members may not touch the same button or stick twice.
    /// Button conflicts are reported before stick conflicts, each in order
    /// of first appearance.
    fn visit_and(&self, arena: &Arena, members: &[ActionId], ctx: &mut ValidationContext) {
        let mut buttons: Vec<(&str, usize)> = Vec::new();
        let mut sticks: Vec<(Stick, usize)> = Vec::new();
        for member in members {
            match arena.kind(*member) {
                ActionKind::Push { target }
                | ActionKind::PushDown { target }
                | ActionKind::PushUp { target } => tally(&mut buttons, target.as_str()),
                ActionKind::RotateStick { stick, .. }
                | ActionKind::MoveStick { stick, .. }
                | ActionKind::SetStick { stick, .. }
                | ActionKind::UnsetStick { stick, .. } => tally(&mut sticks, *stick),
                _ => {}
            }
        }

        for (button, count) in buttons {
            if count >= 2 {
                self.report(
                    ctx,
                    ErrorCode::ActionSet,
                    format!("Duplicate pushDown or pushUp for \"{}\" is detected", button),
                );
            }
        }
        for (stick, count) in sticks {
            if count >= 2 {
                self.report(
                    ctx,
                    ErrorCode::ActionSet,
                    format!("Duplicate stick operation for \"{}\" is detected", stick),
                );
            }
        }

        for member in members {
            self.visit(arena, *member, ctx);
        }
    }
}

fn tally<K: PartialEq>(counts: &mut Vec<(K, usize)>, key: K) {
    match counts.iter_mut().find(|(k, _)| *k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key, 1)),
    }
}
