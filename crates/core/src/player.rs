//! Execution seam.
//!
//! An [`ActionPlayer`] is whatever actually drives a controller. [`play`]
//! walks an optimized ast and calls exactly one player method per action.
//! Holds must already have been extracted; `compile` guarantees that for
//! its `ast` output.

use crate::action::{ActionContext, ActionId, ActionKind, Arena, Stick, TextGroup};
use crate::ast::Ast;

pub trait ActionPlayer {
    type Error: std::error::Error + 'static;

    /// Called once before the first action of a [`play`] run.
    fn reset(&mut self) {}

    fn push(&mut self, target: &str, ctx: ActionContext<'_>) -> Result<(), Self::Error>;
    fn push_down(&mut self, target: &str, ctx: ActionContext<'_>) -> Result<(), Self::Error>;
    fn push_up(&mut self, target: &str, ctx: ActionContext<'_>) -> Result<(), Self::Error>;

    fn rotate(
        &mut self,
        stick: Stick,
        from: i64,
        to: i64,
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;
    fn move_stick(
        &mut self,
        stick: Stick,
        from: i64,
        to: i64,
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;
    fn set(
        &mut self,
        stick: Stick,
        to: i64,
        holding: bool,
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;
    fn unset(&mut self, stick: Stick, from: i64, ctx: ActionContext<'_>) -> Result<(), Self::Error>;
    fn touch(&mut self, stick: Stick, ctx: ActionContext<'_>) -> Result<(), Self::Error>;

    fn text(
        &mut self,
        text: &str,
        group: TextGroup,
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;

    fn plugin(
        &mut self,
        name: &str,
        args: &[String],
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;
    fn plugin_hold_start(
        &mut self,
        name: &str,
        args: &[String],
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;
    fn plugin_hold_end(
        &mut self,
        name: &str,
        args: &[String],
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;

    /// Members run simultaneously. Implementations recurse with
    /// [`play_action`] as they see fit.
    fn and_group(
        &mut self,
        members: &[ActionId],
        ctx: ActionContext<'_>,
    ) -> Result<(), Self::Error>;
    /// Exactly one member should run; choosing it is up to the player.
    fn or_group(&mut self, members: &[ActionId], ctx: ActionContext<'_>) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum PlayError<E: std::error::Error + 'static> {
    #[error("hold statement reached the player; holds must be extracted first")]
    UnextractedHold,

    #[error(transparent)]
    Player(E),
}

/// Reset `player` and run every top-level action of `ast` in order.
pub fn play<P: ActionPlayer + ?Sized>(
    ast: &Ast,
    player: &mut P,
) -> Result<(), PlayError<P::Error>> {
    player.reset();
    for id in &ast.actions {
        play_action(&ast.arena, *id, player)?;
    }
    Ok(())
}

/// Dispatch one action to the matching player method. Nop does nothing.
pub fn play_action<P: ActionPlayer + ?Sized>(
    arena: &Arena,
    id: ActionId,
    player: &mut P,
) -> Result<(), PlayError<P::Error>> {
    let ctx = arena.context(id);
    let result = match arena.kind(id) {
        ActionKind::Nop => Ok(()),
        ActionKind::Hold { .. } => return Err(PlayError::UnextractedHold),
        ActionKind::Push { target } => player.push(target, ctx),
        ActionKind::PushDown { target } => player.push_down(target, ctx),
        ActionKind::PushUp { target } => player.push_up(target, ctx),
        ActionKind::And(members) => player.and_group(members, ctx),
        ActionKind::Or(members) => player.or_group(members, ctx),
        ActionKind::RotateStick { stick, from, to } => player.rotate(*stick, *from, *to, ctx),
        ActionKind::MoveStick { stick, from, to } => player.move_stick(*stick, *from, *to, ctx),
        ActionKind::SetStick { stick, to, holding } => player.set(*stick, *to, *holding, ctx),
        ActionKind::UnsetStick { stick, from } => player.unset(*stick, *from, ctx),
        ActionKind::TouchStick { stick } => player.touch(*stick, ctx),
        ActionKind::Text { text, group } => player.text(text, *group, ctx),
        ActionKind::Plugin { name, args } => player.plugin(name, args, ctx),
        ActionKind::PluginHoldStart { name, args } => player.plugin_hold_start(name, args, ctx),
        ActionKind::PluginHoldEnd { name, args } => player.plugin_hold_end(name, args, ctx),
    };
    result.map_err(PlayError::Player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        resets: usize,
    }

    impl Recorder {
        fn record(&mut self, entry: String) -> Result<(), Infallible> {
            self.log.push(entry);
            Ok(())
        }
    }

    impl ActionPlayer for Recorder {
        type Error = Infallible;

        fn reset(&mut self) {
            self.resets += 1;
            self.log.clear();
        }
        fn push(&mut self, target: &str, _: ActionContext<'_>) -> Result<(), Infallible> {
            self.record(format!("push {}", target))
        }
        fn push_down(&mut self, target: &str, _: ActionContext<'_>) -> Result<(), Infallible> {
            self.record(format!("down {}", target))
        }
        fn push_up(&mut self, target: &str, _: ActionContext<'_>) -> Result<(), Infallible> {
            self.record(format!("up {}", target))
        }
        fn rotate(
            &mut self,
            stick: Stick,
            from: i64,
            to: i64,
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("rotate {} {} {}", stick, from, to))
        }
        fn move_stick(
            &mut self,
            stick: Stick,
            from: i64,
            to: i64,
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("move {} {} {}", stick, from, to))
        }
        fn set(
            &mut self,
            stick: Stick,
            to: i64,
            holding: bool,
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("set {} {} {}", stick, to, holding))
        }
        fn unset(
            &mut self,
            stick: Stick,
            from: i64,
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("unset {} {}", stick, from))
        }
        fn touch(&mut self, stick: Stick, _: ActionContext<'_>) -> Result<(), Infallible> {
            self.record(format!("touch {}", stick))
        }
        fn text(
            &mut self,
            text: &str,
            group: TextGroup,
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("{} {}", group.as_str(), text))
        }
        fn plugin(
            &mut self,
            name: &str,
            args: &[String],
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("plugin {} {}", name, args.join(" ")))
        }
        fn plugin_hold_start(
            &mut self,
            name: &str,
            _: &[String],
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("start {}", name))
        }
        fn plugin_hold_end(
            &mut self,
            name: &str,
            _: &[String],
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("end {}", name))
        }
        fn and_group(
            &mut self,
            members: &[ActionId],
            ctx: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("and {}", members.len()))?;
            for member in members {
                if let Err(PlayError::Player(e)) = play_action(ctx.arena, *member, self) {
                    return Err(e);
                }
            }
            Ok(())
        }
        fn or_group(
            &mut self,
            members: &[ActionId],
            _: ActionContext<'_>,
        ) -> Result<(), Infallible> {
            self.record(format!("or {}", members.len()))
        }
    }

    #[test]
    fn each_action_calls_one_method() {
        let src = r#"a, (pushDown(b), setR(90)), nop(), touchL(), info("hi"), turbo(2)"#;
        let ast = parse(src).unwrap();
        let mut recorder = Recorder::default();
        play(&ast, &mut recorder).unwrap();
        assert_eq!(
            recorder.log,
            [
                "push a",
                "and 2",
                "down b",
                "set rstick 90 false",
                "touch lstick",
                "info hi",
                "plugin turbo 2",
            ]
        );
        assert_eq!(recorder.resets, 1);
    }

    #[test]
    fn or_group_is_left_to_the_player() {
        let ast = parse("or(x, y, z)").unwrap();
        let mut recorder = Recorder::default();
        play(&ast, &mut recorder).unwrap();
        assert_eq!(recorder.log, ["or 3"]);
    }

    #[test]
    fn hold_must_be_extracted_first() {
        let ast = parse("a { b }").unwrap();
        let mut recorder = Recorder::default();
        assert!(matches!(
            play(&ast, &mut recorder),
            Err(PlayError::UnextractedHold)
        ));
    }

    #[test]
    fn context_reports_position_in_owner() {
        let ast = parse("(a, b, c)").unwrap();
        let and = ast.actions[0];
        let c = ast.arena.members(and)[2];
        let ctx = ast.arena.context(c);
        assert_eq!(ctx.owner, Some(and));
        assert_eq!(ctx.position, Some(2));
    }
}
