//! Dry-run player: records what a controller would be told to do.

use combo_core::{play_action, ActionContext, ActionId, ActionPlayer, PlayError, Stick, TextGroup};

#[derive(Debug, thiserror::Error)]
pub(crate) enum TraceError {
    #[error("hold statement inside a group cannot be played")]
    NestedHold,
}

#[derive(Debug, Default)]
pub(crate) struct TracePlayer {
    steps: Vec<String>,
    depth: usize,
}

impl TracePlayer {
    pub(crate) fn steps(&self) -> &[String] {
        &self.steps
    }

    fn step(&mut self, line: String) -> Result<(), TraceError> {
        tracing::debug!(depth = self.depth, step = %line, "play");
        self.steps.push(format!("{}{}", "  ".repeat(self.depth), line));
        Ok(())
    }

    fn nested(&mut self, members: &[ActionId], ctx: ActionContext<'_>) -> Result<(), TraceError> {
        self.depth += 1;
        let result = members.iter().try_for_each(|member| {
            play_action(ctx.arena, *member, &mut *self).map_err(|e| match e {
                PlayError::Player(e) => e,
                PlayError::UnextractedHold => TraceError::NestedHold,
            })
        });
        self.depth -= 1;
        result
    }
}

impl ActionPlayer for TracePlayer {
    type Error = TraceError;

    fn reset(&mut self) {
        self.steps.clear();
        self.depth = 0;
    }

    fn push(&mut self, target: &str, _: ActionContext<'_>) -> Result<(), TraceError> {
        self.step(format!("tap {}", target))
    }

    fn push_down(&mut self, target: &str, _: ActionContext<'_>) -> Result<(), TraceError> {
        self.step(format!("press {}", target))
    }

    fn push_up(&mut self, target: &str, _: ActionContext<'_>) -> Result<(), TraceError> {
        self.step(format!("release {}", target))
    }

    fn rotate(
        &mut self,
        stick: Stick,
        from: i64,
        to: i64,
        _: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        self.step(format!("rotate {} {} -> {}", stick, from, to))
    }

    fn move_stick(
        &mut self,
        stick: Stick,
        from: i64,
        to: i64,
        _: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        self.step(format!("move {} {} -> {}", stick, from, to))
    }

    fn set(
        &mut self,
        stick: Stick,
        to: i64,
        holding: bool,
        _: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        let held = if holding { " (held)" } else { "" };
        self.step(format!("set {} to {}{}", stick, to, held))
    }

    fn unset(&mut self, stick: Stick, from: i64, _: ActionContext<'_>) -> Result<(), TraceError> {
        self.step(format!("unset {} from {}", stick, from))
    }

    fn touch(&mut self, stick: Stick, _: ActionContext<'_>) -> Result<(), TraceError> {
        self.step(format!("touch {}", stick))
    }

    fn text(
        &mut self,
        text: &str,
        group: TextGroup,
        _: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        self.step(format!("{}: {}", group.as_str(), text))
    }

    fn plugin(
        &mut self,
        name: &str,
        args: &[String],
        _: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        self.step(format!("plugin {}({})", name, args.join(", ")))
    }

    fn plugin_hold_start(
        &mut self,
        name: &str,
        args: &[String],
        _: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        self.step(format!("plugin {}.start({})", name, args.join(", ")))
    }

    fn plugin_hold_end(
        &mut self,
        name: &str,
        args: &[String],
        _: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        self.step(format!("plugin {}.end({})", name, args.join(", ")))
    }

    fn and_group(
        &mut self,
        members: &[ActionId],
        ctx: ActionContext<'_>,
    ) -> Result<(), TraceError> {
        self.step("together:".to_string())?;
        self.nested(members, ctx)
    }

    /// Dry runs always take the first alternative.
    fn or_group(&mut self, members: &[ActionId], ctx: ActionContext<'_>) -> Result<(), TraceError> {
        self.step(format!("one of {}, taking the first:", members.len()))?;
        self.nested(&members[..members.len().min(1)], ctx)
    }
}
