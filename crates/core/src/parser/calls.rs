//! Call-form resolution: `name(args)` to a concrete action.

use crate::action::{ActionId, Arena, Stick, TextGroup};
use crate::error::SyntaxError;
use std::fmt;

/// A raw call argument as it appeared in source.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Arg {
    Word(String),
    Str(String),
    Int(i64),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Word(w) | Arg::Str(w) => f.write_str(w),
            Arg::Int(n) => write!(f, "{}", n),
        }
    }
}

pub(super) fn build(
    arena: &mut Arena,
    name: &str,
    args: &[Arg],
    line: u32,
) -> Result<ActionId, SyntaxError> {
    let call = Call { name, args, line };
    let id = match name {
        "rotate" | "rotatel" => {
            let (from, to) = call.angle_pair()?;
            arena.rotate(Stick::Left, from, to)
        }
        "rotater" => {
            let (from, to) = call.angle_pair()?;
            arena.rotate(Stick::Right, from, to)
        }
        "move" | "movel" => {
            let (from, to) = call.angle_pair()?;
            arena.move_stick(Stick::Left, from, to)
        }
        "mover" => {
            let (from, to) = call.angle_pair()?;
            arena.move_stick(Stick::Right, from, to)
        }
        "set" | "setl" => arena.set_stick(Stick::Left, call.angle(0)?),
        "setr" => arena.set_stick(Stick::Right, call.angle(0)?),
        "unset" | "unsetl" => arena.unset_stick(Stick::Left, call.angle(0)?),
        "unsetr" => arena.unset_stick(Stick::Right, call.angle(0)?),
        "touch" | "touchl" => arena.touch(Stick::Left),
        "touchr" => arena.touch(Stick::Right),
        "pushdown" => arena.push_down(call.text(0)?.to_lowercase()),
        "pushup" => arena.push_up(call.text(0)?.to_lowercase()),
        "info" => arena.text(call.text(0)?, TextGroup::Info),
        "warn" => arena.text(call.text(0)?, TextGroup::Warn),
        "error" => arena.text(call.text(0)?, TextGroup::Error),
        "nop" => arena.nop(),
        _ => arena.plugin(name, args.iter().map(Arg::to_string).collect()),
    };
    Ok(id)
}

struct Call<'a> {
    name: &'a str,
    args: &'a [Arg],
    line: u32,
}

impl Call<'_> {
    fn arg(&self, index: usize) -> Result<&Arg, SyntaxError> {
        self.args.get(index).ok_or_else(|| {
            SyntaxError::parse(
                self.line,
                format!("{}() expects at least {} argument(s)", self.name, index + 1),
            )
        })
    }

    fn angle(&self, index: usize) -> Result<i64, SyntaxError> {
        match self.arg(index)? {
            Arg::Int(n) => Ok(*n),
            other => Err(SyntaxError::parse(
                self.line,
                format!("{}() expects an integer angle, got '{}'", self.name, other),
            )),
        }
    }

    fn angle_pair(&self) -> Result<(i64, i64), SyntaxError> {
        Ok((self.angle(0)?, self.angle(1)?))
    }

    fn text(&self, index: usize) -> Result<String, SyntaxError> {
        Ok(self.arg(index)?.to_string())
    }
}
