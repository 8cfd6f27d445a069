//! combo-core: compiler for the combo controller-input language.
//!
//! Turns combo source (button presses, stick motions, simultaneous groups,
//! alternatives and hold blocks) into an executable action tree plus a list
//! of validation errors found by exploring every alternative.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`compile()`] / [`compile_with()`] -- run the full pipeline
//! - [`Ast`], [`Arena`], [`ActionId`], [`ActionKind`] -- the action tree
//! - [`ActionMapper`] and the rewrite passes in [`mapper`]
//! - [`ActionPlayer`] / [`play()`] -- the execution seam
//! - [`ValidationError`], [`ErrorCode`] -- reported findings
//!
//! The individual pipeline stages are also re-exported for callers that
//! want the intermediate forms.

pub mod action;
pub mod ast;
pub mod branch;
pub mod compile;
pub mod config;
pub mod error;
pub mod lexer;
pub mod mapper;
pub mod parser;
pub mod player;
pub mod validate;

// ── Convenience re-exports: key types ────────────────────────────────

pub use action::{
    Action, ActionContext, ActionId, ActionKind, Arena, ButtonName, Stick, TextGroup,
};
pub use ast::{Ast, Branches};
pub use config::CompileOptions;
pub use error::{ActionError, CompileError, ErrorCode, SyntaxError, ValidationError};
pub use mapper::ActionMapper;
pub use player::{ActionPlayer, PlayError};
pub use validate::{ErrorChecker, ValidationContext};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::{
    compile, compile_plain_ast, compile_with, create_debug_branches, optimize_ast,
    validate_branches, CompileResult,
};
pub use parser::parse;
pub use player::{play, play_action};
