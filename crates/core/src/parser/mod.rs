/// Combo source parser.
/// Builds the plain action tree straight into an arena. No rewriting or
/// validation happens here: nested same-kind groups are spliced by the
/// arena constructors and everything else is left to the mappers.
use crate::action::{ActionId, Arena, TextGroup};
use crate::ast::Ast;
use crate::error::{CompileError, SyntaxError};
use crate::lexer::{self, Spanned, Token};

mod calls;

use calls::Arg;

/// Deepest allowed nesting of groups and hold blocks.
const MAX_NESTING: usize = 128;

/// Parse combo source into its plain ast.
pub fn parse(src: &str) -> Result<Ast, CompileError> {
    let tokens = lexer::lex(src)?;
    let mut p = Parser::new(&tokens);
    let actions = p.parse_program()?;
    Ok(Ast::new(p.arena, actions))
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
    arena: Arena,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            arena: Arena::new(),
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> CompileError {
        SyntaxError::parse(self.cur_line(), msg).into()
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if self.depth >= MAX_NESTING {
            return Err(self.err(format!(
                "nesting too deep (more than {} levels)",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn skip_commas(&mut self) {
        while self.peek() == &Token::Comma {
            self.advance();
        }
    }

    // -- Statements ---------------------------------------------

    fn parse_program(&mut self) -> Result<Vec<ActionId>, CompileError> {
        let mut actions = Vec::new();
        loop {
            self.skip_commas();
            match self.peek() {
                Token::Eof => break,
                Token::RParen => return Err(self.err("unexpected ')' with no open group")),
                Token::RBrace => return Err(self.err("unexpected '}' with no open hold")),
                _ => actions.push(self.parse_statement()?),
            }
        }
        Ok(actions)
    }

    /// `action` or `action { statement* }`.
    fn parse_statement(&mut self) -> Result<ActionId, CompileError> {
        let action = self.parse_action()?;
        if self.peek() != &Token::LBrace {
            return Ok(action);
        }
        self.advance();
        let children = self.nested(Self::parse_hold_body)?;
        Ok(self.arena.hold(action, children)?)
    }

    /// Statements of a hold block, after the opening brace.
    fn parse_hold_body(&mut self) -> Result<Vec<ActionId>, CompileError> {
        let mut children = Vec::new();
        loop {
            self.skip_commas();
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    return Ok(children);
                }
                Token::Eof => return Err(self.err("expected '}' to close hold block")),
                _ => children.push(self.parse_statement()?),
            }
        }
    }

    // -- Actions ------------------------------------------------

    fn parse_action(&mut self) -> Result<ActionId, CompileError> {
        match self.peek().clone() {
            Token::LParen => {
                self.advance();
                let members = self.parse_group()?;
                Ok(self.arena.and(members))
            }
            Token::Str(text) => {
                self.advance();
                Ok(self.arena.text(text, TextGroup::Normal))
            }
            Token::Word(word) => {
                let line = self.cur_line();
                self.advance();
                if self.peek() != &Token::LParen {
                    return Ok(self.arena.push(word.to_lowercase()));
                }
                self.advance();
                let name = word.to_lowercase();
                if name == "or" {
                    let members = self.parse_group()?;
                    return Ok(self.arena.or(members));
                }
                let args = self.parse_args()?;
                Ok(calls::build(&mut self.arena, &name, &args, line)?)
            }
            Token::Int(n) => Err(self.err(format!(
                "unexpected integer {}; actions are button names, calls or strings",
                n
            ))),
            other => Err(self.err(format!("expected an action, got {:?}", other))),
        }
    }

    /// Members of `( ... )` or `or( ... )`, after the opening paren.
    fn parse_group(&mut self) -> Result<Vec<ActionId>, CompileError> {
        self.nested(Self::parse_group_members)
    }

    fn parse_group_members(&mut self) -> Result<Vec<ActionId>, CompileError> {
        let mut members = Vec::new();
        loop {
            self.skip_commas();
            match self.peek() {
                Token::RParen => {
                    self.advance();
                    return Ok(members);
                }
                Token::Eof => return Err(self.err("expected ')' to close group")),
                Token::LBrace => {
                    return Err(self.err("hold blocks are only allowed at statement level"))
                }
                _ => members.push(self.parse_action()?),
            }
        }
    }

    /// Call arguments, after the opening paren.
    fn parse_args(&mut self) -> Result<Vec<Arg>, CompileError> {
        let mut args = Vec::new();
        loop {
            self.skip_commas();
            let arg = match self.peek().clone() {
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                }
                Token::Word(w) => Arg::Word(w),
                Token::Str(s) => Arg::Str(s),
                Token::Int(n) => Arg::Int(n),
                Token::Eof => return Err(self.err("expected ')' to close argument list")),
                other => {
                    return Err(self.err(format!("expected an argument, got {:?}", other)))
                }
            };
            self.advance();
            args.push(arg);
        }
    }
}
