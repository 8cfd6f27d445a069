use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Button names, call names and bare plugin arguments
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Signed integer literal
    Int(i64),
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

/// Characters that end a word.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '(' | ')' | '{' | '}' | '"' | '\'')
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;

    while pos < chars.len() {
        let c = chars[pos];

        // Whitespace
        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            pos += 1;
            continue;
        }

        let tok_line = line;

        // String literal, either quote style
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(SyntaxError::lex(tok_line, "unclosed string literal"));
                }
                let sc = chars[pos];
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(SyntaxError::lex(tok_line, "unterminated escape in string"));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\'' => s.push('\''),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                if sc == '\n' {
                    line += 1;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                line: tok_line,
            });
            continue;
        }

        // Integer
        if c.is_ascii_digit()
            || (c == '-' && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit())
        {
            let start = pos;
            pos += 1;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let s: String = chars[start..pos].iter().collect();
            let n: i64 = s
                .parse()
                .map_err(|_| SyntaxError::lex(tok_line, format!("invalid integer '{}'", s)))?;
            tokens.push(Spanned {
                token: Token::Int(n),
                line: tok_line,
            });
            continue;
        }

        // Punctuation
        let punct = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = punct {
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            pos += 1;
            continue;
        }

        // Word: anything up to the next delimiter, including non-ASCII names
        let start = pos;
        while pos < chars.len() && !is_delimiter(chars[pos]) {
            pos += 1;
        }
        let word: String = chars[start..pos].iter().collect();
        tokens.push(Spanned {
            token: Token::Word(word),
            line: tok_line,
        });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}
