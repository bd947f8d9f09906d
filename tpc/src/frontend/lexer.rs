//! Hand-rolled lexer: source text to a flat token stream with line numbers.
//! Comments (`//` to end of line, `/* ... */`) and whitespace are skipped;
//! everything else is a keyword, identifier, literal, or piece of
//! punctuation from the fixed set §4.8 describes.

use super::{Result, SyntaxError};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int,
    Char,
    Void,
    If,
    Else,
    While,
    Return,
    Ident(String),
    IntLit(i64),
    CharLit(u8),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Assign,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Ampersand,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
}

fn err(line: u32, message: impl Into<String>) -> SyntaxError {
    SyntaxError { message: message.into(), line }
}

/// Decodes the same escape set `charToAsciiCode` recognizes.
fn decode_escape(c: char, line: u32) -> Result<u8> {
    Ok(match c {
        'n' => b'\n',
        't' => b'\t',
        'r' => b'\r',
        'b' => 8,
        'f' => 12,
        'a' => 7,
        'v' => 11,
        '0' => 0,
        other if other.is_ascii() => other as u8,
        _ => return Err(err(line, "invalid escape sequence in character literal")),
    })
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Lexer<'a> {
        Lexer { chars: source.chars().peekable(), line: 1 }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.next() {
                        Some('/') => {
                            self.bump();
                            self.bump();
                            while let Some(c) = self.peek() {
                                if c == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some('*') => {
                            let start_line = self.line;
                            self.bump();
                            self.bump();
                            loop {
                                match self.bump() {
                                    Some('*') if self.peek() == Some('/') => {
                                        self.bump();
                                        break;
                                    }
                                    Some(_) => continue,
                                    None => return Err(err(start_line, "unterminated block comment")),
                                }
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text.parse::<i64>()
            .map(TokenKind::IntLit)
            .map_err(|_| err(self.line, "malformed integer literal"))
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match text.as_str() {
            "int" => TokenKind::Int,
            "char" => TokenKind::Char,
            "void" => TokenKind::Void,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            _ => TokenKind::Ident(text),
        }
    }

    fn lex_char_literal(&mut self) -> Result<TokenKind> {
        let line = self.line;
        self.bump(); // opening quote
        let value = match self.bump() {
            Some('\\') => {
                let escaped = self.bump().ok_or_else(|| err(line, "unterminated character literal"))?;
                decode_escape(escaped, line)?
            }
            Some(c) if c.is_ascii() => c as u8,
            Some(_) => return Err(err(line, "character literal must be a single ASCII character")),
            None => return Err(err(line, "unterminated character literal")),
        };
        match self.bump() {
            Some('\'') => Ok(TokenKind::CharLit(value)),
            _ => Err(err(line, "character literal must close with a single quote")),
        }
    }

    fn lex_one(&mut self) -> Result<Option<Token>> {
        self.skip_trivia()?;
        let line = self.line;
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let kind = match c {
            '0'..='9' => self.lex_number()?,
            c if c.is_alphabetic() || c == '_' => self.lex_ident_or_keyword(),
            '\'' => self.lex_char_literal()?,
            '(' => {
                self.bump();
                TokenKind::LParen
            }
            ')' => {
                self.bump();
                TokenKind::RParen
            }
            '{' => {
                self.bump();
                TokenKind::LBrace
            }
            '}' => {
                self.bump();
                TokenKind::RBrace
            }
            '[' => {
                self.bump();
                TokenKind::LBracket
            }
            ']' => {
                self.bump();
                TokenKind::RBracket
            }
            ',' => {
                self.bump();
                TokenKind::Comma
            }
            ';' => {
                self.bump();
                TokenKind::Semicolon
            }
            '+' => {
                self.bump();
                TokenKind::Plus
            }
            '-' => {
                self.bump();
                TokenKind::Minus
            }
            '*' => {
                self.bump();
                TokenKind::Star
            }
            '/' => {
                self.bump();
                TokenKind::Slash
            }
            '!' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::Neq
                } else {
                    TokenKind::Bang
                }
            }
            '=' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '<' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                self.bump();
                if self.peek() == Some('&') {
                    self.bump();
                    TokenKind::AndAnd
                } else {
                    TokenKind::Ampersand
                }
            }
            '|' => {
                self.bump();
                if self.peek() == Some('|') {
                    self.bump();
                    TokenKind::OrOr
                } else {
                    return Err(err(line, "unexpected character '|'"));
                }
            }
            other => return Err(err(line, format!("unexpected character '{}'", other))),
        };
        Ok(Some(Token { kind, line }))
    }
}

pub fn lex(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.lex_one()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_identifiers() {
        let tokens = lex("int main").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Ident("main".to_string()));
    }

    #[test]
    fn lexes_two_char_operators_before_one_char() {
        let tokens = lex("<= < == = != !").unwrap();
        let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Le, TokenKind::Lt, TokenKind::EqEq, TokenKind::Assign, TokenKind::Neq, TokenKind::Bang]
        );
    }

    #[test]
    fn lexes_escaped_character_literal() {
        let tokens = lex("'\\n'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::CharLit(b'\n'));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let tokens = lex("int // trailing\n/* block */ x").unwrap();
        let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Int, TokenKind::Ident("x".to_string())]);
    }

    #[test]
    fn tracks_line_numbers_across_newlines() {
        let tokens = lex("int\nmain").unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }
}
