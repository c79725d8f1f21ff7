use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// A bare word; keywords are bare words compared case-insensitively.
    Word(String),
    /// A `"quoted"` or `` `quoted` `` identifier, never a keyword.
    QuotedIdent(String),
    Number(String),
    String(String),
    /// `?` (`None`) or `:name`.
    Param(Option<String>),
    Comma,
    LParen,
    RParen,
    Star,
    Minus,
    Plus,
    Semicolon,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Token {
    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(word) if word.eq_ignore_ascii_case(keyword))
    }
}

pub(crate) struct Lexer<'a> {
    sql: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(sql: &'a str) -> Self {
        Self {
            sql,
            chars: sql.char_indices().peekable(),
        }
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        self.skip_whitespace_and_comments();

        let Some((start, ch)) = self.chars.next() else {
            return Ok(None);
        };

        let token = match ch {
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '*' => Token::Star,
            '+' => Token::Plus,
            '-' => Token::Minus,
            ';' => Token::Semicolon,
            '=' => Token::Eq,
            '?' => Token::Param(None),

            '!' if self.eat('=') => Token::NotEq,
            '<' if self.eat('=') => Token::LtEq,
            '<' if self.eat('>') => Token::NotEq,
            '<' => Token::Lt,
            '>' if self.eat('=') => Token::GtEq,
            '>' => Token::Gt,

            ':' => {
                let name = self.take_while(is_ident_char);

                if name.is_empty() {
                    return Err(err_memory!(Syntax, "expected a name after `:` at byte {start}"));
                }

                Token::Param(Some(name.to_owned()))
            }

            '\'' => Token::String(self.quoted(start, '\'')?),
            quote @ ('"' | '`') => Token::QuotedIdent(self.quoted(start, quote)?),

            c if c.is_ascii_digit() || (c == '.' && self.peek_is(|c| c.is_ascii_digit())) => {
                Token::Number(self.number(start))
            }

            c if is_ident_start(c) => {
                let rest = self.take_while(is_ident_char);
                Token::Word(format!("{c}{rest}"))
            }

            c => {
                return Err(err_memory!(
                    Syntax,
                    "unexpected character {c:?} at byte {start}"
                ));
            }
        };

        Ok(Some(token))
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek_is(char::is_whitespace) {
                self.chars.next();
            }

            let rest = self.rest();

            if rest.starts_with("--") {
                while self.chars.next_if(|&(_, c)| c != '\n').is_some() {}
            } else if rest.starts_with("/*") {
                self.chars.next();
                self.chars.next();

                let mut star = false;

                for (_, c) in self.chars.by_ref() {
                    if star && c == '/' {
                        break;
                    }

                    star = c == '*';
                }
            } else {
                return;
            }
        }
    }

    // reads up to the closing quote; a doubled quote stands for itself
    fn quoted(&mut self, start: usize, quote: char) -> Result<String, Error> {
        let mut value = String::new();

        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => {
                    if self.eat(quote) {
                        value.push(quote);
                    } else {
                        return Ok(value);
                    }
                }

                Some((_, c)) => value.push(c),

                None => {
                    return Err(err_memory!(
                        Syntax,
                        "unterminated quoted text starting at byte {start}"
                    ));
                }
            }
        }
    }

    fn number(&mut self, start: usize) -> String {
        let mut end = start + 1;
        let mut seen_exponent = false;

        while let Some(&(index, c)) = self.chars.peek() {
            let accept = c.is_ascii_digit()
                || c == '.'
                || (!seen_exponent && matches!(c, 'e' | 'E'))
                || (matches!(c, '+' | '-') && matches!(self.sql[..index].chars().last(), Some('e' | 'E')));

            if !accept {
                break;
            }

            seen_exponent |= matches!(c, 'e' | 'E');
            end = index + c.len_utf8();
            self.chars.next();
        }

        self.sql[start..end].to_owned()
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset();

        while self.chars.next_if(|&(_, c)| predicate(c)).is_some() {}

        &self.sql[start..self.offset()]
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn peek_is(&mut self, predicate: impl Fn(char) -> bool) -> bool {
        self.chars.peek().is_some_and(|&(_, c)| predicate(c))
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.sql.len(), |&(index, _)| index)
    }

    fn rest(&mut self) -> &'a str {
        let offset = self.offset();
        &self.sql[offset..]
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
