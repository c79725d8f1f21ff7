use sqlbind_core::type_info::DataType;
use sqlbind_core::value::ValueKind;

use super::lexer::{Lexer, Token};
use super::{
    ColumnDef, Command, CompareOp, Condition, Expr, OrderBy, Parsed, Predicate, Projection,
    SelectItem,
};
use crate::error::Error;

/// Parses a single statement; a trailing `;` is allowed.
pub(crate) fn parse(sql: &str) -> Result<Parsed, Error> {
    let tokens = Lexer::new(sql).tokenize()?;
    let mut parser = Parser {
        tokens,
        position: 0,
        parameters: 0,
    };

    let command = parser.command()?;

    parser.eat(&Token::Semicolon);

    if let Some(token) = parser.peek() {
        return Err(err_memory!(
            Syntax,
            "unexpected {token:?} after the end of the statement"
        ));
    }

    Ok(Parsed {
        command,
        parameters: parser.parameters,
    })
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    parameters: usize,
}

impl Parser {
    fn command(&mut self) -> Result<Command, Error> {
        match self.next() {
            Some(token) if token.is_keyword("create") => self.create_table(),
            Some(token) if token.is_keyword("drop") => self.drop_table(),
            Some(token) if token.is_keyword("insert") => self.insert(),
            Some(token) if token.is_keyword("select") => self.select(),
            Some(token) if token.is_keyword("update") => self.update(),
            Some(token) if token.is_keyword("delete") => self.delete(),
            Some(token) => Err(err_memory!(Syntax, "unsupported statement starting with {token:?}")),
            None => Err(err_memory!(Syntax, "empty statement")),
        }
    }

    fn create_table(&mut self) -> Result<Command, Error> {
        self.expect_keyword("table")?;

        let if_not_exists = self.eat_keyword("if");
        if if_not_exists {
            self.expect_keyword("not")?;
            self.expect_keyword("exists")?;
        }

        let name = self.identifier()?;
        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();

        loop {
            columns.push(self.column_def()?);

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        self.expect(&Token::RParen)?;

        Ok(Command::CreateTable {
            name,
            if_not_exists,
            columns,
        })
    }

    fn column_def(&mut self) -> Result<ColumnDef, Error> {
        let name = self.identifier()?;
        let data_type = self.data_type()?;

        let mut def = ColumnDef {
            name,
            data_type,
            not_null: false,
            unique: false,
        };

        loop {
            if self.eat_keyword("not") {
                self.expect_keyword("null")?;
                def.not_null = true;
            } else if self.eat_keyword("null") {
                def.not_null = false;
            } else if self.eat_keyword("unique") {
                def.unique = true;
            } else if self.eat_keyword("primary") {
                self.expect_keyword("key")?;
                def.unique = true;
                def.not_null = true;
            } else {
                return Ok(def);
            }
        }
    }

    fn data_type(&mut self) -> Result<DataType, Error> {
        let word = match self.next() {
            Some(Token::Word(word)) => word.to_ascii_lowercase(),
            other => return Err(err_memory!(Syntax, "expected a column type, got {other:?}")),
        };

        let data_type = match &*word {
            "int" | "integer" | "smallint" | "tinyint" | "mediumint" | "int2" | "int4" => {
                DataType::Integer
            }
            "bigint" if self.eat_keyword("unsigned") => DataType::UnsignedBigInt,
            "bigint" | "int8" => DataType::BigInt,
            "unsigned" => DataType::UnsignedBigInt,
            "numeric" | "decimal" | "float" | "float4" | "float8" | "real" | "number" => {
                DataType::Double
            }
            "double" => {
                self.eat_keyword("precision");
                DataType::Double
            }
            "char" | "varchar" | "text" | "nvarchar" | "clob" => DataType::Text,
            "date" => DataType::Date,
            "datetime" | "timestamp" => DataType::DateTime,
            "blob" | "bytea" => DataType::Blob,
            "bool" | "boolean" => DataType::Bool,
            _ => return Err(err_memory!(Syntax, "unknown column type `{word}`")),
        };

        // length, precision and scale are accepted and ignored
        if self.eat(&Token::LParen) {
            self.number()?;

            if self.eat(&Token::Comma) {
                self.number()?;
            }

            self.expect(&Token::RParen)?;
        }

        Ok(data_type)
    }

    fn drop_table(&mut self) -> Result<Command, Error> {
        self.expect_keyword("table")?;

        let if_exists = self.eat_keyword("if");
        if if_exists {
            self.expect_keyword("exists")?;
        }

        Ok(Command::DropTable {
            name: self.identifier()?,
            if_exists,
        })
    }

    fn insert(&mut self) -> Result<Command, Error> {
        self.expect_keyword("into")?;
        let table = self.identifier()?;

        let columns = if self.eat(&Token::LParen) {
            let columns = self.identifier_list()?;
            self.expect(&Token::RParen)?;
            Some(columns)
        } else {
            None
        };

        self.expect_keyword("values")?;

        let mut rows = Vec::new();

        loop {
            self.expect(&Token::LParen)?;

            let mut values = Vec::new();

            loop {
                values.push(self.expr()?);

                if !self.eat(&Token::Comma) {
                    break;
                }
            }

            self.expect(&Token::RParen)?;

            if let Some(columns) = &columns {
                if columns.len() != values.len() {
                    return Err(err_memory!(
                        Syntax,
                        "{} columns but {} values in INSERT",
                        columns.len(),
                        values.len()
                    ));
                }
            }

            rows.push(values);

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(Command::Insert {
            table,
            columns,
            rows,
        })
    }

    fn select(&mut self) -> Result<Command, Error> {
        let projection = self.projection()?;

        self.expect_keyword("from")?;
        let table = self.identifier()?;
        let filter = self.filter()?;

        let mut order_by = Vec::new();

        if self.eat_keyword("order") {
            self.expect_keyword("by")?;

            loop {
                let column = self.identifier()?;
                let descending = if self.eat_keyword("desc") {
                    true
                } else {
                    self.eat_keyword("asc");
                    false
                };

                order_by.push(OrderBy { column, descending });

                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        Ok(Command::Select {
            table,
            projection,
            filter,
            order_by,
        })
    }

    fn projection(&mut self) -> Result<Projection, Error> {
        if self.eat(&Token::Star) {
            return Ok(Projection::All);
        }

        if self.peek_keyword("count") && self.peek_nth(1) == Some(&Token::LParen) {
            self.position += 2;
            self.expect(&Token::Star)?;
            self.expect(&Token::RParen)?;

            return Ok(Projection::Count {
                alias: self.alias()?,
            });
        }

        let mut items = Vec::new();

        loop {
            let length = ["length", "len", "char_length"]
                .iter()
                .any(|name| self.peek_keyword(name))
                && self.peek_nth(1) == Some(&Token::LParen);

            let column = if length {
                self.position += 2;
                let column = self.identifier()?;
                self.expect(&Token::RParen)?;
                column
            } else {
                self.identifier()?
            };

            items.push(SelectItem {
                column,
                length,
                alias: self.alias()?,
            });

            if !self.eat(&Token::Comma) {
                return Ok(Projection::Items(items));
            }
        }
    }

    fn alias(&mut self) -> Result<Option<String>, Error> {
        if self.eat_keyword("as") {
            return self.identifier().map(Some);
        }

        Ok(None)
    }

    fn update(&mut self) -> Result<Command, Error> {
        let table = self.identifier()?;
        self.expect_keyword("set")?;

        let mut assignments = Vec::new();

        loop {
            let column = self.identifier()?;
            self.expect(&Token::Eq)?;
            assignments.push((column, self.expr()?));

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(Command::Update {
            table,
            assignments,
            filter: self.filter()?,
        })
    }

    fn delete(&mut self) -> Result<Command, Error> {
        self.expect_keyword("from")?;
        let table = self.identifier()?;

        Ok(Command::Delete {
            table,
            filter: self.filter()?,
        })
    }

    fn filter(&mut self) -> Result<Vec<Condition>, Error> {
        let mut conditions = Vec::new();

        if !self.eat_keyword("where") {
            return Ok(conditions);
        }

        loop {
            let column = self.identifier()?;

            let predicate = if self.eat_keyword("is") {
                if self.eat_keyword("not") {
                    self.expect_keyword("null")?;
                    Predicate::IsNotNull
                } else {
                    self.expect_keyword("null")?;
                    Predicate::IsNull
                }
            } else {
                let op = match self.next() {
                    Some(Token::Eq) => CompareOp::Eq,
                    Some(Token::NotEq) => CompareOp::NotEq,
                    Some(Token::Lt) => CompareOp::Lt,
                    Some(Token::LtEq) => CompareOp::LtEq,
                    Some(Token::Gt) => CompareOp::Gt,
                    Some(Token::GtEq) => CompareOp::GtEq,
                    other => {
                        return Err(err_memory!(
                            Syntax,
                            "expected a comparison after `{column}`, got {other:?}"
                        ));
                    }
                };

                Predicate::Compare(op, self.expr()?)
            };

            conditions.push(Condition { column, predicate });

            if !self.eat_keyword("and") {
                return Ok(conditions);
            }
        }
    }

    fn expr(&mut self) -> Result<Expr, Error> {
        match self.next() {
            Some(Token::Param(_)) => {
                let slot = self.parameters;
                self.parameters += 1;

                Ok(Expr::Param(slot))
            }

            Some(Token::String(text)) => Ok(Expr::Literal(ValueKind::Text(text))),

            Some(Token::Number(number)) => number_literal(&number).map(Expr::Literal),

            Some(Token::Minus) => match self.next() {
                Some(Token::Number(number)) => {
                    number_literal(&format!("-{number}")).map(Expr::Literal)
                }
                other => Err(err_memory!(Syntax, "expected a number after `-`, got {other:?}")),
            },

            Some(Token::Plus) => match self.next() {
                Some(Token::Number(number)) => number_literal(&number).map(Expr::Literal),
                other => Err(err_memory!(Syntax, "expected a number after `+`, got {other:?}")),
            },

            Some(token) if token.is_keyword("null") => Ok(Expr::Literal(ValueKind::Null(DataType::Null))),
            Some(token) if token.is_keyword("true") => Ok(Expr::Literal(ValueKind::Bool(true))),
            Some(token) if token.is_keyword("false") => Ok(Expr::Literal(ValueKind::Bool(false))),

            other => Err(err_memory!(Syntax, "expected a value, got {other:?}")),
        }
    }

    fn identifier(&mut self) -> Result<String, Error> {
        match self.next() {
            Some(Token::Word(word) | Token::QuotedIdent(word)) => Ok(word),
            other => Err(err_memory!(Syntax, "expected an identifier, got {other:?}")),
        }
    }

    fn identifier_list(&mut self) -> Result<Vec<String>, Error> {
        let mut names = vec![self.identifier()?];

        while self.eat(&Token::Comma) {
            names.push(self.identifier()?);
        }

        Ok(names)
    }

    fn number(&mut self) -> Result<String, Error> {
        match self.next() {
            Some(Token::Number(number)) => Ok(number),
            other => Err(err_memory!(Syntax, "expected a number, got {other:?}")),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|token| token.is_keyword(keyword))
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), Error> {
        match self.next() {
            Some(token) if token == *expected => Ok(()),
            other => Err(err_memory!(Syntax, "expected {expected:?}, got {other:?}")),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), Error> {
        match self.next() {
            Some(token) if token.is_keyword(keyword) => Ok(()),
            other => Err(err_memory!(
                Syntax,
                "expected `{}`, got {other:?}",
                keyword.to_ascii_uppercase()
            )),
        }
    }
}

fn number_literal(text: &str) -> Result<ValueKind, Error> {
    if let Ok(value) = text.parse::<i32>() {
        return Ok(ValueKind::Integer(value));
    }

    if let Ok(value) = text.parse::<i64>() {
        return Ok(ValueKind::BigInt(value));
    }

    if let Ok(value) = text.parse::<u64>() {
        return Ok(ValueKind::UnsignedBigInt(value));
    }

    text.parse::<f64>()
        .map(ValueKind::Double)
        .map_err(|_| err_memory!(Syntax, "invalid number `{text}`"))
}
