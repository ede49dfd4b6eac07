//! Token cursor over sqlparser's tokenizer output

use sqlparser::dialect::{
    Dialect as SqlparserDialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
};
use sqlparser::tokenizer::{Token, Tokenizer};

/// A statement could not be read; the message says what was expected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed(pub String);

pub(crate) type Step<T> = Result<T, Malformed>;

/// How unquoted identifiers are folded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentCase {
    Preserve,
    Lower,
    Upper,
}

impl IdentCase {
    fn fold(&self, name: &str) -> String {
        match self {
            IdentCase::Preserve => name.to_string(),
            IdentCase::Lower => name.to_lowercase(),
            IdentCase::Upper => name.to_uppercase(),
        }
    }
}

/// Which sqlparser dialect drives tokenizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    Generic,
    Postgres,
    MySql,
    MsSql,
}

impl TokenizerKind {
    fn parser_dialect(&self) -> Box<dyn SqlparserDialect> {
        match self {
            TokenizerKind::Generic => Box::new(GenericDialect {}),
            TokenizerKind::Postgres => Box::new(PostgreSqlDialect {}),
            TokenizerKind::MySql => Box::new(MySqlDialect {}),
            TokenizerKind::MsSql => Box::new(MsSqlDialect {}),
        }
    }

    /// Tokenize one statement, dropping whitespace and comments.
    ///
    /// Lines are absolute: `first_line` is the line the statement starts on.
    pub(crate) fn tokenize(
        &self,
        text: &str,
        first_line: usize,
    ) -> Result<Vec<(Token, usize)>, String> {
        let dialect = self.parser_dialect();
        let tokens = Tokenizer::new(dialect.as_ref(), text)
            .tokenize_with_location()
            .map_err(|e| e.to_string())?;
        Ok(tokens
            .into_iter()
            .filter(|t| !matches!(t.token, Token::Whitespace(_) | Token::EOF))
            .map(|t| {
                let line = usize::try_from(t.span.start.line).unwrap_or(0);
                (t.token, first_line + line.saturating_sub(1))
            })
            .collect())
    }
}

/// Forward-only reader over one statement's tokens
pub(crate) struct Cursor {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    ident_case: IdentCase,
    eof: Token,
}

impl Cursor {
    pub(crate) fn new(tokens: Vec<(Token, usize)>, ident_case: IdentCase) -> Self {
        Self {
            tokens,
            pos: 0,
            ident_case,
            eof: Token::EOF,
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .map(|(t, _)| t)
            .unwrap_or(&self.eof)
    }

    /// Line of the next token, or of the last one at the end
    pub(crate) fn line(&self) -> Option<usize> {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, line)| *line)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    pub(crate) fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Is the n-th token the unquoted word `keyword`?
    pub(crate) fn nth_is_keyword(&self, n: usize, keyword: &str) -> bool {
        matches!(
            self.peek_nth(n),
            Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(keyword)
        )
    }

    pub(crate) fn peek_keyword(&self, keyword: &str) -> bool {
        self.nth_is_keyword(0, keyword)
    }

    pub(crate) fn peek_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.peek_keyword(k))
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn peek_keywords(&self, keywords: &[&str]) -> bool {
        keywords
            .iter()
            .enumerate()
            .all(|(i, k)| self.nth_is_keyword(i, k))
    }

    /// Consume a keyword sequence only if all of it is present
    pub(crate) fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        if self.peek_keywords(keywords) {
            self.pos += keywords.len();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Step<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    pub(crate) fn eat_token(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_token(&mut self, token: &Token) -> Step<()> {
        if self.eat_token(token) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{token}'")))
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> Malformed {
        match self.peek() {
            Token::EOF => Malformed(format!("expected {expected}, found end of statement")),
            other => Malformed(format!("expected {expected}, found '{other}'")),
        }
    }

    /// Identifier; quoted names keep their case, unquoted ones are folded
    pub(crate) fn parse_ident(&mut self) -> Step<String> {
        let name = match self.peek() {
            Token::Word(w) if w.quote_style.is_some() => w.value.clone(),
            Token::Word(w) => self.ident_case.fold(&w.value),
            Token::DoubleQuotedString(s) => s.clone(),
            _ => return Err(self.unexpected("identifier")),
        };
        self.advance();
        Ok(name)
    }

    /// `a.b.c`, keeping only the last part
    pub(crate) fn parse_object_name(&mut self) -> Step<String> {
        let mut name = self.parse_ident()?;
        while self.eat_token(&Token::Period) {
            name = self.parse_ident()?;
        }
        Ok(name)
    }

    /// `[qualifier.]name`; longer qualifiers keep their last part, so
    /// `db.schema.table` yields `(Some(schema), table)`
    pub(crate) fn parse_qualified_name(&mut self) -> Step<(Option<String>, String)> {
        let mut parts = vec![self.parse_ident()?];
        while self.eat_token(&Token::Period) {
            parts.push(self.parse_ident()?);
        }
        let name = parts.pop().unwrap_or_default();
        Ok((parts.pop(), name))
    }

    /// `[qualifier.]column`
    pub(crate) fn parse_qualified_column(&mut self) -> Step<(Option<String>, String)> {
        self.parse_qualified_name()
    }

    /// `(a, b DESC, c(10))`
    pub(crate) fn parse_column_list(&mut self) -> Step<Vec<String>> {
        self.expect_token(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_ident()?);
            // prefix length on an index column
            if self.peek() == &Token::LParen {
                self.skip_group();
            }
            let _ = self.eat_keyword("ASC") || self.eat_keyword("DESC");
            if !self.eat_token(&Token::Comma) {
                break;
            }
        }
        self.expect_token(&Token::RParen)?;
        Ok(columns)
    }

    pub(crate) fn parse_u32(&mut self) -> Step<u32> {
        let parsed = match self.peek() {
            Token::Number(n, _) => n
                .parse::<u32>()
                .map_err(|_| Malformed(format!("'{n}' is not a count"))),
            _ => return Err(self.unexpected("a number")),
        };
        let value = parsed?;
        self.advance();
        Ok(value)
    }

    /// Skip one token, or a whole parenthesised group
    pub(crate) fn skip_group(&mut self) {
        if !matches!(self.advance(), Token::LParen | Token::LBracket) {
            return;
        }
        let mut depth = 1usize;
        while depth > 0 && !self.is_at_end() {
            match self.advance() {
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket => depth -= 1,
                _ => {}
            }
        }
    }

    /// Skip to the next `,` or `)` at this nesting level without consuming it
    pub(crate) fn skip_to_element_end(&mut self) {
        while !self.is_at_end() && !matches!(self.peek(), Token::Comma | Token::RParen) {
            self.skip_group();
        }
    }

    /// Text of the next few tokens, for diagnostics
    pub(crate) fn preview(&self, max: usize) -> String {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .take(max)
            .map(|(t, _)| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
#[path = "tokens_test.rs"]
mod tests;
