//! Task query language parser and evaluator.
//!
//! Parses expressions like:
//! - open
//! - open & above(normal)
//! - (priority(high) | priority(highest)) ~ path~"archive/"
//! - tag("#work") & overdue
//!
//! `|` is union, `&` intersection and `~` difference. `&` and `~` bind
//! tighter than `|`.

use chrono::NaiveDate;

use crate::priority::Priority;
use crate::vault::{display_path, TaskItem};

/// Query used when none is configured: every task not yet checked off.
pub const DEFAULT_QUERY: &str = "open";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    Atom(Predicate),
    Union(Box<QueryExpr>, Box<QueryExpr>),
    Intersection(Box<QueryExpr>, Box<QueryExpr>),
    Difference(Box<QueryExpr>, Box<QueryExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    Open,
    Done,
    Due,
    Undated,
    Overdue,
    DueToday,
    Priority(Priority),
    Above(Priority),
    Below(Priority),
    PathContains(String),
    TextContains(String),
    Tag(String),
}

impl QueryExpr {
    /// Whether `task` satisfies the expression on the calendar day `today`.
    pub fn matches(&self, task: &TaskItem, today: NaiveDate) -> bool {
        match self {
            QueryExpr::Atom(predicate) => predicate.matches(task, today),
            QueryExpr::Union(left, right) => {
                left.matches(task, today) || right.matches(task, today)
            }
            QueryExpr::Intersection(left, right) => {
                left.matches(task, today) && right.matches(task, today)
            }
            QueryExpr::Difference(left, right) => {
                left.matches(task, today) && !right.matches(task, today)
            }
        }
    }

    /// Keep the tasks matching the expression, preserving order.
    pub fn filter(&self, tasks: Vec<TaskItem>, today: NaiveDate) -> Vec<TaskItem> {
        tasks
            .into_iter()
            .filter(|task| self.matches(task, today))
            .collect()
    }
}

impl Predicate {
    fn matches(&self, task: &TaskItem, today: NaiveDate) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Open => !task.completed,
            Predicate::Done => task.completed,
            Predicate::Due => task.due.is_some(),
            Predicate::Undated => task.due.is_none(),
            Predicate::Overdue => !task.completed && task.due.is_some_and(|due| due < today),
            Predicate::DueToday => task.due == Some(today),
            Predicate::Priority(level) => task.priority == *level,
            Predicate::Above(level) => task.priority > *level,
            Predicate::Below(level) => task.priority < *level,
            Predicate::PathContains(needle) => display_path(&task.file).contains(needle.as_str()),
            Predicate::TextContains(needle) => task
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Predicate::Tag(tag) => has_tag(&task.raw, tag),
        }
    }
}

/// Whole-tag match: `#work` matches `#work` and `#work/deep`, not `#workshop`.
fn has_tag(text: &str, tag: &str) -> bool {
    let tag = tag.trim();
    let tag = tag.strip_prefix('#').unwrap_or(tag);
    if tag.is_empty() {
        return false;
    }
    let needle = format!("#{tag}");

    text.match_indices(&needle).any(|(index, _)| {
        let boundary_before = text[..index]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        let boundary_after = text[index + needle.len()..]
            .chars()
            .next()
            .map_or(true, |ch| !(ch.is_alphanumeric() || ch == '_' || ch == '-'));
        boundary_before && boundary_after
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub message: String,
    pub position: usize,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for QueryError {}

pub fn parse_query(input: &str) -> Result<QueryExpr, QueryError> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expr()?;
    parser.expect(TokenKind::Eof)?;
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Str(String),
    LParen,
    RParen,
    Pipe,
    Amp,
    Tilde,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn next_token(&mut self) -> Result<Token, QueryError> {
        self.skip_ws();
        let pos = self.pos;
        let Some(ch) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos,
            });
        };
        let single = match ch {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '|' => Some(TokenKind::Pipe),
            '&' => Some(TokenKind::Amp),
            '~' => Some(TokenKind::Tilde),
            _ => None,
        };
        if let Some(kind) = single {
            self.bump();
            return Ok(Token { kind, pos });
        }
        match ch {
            '"' => self.read_string(),
            _ if is_ident_start(ch) => Ok(self.read_ident()),
            _ => Err(QueryError {
                message: format!("Unexpected character '{ch}'"),
                position: pos,
            }),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while self.peek_char().is_some_and(is_ident_continue) {
            self.bump();
        }
        Token {
            kind: TokenKind::Ident(self.input[start..self.pos].to_string()),
            pos: start,
        }
    }

    fn read_string(&mut self) -> Result<Token, QueryError> {
        let start = self.pos;
        self.bump(); // opening quote
        let mut out = String::new();
        while let Some(ch) = self.bump() {
            match ch {
                '"' => {
                    return Ok(Token {
                        kind: TokenKind::Str(out),
                        pos: start,
                    });
                }
                '\\' => {
                    let Some(esc) = self.bump() else {
                        break;
                    };
                    out.push(match esc {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                other => out.push(other),
            }
        }
        Err(QueryError {
            message: "Unterminated string literal".to_string(),
            position: start,
        })
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, QueryError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(Self { tokens, index: 0 })
    }

    fn parse_expr(&mut self) -> Result<QueryExpr, QueryError> {
        self.parse_union()
    }

    fn parse_union(&mut self) -> Result<QueryExpr, QueryError> {
        let mut expr = self.parse_intersection()?;
        while self.peek_is(&TokenKind::Pipe) {
            self.next_token();
            let rhs = self.parse_intersection()?;
            expr = QueryExpr::Union(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_intersection(&mut self) -> Result<QueryExpr, QueryError> {
        let mut expr = self.parse_term()?;
        loop {
            if self.peek_is(&TokenKind::Amp) {
                self.next_token();
                let rhs = self.parse_term()?;
                expr = QueryExpr::Intersection(Box::new(expr), Box::new(rhs));
            } else if self.peek_is(&TokenKind::Tilde) {
                self.next_token();
                let rhs = self.parse_term()?;
                expr = QueryExpr::Difference(Box::new(expr), Box::new(rhs));
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<QueryExpr, QueryError> {
        match self.peek_kind() {
            TokenKind::LParen => {
                self.next_token();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Ident(_) => Ok(QueryExpr::Atom(self.parse_predicate()?)),
            _ => Err(self.error_here("Expected query term")),
        }
    }

    fn parse_predicate(&mut self) -> Result<Predicate, QueryError> {
        let ident = self.expect_ident()?;
        match ident.as_str() {
            "all" => Ok(Predicate::All),
            "open" => Ok(Predicate::Open),
            "done" => Ok(Predicate::Done),
            "due" => Ok(Predicate::Due),
            "undated" => Ok(Predicate::Undated),
            "overdue" => Ok(Predicate::Overdue),
            "today" => Ok(Predicate::DueToday),
            "priority" => Ok(Predicate::Priority(self.parse_priority_arg()?)),
            "above" => Ok(Predicate::Above(self.parse_priority_arg()?)),
            "below" => Ok(Predicate::Below(self.parse_priority_arg()?)),
            "path" => {
                self.expect(TokenKind::Tilde)?;
                Ok(Predicate::PathContains(self.expect_string()?))
            }
            "text" => {
                self.expect(TokenKind::Tilde)?;
                Ok(Predicate::TextContains(self.expect_string()?))
            }
            "tag" => Ok(Predicate::Tag(self.parse_string_arg()?)),
            _ => Err(self.error_at_previous(&format!("Unknown predicate '{ident}'"))),
        }
    }

    fn parse_priority_arg(&mut self) -> Result<Priority, QueryError> {
        self.expect(TokenKind::LParen)?;
        let name = match self.next_token().kind {
            TokenKind::Ident(value) | TokenKind::Str(value) => value,
            _ => return Err(self.error_at_previous("Expected priority name")),
        };
        let level = Priority::from_name(&name)
            .ok_or_else(|| self.error_at_previous(&format!("Unknown priority '{name}'")))?;
        self.expect(TokenKind::RParen)?;
        Ok(level)
    }

    fn parse_string_arg(&mut self) -> Result<String, QueryError> {
        self.expect(TokenKind::LParen)?;
        let value = self.expect_string()?;
        self.expect(TokenKind::RParen)?;
        Ok(value)
    }

    fn expect_string(&mut self) -> Result<String, QueryError> {
        match self.next_token().kind {
            TokenKind::Str(value) => Ok(value),
            _ => Err(self.error_at_previous("Expected string literal")),
        }
    }

    fn expect_ident(&mut self) -> Result<String, QueryError> {
        match self.next_token().kind {
            TokenKind::Ident(value) => Ok(value),
            _ => Err(self.error_at_previous("Expected identifier")),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), QueryError> {
        let token = self.next_token();
        if std::mem::discriminant(&token.kind) == std::mem::discriminant(&kind) {
            Ok(())
        } else {
            Err(QueryError {
                message: format!("Expected {}", kind_name(&kind)),
                position: token.pos,
            })
        }
    }

    fn error_here(&self, message: &str) -> QueryError {
        QueryError {
            message: message.to_string(),
            position: self.tokens.get(self.index).map_or(0, |t| t.pos),
        }
    }

    fn error_at_previous(&self, message: &str) -> QueryError {
        let index = self.index.saturating_sub(1);
        QueryError {
            message: message.to_string(),
            position: self.tokens.get(index).map_or(0, |t| t.pos),
        }
    }

    fn next_token(&mut self) -> Token {
        let last = self.tokens.len() - 1;
        let token = self.tokens[self.index.min(last)].clone();
        // Stays on Eof once reached.
        if self.index <= last && token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.index.min(self.tokens.len() - 1)].kind
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }
}

fn kind_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Ident(_) => "identifier",
        TokenKind::Str(_) => "string",
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::Pipe => "|",
        TokenKind::Amp => "&",
        TokenKind::Tilde => "~",
        TokenKind::Eof => "end of input",
    }
}
