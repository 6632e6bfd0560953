//! Algebraic expression engine.
//!
//! Reliability formulas and presence conditions are plain text over named
//! variables. [`parse`] turns such text into an evaluable [`Expression`];
//! [`Expression::evaluate`] computes its value under a variable-binding map.
//!
//! The language covers floating-point literals, the arithmetic operators
//! `+ - * /` with unary minus, the boolean operators `&& || !` (non-zero is
//! truthy, results are `1.0`/`0.0`), the keywords `true`/`false`, and
//! parentheses. Evaluation fails on any unbound variable.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

/// Errors from expression parsing or evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("unbound variable `{0}`")]
    UnboundVariable(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn syntax(position: usize, message: impl Into<String>) -> ExprError {
    ExprError::Syntax {
        position,
        message: message.into(),
    }
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '+' => {
                tokens.push((i, Token::Plus));
                i += 1;
            }
            '-' => {
                tokens.push((i, Token::Minus));
                i += 1;
            }
            '*' => {
                tokens.push((i, Token::Star));
                i += 1;
            }
            '/' => {
                tokens.push((i, Token::Slash));
                i += 1;
            }
            '!' => {
                tokens.push((i, Token::Not));
                i += 1;
            }
            '(' => {
                tokens.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::RParen));
                i += 1;
            }
            '&' | '|' => {
                if i + 1 < bytes.len() && bytes[i + 1] == bytes[i] {
                    tokens.push((i, if c == '&' { Token::And } else { Token::Or }));
                    i += 2;
                } else {
                    return Err(syntax(i, format!("expected `{c}{c}`")));
                }
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // Exponent suffix, e.g. `1.5e-3`.
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let value: f64 = text[start..i]
                    .parse()
                    .map_err(|_| syntax(start, format!("malformed number `{}`", &text[start..i])))?;
                tokens.push((start, Token::Number(value)));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                let word = &text[start..i];
                match word {
                    "true" => tokens.push((start, Token::Number(1.0))),
                    "false" => tokens.push((start, Token::Number(0.0))),
                    _ => tokens.push((start, Token::Ident(word.to_string()))),
                }
            }
            _ => return Err(syntax(i, format!("unexpected character `{c}`"))),
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Const(f64),
    Var(String),
    Neg(Box<Node>),
    Not(Box<Node>),
    Add(Box<Node>, Box<Node>),
    Sub(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Div(Box<Node>, Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

struct Parser<'a> {
    tokens: &'a [(usize, Token)],
    pos: usize,
    len: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn bump(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t);
        self.pos += 1;
        token
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.len, |(p, _)| *p)
    }

    // or := and ( '||' and )*
    fn or(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.bump();
            let rhs = self.and()?;
            lhs = Node::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // and := sum ( '&&' sum )*
    fn and(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.sum()?;
        while self.peek() == Some(&Token::And) {
            self.bump();
            let rhs = self.sum()?;
            lhs = Node::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // sum := product ( ('+'|'-') product )*
    fn sum(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.product()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    let rhs = self.product()?;
                    lhs = Node::Add(Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Minus) => {
                    self.bump();
                    let rhs = self.product()?;
                    lhs = Node::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    // product := unary ( ('*'|'/') unary )*
    fn product(&mut self) -> Result<Node, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    let rhs = self.unary()?;
                    lhs = Node::Mul(Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Slash) => {
                    self.bump();
                    let rhs = self.unary()?;
                    lhs = Node::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    // unary := ('-'|'!') unary | atom
    fn unary(&mut self) -> Result<Node, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.bump();
                Ok(Node::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Not) => {
                self.bump();
                Ok(Node::Not(Box::new(self.unary()?)))
            }
            _ => self.atom(),
        }
    }

    // atom := NUMBER | IDENT | '(' or ')'
    fn atom(&mut self) -> Result<Node, ExprError> {
        let position = self.position();
        match self.bump() {
            Some(Token::Number(value)) => Ok(Node::Const(*value)),
            Some(Token::Ident(name)) => Ok(Node::Var(name.clone())),
            Some(Token::LParen) => {
                let inner = self.or()?;
                let position = self.position();
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(syntax(position, "expected `)`")),
                }
            }
            Some(token) => Err(syntax(position, format!("unexpected token `{token:?}`"))),
            None => Err(syntax(position, "unexpected end of expression")),
        }
    }
}

/// A parsed, immutable, reusable expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Node,
    source: String,
}

/// Parse formula text into an [`Expression`].
pub fn parse(text: &str) -> Result<Expression, ExprError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        len: text.len(),
    };
    let root = parser.or()?;
    if parser.pos < tokens.len() {
        return Err(syntax(parser.position(), "trailing input"));
    }
    Ok(Expression {
        root,
        source: text.to_string(),
    })
}

impl Expression {
    /// The original formula text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The set of free variables referenced by the expression.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut vars = BTreeSet::new();
        collect_vars(&self.root, &mut vars);
        vars
    }

    /// Evaluate the expression under the given variable bindings.
    ///
    /// Fails with [`ExprError::UnboundVariable`] if the expression references
    /// a variable absent from `bindings`.
    pub fn evaluate(&self, bindings: &HashMap<String, f64>) -> Result<f64, ExprError> {
        eval(&self.root, bindings)
    }
}

fn collect_vars<'a>(node: &'a Node, vars: &mut BTreeSet<&'a str>) {
    match node {
        Node::Const(_) => {}
        Node::Var(name) => {
            vars.insert(name);
        }
        Node::Neg(a) | Node::Not(a) => collect_vars(a, vars),
        Node::Add(a, b)
        | Node::Sub(a, b)
        | Node::Mul(a, b)
        | Node::Div(a, b)
        | Node::And(a, b)
        | Node::Or(a, b) => {
            collect_vars(a, vars);
            collect_vars(b, vars);
        }
    }
}

fn truthy(value: f64) -> bool {
    value != 0.0
}

fn eval(node: &Node, bindings: &HashMap<String, f64>) -> Result<f64, ExprError> {
    Ok(match node {
        Node::Const(value) => *value,
        Node::Var(name) => *bindings
            .get(name)
            .ok_or_else(|| ExprError::UnboundVariable(name.clone()))?,
        Node::Neg(a) => -eval(a, bindings)?,
        Node::Not(a) => {
            if truthy(eval(a, bindings)?) {
                0.0
            } else {
                1.0
            }
        }
        Node::Add(a, b) => eval(a, bindings)? + eval(b, bindings)?,
        Node::Sub(a, b) => eval(a, bindings)? - eval(b, bindings)?,
        Node::Mul(a, b) => eval(a, bindings)? * eval(b, bindings)?,
        Node::Div(a, b) => eval(a, bindings)? / eval(b, bindings)?,
        Node::And(a, b) => {
            if truthy(eval(a, bindings)?) && truthy(eval(b, bindings)?) {
                1.0
            } else {
                0.0
            }
        }
        Node::Or(a, b) => {
            if truthy(eval(a, bindings)?) || truthy(eval(b, bindings)?) {
                1.0
            } else {
                0.0
            }
        }
    })
}
