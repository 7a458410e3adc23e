//! Recursive-descent parser.
//!
//! Consumes the lexer through its `current()`/`next_token()` interface and
//! builds the `ast` nodes. Class references are resolved while parsing: a
//! class becomes instantiable once its definition completes, and every
//! `Name(...)` instantiation site shares the same `Rc<Class>`.

use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, anyhow, bail};

use crate::ast::{BinaryOperator, Comparator, Expression, Statement, VariableValue};
use crate::lexer::Lexer;
use crate::runtime::class::{Class, Method, SELF_NAME};
use crate::token::Token;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    declared_classes: HashMap<String, Rc<Class>>,
}

/// Parses the whole token stream into the top-level `Compound`.
pub fn parse(lexer: Lexer<'_>) -> Result<Statement> {
    Parser::new(lexer).parse_program()
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            declared_classes: HashMap::new(),
        }
    }

    pub fn parse_program(mut self) -> Result<Statement> {
        let mut statements = Vec::new();
        while *self.lexer.current() != Token::Eof {
            statements.push(self.parse_statement()?);
        }
        Ok(Statement::Compound(statements))
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.lexer.current() {
            Token::Class => self.parse_class_definition(),
            Token::If => self.parse_if_else(),
            Token::Print => self.parse_print(),
            Token::Return => self.parse_return(),
            Token::Def => bail!("Method definitions are only allowed inside a class"),
            _ => self.parse_assignment_or_expression(),
        }
    }

    fn parse_class_definition(&mut self) -> Result<Statement> {
        self.advance()?; // class
        let name = self.expect_identifier()?;
        let mut parent = None;
        if self.try_consume_char(b'(')? {
            let parent_name = self.expect_identifier()?;
            parent = Some(
                self.declared_classes
                    .get(&parent_name)
                    .cloned()
                    .ok_or_else(|| anyhow!("Unknown base class '{parent_name}'"))?,
            );
            self.expect_char(b')')?;
        }
        self.expect_char(b':')?;
        self.expect(Token::Newline)?;
        self.expect(Token::Indent)?;

        let mut methods = Vec::new();
        while *self.lexer.current() != Token::Dedent {
            methods.push(self.parse_method()?);
        }
        self.expect(Token::Dedent)?;

        let class = Rc::new(Class::new(name.clone(), methods, parent));
        self.declared_classes.insert(name, class.clone());
        Ok(Statement::ClassDefinition(class))
    }

    fn parse_method(&mut self) -> Result<Method> {
        self.expect(Token::Def)?;
        let name = self.expect_identifier()?;
        self.expect_char(b'(')?;
        let self_param = self.expect_identifier()?;
        if self_param != SELF_NAME {
            bail!("The first parameter of method '{name}' must be 'self', got '{self_param}'");
        }
        let mut formal_params = Vec::new();
        while self.try_consume_char(b',')? {
            formal_params.push(self.expect_identifier()?);
        }
        self.expect_char(b')')?;
        self.expect_char(b':')?;
        let body = self.parse_suite()?;
        Ok(Method {
            name,
            formal_params,
            body: Statement::MethodBody(Box::new(body)),
        })
    }

    /// Newline, Indent, statements, Dedent.
    fn parse_suite(&mut self) -> Result<Statement> {
        self.expect(Token::Newline)?;
        self.expect(Token::Indent)?;
        let mut statements = Vec::new();
        while *self.lexer.current() != Token::Dedent {
            statements.push(self.parse_statement()?);
        }
        self.expect(Token::Dedent)?;
        Ok(Statement::Compound(statements))
    }

    fn parse_if_else(&mut self) -> Result<Statement> {
        self.advance()?; // if
        let condition = self.parse_expression()?;
        self.expect_char(b':')?;
        let if_body = self.parse_suite()?;
        let mut else_body = None;
        if *self.lexer.current() == Token::Else {
            self.advance()?;
            self.expect_char(b':')?;
            else_body = Some(Box::new(self.parse_suite()?));
        }
        Ok(Statement::IfElse {
            condition,
            if_body: Box::new(if_body),
            else_body,
        })
    }

    fn parse_print(&mut self) -> Result<Statement> {
        self.advance()?; // print
        let mut args = Vec::new();
        if *self.lexer.current() != Token::Newline {
            args.push(self.parse_expression()?);
            while self.try_consume_char(b',')? {
                args.push(self.parse_expression()?);
            }
        }
        self.expect(Token::Newline)?;
        Ok(Statement::Print(args))
    }

    fn parse_return(&mut self) -> Result<Statement> {
        self.advance()?; // return
        if *self.lexer.current() == Token::Newline {
            self.advance()?;
            return Ok(Statement::Return(Expression::None));
        }
        let value = self.parse_expression()?;
        self.expect(Token::Newline)?;
        Ok(Statement::Return(value))
    }

    fn parse_assignment_or_expression(&mut self) -> Result<Statement> {
        let expression = self.parse_expression()?;
        if !self.try_consume_char(b'=')? {
            self.expect(Token::Newline)?;
            return Ok(Statement::Expr(expression));
        }

        let Expression::Variable(variable) = expression else {
            bail!("Left side of assignment must be a variable or field");
        };
        let rv = self.parse_expression()?;
        self.expect(Token::Newline)?;

        let mut dotted_ids = variable.dotted_ids;
        match dotted_ids.pop() {
            Some(field) if !dotted_ids.is_empty() => Ok(Statement::FieldAssignment {
                object: VariableValue::new(dotted_ids),
                field,
                rv,
            }),
            Some(var) => Ok(Statement::Assignment { var, rv }),
            None => bail!("Left side of assignment must name a variable"),
        }
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut expression = self.parse_and()?;
        while *self.lexer.current() == Token::Or {
            self.advance()?;
            let rhs = self.parse_and()?;
            expression = Expression::Or {
                lhs: Box::new(expression),
                rhs: Box::new(rhs),
            };
        }
        Ok(expression)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut expression = self.parse_not()?;
        while *self.lexer.current() == Token::And {
            self.advance()?;
            let rhs = self.parse_not()?;
            expression = Expression::And {
                lhs: Box::new(expression),
                rhs: Box::new(rhs),
            };
        }
        Ok(expression)
    }

    fn parse_not(&mut self) -> Result<Expression> {
        if *self.lexer.current() == Token::Not {
            self.advance()?;
            let argument = self.parse_not()?;
            return Ok(Expression::Not(Box::new(argument)));
        }
        self.parse_comparison()
    }

    // Comparisons do not chain: `a < b < c` is a parse error downstream.
    fn parse_comparison(&mut self) -> Result<Expression> {
        let lhs = self.parse_additive()?;
        let cmp = match self.lexer.current() {
            Token::Eq => Comparator::Equal,
            Token::NotEq => Comparator::NotEqual,
            Token::LessOrEq => Comparator::LessOrEqual,
            Token::GreaterOrEq => Comparator::GreaterOrEqual,
            Token::Char(b'<') => Comparator::Less,
            Token::Char(b'>') => Comparator::Greater,
            _ => return Ok(lhs),
        };
        self.advance()?;
        let rhs = self.parse_additive()?;
        Ok(Expression::Comparison {
            cmp,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut expression = self.parse_multiplicative()?;
        loop {
            let op = match self.lexer.current() {
                Token::Char(b'+') => BinaryOperator::Add,
                Token::Char(b'-') => BinaryOperator::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_multiplicative()?;
            expression = Expression::BinaryOp {
                op,
                lhs: Box::new(expression),
                rhs: Box::new(rhs),
            };
        }
        Ok(expression)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut expression = self.parse_postfix()?;
        loop {
            let op = match self.lexer.current() {
                Token::Char(b'*') => BinaryOperator::Mult,
                Token::Char(b'/') => BinaryOperator::Div,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_postfix()?;
            expression = Expression::BinaryOp {
                op,
                lhs: Box::new(expression),
                rhs: Box::new(rhs),
            };
        }
        Ok(expression)
    }

    // Method calls chained onto non-variable results, e.g. `A().hi()`.
    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expression = self.parse_primary()?;
        while *self.lexer.current() == Token::Char(b'.') {
            self.advance()?;
            let method = self.expect_identifier()?;
            let args = self.parse_call_args()?;
            expression = Expression::MethodCall {
                object: Box::new(expression),
                method,
                args,
            };
        }
        Ok(expression)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        match self.lexer.current().clone() {
            Token::Number(value) => {
                self.advance()?;
                Ok(Expression::NumericConst(value))
            }
            Token::String(value) => {
                self.advance()?;
                Ok(Expression::StringConst(value))
            }
            Token::True => {
                self.advance()?;
                Ok(Expression::BoolConst(true))
            }
            Token::False => {
                self.advance()?;
                Ok(Expression::BoolConst(false))
            }
            Token::None => {
                self.advance()?;
                Ok(Expression::None)
            }
            Token::Char(b'(') => {
                self.advance()?;
                let expression = self.parse_expression()?;
                self.expect_char(b')')?;
                Ok(expression)
            }
            Token::Char(b'-') => {
                // A leading minus is only valid directly before a number.
                self.advance()?;
                let Token::Number(value) = *self.lexer.current() else {
                    bail!("Expected a number after '-', got {}", self.lexer.current());
                };
                self.advance()?;
                Ok(Expression::NumericConst(-value))
            }
            Token::Id(name) => {
                self.advance()?;
                if name == "str" && *self.lexer.current() == Token::Char(b'(') {
                    self.advance()?;
                    let argument = self.parse_expression()?;
                    self.expect_char(b')')?;
                    return Ok(Expression::Stringify(Box::new(argument)));
                }

                let mut dotted_ids = vec![name];
                while *self.lexer.current() == Token::Char(b'.') {
                    self.advance()?;
                    let id = self.expect_identifier()?;
                    if *self.lexer.current() == Token::Char(b'(') {
                        let args = self.parse_call_args()?;
                        return Ok(Expression::MethodCall {
                            object: Box::new(Expression::Variable(VariableValue::new(dotted_ids))),
                            method: id,
                            args,
                        });
                    }
                    dotted_ids.push(id);
                }

                if dotted_ids.len() == 1 && *self.lexer.current() == Token::Char(b'(') {
                    let class_name = &dotted_ids[0];
                    let Some(class) = self.declared_classes.get(class_name).cloned() else {
                        bail!("Unknown class '{class_name}'");
                    };
                    let args = self.parse_call_args()?;
                    return Ok(Expression::NewInstance { class, args });
                }

                Ok(Expression::Variable(VariableValue::new(dotted_ids)))
            }
            other => bail!("Expected an expression, got {other}"),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expression>> {
        self.expect_char(b'(')?;
        let mut args = Vec::new();
        if *self.lexer.current() != Token::Char(b')') {
            args.push(self.parse_expression()?);
            while self.try_consume_char(b',')? {
                args.push(self.parse_expression()?);
            }
        }
        self.expect_char(b')')?;
        Ok(args)
    }

    fn advance(&mut self) -> Result<()> {
        self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if *self.lexer.current() == expected {
            self.advance()?;
            Ok(())
        } else {
            bail!("Expected {expected}, got {}", self.lexer.current())
        }
    }

    fn expect_char(&mut self, byte: u8) -> Result<()> {
        self.expect(Token::Char(byte))
    }

    fn try_consume_char(&mut self, byte: u8) -> Result<bool> {
        if *self.lexer.current() == Token::Char(byte) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_identifier(&mut self) -> Result<String> {
        if let Token::Id(name) = self.lexer.current().clone() {
            self.advance()?;
            Ok(name)
        } else {
            bail!("Expected an identifier, got {}", self.lexer.current())
        }
    }
}
