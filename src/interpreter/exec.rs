//! Per-node execution. Expressions and statements share the same
//! `execute(closure, context)` contract: evaluation is strictly
//! left-to-right and depth-first, and every node yields an `ObjectHolder`
//! (empty for statements with nothing to say).

use crate::ast::{BinaryOperator, Comparator, Expression, Statement, VariableValue};
use crate::runtime::class::{
    ADD_METHOD, ClassInstance, DIV_METHOD, INIT_METHOD, MUL_METHOD, SUB_METHOD,
};
use crate::runtime::compare;
use crate::runtime::context::Context;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::object::{Closure, Object, ObjectHolder};

impl VariableValue {
    /// Looks the first segment up in the closure and every later one in the
    /// fields of the instance found so far.
    pub fn resolve(&self, closure: &Closure) -> RuntimeResult<ObjectHolder> {
        let mut current = closure
            .get(&self.dotted_ids[0])
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: self.dotted_ids[0].clone(),
            })?;
        for field in &self.dotted_ids[1..] {
            let next = {
                let Some(instance) = current.try_as_instance() else {
                    return Err(RuntimeError::NotAnInstance {
                        type_name: current.type_name(),
                    });
                };
                instance.fields().get(field).cloned()
            };
            current = next.ok_or_else(|| RuntimeError::UnknownField {
                field: field.clone(),
            })?;
        }
        Ok(current)
    }
}

impl Expression {
    pub fn execute(
        &self,
        closure: &mut Closure,
        context: &mut dyn Context,
    ) -> RuntimeResult<ObjectHolder> {
        match self {
            Expression::NumericConst(value) => Ok(ObjectHolder::own(Object::Number(*value))),
            Expression::StringConst(value) => Ok(ObjectHolder::own(Object::String(value.clone()))),
            Expression::BoolConst(value) => Ok(ObjectHolder::own(Object::Bool(*value))),
            Expression::None => Ok(ObjectHolder::none()),
            Expression::Variable(variable) => variable.resolve(closure),
            Expression::BinaryOp { op, lhs, rhs } => {
                let lhs = lhs.execute(closure, context)?;
                let rhs = rhs.execute(closure, context)?;
                binary_op(*op, lhs, rhs, context)
            }
            Expression::Comparison { cmp, lhs, rhs } => {
                let lhs = lhs.execute(closure, context)?;
                let rhs = rhs.execute(closure, context)?;
                let verdict = match cmp {
                    Comparator::Equal => compare::equal(&lhs, &rhs, context)?,
                    Comparator::NotEqual => compare::not_equal(&lhs, &rhs, context)?,
                    Comparator::Less => compare::less(&lhs, &rhs, context)?,
                    Comparator::Greater => compare::greater(&lhs, &rhs, context)?,
                    Comparator::LessOrEqual => compare::less_or_equal(&lhs, &rhs, context)?,
                    Comparator::GreaterOrEqual => compare::greater_or_equal(&lhs, &rhs, context)?,
                };
                Ok(ObjectHolder::own(Object::Bool(verdict)))
            }
            Expression::And { lhs, rhs } => {
                let value = lhs.execute(closure, context)?.is_true()
                    && rhs.execute(closure, context)?.is_true();
                Ok(ObjectHolder::own(Object::Bool(value)))
            }
            Expression::Or { lhs, rhs } => {
                let value = lhs.execute(closure, context)?.is_true()
                    || rhs.execute(closure, context)?.is_true();
                Ok(ObjectHolder::own(Object::Bool(value)))
            }
            Expression::Not(argument) => {
                let argument = argument.execute(closure, context)?;
                let Some(value) = argument.try_as_bool() else {
                    return Err(RuntimeError::UnsupportedOperation {
                        operation: "not",
                        type_name: argument.type_name(),
                    });
                };
                Ok(ObjectHolder::own(Object::Bool(!value)))
            }
            Expression::Stringify(argument) => {
                let value = argument.execute(closure, context)?;
                let rendered = value.to_output(context)?;
                Ok(ObjectHolder::own(Object::String(rendered)))
            }
            Expression::MethodCall {
                object,
                method,
                args,
            } => {
                let object = object.execute(closure, context)?;
                let mut actual_args = Vec::with_capacity(args.len());
                for arg in args {
                    actual_args.push(arg.execute(closure, context)?);
                }
                object.call_method(method, actual_args, context)
            }
            Expression::NewInstance { class, args } => {
                let instance =
                    ObjectHolder::own(Object::ClassInstance(ClassInstance::new(class.clone())));
                let init_params = class
                    .get_method(INIT_METHOD)
                    .map(|init| init.formal_params.len());
                if init_params.unwrap_or(0) != args.len() {
                    return Err(RuntimeError::MethodArityMismatch {
                        method: INIT_METHOD.to_string(),
                        expected: init_params.unwrap_or(0),
                        found: args.len(),
                    });
                }
                if init_params.is_some() {
                    let mut actual_args = Vec::with_capacity(args.len());
                    for arg in args {
                        actual_args.push(arg.execute(closure, context)?);
                    }
                    instance.call_method(INIT_METHOD, actual_args, context)?;
                }
                Ok(instance)
            }
        }
    }
}

/// Arithmetic dispatch: both numbers (plus both strings for `+`) operate
/// directly; otherwise a left-hand instance gets a chance through its
/// dunder method; anything else is a type error.
fn binary_op(
    op: BinaryOperator,
    lhs: ObjectHolder,
    rhs: ObjectHolder,
    context: &mut dyn Context,
) -> RuntimeResult<ObjectHolder> {
    let method = match op {
        BinaryOperator::Add => ADD_METHOD,
        BinaryOperator::Sub => SUB_METHOD,
        BinaryOperator::Mult => MUL_METHOD,
        BinaryOperator::Div => DIV_METHOD,
    };

    if let (Some(left), Some(right)) = (lhs.try_as_number(), rhs.try_as_number()) {
        let result = match op {
            BinaryOperator::Add => left.checked_add(right),
            BinaryOperator::Sub => left.checked_sub(right),
            BinaryOperator::Mult => left.checked_mul(right),
            BinaryOperator::Div => {
                if right == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                left.checked_div(right)
            }
        };
        let value = result.ok_or(RuntimeError::ArithmeticOverflow { operation: method })?;
        return Ok(ObjectHolder::own(Object::Number(value)));
    }

    if op == BinaryOperator::Add {
        if let (Some(left), Some(right)) = (lhs.try_as_string(), rhs.try_as_string()) {
            return Ok(ObjectHolder::own(Object::String(format!(
                "{}{}",
                &*left, &*right
            ))));
        }
    }

    if lhs.has_method(method, 1) {
        return lhs.call_method(method, vec![rhs], context);
    }

    Err(RuntimeError::UnsupportedOperation {
        operation: method,
        type_name: lhs.type_name(),
    })
}

impl Statement {
    pub fn execute(
        &self,
        closure: &mut Closure,
        context: &mut dyn Context,
    ) -> RuntimeResult<ObjectHolder> {
        match self {
            Statement::Assignment { var, rv } => {
                let value = rv.execute(closure, context)?;
                closure.insert(var.clone(), value.clone());
                Ok(value)
            }
            Statement::FieldAssignment { object, field, rv } => {
                let target = object.resolve(closure)?;
                let value = rv.execute(closure, context)?;
                let Some(mut instance) = target.try_as_instance_mut() else {
                    return Err(RuntimeError::NotAnInstance {
                        type_name: target.type_name(),
                    });
                };
                instance.fields_mut().insert(field.clone(), value.clone());
                Ok(value)
            }
            Statement::Print(args) => {
                let mut first = true;
                for arg in args {
                    let value = arg.execute(closure, context)?;
                    let rendered = value.to_output(context)?;
                    let output = context.output_stream();
                    if !first {
                        output.push(' ');
                    }
                    output.push_str(&rendered);
                    first = false;
                }
                context.output_stream().push('\n');
                Ok(ObjectHolder::none())
            }
            Statement::Expr(expression) => expression.execute(closure, context),
            Statement::Return(value) => value.execute(closure, context),
            Statement::IfElse {
                condition,
                if_body,
                else_body,
            } => {
                if condition.execute(closure, context)?.is_true() {
                    return if_body.execute(closure, context);
                }
                if let Some(else_body) = else_body {
                    return else_body.execute(closure, context);
                }
                Ok(ObjectHolder::none())
            }
            Statement::Compound(statements) => {
                for statement in statements {
                    match statement {
                        // A return ends the enclosing method with its value.
                        Statement::Return(_) => return statement.execute(closure, context),
                        // A conditional yielding a value means a return fired
                        // inside one of its branches; pass it along.
                        Statement::IfElse { .. } => {
                            let result = statement.execute(closure, context)?;
                            if !result.is_empty() {
                                return Ok(result);
                            }
                        }
                        _ => {
                            statement.execute(closure, context)?;
                        }
                    }
                }
                Ok(ObjectHolder::none())
            }
            Statement::MethodBody(body) => body.execute(closure, context),
            Statement::ClassDefinition(class) => {
                closure.insert(
                    class.name().to_string(),
                    ObjectHolder::own(Object::Class(class.clone())),
                );
                Ok(ObjectHolder::none())
            }
        }
    }
}
