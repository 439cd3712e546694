use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{CalcError, Span};
use crate::value::Value;

/// Apply a binary operator to two typed operands.
///
/// Domain rules:
/// - `+` / `-` require both operands in the same domain
/// - `*` allows exactly one time operand (scaling)
/// - `/` requires a numeric divisor
/// - `^` is only defined for numbers
pub fn apply_binary(
    operator: BinaryOp,
    left: Value,
    right: Value,
    span: &Span,
) -> Result<Value, CalcError> {
    match operator {
        BinaryOp::Add => match (left, right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l + r)),
            (Value::Double(l), Value::Double(r)) => Ok(Value::Double(l + r)),
            (Value::Int(l), Value::Double(r)) => Ok(Value::Double(l as f64 + r)),
            (Value::Double(l), Value::Int(r)) => Ok(Value::Double(l + r as f64)),
            (Value::Time(l), Value::Time(r)) => Ok(Value::Time(l + r)),
            (l, r) => Err(CalcError::arithmetic_error_with_help(
                span.clone(),
                format!("Cannot add {} and {}", l.type_name(), r.type_name()),
                "Addition requires two numbers or two times.".to_string(),
            )),
        },
        BinaryOp::Subtract => match (left, right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l - r)),
            (Value::Double(l), Value::Double(r)) => Ok(Value::Double(l - r)),
            (Value::Int(l), Value::Double(r)) => Ok(Value::Double(l as f64 - r)),
            (Value::Double(l), Value::Int(r)) => Ok(Value::Double(l - r as f64)),
            (Value::Time(l), Value::Time(r)) => Ok(Value::Time(l - r)),
            (l, r) => Err(CalcError::arithmetic_error_with_help(
                span.clone(),
                format!("Cannot subtract {} and {}", l.type_name(), r.type_name()),
                "Subtraction requires two numbers or two times.".to_string(),
            )),
        },
        BinaryOp::Multiply => match (left, right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l * r)),
            (Value::Double(l), Value::Double(r)) => Ok(Value::Double(l * r).trim()),
            (Value::Int(l), Value::Double(r)) => Ok(Value::Double(l as f64 * r).trim()),
            (Value::Double(l), Value::Int(r)) => Ok(Value::Double(l * r as f64).trim()),
            (Value::Time(t), Value::Int(n)) | (Value::Int(n), Value::Time(t)) => {
                Ok(Value::Time(t.scale(n as f64)))
            }
            (Value::Time(t), Value::Double(n)) | (Value::Double(n), Value::Time(t)) => {
                Ok(Value::Time(t.scale(n)))
            }
            (l, r) => Err(CalcError::arithmetic_error_with_help(
                span.clone(),
                format!("Cannot multiply {} and {}", l.type_name(), r.type_name()),
                "At most one multiplication operand may be a time.".to_string(),
            )),
        },
        BinaryOp::Divide => {
            let divisor = match right {
                Value::Int(n) => n as f64,
                Value::Double(n) => n,
                Value::Time(_) => {
                    return Err(CalcError::arithmetic_error_with_help(
                        span.clone(),
                        format!("Cannot divide {} by time", left.type_name()),
                        "The divisor must be a number.".to_string(),
                    ));
                }
            };

            if divisor == 0.0 {
                return Err(CalcError::arithmetic_error(
                    span.clone(),
                    "Division by zero".to_string(),
                ));
            }

            match left {
                Value::Int(l) => Ok(Value::Double(l as f64 / divisor).trim()),
                Value::Double(l) => Ok(Value::Double(l / divisor).trim()),
                Value::Time(t) => Ok(Value::Time(t.scale(1.0 / divisor))),
            }
        }
        BinaryOp::Power => match (left, right) {
            (Value::Time(_), _) | (_, Value::Time(_)) => {
                Err(CalcError::arithmetic_error_with_help(
                    span.clone(),
                    "Operator '^' is not defined for time values".to_string(),
                    "Exponentiation only works with numbers.".to_string(),
                ))
            }
            (l, r) => {
                let base = match l {
                    Value::Int(n) => n as f64,
                    Value::Double(n) => n,
                    Value::Time(_) => unreachable!(),
                };
                let exponent = match r {
                    Value::Int(n) => n as f64,
                    Value::Double(n) => n,
                    Value::Time(_) => unreachable!(),
                };
                Ok(Value::Double(base.powf(exponent)).trim())
            }
        },
    }
}

/// Apply a unary operator to one typed operand.
pub fn apply_unary(operator: UnaryOp, operand: Value, _span: &Span) -> Result<Value, CalcError> {
    match operator {
        UnaryOp::Identity => Ok(operand),
        UnaryOp::Negate => match operand {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Double(n) => Ok(Value::Double(-n)),
            Value::Time(t) => Ok(Value::Time(-t)),
        },
    }
}

/// Fold an expression tree directly into a single value, without producing
/// a step trace. Shares the arithmetic rules with the visualization path.
pub fn evaluate(expr: &Expr) -> Result<Value, CalcError> {
    match expr {
        Expr::Literal { value, .. } => Ok(*value),
        Expr::Grouping { expr, .. } => evaluate(expr),
        Expr::Unary {
            operator,
            operand,
            span,
        } => {
            let operand_val = evaluate(operand)?;
            apply_unary(*operator, operand_val, span)
        }
        Expr::Binary {
            left,
            operator,
            right,
            span,
        } => {
            let left_val = evaluate(left)?;
            let right_val = evaluate(right)?;
            apply_binary(*operator, left_val, right_val, span)
        }
    }
}
