// ABOUTME: Tree-walking evaluator — executes a parsed program against an environment

use crate::ast::{BinaryOp, Body, Expr, Iterable, MemberKey, Program, Stmt, UnaryOp};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::Value;
use std::rc::Rc;

/// Runs a whole program in `env`, returning the value of its last
/// statement (spec §6 `exec`).
pub fn exec(env: &Rc<Environment>, program: &Program) -> Result<Value, RuntimeError> {
    eval_body(program, env)
}

/// A body's value is the value of its last statement, or `Empty` if the
/// body is empty (spec §3 "Body"). Only expression statements contribute
/// a non-`Empty` value; declarations, assignments, and loops are run for
/// effect.
fn eval_body(body: &Body, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    let mut last = Value::Empty;
    for stmt in body {
        last = eval_stmt(stmt, env)?;
    }
    Ok(last)
}

fn eval_stmt(stmt: &Stmt, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    match stmt {
        Stmt::Decl { name, expr } => {
            let value = eval_expr(expr, env)?;
            env.define(name, value.clone());
            Ok(value)
        }
        Stmt::Assign { target, expr } => {
            let name = match target {
                Expr::Ident(name) => name,
                // The parser accepts any expression on the left of `:=`;
                // the evaluator only ever supports identifier lvalues
                // (spec §9 note 1). Surfaced as a type error rather than
                // silently doing nothing.
                other => {
                    return Err(RuntimeError::type_error_named(
                        "identifier lvalue",
                        describe_lvalue(other),
                    ))
                }
            };
            let value = eval_expr(expr, env)?;
            env.assign(name, value.clone())?;
            Ok(value)
        }
        Stmt::ExprStmt(expr) => eval_expr(expr, env),
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            if expect_bool(eval_expr(cond, env)?)? {
                eval_body(then_body, env)
            } else {
                eval_body(else_body, env)
            }
        }
        Stmt::While { cond, body } => {
            while expect_bool(eval_expr(cond, env)?)? {
                eval_body(body, env)?;
            }
            Ok(Value::Empty)
        }
        Stmt::For {
            name,
            iterable,
            body,
        } => {
            let items = eval_iterable(iterable, env)?;
            for item in items {
                // Bound via `define` in the current environment once per
                // iteration, not a fresh scope (spec §4.5): a closure
                // created in the loop body shares the one cell across
                // iterations, same as `while`.
                env.define(name, item);
                eval_body(body, env)?;
            }
            Ok(Value::Empty)
        }
    }
}

/// `lo..hi` is a half-open integer range: `lo` included, `hi` excluded.
fn eval_iterable(iterable: &Iterable, env: &Rc<Environment>) -> Result<Vec<Value>, RuntimeError> {
    match iterable {
        Iterable::Expr(expr) => match eval_expr(expr, env)? {
            Value::Array(items) => Ok(items),
            other => Err(RuntimeError::type_error("array", &other)),
        },
        Iterable::Range(lo, hi) => {
            let lo = expect_int(eval_expr(lo, env)?)?;
            let hi = expect_int(eval_expr(hi, env)?)?;
            Ok((lo..hi).map(Value::Int).collect())
        }
    }
}

fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Ident(name) => env.lookup(name),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Real(n) => Ok(Value::Real(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Empty => Ok(Value::Empty),
        Expr::Array(items) => {
            let values = items
                .iter()
                .map(|item| eval_expr(item, env))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
        Expr::Tuple(items) => {
            let values = items
                .iter()
                .map(|(key, item)| eval_expr(item, env).map(|v| (key.clone(), v)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Tuple(values))
        }
        Expr::FuncLit { params, body } => Ok(Value::Closure {
            params: params.clone(),
            body: Rc::new(body.clone()),
            env: env.clone(),
        }),
        Expr::Unary(op, operand) => eval_unary(*op, eval_expr(operand, env)?),
        Expr::Binary(op, lhs, rhs) => {
            eval_binary(*op, eval_expr(lhs, env)?, eval_expr(rhs, env)?)
        }
        Expr::IsInstance(inner, indicator) => {
            let value = eval_expr(inner, env)?;
            Ok(Value::Bool(value.is_instance_of(*indicator)))
        }
        Expr::Index(base, index) => {
            let base = eval_expr(base, env)?;
            let index = eval_expr(index, env)?;
            eval_index(base, index)
        }
        Expr::Member(base, key) => {
            let base = eval_expr(base, env)?;
            eval_member(base, key)
        }
        Expr::Call(callee, args) => {
            let callee = eval_expr(callee, env)?;
            let args = args
                .iter()
                .map(|arg| eval_expr(arg, env))
                .collect::<Result<Vec<_>, _>>()?;
            call_value(callee, &args)
        }
    }
}

fn call_value(callee: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    match callee {
        Value::BuiltIn(f) => f(args),
        Value::Closure { params, body, env } => {
            if params.len() != args.len() {
                return Err(RuntimeError::arity_error(params.len().to_string(), args.len()));
            }
            let pairs: Vec<(String, Value)> = params
                .into_iter()
                .zip(args.iter().cloned())
                .collect();
            let call_env = Environment::bind_vars(env, pairs);
            eval_body(&body, &call_env)
        }
        other => Err(RuntimeError::not_function(&other)),
    }
}

fn eval_index(base: Value, index: Value) -> Result<Value, RuntimeError> {
    match &base {
        Value::Array(items) => {
            let i = expect_int(index)?;
            checked_index(i, items.len())
                .and_then(|idx| items.get(idx))
                .cloned()
                .ok_or_else(|| RuntimeError::attribute_error(&base, i.to_string()))
        }
        Value::String(s) => {
            let i = expect_int(index)?;
            let chars: Vec<char> = s.chars().collect();
            checked_index(i, chars.len())
                .and_then(|idx| chars.get(idx))
                .map(|c| Value::String(c.to_string()))
                .ok_or_else(|| RuntimeError::attribute_error(&base, i.to_string()))
        }
        Value::Empty => Err(RuntimeError::NullAccess),
        other => Err(RuntimeError::type_error_named("array or string", other.type_name())),
    }
}

/// `None` when `i` is out of `[0, len)`; callers turn that into an
/// `AttributeError` (spec §4.5: out-of-bounds indexing is never anything
/// else), not the host-reserved `Default` variant.
fn checked_index(i: i64, len: usize) -> Option<usize> {
    if i >= 0 && (i as usize) < len {
        Some(i as usize)
    } else {
        None
    }
}

fn eval_member(base: Value, key: &MemberKey) -> Result<Value, RuntimeError> {
    match &base {
        Value::Tuple(entries) => match key {
            MemberKey::Name(name) => entries
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| RuntimeError::attribute_error(&base, name.clone())),
            MemberKey::Index(i) => checked_index(*i, entries.len())
                .and_then(|idx| entries.get(idx))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| RuntimeError::attribute_error(&base, i.to_string())),
        },
        Value::Empty => Err(RuntimeError::NullAccess),
        other => Err(RuntimeError::type_error_named("tuple", other.type_name())),
    }
}

fn eval_unary(op: UnaryOp, value: Value) -> Result<Value, RuntimeError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!expect_bool(value)?)),
        UnaryOp::Neg => match value {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Real(n) => Ok(Value::Real(-n)),
            Value::Empty => Err(RuntimeError::NullAccess),
            other => Err(RuntimeError::type_error("int or real", &other)),
        },
        UnaryOp::Pos => match value {
            Value::Int(_) | Value::Real(_) => Ok(value),
            Value::Empty => Err(RuntimeError::NullAccess),
            other => Err(RuntimeError::type_error("int or real", &other)),
        },
    }
}

fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::And => Ok(Value::Bool(expect_bool(lhs)? && expect_bool(rhs)?)),
        BinaryOp::Or => Ok(Value::Bool(expect_bool(lhs)? || expect_bool(rhs)?)),
        BinaryOp::Xor => Ok(Value::Bool(expect_bool(lhs)? ^ expect_bool(rhs)?)),

        // Relational operators, including `=`/`/=`, promote both operands
        // to real and compare numerically — the spec's literal wording
        // for this whole precedence group (see DESIGN.md for the
        // open-question discussion around `=`/`/=` on non-numeric
        // operands).
        BinaryOp::Lt => Ok(Value::Bool(to_real(lhs)? < to_real(rhs)?)),
        BinaryOp::Le => Ok(Value::Bool(to_real(lhs)? <= to_real(rhs)?)),
        BinaryOp::Gt => Ok(Value::Bool(to_real(lhs)? > to_real(rhs)?)),
        BinaryOp::Ge => Ok(Value::Bool(to_real(lhs)? >= to_real(rhs)?)),
        BinaryOp::Eq => Ok(Value::Bool(to_real(lhs)? == to_real(rhs)?)),
        BinaryOp::Ne => Ok(Value::Bool(to_real(lhs)? != to_real(rhs)?)),

        // `+` additionally concatenates strings, arrays, and tuples
        // (preserving keys); `-`/`*`/`/` are numeric only (spec §4.5).
        BinaryOp::Add => match (lhs, rhs) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::Array(mut a), Value::Array(b)) => {
                a.extend(b);
                Ok(Value::Array(a))
            }
            (Value::Tuple(mut a), Value::Tuple(b)) => {
                a.extend(b);
                Ok(Value::Tuple(a))
            }
            (lhs, rhs) => numeric_op(lhs, rhs, |a, b| a + b, |a, b| a + b),
        },
        BinaryOp::Sub => numeric_op(lhs, rhs, |a, b| a - b, |a, b| a - b),
        BinaryOp::Mul => numeric_op(lhs, rhs, |a, b| a * b, |a, b| a * b),
        // Integer division truncates; mixed or real division floats.
        // Rust's integer division panics on a zero divisor, so that case
        // is surfaced as a runtime error instead of reaching `/`.
        BinaryOp::Div => match (lhs, rhs) {
            (Value::Int(_), Value::Int(0)) => {
                Err(RuntimeError::Default("division by zero".to_string()))
            }
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a / b)),
            (lhs, rhs) => Ok(Value::Real(to_real(lhs)? / to_real(rhs)?)),
        },
    }
}

/// Integer arithmetic when both operands are already `Int`; promotes to
/// `Real` the moment either operand is not (spec §4.5 "Arithmetic").
fn numeric_op(
    lhs: Value,
    rhs: Value,
    int_op: impl Fn(i64, i64) -> i64,
    real_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        _ => Ok(Value::Real(real_op(to_real(lhs)?, to_real(rhs)?))),
    }
}

fn describe_lvalue(expr: &Expr) -> &'static str {
    match expr {
        Expr::Index(..) => "index expression",
        Expr::Member(..) => "member expression",
        Expr::Call(..) => "call expression",
        _ => "non-identifier expression",
    }
}

fn to_real(value: Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(n as f64),
        Value::Real(n) => Ok(n),
        Value::Empty => Err(RuntimeError::NullAccess),
        other => Err(RuntimeError::type_error("int or real", &other)),
    }
}

fn expect_bool(value: Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::Empty => Err(RuntimeError::NullAccess),
        other => Err(RuntimeError::type_error("bool", &other)),
    }
}

fn expect_int(value: Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(n),
        Value::Empty => Err(RuntimeError::NullAccess),
        other => Err(RuntimeError::type_error("int", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(source: &str) -> Result<Value, RuntimeError> {
        let program = parse(source).expect("source should parse");
        let env = Environment::new();
        exec(&env, &program)
    }

    #[test]
    fn evaluates_arithmetic_with_int_to_real_promotion() {
        assert!(matches!(run("1 + 2;"), Ok(Value::Int(3))));
        assert!(matches!(run("1 + 2.0;"), Ok(Value::Real(n)) if n == 3.0));
        // Integer division truncates; a mixed operand floats it instead.
        assert!(matches!(run("7 / 2;"), Ok(Value::Int(3))));
        assert!(matches!(run("7 / 2.0;"), Ok(Value::Real(n)) if n == 3.5));
    }

    #[test]
    fn plus_concatenates_strings_arrays_and_tuples() {
        assert_eq!(run(r#""ab" + "cd";"#).unwrap().to_string(), "abcd");
        assert!(matches!(run("([1,2] + [3])[2];"), Ok(Value::Int(3))));
        assert!(matches!(run("({a := 1} + {b := 2}).b;"), Ok(Value::Int(2))));
    }

    #[test]
    fn declaration_and_assignment_evaluate_to_the_assigned_value() {
        assert!(matches!(run("var x := 5;"), Ok(Value::Int(5))));
        assert!(matches!(run("var x := 1; x := 9;"), Ok(Value::Int(9))));
    }

    #[test]
    fn assigning_into_a_non_identifier_lvalue_is_a_type_error() {
        assert!(run("var a := [1]; a[0] := 2;").is_err());
    }

    #[test]
    fn division_by_zero_is_a_runtime_error_not_a_panic() {
        assert!(run("1 / 0;").is_err());
    }

    #[test]
    fn for_loop_variable_is_a_single_cell_shared_across_iterations() {
        // Matches §4.5: `for` binds via `define` in the *current*
        // environment once per iteration, not a fresh scope per
        // iteration — so a closure captured in the body sees whatever
        // the shared cell holds by the time it's called.
        let result = run(
            "var captured := func() => 0; \
             for i in 0..3 loop captured := func() => i; end; \
             captured();",
        );
        assert!(matches!(result, Ok(Value::Int(2))));
    }

    #[test]
    fn relational_operators_compare_numerically() {
        assert!(matches!(run("1 < 2;"), Ok(Value::Bool(true))));
        assert!(matches!(run("2 = 2.0;"), Ok(Value::Bool(true))));
    }

    #[test]
    fn if_statement_yields_taken_branch_value() {
        assert!(matches!(run("if true then 1; else 2; end;"), Ok(Value::Int(1))));
        assert!(matches!(run("if false then 1; else 2; end;"), Ok(Value::Int(2))));
    }

    #[test]
    fn while_loop_mutates_outer_binding() {
        let result = run("var i := 0; while i < 5 loop i := i + 1; end; i;");
        assert!(matches!(result, Ok(Value::Int(5))));
    }

    #[test]
    fn for_loop_over_range_accumulates() {
        let result = run("var total := 0; for i in 0..5 loop total := total + i; end; total;");
        assert!(matches!(result, Ok(Value::Int(10))));
    }

    #[test]
    fn recursive_closure_can_call_itself_through_its_own_binding() {
        let result = run(
            "var fact := func(n) is \
                if n <= 1 then 1; else n * fact(n - 1); end; \
             end; \
             fact(5);",
        );
        assert!(matches!(result, Ok(Value::Int(120))));
    }

    #[test]
    fn closures_capture_a_live_shared_environment() {
        let result = run(
            "var x := 1; \
             var getX := func() => x; \
             x := 2; \
             getX();",
        );
        assert!(matches!(result, Ok(Value::Int(2))));
    }

    #[test]
    fn array_and_tuple_access() {
        assert!(matches!(run("[1,2,3][1];"), Ok(Value::Int(2))));
        assert!(matches!(run("{a := 1, b := 2}.b;"), Ok(Value::Int(2))));
    }

    #[test]
    fn out_of_range_index_is_an_attribute_error() {
        assert!(matches!(
            run("[1,2,3][5];"),
            Err(RuntimeError::AttributeError { .. })
        ));
        assert!(matches!(
            run("{a := 1, b := 2}.9;"),
            Err(RuntimeError::AttributeError { .. })
        ));
    }

    #[test]
    fn empty_is_rejected_by_arithmetic_and_relational_operators() {
        assert!(matches!(run("var x; x + 1;"), Err(RuntimeError::NullAccess)));
        assert!(matches!(run("var x; x < 1;"), Err(RuntimeError::NullAccess)));
    }

    #[test]
    fn is_type_test_reports_runtime_type() {
        assert!(matches!(run("1 is int;"), Ok(Value::Bool(true))));
        assert!(matches!(run("1 is real;"), Ok(Value::Bool(false))));
        assert!(matches!(run("[1] is array;"), Ok(Value::Bool(true))));
    }

    #[test]
    fn calling_a_non_function_is_an_error() {
        assert!(run("var x := 1; x();").is_err());
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        assert!(run("var f := func(x) => x; f();").is_err());
    }
}
