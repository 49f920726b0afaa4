use super::lexer::VARIABLE;
use super::parser::Expr;
use super::CalcError;
use std::f64::consts::{E, PI};

impl Expr {
    /// Interprets the tree. `x` supplies the free variable, if any.
    ///
    /// Every intermediate value is checked, so NaN or an infinity never
    /// escapes as a result.
    pub fn eval(&self, x: Option<f64>) -> Result<f64, CalcError> {
        let value = match self {
            Expr::Number(n) => *n,
            Expr::Constant(name) => match name.as_str() {
                "pi" => PI,
                "e" => E,
                other => return Err(CalcError::Syntax(format!("unknown constant '{}'", other))),
            },
            Expr::Variable => x.ok_or(CalcError::UnboundVariable(VARIABLE))?,
            Expr::Neg(inner) => -inner.eval(x)?,
            Expr::Binary { op, left, right } => {
                let l = left.eval(x)?;
                let r = right.eval(x)?;
                apply_operator(*op, l, r)?
            }
            Expr::Call { name, arg } => apply_function(name, arg.eval(x)?)?,
        };
        finite(value)
    }
}

fn finite(value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::Overflow(format!("non-finite result {}", value)))
    }
}

fn apply_operator(op: char, l: f64, r: f64) -> Result<f64, CalcError> {
    match op {
        '+' => Ok(l + r),
        '-' => Ok(l - r),
        '*' => Ok(l * r),
        '/' => {
            if r == 0.0 {
                return Err(CalcError::Overflow("division by zero".to_string()));
            }
            Ok(l / r)
        }
        '^' => {
            let result = l.powf(r);
            if result.is_nan() {
                return Err(CalcError::Domain(format!(
                    "{} ^ {} has no real value",
                    l, r
                )));
            }
            Ok(result)
        }
        other => Err(CalcError::Syntax(format!("unknown operator '{}'", other))),
    }
}

fn apply_function(name: &str, arg: f64) -> Result<f64, CalcError> {
    let result = match name {
        // Trigonometric, radians
        "sin" => arg.sin(),
        "cos" => arg.cos(),
        "tan" => arg.tan(),
        "asin" => {
            if !(-1.0..=1.0).contains(&arg) {
                return Err(CalcError::Domain("asin domain: [-1, 1]".to_string()));
            }
            arg.asin()
        }
        "acos" => {
            if !(-1.0..=1.0).contains(&arg) {
                return Err(CalcError::Domain("acos domain: [-1, 1]".to_string()));
            }
            arg.acos()
        }
        "atan" => arg.atan(),

        // Hyperbolic
        "sinh" => arg.sinh(),
        "cosh" => arg.cosh(),
        "tanh" => arg.tanh(),

        // Exponential
        "ln" => {
            if arg <= 0.0 {
                return Err(CalcError::Domain("ln domain: positive numbers".to_string()));
            }
            arg.ln()
        }
        "log" => {
            if arg <= 0.0 {
                return Err(CalcError::Domain("log domain: positive numbers".to_string()));
            }
            arg.log10()
        }
        "exp" => arg.exp(),

        // Basic
        "sqrt" => {
            if arg < 0.0 {
                return Err(CalcError::Domain("sqrt domain: non-negative numbers".to_string()));
            }
            arg.sqrt()
        }
        "abs" => arg.abs(),
        "floor" => arg.floor(),
        "ceil" => arg.ceil(),
        "round" => arg.round(),

        _ => return Err(CalcError::Syntax(format!("unknown function '{}'", name))),
    };
    Ok(result)
}
