use super::lexer::{is_constant, is_function, Token};
use super::CalcError;

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(String),
    Variable,
    Neg(Box<Expr>),
    Binary {
        op: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        arg: Box<Expr>,
    },
}

/// Recursive-descent parser over the lexer's tokens.
///
/// Grammar, lowest precedence first:
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary | implicit unary)*
/// unary   := ('-' | '+') unary | power
/// power   := primary ('^' unary)?
/// primary := number | constant | 'x' | name '(' expr ')' | '(' expr ')'
/// ```
///
/// `^` binds tighter than unary minus and is right-associative, so
/// `-2^2 = -4` and `2^3^2 = 512`.
///
/// Nesting (parentheses, calls, signs, exponents) is limited to
/// [`MAX_DEPTH`] levels and input to [`MAX_TOKENS`] tokens, which bounds
/// the depth of the tree and of its evaluation.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

/// Maximum nesting depth of a single expression.
pub const MAX_DEPTH: usize = 100;
/// Maximum number of tokens in a single expression.
pub const MAX_TOKENS: usize = 1_000;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Expr, CalcError> {
        if self.tokens.is_empty() {
            return Err(CalcError::Syntax("empty expression".to_string()));
        }
        if self.tokens.len() > MAX_TOKENS {
            return Err(CalcError::Syntax(format!(
                "expression longer than {} tokens",
                MAX_TOKENS
            )));
        }
        let expr = self.expr()?;
        if self.current < self.tokens.len() {
            return Err(CalcError::Syntax(format!(
                "unexpected {:?} at end of expression",
                self.tokens[self.current]
            )));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    /// Runs `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CalcError>,
    ) -> Result<T, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::Syntax(format!(
                "expression nested deeper than {} levels",
                MAX_DEPTH
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expr(&mut self) -> Result<Expr, CalcError> {
        let mut left = self.term()?;

        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = *op;
            self.current += 1;
            let right = self.term()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, CalcError> {
        let mut left = self.unary()?;

        loop {
            match self.peek() {
                Some(Token::Op(op @ ('*' | '/'))) => {
                    let op = *op;
                    self.current += 1;
                    let right = self.unary()?;
                    left = binary(op, left, right);
                }
                // `2π`, `3(4)`, `2x`, `(1)(2)`
                Some(Token::LParen) | Some(Token::Ident(_)) | Some(Token::Variable) => {
                    let right = self.unary()?;
                    left = binary('*', left, right);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, CalcError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.current += 1;
                let operand = self.nested(Self::unary)?;
                Ok(Expr::Neg(Box::new(operand)))
            }
            Some(Token::Op('+')) => {
                self.current += 1;
                self.nested(Self::unary)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, CalcError> {
        let base = self.primary()?;

        if let Some(Token::Op('^')) = self.peek() {
            self.current += 1;
            // the exponent may carry its own sign: 2^-1
            let exponent = self.nested(Self::unary)?;
            Ok(binary('^', base, exponent))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> Result<Expr, CalcError> {
        let token = match self.tokens.get(self.current) {
            Some(token) => token.clone(),
            None => return Err(CalcError::Syntax("unexpected end of input".to_string())),
        };
        self.current += 1;

        match token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Variable => Ok(Expr::Variable),
            Token::LParen => {
                let inner = self.nested(Self::expr)?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Token::Ident(name) if is_constant(&name) => Ok(Expr::Constant(name)),
            Token::Ident(name) if is_function(&name) => {
                if self.peek() != Some(&Token::LParen) {
                    return Err(CalcError::Syntax(format!(
                        "function '{}' requires parentheses",
                        name
                    )));
                }
                self.current += 1;
                let arg = self.nested(Self::expr)?;
                self.expect_rparen()?;
                Ok(Expr::Call {
                    name,
                    arg: Box::new(arg),
                })
            }
            Token::Ident(name) => Err(CalcError::Syntax(format!("unknown name '{}'", name))),
            other => Err(CalcError::Syntax(format!("unexpected {:?}", other))),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), CalcError> {
        if self.peek() == Some(&Token::RParen) {
            self.current += 1;
            Ok(())
        } else {
            Err(CalcError::Syntax("missing closing parenthesis".to_string()))
        }
    }
}

fn binary(op: char, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_engine::lexer::tokenize;

    fn parse(input: &str) -> Result<Expr, CalcError> {
        Parser::new(tokenize(input)?).parse()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1+2*3").unwrap();
        match expr {
            Expr::Binary { op: '+', right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: '*', .. }));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn unary_minus_wraps_power() {
        let expr = parse("-2^2").unwrap();
        match expr {
            Expr::Neg(inner) => assert!(matches!(*inner, Expr::Binary { op: '^', .. })),
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn implicit_multiplication_with_constant() {
        let expr = parse("2π").unwrap();
        assert_eq!(
            expr,
            binary('*', Expr::Number(2.0), Expr::Constant("pi".to_string()))
        );
    }

    #[test]
    fn adjacent_numbers_are_rejected() {
        assert!(parse("1.2.3").is_err());
    }

    #[test]
    fn function_without_parentheses_is_rejected() {
        assert!(parse("sin 2").is_err());
    }

    #[test]
    fn unbalanced_parentheses_are_rejected() {
        assert!(parse("(1+2").is_err());
        assert!(parse("1+2)").is_err());
        assert!(parse("").is_err());
        assert!(parse("2+").is_err());
    }

    #[test]
    fn nesting_is_limited() {
        let ok = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(parse(&ok).is_ok());

        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&deep), Err(CalcError::Syntax(_))));

        let calls = format!("{}1{}", "sqrt(".repeat(500), ")".repeat(500));
        assert!(matches!(parse(&calls), Err(CalcError::Syntax(_))));
    }

    #[test]
    fn sign_and_exponent_chains_are_limited() {
        assert!(parse(&format!("{}1", "-".repeat(50_000))).is_err());
        assert!(parse(&format!("{}1", "-+".repeat(300))).is_err());
        assert!(parse(&format!("2{}", "^2".repeat(300))).is_err());
        assert!(parse(&format!("{}1", "--".repeat(10))).is_ok());
    }

    #[test]
    fn long_flat_expressions_are_limited() {
        let long = vec!["1"; MAX_TOKENS].join("+");
        assert!(matches!(parse(&long), Err(CalcError::Syntax(_))));
        let short = vec!["1"; 100].join("+");
        assert!(parse(&short).is_ok());
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(parse("foo(1)"), Err(CalcError::Syntax(_))));
    }
}
