use super::CalcError;

/// The free variable used for graphing.
pub const VARIABLE: char = 'x';

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Op(char),
    Ident(String),
    Variable,
    LParen,
    RParen,
}

/// Converts display notation (calculator glyphs included) into a token stream.
///
/// Identifiers are read as whole words, so a constant like `e` is only
/// recognized when it stands alone and never inside `sec`, `exp` or similar.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '×' | '·' => {
                tokens.push(Token::Op('*'));
                chars.next();
            }
            '÷' => {
                tokens.push(Token::Op('/'));
                chars.next();
            }
            '−' => {
                tokens.push(Token::Op('-'));
                chars.next();
            }
            'π' => {
                tokens.push(Token::Ident("pi".to_string()));
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                let mut has_dot = false;

                while let Some(&ch) = chars.peek() {
                    match ch {
                        '.' if has_dot => break,
                        '.' => {
                            has_dot = true;
                            num_str.push(ch);
                            chars.next();
                        }
                        '0'..='9' => {
                            num_str.push(ch);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                let value = num_str
                    .parse::<f64>()
                    .map_err(|_| CalcError::Syntax(format!("invalid number '{}'", num_str)))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphabetic() {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                push_identifier(&mut tokens, &ident);
            }
            _ => return Err(CalcError::Syntax(format!("unknown character '{}'", c))),
        }
    }
    Ok(tokens)
}

/// Canonical text form of an expression: ASCII operators, named constants,
/// one space between tokens. `2×π÷X` becomes `2 * pi / x`.
pub fn normalize(input: &str) -> Result<String, CalcError> {
    let parts: Vec<String> = tokenize(input)?
        .iter()
        .map(|token| match token {
            Token::Number(n) => n.to_string(),
            Token::Op(op) => op.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Variable => VARIABLE.to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        })
        .collect();
    Ok(parts.join(" "))
}

// A run like `xx` or `2xe` has no separators between its letters; anything
// that is not a known name is split into single-letter tokens so `xe` reads
// as `x·e`.
fn push_identifier(tokens: &mut Vec<Token>, ident: &str) {
    let lower = ident.to_ascii_lowercase();
    if lower == "x" {
        tokens.push(Token::Variable);
        return;
    }
    if is_known_name(&lower) {
        tokens.push(Token::Ident(lower));
        return;
    }
    if lower.chars().all(|c| c == VARIABLE || c == 'e') {
        for c in lower.chars() {
            if c == VARIABLE {
                tokens.push(Token::Variable);
            } else {
                tokens.push(Token::Ident("e".to_string()));
            }
        }
        return;
    }
    tokens.push(Token::Ident(lower));
}

pub fn is_known_name(name: &str) -> bool {
    is_constant(name) || is_function(name)
}

pub fn is_constant(name: &str) -> bool {
    matches!(name, "pi" | "e")
}

pub fn is_function(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "asin" | "acos" | "atan" |
        "sinh" | "cosh" | "tanh" |
        "log" | "ln" | "exp" | "sqrt" | "abs" | "floor" | "ceil" | "round"
    )
}

/// Whether the expression contains the free variable.
///
/// Uses the token stream when the input lexes, so `exp(2)` is not mistaken
/// for a function of `x`. Input that fails to lex falls back to a plain
/// case-insensitive letter check.
pub fn contains_variable(input: &str) -> bool {
    match tokenize(input) {
        Ok(tokens) => tokens.iter().any(|t| *t == Token::Variable),
        Err(_) => input.chars().any(|c| c.to_ascii_lowercase() == VARIABLE),
    }
}
