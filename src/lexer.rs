// ABOUTME: Lexer module — turns D source text into a token stream using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while_m_n},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{opt, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Real(f64),
    Str(String),

    // Reserved words
    True,
    False,
    Not,
    And,
    Or,
    Xor,
    Is,
    End,
    Func,
    If,
    Then,
    Else,
    While,
    For,
    Loop,
    Var,
    In,

    // Reserved operators
    DotDot,
    Dot,
    FatArrow,
    ColonEq,
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semi,

    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("identifier `{}`", s),
            TokenKind::Int(n) => format!("integer `{}`", n),
            TokenKind::Real(n) => format!("real `{}`", n),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{:?}`", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

/// Skip whitespace and `// ...` line comments (spec §4.1: comments are a
/// host convention, treated as whitespace by the core).
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    let line_comment = (tag("//"), take_while(|c| c != '\n')).map(|_| ());
    many0(alt((value((), multispace1), line_comment)))
        .map(|_| ())
        .parse(input)
}

fn lex_number(input: &str) -> IResult<&str, TokenKind> {
    // Integer: [0-9]+ ; Real: [0-9]+\.[0-9]+
    let (rest, (int_part, frac_part)) =
        (digit1, opt((char('.'), digit1))).parse(input)?;
    match frac_part {
        Some((_, frac)) => {
            let text = format!("{}.{}", int_part, frac);
            let n: f64 = text.parse().expect("digit1 guarantees a valid float");
            Ok((rest, TokenKind::Real(n)))
        }
        None => match int_part.parse::<i64>() {
            Ok(n) => Ok((rest, TokenKind::Int(n))),
            // Out of 64-bit range: fail the lex rather than silently
            // clamping to i64::MAX, which would corrupt the literal's
            // value with no diagnostic. `tokenize` turns this into a
            // ParseError naming the overflowing literal.
            Err(_) => Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Digit,
            ))),
        },
    }
}

/// Identifiers are `[A-Za-z][A-Za-z0-9]{0,31}` (spec §4.1) — 32 characters
/// total, capped via the continuation's `{0,31}` bound rather than left
/// unbounded.
fn lex_ident_or_keyword(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) = recognize((
        one_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ"),
        take_while_m_n(0, 31, |c: char| c.is_ascii_alphanumeric()),
    ))
    .parse(input)?;

    let kind = match text {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "not" => TokenKind::Not,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "xor" => TokenKind::Xor,
        "is" => TokenKind::Is,
        "end" => TokenKind::End,
        "func" => TokenKind::Func,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "loop" => TokenKind::Loop,
        "var" => TokenKind::Var,
        "in" => TokenKind::In,
        _ => TokenKind::Ident(text.to_string()),
    };
    Ok((rest, kind))
}

fn lex_string(input: &str) -> IResult<&str, TokenKind> {
    let (input, _) = char('"')(input)?;
    let (input, content) = take_while(|c| c != '"')(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, TokenKind::Str(content.to_string())))
}

/// Reserved operators, longest alternative first so maximal munch
/// disambiguates `:=` from a bare `=`-ish prefix and `..` from `.`.
///
/// Split into two nested `alt` groups because nom's `Alt` trait is only
/// implemented for tuples up to 21 elements and this set has 22 members;
/// the split falls on a boundary that keeps every prefix-conflicting pair
/// (`..`/`.`, `<=`/`<`, `>=`/`>`, `/=`/`/`) ordered correctly, since the
/// first group is tried to exhaustion before the second is attempted.
fn lex_operator(input: &str) -> IResult<&str, TokenKind> {
    alt((
        alt((
            value(TokenKind::DotDot, tag("..")),
            value(TokenKind::Dot, char('.')),
            value(TokenKind::FatArrow, tag("=>")),
            value(TokenKind::ColonEq, tag(":=")),
            value(TokenKind::Le, tag("<=")),
            value(TokenKind::Ge, tag(">=")),
            value(TokenKind::Ne, tag("/=")),
            value(TokenKind::Plus, char('+')),
            value(TokenKind::Minus, char('-')),
            value(TokenKind::Star, char('*')),
            value(TokenKind::Slash, char('/')),
        )),
        alt((
            value(TokenKind::Lt, char('<')),
            value(TokenKind::Gt, char('>')),
            value(TokenKind::Eq, char('=')),
            value(TokenKind::LParen, char('(')),
            value(TokenKind::RParen, char(')')),
            value(TokenKind::LBracket, char('[')),
            value(TokenKind::RBracket, char(']')),
            value(TokenKind::LBrace, char('{')),
            value(TokenKind::RBrace, char('}')),
            value(TokenKind::Comma, char(',')),
            value(TokenKind::Semi, char(';')),
        )),
    ))
    .parse(input)
}

fn lex_one(input: &str) -> IResult<&str, TokenKind> {
    alt((lex_string, lex_number, lex_ident_or_keyword, lex_operator)).parse(input)
}

/// Tokenize an entire source string, ending with an explicit `Eof` token
/// so the parser never needs to special-case running off the end.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0usize;

    loop {
        let (after_ws, _) = ws_and_comments(rest)
            .map_err(|_| ParseError::invalid(offset, "internal whitespace scan failure"))?;
        offset += rest.len() - after_ws.len();
        rest = after_ws;

        if rest.is_empty() {
            break;
        }

        let start = offset;
        match lex_one(rest) {
            Ok((remaining, kind)) => {
                let consumed = rest.len() - remaining.len();
                tokens.push(Token { kind, pos: start });
                offset += consumed;
                rest = remaining;
            }
            Err(_) => {
                let bad_char = rest.chars().next().unwrap_or('?');
                if bad_char.is_ascii_digit() {
                    let digits: String =
                        rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                    return Err(ParseError::invalid(
                        start,
                        format!(
                            "integer literal `{}` does not fit in a 64-bit signed integer",
                            digits
                        ),
                    ));
                }
                return Err(ParseError::invalid(
                    start,
                    format!("unrecognized character '{}'", bad_char),
                ));
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: offset,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::Real(3.14), TokenKind::Eof]);
    }

    #[test]
    fn integer_literal_overflowing_i64_is_a_parse_error_not_a_silent_clamp() {
        let err = tokenize("99999999999999999999").unwrap_err();
        match err {
            ParseError::InvalidToken { pos, .. } => assert_eq!(pos, 0),
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }

    #[test]
    fn lexes_identifiers_and_keywords() {
        assert_eq!(
            kinds("foo var"),
            vec![
                TokenKind::Ident("foo".to_string()),
                TokenKind::Var,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn identifier_is_capped_at_32_characters() {
        let exactly_32 = "a".repeat(32);
        assert_eq!(
            kinds(&exactly_32),
            vec![TokenKind::Ident(exactly_32.clone()), TokenKind::Eof]
        );

        // A 33rd character spills into a second token rather than
        // extending the identifier past the spec's 32-character cap.
        let thirty_three = "a".repeat(33);
        let tokens = kinds(&thirty_three);
        assert_eq!(tokens[0], TokenKind::Ident(exactly_32));
        assert_eq!(tokens[1], TokenKind::Ident("a".to_string()));
        assert_eq!(tokens[2], TokenKind::Eof);
    }

    #[test]
    fn lexes_strings_without_escapes() {
        assert_eq!(
            kinds(r#""hello world""#),
            vec![TokenKind::Str("hello world".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn disambiguates_assign_from_equality() {
        assert_eq!(
            kinds(":= ="),
            vec![TokenKind::ColonEq, TokenKind::Eq, TokenKind::Eof]
        );
    }

    #[test]
    fn disambiguates_range_from_member() {
        assert_eq!(
            kinds(".. ."),
            vec![TokenKind::DotDot, TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(
            kinds("1 // comment\n2"),
            vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]
        );
    }

    #[test]
    fn reports_position_of_bad_character() {
        let err = tokenize("x := @").unwrap_err();
        match err {
            ParseError::InvalidToken { pos, .. } => assert_eq!(pos, 5),
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }
}
