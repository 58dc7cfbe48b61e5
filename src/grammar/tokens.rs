//! Token definitions for normalized rules text
//!
//! The tokenizer runs over text that has already been normalized: prose is
//! lowercase, card names are placeholders (`SELF`, `PARENT`, `NAME_…`) and
//! mana symbols keep their braces. Anything outside this vocabulary is a lex
//! error.

use super::EntryRule;
use crate::error::ParseFailure;
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token with its byte range in the source text.
pub type TokenSpan = (Token, Range<usize>);

#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    /// A braced symbol; holds the text between the braces.
    #[regex(r"\{[^{}]+\}", |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    Symbol(String),

    #[token("SELF")]
    SelfRef,

    #[token("PARENT")]
    ParentRef,

    #[regex(r"NAME_\w+", |lex| lex.slice().to_string())]
    Name(String),

    /// Power/toughness or its modifier: `3/3`, `+1/+1`, `x/x`.
    #[regex(r"[+\-]?[0-9x*]+/[+\-]?[0-9x*]+", |lex| lex.slice().to_string())]
    PowerToughness(String),

    #[regex(r"[+\-][0-9x]+", |lex| lex.slice().to_string())]
    Signed(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Number(u32),

    #[regex(r"[a-z][a-z0-9\-]*(?:'[a-z]*)?", |lex| lex.slice().to_string())]
    Word(String),

    #[token("'s")]
    Possessive,

    #[token("'")]
    Apostrophe,

    #[token(",")]
    Comma,

    #[token(".")]
    Period,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("\"")]
    Quote,

    #[token("—")]
    EmDash,

    #[token("•")]
    Bullet,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("\n")]
    Newline,
}

impl Token {
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Word(w) if w == word)
    }

    pub fn word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }

    /// A reference to a card: `SELF`, `PARENT` or a name token.
    pub fn is_reference(&self) -> bool {
        matches!(self, Token::SelfRef | Token::ParentRef | Token::Name(_))
    }

    /// Tokens that may appear inside a noun phrase.
    pub fn is_phrase(&self) -> bool {
        !matches!(
            self,
            Token::Period | Token::Colon | Token::Quote | Token::Newline
        )
    }

    /// Punctuation that attaches to the preceding token when rendered.
    fn attaches_left(&self) -> bool {
        matches!(
            self,
            Token::Comma
                | Token::Period
                | Token::Colon
                | Token::Semicolon
                | Token::Possessive
                | Token::CloseParen
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Symbol(s) => write!(f, "{{{}}}", s),
            Token::SelfRef => f.write_str("SELF"),
            Token::ParentRef => f.write_str("PARENT"),
            Token::Name(s) | Token::PowerToughness(s) | Token::Signed(s) | Token::Word(s) => {
                f.write_str(s)
            }
            Token::Number(n) => write!(f, "{}", n),
            Token::Possessive => f.write_str("'s"),
            Token::Apostrophe => f.write_str("'"),
            Token::Comma => f.write_str(","),
            Token::Period => f.write_str("."),
            Token::Colon => f.write_str(":"),
            Token::Semicolon => f.write_str(";"),
            Token::Quote => f.write_str("\""),
            Token::EmDash => f.write_str("—"),
            Token::Bullet => f.write_str("•"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Newline => f.write_str("\n"),
        }
    }
}

/// Tokenize `text` for the given entry rule.
pub fn tokenize(rule: EntryRule, text: &str) -> Result<Vec<TokenSpan>, ParseFailure> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(text);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                let span = lexer.span();
                return Err(ParseFailure::new(
                    rule,
                    text,
                    format!("unexpected character(s) {:?} at {}", &text[span.clone()], span.start),
                ));
            }
        }
    }
    Ok(tokens)
}

/// Render tokens back to text, single-spaced.
pub fn text_of(tokens: &[TokenSpan]) -> String {
    let mut out = String::new();
    let mut after_open = true;
    for (token, _) in tokens {
        if !after_open && !token.attaches_left() {
            out.push(' ');
        }
        out.push_str(&token.to_string());
        after_open = matches!(token, Token::OpenParen | Token::Quote);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(EntryRule::RulesText, text)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_symbols_and_words() {
        assert_eq!(
            kinds("{t}: add {g}."),
            vec![
                Token::Symbol("t".into()),
                Token::Colon,
                Token::Word("add".into()),
                Token::Symbol("g".into()),
                Token::Period,
            ]
        );
    }

    #[test]
    fn test_modifiers_and_numbers() {
        assert_eq!(
            kinds("+1/+1 -2 3 x/x"),
            vec![
                Token::PowerToughness("+1/+1".into()),
                Token::Signed("-2".into()),
                Token::Number(3),
                Token::PowerToughness("x/x".into()),
            ]
        );
    }

    #[test]
    fn test_references() {
        assert_eq!(
            kinds("SELF's PARENT NAME_Grizzly_Bears"),
            vec![
                Token::SelfRef,
                Token::Possessive,
                Token::ParentRef,
                Token::Name("NAME_Grizzly_Bears".into()),
            ]
        );
    }

    #[test]
    fn test_contractions_stay_words() {
        assert_eq!(
            kinds("can't opponent's"),
            vec![Token::Word("can't".into()), Token::Word("opponent's".into())]
        );
    }

    #[test]
    fn test_unknown_characters_fail() {
        let err = tokenize(EntryRule::RulesText, "draw a card!").unwrap_err();
        assert_eq!(err.rule, EntryRule::RulesText);
        assert!(err.message.contains("\"!\""));
    }

    #[test]
    fn test_text_of_spacing() {
        let tokens = tokenize(EntryRule::RulesText, "SELF's power , +1/+1 .").unwrap();
        assert_eq!(text_of(&tokens), "SELF's power, +1/+1.");
    }
}
