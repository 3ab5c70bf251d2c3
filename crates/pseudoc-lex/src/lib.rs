//! pseudoc-lex - Lexical Analyzer (Lexer/Tokenizer)
//!
//! Transforms pseudocode source text into a flat token stream. The scanner
//! is direct-coded: each token category has its own `lex_*` function driven
//! by a character [`Cursor`] with one-character lookahead.
//!
//! Surface rules:
//! - `//` comments are stripped per physical line before scanning.
//! - Keywords are the closed uppercase set of the language; recognition is
//!   whole-word and case-sensitive, so `output` is an identifier.
//! - `CASE OF` is a single compound keyword token; a bare `CASE` is an
//!   ordinary identifier.
//! - `AND`, `OR` and `NOT` are logical-operator tokens, not identifiers.
//! - Maximal munch resolves `<-` / `<=` / `<>` / `<` and `>=` / `>`.
//! - Number literals keep their lexeme text (`\d+(\.\d+)?`); conversion to a
//!   concrete numeric type happens downstream.
//! - String literals are double-quoted, single-line, with no escapes.
//!
//! Any character outside the surface is a fatal [`LexError`] naming the
//! character and its position.

pub mod cursor;

mod edge_cases;

use thiserror::Error;

use crate::cursor::Cursor;

/// Error produced while scanning source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A character that starts no token of the language.
    #[error("lex error: unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedChar { ch: char, line: u32, column: u32 },

    /// A string literal with no closing quote on the same line.
    #[error("lex error: unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },
}

/// Reserved words of the language.
///
/// The set is closed and case-sensitive; every member is all-uppercase.
/// `CaseOf` is the two-word compound `CASE OF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Output,
    If,
    Then,
    Else,
    EndIf,
    While,
    EndWhile,
    Declare,
    Integer,
    Real,
    String,
    Input,
    For,
    To,
    Next,
    Repeat,
    Until,
    Otherwise,
    EndCase,
    Char,
    Date,
    Boolean,
    Type,
    EndType,
    Procedure,
    EndProcedure,
    Function,
    EndFunction,
    Return,
    Returns,
    Call,
    Array,
    Of,
    CaseOf,
}

impl Keyword {
    /// Maps a scanned word to its keyword, if it is one.
    fn from_word(word: &str) -> Option<Keyword> {
        let kw = match word {
            "OUTPUT" => Keyword::Output,
            "IF" => Keyword::If,
            "THEN" => Keyword::Then,
            "ELSE" => Keyword::Else,
            "ENDIF" => Keyword::EndIf,
            "WHILE" => Keyword::While,
            "ENDWHILE" => Keyword::EndWhile,
            "DECLARE" => Keyword::Declare,
            "INTEGER" => Keyword::Integer,
            "REAL" => Keyword::Real,
            "STRING" => Keyword::String,
            "INPUT" => Keyword::Input,
            "FOR" => Keyword::For,
            "TO" => Keyword::To,
            "NEXT" => Keyword::Next,
            "REPEAT" => Keyword::Repeat,
            "UNTIL" => Keyword::Until,
            "OTHERWISE" => Keyword::Otherwise,
            "ENDCASE" => Keyword::EndCase,
            "CHAR" => Keyword::Char,
            "DATE" => Keyword::Date,
            "BOOLEAN" => Keyword::Boolean,
            "TYPE" => Keyword::Type,
            "ENDTYPE" => Keyword::EndType,
            "PROCEDURE" => Keyword::Procedure,
            "ENDPROCEDURE" => Keyword::EndProcedure,
            "FUNCTION" => Keyword::Function,
            "ENDFUNCTION" => Keyword::EndFunction,
            "RETURN" => Keyword::Return,
            "RETURNS" => Keyword::Returns,
            "CALL" => Keyword::Call,
            "ARRAY" => Keyword::Array,
            "OF" => Keyword::Of,
            _ => return None,
        };
        Some(kw)
    }

    /// The source spelling of the keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Output => "OUTPUT",
            Keyword::If => "IF",
            Keyword::Then => "THEN",
            Keyword::Else => "ELSE",
            Keyword::EndIf => "ENDIF",
            Keyword::While => "WHILE",
            Keyword::EndWhile => "ENDWHILE",
            Keyword::Declare => "DECLARE",
            Keyword::Integer => "INTEGER",
            Keyword::Real => "REAL",
            Keyword::String => "STRING",
            Keyword::Input => "INPUT",
            Keyword::For => "FOR",
            Keyword::To => "TO",
            Keyword::Next => "NEXT",
            Keyword::Repeat => "REPEAT",
            Keyword::Until => "UNTIL",
            Keyword::Otherwise => "OTHERWISE",
            Keyword::EndCase => "ENDCASE",
            Keyword::Char => "CHAR",
            Keyword::Date => "DATE",
            Keyword::Boolean => "BOOLEAN",
            Keyword::Type => "TYPE",
            Keyword::EndType => "ENDTYPE",
            Keyword::Procedure => "PROCEDURE",
            Keyword::EndProcedure => "ENDPROCEDURE",
            Keyword::Function => "FUNCTION",
            Keyword::EndFunction => "ENDFUNCTION",
            Keyword::Return => "RETURN",
            Keyword::Returns => "RETURNS",
            Keyword::Call => "CALL",
            Keyword::Array => "ARRAY",
            Keyword::Of => "OF",
            Keyword::CaseOf => "CASE OF",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token classification plus payload for literals and identifiers.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Punctuation
    /// `:`
    Colon,
    /// `<-`
    Assign,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `^` (address-of prefix, dereference postfix, pointer type marker)
    Caret,
    /// `&` string concatenation
    StrComb,
    /// `.` field access
    Dot,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT`
    Not,

    /// Number literal; the lexeme is preserved verbatim.
    Number(String),
    /// String literal with the quotes removed.
    Str(String),
    /// Reserved word.
    Keyword(Keyword),
    /// `[A-Za-z_][A-Za-z0-9_]*` outside the keyword set.
    Ident(String),
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Assign => f.write_str("<-"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Caret => f.write_str("^"),
            TokenKind::StrComb => f.write_str("&"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::Neq => f.write_str("<>"),
            TokenKind::Lt => f.write_str("<"),
            TokenKind::Gt => f.write_str(">"),
            TokenKind::Lte => f.write_str("<="),
            TokenKind::Gte => f.write_str(">="),
            TokenKind::And => f.write_str("AND"),
            TokenKind::Or => f.write_str("OR"),
            TokenKind::Not => f.write_str("NOT"),
            TokenKind::Number(text) => f.write_str(text),
            TokenKind::Str(text) => write!(f, "\"{text}\""),
            TokenKind::Keyword(kw) => write!(f, "{kw}"),
            TokenKind::Ident(name) => f.write_str(name),
        }
    }
}

/// A scanned token with its source position (1-based line and column).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

/// Scans a complete source text into tokens.
///
/// Whitespace, newlines and comments are discarded; positions refer to the
/// original line/column layout, which comment stripping preserves.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let stripped = strip_comments(source);
    let mut lexer = Lexer::new(&stripped);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Removes `//`-to-end-of-line comments from every physical line.
///
/// Stripping happens before scanning, so a `//` inside a string literal also
/// starts a comment. Line structure is preserved.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match line.find("//") {
            Some(pos) => out.push_str(&line[..pos]),
            None => out.push_str(line),
        }
    }
    out
}

/// The scanner itself; use [`lex`] for the one-shot entry point.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over comment-free source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Scans the next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let line = self.cursor.line();
        let column = self.cursor.column();
        let c = self.cursor.current_char();

        let kind = match c {
            ':' => self.single(TokenKind::Colon),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            '^' => self.single(TokenKind::Caret),
            '&' => self.single(TokenKind::StrComb),
            '.' => self.single(TokenKind::Dot),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '=' => self.single(TokenKind::Eq),
            '<' => self.lex_less(),
            '>' => self.lex_greater(),
            '"' => self.lex_string(line, column)?,
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_ident_start(c) => self.lex_word(),
            other => {
                return Err(LexError::UnexpectedChar {
                    ch: other,
                    line,
                    column,
                })
            }
        };

        Ok(Some(Token { kind, line, column }))
    }

    /// Consumes one character and returns the given kind.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// Lexes `<-`, `<=`, `<>`, or `<`.
    fn lex_less(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('-') {
            TokenKind::Assign
        } else if self.cursor.match_char('=') {
            TokenKind::Lte
        } else if self.cursor.match_char('>') {
            TokenKind::Neq
        } else {
            TokenKind::Lt
        }
    }

    /// Lexes `>=` or `>`.
    fn lex_greater(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            TokenKind::Gte
        } else {
            TokenKind::Gt
        }
    }

    /// Lexes a double-quoted single-line string literal (no escapes).
    fn lex_string(&mut self, line: u32, column: u32) -> Result<TokenKind, LexError> {
        self.cursor.advance(); // opening quote
        let mut text = String::new();
        loop {
            if self.cursor.is_at_end() || self.cursor.current_char() == '\n' {
                return Err(LexError::UnterminatedString { line, column });
            }
            let c = self.cursor.current_char();
            self.cursor.advance();
            if c == '"' {
                break;
            }
            text.push(c);
        }
        Ok(TokenKind::Str(text))
    }

    /// Lexes `\d+(\.\d+)?`, preserving the lexeme.
    ///
    /// A dot not followed by a digit is left for the next token, so `3.`
    /// scans as `3` then `.`.
    fn lex_number(&mut self) -> TokenKind {
        let mut text = String::new();
        while self.cursor.current_char().is_ascii_digit() {
            text.push(self.cursor.current_char());
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' && self.cursor.char_at(1).is_ascii_digit() {
            text.push('.');
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                text.push(self.cursor.current_char());
                self.cursor.advance();
            }
        }
        TokenKind::Number(text)
    }

    /// Lexes a word and classifies it as keyword, logical operator, or
    /// identifier. Handles the `CASE OF` compound.
    fn lex_word(&mut self) -> TokenKind {
        let word = self.scan_word();
        match word.as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "CASE" if self.peek_case_of() => {
                // consume the single space and the word OF
                self.cursor.advance();
                self.scan_word();
                TokenKind::Keyword(Keyword::CaseOf)
            }
            _ => match Keyword::from_word(&word) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident(word),
            },
        }
    }

    /// Scans `[A-Za-z_][A-Za-z0-9_]*` at the cursor.
    fn scan_word(&mut self) -> String {
        let mut word = String::new();
        while is_ident_continue(self.cursor.current_char()) {
            word.push(self.cursor.current_char());
            self.cursor.advance();
        }
        word
    }

    /// True when the cursor sits on exactly one space followed by the whole
    /// word `OF`.
    fn peek_case_of(&self) -> bool {
        self.cursor.current_char() == ' '
            && self.cursor.char_at(1) == 'O'
            && self.cursor.char_at(2) == 'F'
            && !is_ident_continue(self.cursor.char_at(3))
    }

    /// Skips spaces, tabs, carriage returns and newlines.
    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.current_char(), ' ' | '\t' | '\r' | '\n') && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_declaration_line() {
        assert_eq!(
            kinds("DECLARE x : INTEGER"),
            vec![
                TokenKind::Keyword(Keyword::Declare),
                TokenKind::Ident("x".to_string()),
                TokenKind::Colon,
                TokenKind::Keyword(Keyword::Integer),
            ]
        );
    }

    #[test]
    fn test_assignment_and_arithmetic() {
        assert_eq!(
            kinds("x <- 1 + 2 * 3"),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number("1".to_string()),
                TokenKind::Plus,
                TokenKind::Number("2".to_string()),
                TokenKind::Star,
                TokenKind::Number("3".to_string()),
            ]
        );
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            kinds("< <= <> <- > >= ="),
            vec![
                TokenKind::Lt,
                TokenKind::Lte,
                TokenKind::Neq,
                TokenKind::Assign,
                TokenKind::Gt,
                TokenKind::Gte,
                TokenKind::Eq,
            ]
        );
    }

    #[test]
    fn test_logical_operators_are_tokens() {
        assert_eq!(
            kinds("a AND b OR NOT c"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::And,
                TokenKind::Ident("b".to_string()),
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_case_of_compound() {
        assert_eq!(
            kinds("CASE OF x"),
            vec![
                TokenKind::Keyword(Keyword::CaseOf),
                TokenKind::Ident("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_bare_case_is_identifier() {
        assert_eq!(kinds("CASE"), vec![TokenKind::Ident("CASE".to_string())]);
        // two spaces break the compound
        assert_eq!(
            kinds("CASE  OF"),
            vec![
                TokenKind::Ident("CASE".to_string()),
                TokenKind::Keyword(Keyword::Of),
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(
            kinds("42 3.14"),
            vec![
                TokenKind::Number("42".to_string()),
                TokenKind::Number("3.14".to_string()),
            ]
        );
        // trailing dot is not part of the number
        assert_eq!(
            kinds("3."),
            vec![TokenKind::Number("3".to_string()), TokenKind::Dot]
        );
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            kinds("\"Hello\" & \"!\""),
            vec![
                TokenKind::Str("Hello".to_string()),
                TokenKind::StrComb,
                TokenKind::Str("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_are_stripped() {
        assert_eq!(
            kinds("OUTPUT 1 // prints one\n// whole line\nOUTPUT 2"),
            vec![
                TokenKind::Keyword(Keyword::Output),
                TokenKind::Number("1".to_string()),
                TokenKind::Keyword(Keyword::Output),
                TokenKind::Number("2".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("output OUTPUT"),
            vec![
                TokenKind::Ident("output".to_string()),
                TokenKind::Keyword(Keyword::Output),
            ]
        );
    }

    #[test]
    fn test_token_positions() {
        let tokens = lex("x\n  y").expect("lexing failed");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("x @ y").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedChar {
                ch: '@',
                line: 1,
                column: 3
            }
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("s <- \"abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
        let err = lex("s <- \"abc\nOUTPUT s").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }
}
