//! Scanner (tokenizer) for the definition language.

use std::fmt;

use crate::devices::DeviceType;
use crate::names::{Name, Names};

/// Location of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in characters)
    pub column: usize,
    /// Byte offset from the start of the source
    pub offset: usize,
}

impl Position {
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Reserved words of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Devices,
    Connect,
    Monitor,
    End,
    /// A device kind such as `NAND`
    Device(DeviceType),
}

impl Keyword {
    pub fn from_word(text: &str) -> Option<Self> {
        match text {
            "DEVICES" => Some(Self::Devices),
            "CONNECT" => Some(Self::Connect),
            "MONITOR" => Some(Self::Monitor),
            "END" => Some(Self::End),
            _ => DeviceType::from_keyword(text).map(Self::Device),
        }
    }

    /// Whether this keyword opens or closes a section.
    pub fn is_section(self) -> bool {
        !matches!(self, Self::Device(_))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Devices => f.write_str("DEVICES"),
            Self::Connect => f.write_str("CONNECT"),
            Self::Monitor => f.write_str("MONITOR"),
            Self::End => f.write_str("END"),
            Self::Device(device_type) => write!(f, "{}", device_type),
        }
    }
}

/// Token types in the definition language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    /// A user identifier, interned
    Name(Name),
    /// A run of decimal digits, kept as written so leading zeros survive
    Number(String),
    /// ','
    Comma,
    /// ';'
    Semicolon,
    /// ':'
    Colon,
    /// '>'
    Arrow,
    /// '.'
    Dot,
    /// A character that cannot start any token
    Invalid(char),
    /// A `/*` comment with no closing `*/`
    UnterminatedComment,
    /// End of file
    Eof,
}

/// A token produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Where the token starts
    pub position: Position,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Whether this token is `DEVICES`, `CONNECT`, `MONITOR` or `END`.
    pub fn is_section_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k.is_section())
    }
}

/// Scanner turning definition text into tokens on demand.
///
/// Identifiers are interned into the scanner's [`Names`] table, which the
/// parser takes over when scanning is done.
pub struct Scanner<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    names: Names,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner with a fresh symbol table.
    pub fn new(input: &'a str) -> Self {
        Self::with_names(input, Names::new())
    }

    /// Create a scanner that interns into an existing symbol table.
    pub fn with_names(input: &'a str, names: Names) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            names,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    /// Give up the symbol table.
    pub fn into_names(self) -> Names {
        self.names
    }

    /// Get the next token. Never fails: malformed input yields an
    /// [`TokenKind::Invalid`] or [`TokenKind::UnterminatedComment`] token,
    /// and the end of input yields [`TokenKind::Eof`] forever.
    pub fn next_token(&mut self) -> Token {
        if let Some(unterminated) = self.skip_whitespace_and_comments() {
            return unterminated;
        }

        let position = self.position();
        let ch = match self.peek() {
            Some(ch) => ch,
            None => {
                return Token {
                    kind: TokenKind::Eof,
                    position,
                };
            }
        };

        let kind = match ch {
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            ':' => self.single(TokenKind::Colon),
            '>' => self.single(TokenKind::Arrow),
            '.' => self.single(TokenKind::Dot),
            '0'..='9' => TokenKind::Number(self.read_while(|c| c.is_ascii_digit()).to_string()),
            _ if ch.is_ascii_alphabetic() => {
                let text = self.read_while(|c| c.is_ascii_alphanumeric());
                match Keyword::from_word(text) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Name(self.names.lookup(text)),
                }
            }
            _ => {
                self.advance();
                TokenKind::Invalid(ch)
            }
        };

        Token { kind, position }
    }

    fn position(&mut self) -> Position {
        let offset = self.chars.peek().map(|(pos, _)| *pos).unwrap_or(self.input.len());
        Position {
            line: self.line,
            column: self.column,
            offset,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    /// Character after the next one.
    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, ch)| ch)
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.position().offset;
        while matches!(self.peek(), Some(ch) if accept(ch)) {
            self.advance();
        }
        let end = self.position().offset;
        &self.input[start..end]
    }

    /// Skip whitespace, `#` line comments and `/* */` block comments.
    ///
    /// Returns a token if a block comment runs to the end of input.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                while matches!(self.peek(), Some(c) if c != '\n') {
                    self.advance();
                }
            } else if ch == '/' && self.peek_second() == Some('*') {
                let position = self.position();
                self.advance();
                self.advance();
                let mut closed = false;
                while let Some(c) = self.advance() {
                    if c == '*' && self.peek() == Some('/') {
                        self.advance();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Some(Token {
                        kind: TokenKind::UnterminatedComment,
                        position,
                    });
                }
            } else {
                break;
            }
        }
        None
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    /// Yields every token including a single final `Eof`, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Scanner::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_scanner_basic() {
        let mut scanner = Scanner::new("DEVICES S1:SWITCH 0;");
        assert_eq!(scanner.next_token().kind, TokenKind::Keyword(Keyword::Devices));
        let token = scanner.next_token();
        let s1 = scanner.names().query("S1").unwrap();
        assert_eq!(token.kind, TokenKind::Name(s1));
        assert_eq!(scanner.next_token().kind, TokenKind::Colon);
        assert_eq!(
            scanner.next_token().kind,
            TokenKind::Keyword(Keyword::Device(DeviceType::Switch))
        );
        assert_eq!(scanner.next_token().kind, TokenKind::Number("0".to_string()));
        assert_eq!(scanner.next_token().kind, TokenKind::Semicolon);
        assert!(scanner.next_token().is_eof());
        assert!(scanner.next_token().is_eof());
    }

    #[test]
    fn test_scanner_connection_punctuation() {
        let mut scanner = Scanner::new("C1>D1.CLK");
        let tokens: Vec<TokenKind> = std::iter::from_fn(|| Some(scanner.next_token()))
            .take(5)
            .map(|t| t.kind)
            .collect();
        assert_eq!(tokens[1], TokenKind::Arrow);
        assert_eq!(tokens[3], TokenKind::Dot);
        assert!(matches!(tokens[4], TokenKind::Name(_)));
    }

    #[test]
    fn test_scanner_keeps_leading_zeros() {
        assert_eq!(
            kinds("0011"),
            vec![TokenKind::Number("0011".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_scanner_skips_comments() {
        let input = "# line comment\n/* block\n comment */ END # trailing";
        assert_eq!(kinds(input), vec![TokenKind::Keyword(Keyword::End), TokenKind::Eof]);
    }

    #[test]
    fn test_scanner_unterminated_comment() {
        let mut scanner = Scanner::new("END /* never closed");
        scanner.next_token();
        let token = scanner.next_token();
        assert_eq!(token.kind, TokenKind::UnterminatedComment);
        assert_eq!(token.position.column, 5);
        assert!(scanner.next_token().is_eof());
    }

    #[test]
    fn test_scanner_invalid_character() {
        let tokens = kinds("C1:CLOCK -8");
        assert_eq!(tokens[3], TokenKind::Invalid('-'));
        assert_eq!(tokens[4], TokenKind::Number("8".to_string()));
    }

    #[test]
    fn test_lone_slash_is_invalid() {
        assert_eq!(kinds("/ END")[0], TokenKind::Invalid('/'));
    }

    #[test]
    fn test_positions_are_monotonic() {
        let input = "DEVICES\n  A1 : AND 2,\n\tN1:NOT;";
        let positions: Vec<Position> = Scanner::new(input).map(|t| t.position).collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(positions[1], Position { line: 2, column: 3, offset: 10 });
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!(matches!(kinds("devices")[0], TokenKind::Name(_)));
    }
}
