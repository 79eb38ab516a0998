use super::token::{CSSToken, HashType, NumericType};
use crate::error::LexError;

/// Tokenize `input` into a token list that always ends with [`CSSToken::EOF`].
///
/// # Errors
///
/// Returns [`LexError`] for an unterminated string or an escape above U+10FFFF.
pub fn tokenize(input: &str) -> Result<Vec<CSSToken>, LexError> {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run()?;
    Ok(tokenizer.into_tokens())
}

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// CSS tokenizer following the CSS Syntax Module Level 3 specification.
pub struct CSSTokenizer {
    /// The preprocessed input being tokenized
    input: Vec<char>,
    /// Current position in the input
    position: usize,
    /// Collected tokens
    tokens: Vec<CSSToken>,
}

impl CSSTokenizer {
    /// Create a new CSS tokenizer with the given input.
    ///
    /// [§ 3.3 Preprocessing the input stream](https://www.w3.org/TR/css-syntax-3/#input-preprocessing)
    ///
    /// "Replace any U+000D CARRIAGE RETURN (CR) code points, U+000C FORM FEED
    /// (FF) code points, or pairs of U+000D CARRIAGE RETURN (CR) followed by
    /// U+000A LINE FEED (LF) in input by a single U+000A LINE FEED (LF) code
    /// point. Replace any U+0000 NULL or surrogate code points in input with
    /// U+FFFD REPLACEMENT CHARACTER."
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        let raw: String = input.into();
        let mut chars = Vec::with_capacity(raw.len());
        let mut iter = raw.chars().peekable();
        while let Some(c) = iter.next() {
            match c {
                '\r' => {
                    if iter.peek() == Some(&'\n') {
                        let _ = iter.next();
                    }
                    chars.push('\n');
                }
                '\x0C' => chars.push('\n'),
                '\0' => chars.push('\u{FFFD}'),
                c => chars.push(c),
            }
        }
        Self {
            input: chars,
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// "This section describes how to consume a token from a stream of code points.
    /// It will return a single token of any type."
    ///
    /// # Errors
    ///
    /// Stops at the first [`LexError`].
    pub fn run(&mut self) -> Result<(), LexError> {
        loop {
            let token = self.consume_token()?;
            let is_eof = token.is_eof();
            self.tokens.push(token);
            if is_eof {
                return Ok(());
            }
        }
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<CSSToken> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[CSSToken] {
        &self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> Result<CSSToken, LexError> {
        // "Consume comments."
        self.consume_comments();

        // "Consume the next input code point."
        let Some(c) = self.consume() else {
            return Ok(CSSToken::EOF);
        };

        let token = match c {
            // "whitespace"
            // "Consume as much whitespace as possible. Return a <whitespace-token>."
            c if is_whitespace(c) => {
                self.consume_whitespace();
                CSSToken::Whitespace
            }

            // "U+0022 QUOTATION MARK (")"
            // "Consume a string token and return it."
            '"' => self.consume_string_token('"')?,

            // "U+0023 NUMBER SIGN (#)"
            '#' => {
                // "If the next input code point is an ident code point or the next
                // two input code points are a valid escape..."
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    // "If the next 3 input code points would start an ident sequence,
                    // set the <hash-token>'s type flag to 'id'."
                    let hash_type = if self.would_start_ident_sequence() {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };

                    // "Consume an ident sequence, and set the <hash-token>'s value
                    // to the returned string."
                    let value = self.consume_ident_sequence()?;
                    CSSToken::Hash { value, hash_type }
                } else {
                    CSSToken::Delim('#')
                }
            }

            // "U+0024 DOLLAR SIGN ($)"
            // "If the next input code point is U+003D EQUALS SIGN (=), consume it
            // and return a <suffix-match-token>."
            '$' => self.match_token_or_delim('$', CSSToken::SuffixMatch),

            // "U+0027 APOSTROPHE (')"
            // "Consume a string token and return it."
            '\'' => self.consume_string_token('\'')?,

            // "U+0028 LEFT PARENTHESIS (()"
            '(' => CSSToken::LeftParen,

            // "U+0029 RIGHT PARENTHESIS ())"
            ')' => CSSToken::RightParen,

            // "U+002A ASTERISK (*)"
            // "If the next input code point is U+003D EQUALS SIGN (=), consume it
            // and return a <substring-match-token>."
            '*' => self.match_token_or_delim('*', CSSToken::SubstringMatch),

            // "U+002B PLUS SIGN (+)"
            '+' => {
                // "If the input stream starts with a number..."
                if self.would_start_number_with(Some('+')) {
                    // "Reconsume the current input code point."
                    self.reconsume();
                    // "Consume a numeric token and return it."
                    self.consume_numeric_token()?
                } else {
                    CSSToken::Delim('+')
                }
            }

            // "U+002C COMMA (,)"
            ',' => CSSToken::Comma,

            // "U+002D HYPHEN-MINUS (-)"
            '-' => {
                if self.would_start_number_with(Some('-')) {
                    self.reconsume();
                    self.consume_numeric_token()?
                }
                // "Otherwise, if the next 2 input code points are U+002D U+003E (->)..."
                else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    let _ = self.consume();
                    let _ = self.consume();
                    CSSToken::CDC
                }
                // "Otherwise, if the input stream starts with an ident sequence..."
                else if self.would_start_ident_sequence_with(Some('-')) {
                    self.reconsume();
                    self.consume_ident_like_token()?
                } else {
                    CSSToken::Delim('-')
                }
            }

            // "U+002E FULL STOP (.)"
            '.' => {
                if self.would_start_number_with(Some('.')) {
                    self.reconsume();
                    self.consume_numeric_token()?
                } else {
                    CSSToken::Delim('.')
                }
            }

            ':' => CSSToken::Colon,
            ';' => CSSToken::Semicolon,

            // "U+003C LESS-THAN SIGN (<)"
            '<' => {
                // "If the next 3 input code points are U+0021 U+002D U+002D (!--)..."
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    let _ = self.consume();
                    let _ = self.consume();
                    let _ = self.consume();
                    CSSToken::CDO
                } else {
                    CSSToken::Delim('<')
                }
            }

            // "U+0040 COMMERCIAL AT (@)"
            '@' => {
                if self.would_start_ident_sequence() {
                    CSSToken::AtKeyword(self.consume_ident_sequence()?)
                } else {
                    CSSToken::Delim('@')
                }
            }

            '[' => CSSToken::LeftBracket,

            // "U+005C REVERSE SOLIDUS (\)"
            '\\' => {
                // "If the input stream starts with a valid escape..."
                if is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()?
                } else {
                    // "This is a parse error."
                    CSSToken::Delim('\\')
                }
            }

            ']' => CSSToken::RightBracket,

            // "U+005E CIRCUMFLEX ACCENT (^)"
            '^' => self.match_token_or_delim('^', CSSToken::PrefixMatch),

            '{' => CSSToken::LeftBrace,

            // "U+007C VERTICAL LINE (|)"
            // "If the next input code point is U+003D EQUALS SIGN (=), consume it
            // and return a <dash-match-token>. Otherwise, if the next input code
            // point is U+007C VERTICAL LINE (|), consume it and return a
            // <column-token>."
            '|' => match self.peek() {
                Some('=') => {
                    let _ = self.consume();
                    CSSToken::DashMatch
                }
                Some('|') => {
                    let _ = self.consume();
                    CSSToken::Column
                }
                _ => CSSToken::Delim('|'),
            },

            '}' => CSSToken::RightBrace,

            // "U+007E TILDE (~)"
            '~' => self.match_token_or_delim('~', CSSToken::IncludeMatch),

            // "digit"
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()?
            }

            // "ident-start code point"
            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()?
            }

            // "anything else"
            // "Return a <delim-token> with its value set to the current input code point."
            c => CSSToken::Delim(c),
        };
        Ok(token)
    }

    /// A `X=` attribute matcher when the next code point is `=`, else a delim.
    fn match_token_or_delim(&mut self, c: char, token: CSSToken) -> CSSToken {
        if self.peek() == Some('=') {
            let _ = self.consume();
            token
        } else {
            CSSToken::Delim(c)
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// "If the next two input code points are U+002F SOLIDUS (/) followed by
    /// U+002A ASTERISK (*), consume them and all following code points up to
    /// and including the first U+002A ASTERISK (*) followed by U+002F SOLIDUS (/),
    /// or up to an EOF code point."
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            let _ = self.consume();
            let _ = self.consume();
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        let _ = self.consume();
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending_code_point: char) -> Result<CSSToken, LexError> {
        let start = self.position - 1;
        let mut value = String::new();

        loop {
            match self.consume() {
                // "ending code point"
                // "Return the <string-token>."
                Some(c) if c == ending_code_point => return Ok(CSSToken::String(value)),

                // "EOF"
                // "This is a parse error. Return the <string-token>."
                //
                // A selector with a dangling quote is almost always a typo, so
                // this is reported instead of silently closing the string.
                None => return Err(LexError::UnterminatedString { position: start }),

                // "newline"
                // "This is a parse error. Reconsume the current input code point,
                // create a <bad-string-token>, and return it."
                Some('\n') => {
                    self.reconsume();
                    return Ok(CSSToken::BadString);
                }

                // "U+005C REVERSE SOLIDUS (\)"
                Some('\\') => match self.peek() {
                    // "If the next input code point is EOF, do nothing."
                    None => {}
                    // "Otherwise, if the next input code point is a newline, consume it."
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    // "Otherwise, (the stream starts with a valid escape) consume an
                    // escaped code point and append the returned code point to the
                    // <string-token>'s value."
                    Some(_) => value.push(self.consume_escaped_code_point()?),
                },

                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.5 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> Result<CSSToken, LexError> {
        let (value, numeric_type, repr) = self.consume_number();

        // "If the next 3 input code points would start an ident sequence..."
        if self.would_start_ident_sequence() {
            let unit = self.consume_ident_sequence()?;
            Ok(CSSToken::Dimension {
                value,
                numeric_type,
                repr,
                unit,
            })
        }
        // "Otherwise, if the next input code point is U+0025 PERCENTAGE SIGN (%)..."
        else if self.peek() == Some('%') {
            let _ = self.consume();
            Ok(CSSToken::Percentage { value, repr })
        } else {
            Ok(CSSToken::Number {
                value,
                numeric_type,
                repr,
            })
        }
    }

    /// [§ 4.3.6 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> Result<CSSToken, LexError> {
        let string = self.consume_ident_sequence()?;

        // "If string's value is an ASCII case-insensitive match for 'url',
        // and the next input code point is U+0028 LEFT PARENTHESIS (()"
        if string.eq_ignore_ascii_case("url") && self.peek() == Some('(') {
            let _ = self.consume();
            // "While the next two input code points are whitespace, consume the
            // next input code point."
            while self.peek().is_some_and(is_whitespace) && self.peek_at(1).is_some_and(is_whitespace)
            {
                let _ = self.consume();
            }
            // "If the next one or two input code points are U+0022 QUOTATION MARK,
            // U+0027 APOSTROPHE, or whitespace followed by U+0022 QUOTATION MARK or
            // U+0027 APOSTROPHE, then create a <function-token>..."
            let quote_follows = matches!(self.peek(), Some('"' | '\''))
                || (self.peek().is_some_and(is_whitespace)
                    && matches!(self.peek_at(1), Some('"' | '\'')));
            if quote_follows {
                Ok(CSSToken::Function(string))
            } else {
                self.consume_url_token()
            }
        } else if self.peek() == Some('(') {
            let _ = self.consume();
            Ok(CSSToken::Function(string))
        } else {
            Ok(CSSToken::Ident(string))
        }
    }

    /// [§ 4.3.7 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> Result<CSSToken, LexError> {
        let mut value = String::new();
        self.consume_whitespace();

        loop {
            match self.consume() {
                Some(')') | None => return Ok(CSSToken::Url(value)),

                // "whitespace"
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    return match self.peek() {
                        Some(')') => {
                            let _ = self.consume();
                            Ok(CSSToken::Url(value))
                        }
                        None => Ok(CSSToken::Url(value)),
                        _ => {
                            self.consume_bad_url_remnants()?;
                            Ok(CSSToken::BadUrl)
                        }
                    };
                }

                // "U+0022 QUOTATION MARK ("), U+0027 APOSTROPHE ('), U+0028 LEFT
                // PARENTHESIS ((), non-printable code point"
                // "This is a parse error. Consume the remnants of a bad url, create a
                // <bad-url-token>, and return it."
                Some(c) if matches!(c, '"' | '\'' | '(') || is_non_printable(c) => {
                    self.consume_bad_url_remnants()?;
                    return Ok(CSSToken::BadUrl);
                }

                // "U+005C REVERSE SOLIDUS (\)"
                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek()) {
                        value.push(self.consume_escaped_code_point()?);
                    } else {
                        self.consume_bad_url_remnants()?;
                        return Ok(CSSToken::BadUrl);
                    }
                }

                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) -> Result<(), LexError> {
        loop {
            match self.consume() {
                Some(')') | None => return Ok(()),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    let _ = self.consume_escaped_code_point()?;
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> Result<String, LexError> {
        let mut result = String::new();
        loop {
            match self.consume() {
                // "ident code point"
                Some(c) if is_ident_code_point(c) => result.push(c),

                // "the stream starts with a valid escape"
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.consume_escaped_code_point()?);
                }

                // "anything else"
                // "Reconsume the current input code point. Return result."
                Some(_) => {
                    self.reconsume();
                    return Ok(result);
                }

                None => return Ok(result),
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> (f64, NumericType, String) {
        // "Initially set type to 'integer'. Let repr be the empty string."
        let mut numeric_type = NumericType::Integer;
        let mut repr = String::new();

        // "If the next input code point is U+002B PLUS SIGN (+) or U+002D HYPHEN-MINUS (-),
        // consume it and append it to repr."
        if matches!(self.peek(), Some('+' | '-')) {
            self.consume_into(&mut repr);
        }

        // "While the next input code point is a digit, consume it and append it to repr."
        self.consume_digits_into(&mut repr);

        // "If the next 2 input code points are U+002E FULL STOP (.) followed by a digit..."
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.consume_into(&mut repr);
            self.consume_into(&mut repr);
            numeric_type = NumericType::Number;
            self.consume_digits_into(&mut repr);
        }

        // "If the next 2 or 3 input code points are U+0045 LATIN CAPITAL LETTER E (E)
        // or U+0065 LATIN SMALL LETTER E (e), optionally followed by U+002D HYPHEN-MINUS (-)
        // or U+002B PLUS SIGN (+), followed by a digit..."
        if matches!(self.peek(), Some('e' | 'E')) {
            let has_sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_pos = if has_sign { 2 } else { 1 };
            if self.peek_at(digit_pos).is_some_and(|c| c.is_ascii_digit()) {
                self.consume_into(&mut repr);
                if has_sign {
                    self.consume_into(&mut repr);
                }
                numeric_type = NumericType::Number;
                self.consume_digits_into(&mut repr);
            }
        }

        // "Convert repr to a number, and set the value to the returned value."
        let value = repr.parse::<f64>().unwrap_or(0.0);
        (value, numeric_type, repr)
    }

    fn consume_into(&mut self, repr: &mut String) {
        if let Some(c) = self.consume() {
            repr.push(c);
        }
    }

    fn consume_digits_into(&mut self, repr: &mut String) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.consume_into(repr);
        }
    }

    /// [§ 4.3.13 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Called with the backslash already consumed.
    fn consume_escaped_code_point(&mut self) -> Result<char, LexError> {
        let backslash = self.position.saturating_sub(1);
        match self.consume() {
            // "hex digit"
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.consume_into(&mut hex);
                }
                // "If the next input code point is whitespace, consume it as well."
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                if code_point > 0x0010_FFFF {
                    return Err(LexError::InvalidEscape {
                        hex,
                        position: backslash,
                    });
                }
                // "If this number is zero, or is for a surrogate... return U+FFFD
                // REPLACEMENT CHARACTER (�)."
                Ok(char::from_u32(code_point)
                    .filter(|&c| c != '\0')
                    .unwrap_or('\u{FFFD}'))
            }
            // "EOF"
            // "This is a parse error. Return U+FFFD REPLACEMENT CHARACTER (�)."
            None => Ok('\u{FFFD}'),
            // "anything else"
            // "Return the current input code point."
            Some(c) => Ok(c),
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    ///
    /// Looks at the next three input code points without consuming them.
    fn would_start_ident_sequence(&self) -> bool {
        starts_ident_sequence(self.peek(), self.peek_at(1), self.peek_at(2))
    }

    /// Same check where `first` is the code point that was just consumed.
    fn would_start_ident_sequence_with(&self, first: Option<char>) -> bool {
        starts_ident_sequence(first, self.peek(), self.peek_at(1))
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    ///
    /// `first` has already been consumed.
    fn would_start_number_with(&self, first: Option<char>) -> bool {
        let second = self.peek();
        let third = self.peek_at(1);
        match first {
            // "U+002B PLUS SIGN (+)" or "U+002D HYPHEN-MINUS (-)"
            // "If the second code point is a digit, return true. Otherwise, if the
            // second code point is a U+002E FULL STOP (.) and the third code point
            // is a digit, return true."
            Some('+' | '-') => {
                second.is_some_and(|c| c.is_ascii_digit())
                    || (second == Some('.') && third.is_some_and(|c| c.is_ascii_digit()))
            }
            // "U+002E FULL STOP (.)"
            // "If the second code point is a digit, return true."
            Some('.') => second.is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    /// Consume and return the next character.
    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// Put back the last consumed character.
    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
///
/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

/// [§ 4.2 Definitions - non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
///
/// "A code point between U+0000 NULL and U+0008 BACKSPACE inclusive, or U+000B
/// LINE TABULATION, or a code point between U+000E SHIFT OUT and U+001F
/// INFORMATION SEPARATOR ONE inclusive, or U+007F DELETE."
const fn is_non_printable(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{e}'..='\u{1f}' | '\u{7f}')
}

/// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
fn starts_ident_sequence(first: Option<char>, second: Option<char>, third: Option<char>) -> bool {
    match first {
        // "U+002D HYPHEN-MINUS"
        // "If the second code point is an ident-start code point or a U+002D
        // HYPHEN-MINUS, or the second and third code points are a valid escape,
        // return true."
        Some('-') => {
            second.is_some_and(is_ident_start_code_point)
                || second == Some('-')
                || is_valid_escape(second, third)
        }
        // "ident-start code point"
        Some(c) if is_ident_start_code_point(c) => true,
        // "U+005C REVERSE SOLIDUS (\)"
        // "If the first and second code points are a valid escape, return true."
        Some('\\') => is_valid_escape(first, second),
        _ => false,
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
///
/// "If the first code point is not U+005C REVERSE SOLIDUS (\), return false.
/// Otherwise, if the second code point is a newline, return false.
/// Otherwise, return true."
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}
