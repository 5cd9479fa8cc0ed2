//! Recursive-descent parser for structured field text.
//!
//! A single left-to-right pass over the input bytes, no backtracking:
//! every value kind is dispatched from its first byte (`"` string,
//! `:` byte sequence, `?` boolean, `@` date, `%` display string, digit
//! or `-` number, ALPHA or `*` token). Input is treated as bytes, so
//! any non-ASCII octet fails at a charset check with its exact offset.
//!
//! Whitespace handling follows the grammar precisely: bare spaces are
//! discarded at the very start and end of a field, spaces or tabs
//! around member commas, spaces only after `;` and inside inner-list
//! parentheses. Parsing is strict; there is no recovery mode, and
//! errors carry the 0-based byte offset where the first problem sits.
//!
//! # Example
//! ```
//! use sfv_core::parse_list;
//!
//! let list = parse_list("sugar, tea, (black green);blend").unwrap();
//! assert_eq!(list.len(), 3);
//! assert!(list.get(-1).unwrap().as_inner_list().is_some());
//! ```

use crate::container::{self, Dictionary, InnerList, Item, Key, Member, OuterList, Parameters};
use crate::error::{Result, SfvError};
use crate::profile::Profile;
use crate::scalar::{
    self, AsciiString, ByteSequence, Date, Decimal, DisplayString, Integer, ScalarValue, Token,
};

/// Parse an item field under the current profile.
pub fn parse_item(input: &str) -> Result<Item> {
    Parser::default().item(input)
}

/// Parse a list field under the current profile.
pub fn parse_list(input: &str) -> Result<OuterList> {
    Parser::default().list(input)
}

/// Parse a dictionary field under the current profile.
pub fn parse_dictionary(input: &str) -> Result<Dictionary> {
    Parser::default().dictionary(input)
}

/// A profile-gated parser for the three field shapes.
///
/// The default parser speaks the current profile. Under
/// [`Profile::Legacy`] the prefixes `@` and `%` fail with
/// [`MissingFeature`](SfvError::MissingFeature) before any of their
/// payload is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parser {
    profile: Profile,
}

impl Parser {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Parse a complete item field: exactly one item, nothing else.
    pub fn item(&self, input: &str) -> Result<Item> {
        let mut cur = Cursor::new(input);
        cur.skip_sp();
        if cur.at_end() {
            return Err(cur.syntax("an item field cannot be empty"));
        }
        let item = self.parse_item(&mut cur)?;
        cur.skip_sp();
        if !cur.at_end() {
            return Err(cur.syntax("trailing characters after the item"));
        }
        Ok(item)
    }

    /// Parse a complete list field. Empty input is an empty list.
    pub fn list(&self, input: &str) -> Result<OuterList> {
        let mut cur = Cursor::new(input);
        cur.skip_sp();
        let mut members = Vec::new();
        while !cur.at_end() {
            members.push(self.parse_member(&mut cur)?);
            cur.skip_ows();
            if cur.at_end() {
                break;
            }
            cur.expect(b',')?;
            cur.skip_ows();
            if cur.at_end() {
                return Err(cur.syntax("a list cannot end with a trailing comma"));
            }
        }
        Ok(OuterList::from_members(members))
    }

    /// Parse a complete dictionary field. Empty input is an empty
    /// dictionary; duplicate keys keep the later member and move the
    /// entry to the end.
    pub fn dictionary(&self, input: &str) -> Result<Dictionary> {
        let mut cur = Cursor::new(input);
        cur.skip_sp();
        let mut entries = Vec::new();
        while !cur.at_end() {
            let key = parse_key(&mut cur)?;
            let member = if cur.peek() == Some(b'=') {
                cur.advance()?;
                self.parse_member(&mut cur)?
            } else {
                // Bare key: a true item that still takes parameters.
                let parameters = self.parse_parameters(&mut cur)?;
                Member::Item(Item::with_parameters(ScalarValue::Boolean(true), parameters))
            };
            entries.push((key, member));
            cur.skip_ows();
            if cur.at_end() {
                break;
            }
            cur.expect(b',')?;
            cur.skip_ows();
            if cur.at_end() {
                return Err(cur.syntax("a dictionary cannot end with a trailing comma"));
            }
        }
        Ok(Dictionary::from_members(entries))
    }

    /// One list or dictionary member: `(` starts an inner list,
    /// anything else must be an item.
    fn parse_member(&self, cur: &mut Cursor) -> Result<Member> {
        if cur.peek() == Some(b'(') {
            self.parse_inner_list(cur).map(Member::InnerList)
        } else {
            self.parse_item(cur).map(Member::Item)
        }
    }

    /// A scalar immediately followed by its parameters.
    fn parse_item(&self, cur: &mut Cursor) -> Result<Item> {
        let value = self.parse_scalar(cur)?;
        let parameters = self.parse_parameters(cur)?;
        Ok(Item::with_parameters(value, parameters))
    }

    /// `( *SP item *( 1*SP item ) *SP )` followed by the list's own
    /// parameters. After an item, the next byte must be a space or the
    /// closing parenthesis.
    fn parse_inner_list(&self, cur: &mut Cursor) -> Result<InnerList> {
        cur.expect(b'(')?;
        let mut items = Vec::new();
        loop {
            cur.skip_sp();
            match cur.peek() {
                None => return Err(cur.syntax("unterminated inner list")),
                Some(b')') => {
                    cur.advance()?;
                    break;
                }
                Some(_) => {
                    items.push(self.parse_item(cur)?);
                    match cur.peek() {
                        Some(b' ' | b')') => {}
                        Some(_) => {
                            return Err(cur.syntax("inner list items must be separated by spaces"))
                        }
                        None => return Err(cur.syntax("unterminated inner list")),
                    }
                }
            }
        }
        let parameters = self.parse_parameters(cur)?;
        Ok(InnerList::with_parameters(items, parameters))
    }

    /// `*( ";" *SP key [ "=" scalar ] )`. A key without `=` is boolean
    /// true. Duplicate keys keep the later value and move to the end.
    fn parse_parameters(&self, cur: &mut Cursor) -> Result<Parameters> {
        let mut pairs = Vec::new();
        while cur.peek() == Some(b';') {
            cur.advance()?;
            cur.skip_sp();
            let key = parse_key(cur)?;
            let value = if cur.peek() == Some(b'=') {
                cur.advance()?;
                self.parse_scalar(cur)?
            } else {
                ScalarValue::Boolean(true)
            };
            pairs.push((key, value));
        }
        Ok(Parameters::from_pairs(pairs))
    }

    /// First-byte dispatch over the eight scalar kinds, with the
    /// profile gate on `@` and `%` before their payload is touched.
    fn parse_scalar(&self, cur: &mut Cursor) -> Result<ScalarValue> {
        match cur.peek() {
            None => Err(cur.syntax("unexpected end of input, expected a value")),
            Some(b'-' | b'0'..=b'9') => match parse_number(cur)? {
                Number::Integer(value) => Integer::new(value).map(ScalarValue::Integer),
                Number::Decimal(decimal) => Ok(ScalarValue::Decimal(decimal)),
            },
            Some(b'"') => parse_string(cur).map(ScalarValue::String),
            Some(b':') => parse_byte_sequence(cur).map(ScalarValue::ByteSequence),
            Some(b'?') => parse_boolean(cur).map(ScalarValue::Boolean),
            Some(b'@') => {
                self.profile.require_extended("date")?;
                parse_date(cur).map(ScalarValue::Date)
            }
            Some(b'%') => {
                self.profile.require_extended("display string")?;
                parse_display_string(cur).map(ScalarValue::DisplayString)
            }
            Some(byte) if scalar::is_token_start(byte) => parse_token(cur).map(ScalarValue::Token),
            Some(_) => Err(cur.syntax("unrecognized value")),
        }
    }
}

/// A parsed numeric literal, before integer/decimal/date wrapping.
enum Number {
    Integer(i64),
    Decimal(Decimal),
}

/// Parse `["-"] 1*15DIGIT ["." 1*3DIGIT]`, rejecting a leading zero
/// unless the integer part is exactly `0`. Digit caps keep every
/// accepted literal inside the model ranges, so the wrapping
/// constructors cannot fail afterwards.
fn parse_number(cur: &mut Cursor) -> Result<Number> {
    let negative = if cur.peek() == Some(b'-') {
        cur.advance()?;
        true
    } else {
        false
    };
    let digits_start = cur.pos;
    if !matches!(cur.peek(), Some(b'0'..=b'9')) {
        return Err(cur.syntax("a number needs at least one digit"));
    }
    let mut whole: i64 = 0;
    let mut whole_digits = 0usize;
    let mut leading_zero = false;
    while let Some(byte @ b'0'..=b'9') = cur.peek() {
        whole_digits += 1;
        if whole_digits == 1 {
            leading_zero = byte == b'0';
        }
        if whole_digits > 15 {
            return Err(cur.syntax_at(digits_start, "integer part exceeds 15 digits"));
        }
        whole = whole * 10 + i64::from(byte - b'0');
        cur.advance()?;
    }
    if leading_zero && whole_digits > 1 {
        return Err(cur.syntax_at(digits_start, "leading zeros are not allowed"));
    }
    if cur.peek() == Some(b'.') {
        if whole_digits > 12 {
            return Err(cur.syntax_at(digits_start, "decimal integer part exceeds 12 digits"));
        }
        cur.advance()?;
        let mut fraction: i64 = 0;
        let mut fraction_digits = 0usize;
        while let Some(byte @ b'0'..=b'9') = cur.peek() {
            fraction_digits += 1;
            if fraction_digits > 3 {
                return Err(cur.syntax("a decimal allows at most 3 fraction digits"));
            }
            fraction = fraction * 10 + i64::from(byte - b'0');
            cur.advance()?;
        }
        if fraction_digits == 0 {
            return Err(cur.syntax("a decimal point must be followed by a digit"));
        }
        if cur.peek() == Some(b'.') {
            return Err(cur.syntax("unexpected second decimal point"));
        }
        let scale = match fraction_digits {
            1 => 100,
            2 => 10,
            _ => 1,
        };
        let magnitude = whole * 1000 + fraction * scale;
        let scaled = if negative { -magnitude } else { magnitude };
        return Decimal::from_thousandths(scaled).map(Number::Decimal);
    }
    let value = if negative { -whole } else { whole };
    Ok(Number::Integer(value))
}

/// Parse `"..."` with `\"` and `\\` as the only escapes; every other
/// byte must be printable ASCII.
fn parse_string(cur: &mut Cursor) -> Result<AsciiString> {
    cur.expect(b'"')?;
    let mut content = String::new();
    loop {
        let byte = match cur.peek() {
            None => return Err(cur.syntax("unterminated string")),
            Some(byte) => byte,
        };
        cur.advance()?;
        match byte {
            b'"' => break,
            b'\\' => match cur.peek() {
                Some(escaped @ (b'"' | b'\\')) => {
                    cur.advance()?;
                    content.push(escaped as char);
                }
                Some(_) => return Err(cur.syntax("only \\\" and \\\\ escapes are allowed")),
                None => return Err(cur.syntax("unterminated escape sequence")),
            },
            0x20..=0x7e => content.push(byte as char),
            _ => return Err(cur.syntax_at(cur.pos - 1, "string contains a non-printable byte")),
        }
    }
    AsciiString::new(content)
}

/// Parse a token run. The dispatch in `parse_scalar` has already
/// checked the first byte.
fn parse_token(cur: &mut Cursor) -> Result<Token> {
    let mut content = String::new();
    while let Some(byte) = cur.peek() {
        if !scalar::is_token_char(byte) {
            break;
        }
        content.push(byte as char);
        cur.advance()?;
    }
    Token::new(content)
}

/// Parse `:base64:`. The charset is checked byte by byte so a stray
/// character gets a precise offset; base64 shape errors point at the
/// start of the run.
fn parse_byte_sequence(cur: &mut Cursor) -> Result<ByteSequence> {
    cur.expect(b':')?;
    let run_start = cur.pos;
    let mut encoded = String::new();
    loop {
        match cur.peek() {
            None => return Err(cur.syntax("unterminated byte sequence")),
            Some(b':') => {
                cur.advance()?;
                break;
            }
            Some(byte) if byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/' | b'=') => {
                encoded.push(byte as char);
                cur.advance()?;
            }
            Some(_) => return Err(cur.syntax("invalid character in byte sequence")),
        }
    }
    ByteSequence::from_encoded(&encoded).map_err(|err| match err {
        SfvError::Syntax { message, .. } => cur.syntax_at(run_start, message),
        other => other,
    })
}

/// Parse `?0` or `?1`.
fn parse_boolean(cur: &mut Cursor) -> Result<bool> {
    cur.expect(b'?')?;
    match cur.peek() {
        Some(b'1') => {
            cur.advance()?;
            Ok(true)
        }
        Some(b'0') => {
            cur.advance()?;
            Ok(false)
        }
        Some(_) => Err(cur.syntax("a boolean must be '?0' or '?1'")),
        None => Err(cur.syntax("unexpected end of input, expected '0' or '1'")),
    }
}

/// Parse `@` followed by a whole number of Unix seconds.
fn parse_date(cur: &mut Cursor) -> Result<Date> {
    cur.expect(b'@')?;
    let number_start = cur.pos;
    match parse_number(cur)? {
        Number::Integer(seconds) => Date::from_unix_seconds(seconds),
        Number::Decimal(_) => Err(cur.syntax_at(
            number_start,
            "a date must be a whole number of seconds",
        )),
    }
}

/// Parse `%"..."` where `%xx` escapes use lowercase hex and the
/// decoded bytes must form valid UTF-8.
fn parse_display_string(cur: &mut Cursor) -> Result<DisplayString> {
    cur.expect(b'%')?;
    cur.expect(b'"')?;
    let content_start = cur.pos;
    let mut bytes = Vec::new();
    loop {
        match cur.peek() {
            None => return Err(cur.syntax("unterminated display string")),
            Some(b'"') => {
                cur.advance()?;
                break;
            }
            Some(b'%') => {
                cur.advance()?;
                let high = parse_lc_hex_digit(cur)?;
                let low = parse_lc_hex_digit(cur)?;
                bytes.push(high * 16 + low);
            }
            Some(byte @ 0x20..=0x7e) => {
                bytes.push(byte);
                cur.advance()?;
            }
            Some(_) => return Err(cur.syntax("display string contains a non-printable byte")),
        }
    }
    match String::from_utf8(bytes) {
        Ok(text) => Ok(DisplayString::new(text)),
        Err(_) => Err(cur.syntax_at(
            content_start,
            "percent escapes do not decode to valid UTF-8",
        )),
    }
}

/// One lowercase hex digit of a `%xx` escape.
fn parse_lc_hex_digit(cur: &mut Cursor) -> Result<u8> {
    match cur.peek() {
        Some(byte @ b'0'..=b'9') => {
            cur.advance()?;
            Ok(byte - b'0')
        }
        Some(byte @ b'a'..=b'f') => {
            cur.advance()?;
            Ok(byte - b'a' + 10)
        }
        Some(_) => Err(cur.syntax("percent escapes use lowercase hex digits")),
        None => Err(cur.syntax("unterminated percent escape")),
    }
}

/// Parse a dictionary or parameter key.
fn parse_key(cur: &mut Cursor) -> Result<Key> {
    match cur.peek() {
        None => return Err(cur.syntax("unexpected end of input, expected a key")),
        Some(byte) if !container::is_key_start(byte) => {
            return Err(cur.syntax("a key must start with a lowercase letter or '*'"))
        }
        Some(_) => {}
    }
    let mut name = String::new();
    while let Some(byte) = cur.peek() {
        if !container::is_key_char(byte) {
            break;
        }
        name.push(byte as char);
        cur.advance()?;
    }
    Key::new(name)
}

/// Byte cursor over the input. All syntax errors are minted here so
/// offsets are always 0-based byte positions into the original text.
struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Result<u8> {
        match self.peek() {
            Some(byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(self.syntax("unexpected end of input")),
        }
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            Some(byte) if byte == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(byte) => Err(self.syntax(format!(
                "expected {:?}, found {:?}",
                expected as char, byte as char
            ))),
            None => Err(self.syntax(format!(
                "unexpected end of input, expected {:?}",
                expected as char
            ))),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume spaces only (field-edge and inner-list whitespace).
    fn skip_sp(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    /// Consume spaces and horizontal tabs (around member commas).
    fn skip_ows(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn syntax(&self, message: impl Into<String>) -> SfvError {
        self.syntax_at(self.pos, message)
    }

    fn syntax_at(&self, offset: usize, message: impl Into<String>) -> SfvError {
        SfvError::Syntax {
            offset,
            message: message.into(),
        }
    }
}
