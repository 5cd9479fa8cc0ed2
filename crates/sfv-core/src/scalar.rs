//! Scalar value kinds and their construction-time bounds.
//!
//! Every scalar kind a structured field can carry is a wrapper type that
//! validates on construction: once a value exists it is serializable, so
//! the serializer never re-checks ranges or character sets. Bounds follow
//! RFC 8941/9651 (15-digit integers, three-fraction-digit decimals,
//! printable-ASCII strings) and are deliberately narrower than the native
//! Rust types underneath.

use base64::engine::general_purpose::{GeneralPurpose, STANDARD};
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::{alphabet, Engine as _};
use chrono::{DateTime, Utc};

use crate::error::{Result, SfvError};

/// Base64 engine for the wire form of byte sequences.
///
/// Serialization always pads; parsing accepts padded and unpadded input,
/// since RFC 8941 asks parsers to be liberal here.
pub(crate) const WIRE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// True for bytes that may start a token: ALPHA or `*`.
pub(crate) fn is_token_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'*'
}

/// True for bytes that may continue a token: `tchar`, `:`, or `/`.
pub(crate) fn is_token_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
                | b':'
                | b'/'
        )
}

// ---------------------------------------------------------------------------
// Integer
// ---------------------------------------------------------------------------

/// A whole number in the 15-digit field range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer(i64);

impl Integer {
    /// Largest representable field integer.
    pub const MAX: i64 = 999_999_999_999_999;
    /// Smallest representable field integer.
    pub const MIN: i64 = -999_999_999_999_999;

    /// Wraps `value`, rejecting anything outside the 15-digit range.
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SfvError::InvalidArgument {
                message: format!("integer {value} is outside the field range"),
            })
        }
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Integer {
    type Error = SfvError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Decimal
// ---------------------------------------------------------------------------

/// A fixed-point number with up to twelve integer digits and exactly
/// three stored fraction digits.
///
/// The payload is a scaled integer (thousandths), so equality and
/// ordering are exact. `1.5` and `1.500` are the same value and
/// serialize identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal(i64);

/// Scaled bound: 999,999,999,999.999 in thousandths.
const DECIMAL_SCALED_MAX: i64 = 999_999_999_999_999;

impl Decimal {
    /// Builds a decimal from a scaled-by-1000 integer payload.
    pub fn from_thousandths(scaled: i64) -> Result<Self> {
        if (-DECIMAL_SCALED_MAX..=DECIMAL_SCALED_MAX).contains(&scaled) {
            Ok(Self(scaled))
        } else {
            Err(SfvError::InvalidArgument {
                message: format!("decimal payload {scaled} is outside the field range"),
            })
        }
    }

    /// The scaled-by-1000 integer payload.
    pub fn thousandths(self) -> i64 {
        self.0
    }

    /// The nearest `f64` reading of this decimal.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl TryFrom<f64> for Decimal {
    type Error = SfvError;

    /// Rounds `value` to three fraction digits, ties to even, then
    /// range-checks. Non-finite input is rejected.
    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(SfvError::InvalidArgument {
                message: format!("decimal must be finite, got {value}"),
            });
        }
        let scaled = (value * 1000.0).round_ties_even();
        if scaled.abs() > DECIMAL_SCALED_MAX as f64 {
            return Err(SfvError::InvalidArgument {
                message: format!("decimal {value} is outside the field range"),
            });
        }
        Ok(Self(scaled as i64))
    }
}

impl TryFrom<i64> for Decimal {
    type Error = SfvError;

    /// Builds a whole-number decimal, e.g. `42` becomes `42.0`.
    fn try_from(value: i64) -> Result<Self> {
        match value.checked_mul(1000) {
            Some(scaled) => Self::from_thousandths(scaled),
            None => Err(SfvError::InvalidArgument {
                message: format!("decimal {value} is outside the field range"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// AsciiString
// ---------------------------------------------------------------------------

/// A quotable string restricted to printable ASCII (0x20..=0x7E).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiString(String);

impl AsciiString {
    /// Wraps `text`, rejecting the first byte outside printable ASCII.
    /// The error offset is the byte position within `text`.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if let Some(pos) = text.bytes().position(|b| !(0x20..=0x7e).contains(&b)) {
            return Err(SfvError::Syntax {
                offset: pos,
                message: "string contains a byte outside printable ASCII".into(),
            });
        }
        Ok(Self(text))
    }

    /// The unquoted, unescaped content.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for AsciiString {
    type Error = SfvError;

    fn try_from(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// An unquoted symbol such as `text/html` or `*`.
///
/// The first byte must be alphabetic or `*`; the rest draw from `tchar`
/// plus `:` and `/`. The case of `Token::new("3a")` failing while the
/// quoted string `"3a"` is fine is what keeps tokens and strings
/// unambiguous on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wraps `text`, rejecting anything the token grammar cannot carry.
    /// The error offset is the byte position within `text`.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let bytes = text.as_bytes();
        match bytes.first() {
            None => {
                return Err(SfvError::Syntax {
                    offset: 0,
                    message: "a token cannot be empty".into(),
                })
            }
            Some(&first) if !is_token_start(first) => {
                return Err(SfvError::Syntax {
                    offset: 0,
                    message: "a token must start with an alphabetic character or '*'".into(),
                })
            }
            Some(_) => {}
        }
        if let Some(pos) = bytes.iter().position(|&b| !is_token_char(b)) {
            return Err(SfvError::Syntax {
                offset: pos,
                message: "invalid character in token".into(),
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for Token {
    type Error = SfvError;

    fn try_from(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

// ---------------------------------------------------------------------------
// ByteSequence
// ---------------------------------------------------------------------------

/// An opaque byte payload, carried on the wire as `:base64:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSequence(Vec<u8>);

impl ByteSequence {
    /// Wraps raw bytes. Any payload is representable, so this cannot fail.
    pub fn from_decoded(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decodes a base64 literal (padding optional) into a byte sequence.
    pub fn from_encoded(text: &str) -> Result<Self> {
        WIRE_BASE64.decode(text).map(Self).map_err(|e| SfvError::Syntax {
            offset: 0,
            message: format!("malformed base64: {e}"),
        })
    }

    /// The canonical padded base64 form, without the surrounding colons.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ByteSequence {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteSequence {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

/// A whole-second Unix timestamp (current profile only on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date(i64);

impl Date {
    /// Wraps a Unix timestamp, enforcing the same range as [`Integer`].
    pub fn from_unix_seconds(seconds: i64) -> Result<Self> {
        if (Integer::MIN..=Integer::MAX).contains(&seconds) {
            Ok(Self(seconds))
        } else {
            Err(SfvError::InvalidArgument {
                message: format!("date {seconds} is outside the field range"),
            })
        }
    }

    pub fn unix_seconds(self) -> i64 {
        self.0
    }

    /// The calendar reading of this timestamp, if chrono can represent it.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl TryFrom<DateTime<Utc>> for Date {
    type Error = SfvError;

    /// Truncates sub-second precision; the wire format has none.
    fn try_from(value: DateTime<Utc>) -> Result<Self> {
        Self::from_unix_seconds(value.timestamp())
    }
}

// ---------------------------------------------------------------------------
// DisplayString
// ---------------------------------------------------------------------------

/// A Unicode string, percent-encoded on the wire (current profile only).
///
/// Any Rust string is representable, so construction cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayString(String);

impl DisplayString {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for DisplayString {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for DisplayString {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

// ---------------------------------------------------------------------------
// ScalarValue
// ---------------------------------------------------------------------------

/// The kind of a [`ScalarValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Decimal,
    String,
    Token,
    ByteSequence,
    Boolean,
    Date,
    DisplayString,
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScalarKind::Integer => "integer",
            ScalarKind::Decimal => "decimal",
            ScalarKind::String => "string",
            ScalarKind::Token => "token",
            ScalarKind::ByteSequence => "byte sequence",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Date => "date",
            ScalarKind::DisplayString => "display string",
        };
        f.write_str(name)
    }
}

/// One scalar value of any of the eight field kinds.
///
/// This enum is the payload position of items and parameters. It is
/// closed: there is no "other" variant, so matching on it is exhaustive
/// and the serializer can emit every variant it can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Integer(Integer),
    Decimal(Decimal),
    String(AsciiString),
    Token(Token),
    ByteSequence(ByteSequence),
    Boolean(bool),
    Date(Date),
    DisplayString(DisplayString),
}

impl ScalarValue {
    /// Shorthand for a range-checked integer scalar.
    pub fn integer(value: i64) -> Result<Self> {
        Integer::new(value).map(Self::Integer)
    }

    /// Shorthand for a rounded, range-checked decimal scalar.
    pub fn decimal(value: f64) -> Result<Self> {
        Decimal::try_from(value).map(Self::Decimal)
    }

    /// Shorthand for a printable-ASCII string scalar.
    pub fn string(text: &str) -> Result<Self> {
        AsciiString::new(text).map(Self::String)
    }

    /// Shorthand for a token scalar.
    pub fn token(text: &str) -> Result<Self> {
        Token::new(text).map(Self::Token)
    }

    /// Shorthand for a byte sequence scalar from raw bytes.
    pub fn byte_sequence(bytes: impl Into<Vec<u8>>) -> Self {
        Self::ByteSequence(ByteSequence::from_decoded(bytes))
    }

    /// Shorthand for a boolean scalar.
    pub fn boolean(value: bool) -> Self {
        Self::Boolean(value)
    }

    /// Shorthand for a range-checked date scalar.
    pub fn date(unix_seconds: i64) -> Result<Self> {
        Date::from_unix_seconds(unix_seconds).map(Self::Date)
    }

    /// Shorthand for a display string scalar.
    pub fn display_string(text: impl Into<String>) -> Self {
        Self::DisplayString(DisplayString::new(text))
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Integer(_) => ScalarKind::Integer,
            ScalarValue::Decimal(_) => ScalarKind::Decimal,
            ScalarValue::String(_) => ScalarKind::String,
            ScalarValue::Token(_) => ScalarKind::Token,
            ScalarValue::ByteSequence(_) => ScalarKind::ByteSequence,
            ScalarValue::Boolean(_) => ScalarKind::Boolean,
            ScalarValue::Date(_) => ScalarKind::Date,
            ScalarValue::DisplayString(_) => ScalarKind::DisplayString,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ScalarValue::Integer(n) => Some(n.as_i64()),
            _ => None,
        }
    }

    /// The decimal payload, if this is a decimal.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ScalarValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// The string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The token, if this is a token.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            ScalarValue::Token(t) => Some(t),
            _ => None,
        }
    }

    /// The decoded bytes, if this is a byte sequence.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ScalarValue::ByteSequence(b) => Some(b.as_bytes()),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The date payload, if this is a date.
    pub fn as_date(&self) -> Option<Date> {
        match self {
            ScalarValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The display string content, if this is a display string.
    pub fn as_display_string(&self) -> Option<&str> {
        match self {
            ScalarValue::DisplayString(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<Integer> for ScalarValue {
    fn from(value: Integer) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for ScalarValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<AsciiString> for ScalarValue {
    fn from(value: AsciiString) -> Self {
        Self::String(value)
    }
}

impl From<Token> for ScalarValue {
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<ByteSequence> for ScalarValue {
    fn from(value: ByteSequence) -> Self {
        Self::ByteSequence(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Date> for ScalarValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<DisplayString> for ScalarValue {
    fn from(value: DisplayString) -> Self {
        Self::DisplayString(value)
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::ByteSequence(ByteSequence::from(bytes))
    }
}

impl From<&[u8]> for ScalarValue {
    fn from(bytes: &[u8]) -> Self {
        Self::ByteSequence(ByteSequence::from(bytes))
    }
}

impl TryFrom<i64> for ScalarValue {
    type Error = SfvError;

    fn try_from(value: i64) -> Result<Self> {
        Self::integer(value)
    }
}

impl TryFrom<f64> for ScalarValue {
    type Error = SfvError;

    fn try_from(value: f64) -> Result<Self> {
        Self::decimal(value)
    }
}

impl TryFrom<&str> for ScalarValue {
    type Error = SfvError;

    /// Strings are the conversion target for `&str`; use
    /// [`ScalarValue::token`] when a token is meant.
    fn try_from(text: &str) -> Result<Self> {
        Self::string(text)
    }
}
