//! Canonical serializer — converts model nodes back into field text.
//!
//! Serialization is the exact inverse of parsing: any text the parser
//! accepts parses again, unchanged, after one serialize round trip. The
//! canonical form is fully pinned, so equal values always produce
//! byte-identical text:
//!
//! - **No optional whitespace**: `", "` between members, one space
//!   between inner-list items, no spaces around `;` or `=`
//! - **Shortest boolean form**: a true parameter is `;key`, a true
//!   dictionary member is the bare `key` (each keeping its parameters)
//! - **Minimal decimals**: no trailing fraction zeros, but always at
//!   least one fraction digit (`42.0`, never `42` or `42.00`)
//! - **Padded base64** for byte sequences, lowercase hex for display
//!   string escapes
//!
//! Serializers are profile-gated like parsers: under
//! [`Profile::Legacy`], dates and display strings fail with
//! [`MissingFeature`](crate::SfvError::MissingFeature) instead of
//! producing text a legacy peer would misread.
//!
//! # Example
//! ```
//! use sfv_core::serialize_dictionary;
//! # use sfv_core::parse_dictionary;
//! let dict = parse_dictionary("a=?1 , b=1.500").unwrap();
//! assert_eq!(serialize_dictionary(&dict).unwrap(), "a, b=1.5");
//! ```

use std::fmt;

use crate::container::{
    Dictionary, FieldNode, InnerList, Item, Member, OuterList, Parameters,
};
use crate::error::Result;
use crate::profile::Profile;
use crate::scalar::{AsciiString, ByteSequence, Date, Decimal, DisplayString, Integer, ScalarValue, Token};

/// Serialize an item field under the current profile.
pub fn serialize_item(item: &Item) -> Result<String> {
    Serializer::default().item(item)
}

/// Serialize a list field under the current profile.
pub fn serialize_list(list: &OuterList) -> Result<String> {
    Serializer::default().list(list)
}

/// Serialize a dictionary field under the current profile.
pub fn serialize_dictionary(dictionary: &Dictionary) -> Result<String> {
    Serializer::default().dictionary(dictionary)
}

/// A profile-gated serializer for the three field shapes.
///
/// The default serializer speaks the current profile; use
/// [`Serializer::new`] with [`Profile::Legacy`] when the receiving peer
/// only understands the legacy grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Serializer {
    profile: Profile,
}

impl Serializer {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// The canonical text of an item field.
    pub fn item(&self, item: &Item) -> Result<String> {
        let mut out = String::new();
        write_item(item, self.profile, &mut out)?;
        Ok(out)
    }

    /// The canonical text of a list field. An empty list yields the
    /// empty string, which on the wire means omitting the field.
    pub fn list(&self, list: &OuterList) -> Result<String> {
        let mut out = String::new();
        let mut first = true;
        for member in list {
            if !first {
                out.push_str(", ");
            }
            first = false;
            write_member(member, self.profile, &mut out)?;
        }
        Ok(out)
    }

    /// The canonical text of a dictionary field. An empty dictionary
    /// yields the empty string.
    pub fn dictionary(&self, dictionary: &Dictionary) -> Result<String> {
        let mut out = String::new();
        let mut first = true;
        for (key, member) in dictionary.iter() {
            if !first {
                out.push_str(", ");
            }
            first = false;
            out.push_str(key.as_str());
            match member {
                // A true item hides its value; only parameters follow.
                Member::Item(item) if item.value() == &ScalarValue::Boolean(true) => {
                    write_parameters(item.parameters(), self.profile, &mut out)?;
                }
                Member::Item(item) => {
                    out.push('=');
                    write_item(item, self.profile, &mut out)?;
                }
                Member::InnerList(list) => {
                    out.push('=');
                    write_inner_list(list, self.profile, &mut out)?;
                }
            }
        }
        Ok(out)
    }

    /// The canonical text of any model node.
    pub fn field_node(&self, node: &FieldNode) -> Result<String> {
        match node {
            FieldNode::Item(item) => self.item(item),
            FieldNode::OuterList(list) => self.list(list),
            FieldNode::Dictionary(dictionary) => self.dictionary(dictionary),
            FieldNode::Parameters(parameters) => {
                let mut out = String::new();
                write_parameters(parameters, self.profile, &mut out)?;
                Ok(out)
            }
            FieldNode::InnerList(list) => {
                let mut out = String::new();
                write_inner_list(list, self.profile, &mut out)?;
                Ok(out)
            }
        }
    }
}

/// Emit one list or dictionary member.
fn write_member(member: &Member, profile: Profile, out: &mut String) -> Result<()> {
    match member {
        Member::Item(item) => write_item(item, profile, out),
        Member::InnerList(list) => write_inner_list(list, profile, out),
    }
}

/// Emit a scalar followed by its parameters.
fn write_item(item: &Item, profile: Profile, out: &mut String) -> Result<()> {
    write_scalar(item.value(), profile, out)?;
    write_parameters(item.parameters(), profile, out)
}

/// Emit `(item item ...)` with exactly one space between items, then
/// the list's own parameters.
fn write_inner_list(list: &InnerList, profile: Profile, out: &mut String) -> Result<()> {
    out.push('(');
    for (i, item) in list.items().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_item(item, profile, out)?;
    }
    out.push(')');
    write_parameters(list.parameters(), profile, out)
}

/// Emit `;key=value` per parameter, eliding `=?1` for true booleans.
fn write_parameters(parameters: &Parameters, profile: Profile, out: &mut String) -> Result<()> {
    for (key, value) in parameters.iter() {
        out.push(';');
        out.push_str(key.as_str());
        if value != &ScalarValue::Boolean(true) {
            out.push('=');
            write_scalar(value, profile, out)?;
        }
    }
    Ok(())
}

/// Emit one scalar in canonical form, gating the extended kinds on the
/// active profile.
fn write_scalar(value: &ScalarValue, profile: Profile, out: &mut String) -> Result<()> {
    match value {
        ScalarValue::Integer(n) => out.push_str(&n.as_i64().to_string()),
        ScalarValue::Decimal(d) => write_decimal(*d, out),
        ScalarValue::String(s) => write_string(s, out),
        ScalarValue::Token(t) => out.push_str(t.as_str()),
        ScalarValue::ByteSequence(b) => {
            out.push(':');
            out.push_str(&b.encoded());
            out.push(':');
        }
        ScalarValue::Boolean(true) => out.push_str("?1"),
        ScalarValue::Boolean(false) => out.push_str("?0"),
        ScalarValue::Date(d) => {
            profile.require_extended("date")?;
            out.push('@');
            out.push_str(&d.unix_seconds().to_string());
        }
        ScalarValue::DisplayString(s) => {
            profile.require_extended("display string")?;
            write_display_string(s, out);
        }
    }
    Ok(())
}

/// Emit a decimal with the fewest fraction digits that preserve the
/// value, never fewer than one: `42.0`, `0.05`, `-1.125`.
fn write_decimal(decimal: Decimal, out: &mut String) {
    let scaled = decimal.thousandths();
    if scaled < 0 {
        out.push('-');
    }
    let magnitude = scaled.unsigned_abs();
    let whole = magnitude / 1000;
    let fraction = magnitude % 1000;
    out.push_str(&whole.to_string());
    out.push('.');
    if fraction == 0 {
        out.push('0');
    } else if fraction % 100 == 0 {
        out.push_str(&(fraction / 100).to_string());
    } else if fraction % 10 == 0 {
        out.push_str(&format!("{:02}", fraction / 10));
    } else {
        out.push_str(&format!("{fraction:03}"));
    }
}

/// Emit a quoted string, escaping only `"` and `\`.
fn write_string(text: &AsciiString, out: &mut String) {
    out.push('"');
    for ch in text.as_str().chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Emit `%"..."`, percent-escaping `%`, `"`, and every byte outside
/// printable ASCII as lowercase hex.
fn write_display_string(text: &DisplayString, out: &mut String) {
    out.push_str("%\"");
    for &byte in text.as_str().as_bytes() {
        if (0x20..=0x7e).contains(&byte) && byte != b'%' && byte != b'"' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02x}"));
        }
    }
    out.push('"');
}

// ---------------------------------------------------------------------------
// Display: every model type prints its canonical current-profile text
// ---------------------------------------------------------------------------

/// Shared body for the fallible Display impls below. Serialization of
/// an in-model value only fails on a profile gate, which the current
/// profile never trips; `fmt::Error` covers the type signature.
fn display_canonical(
    f: &mut fmt::Formatter<'_>,
    write: impl FnOnce(&mut String) -> Result<()>,
) -> fmt::Result {
    let mut out = String::new();
    write(&mut out).map_err(|_| fmt::Error)?;
    f.write_str(&out)
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_canonical(f, |out| write_scalar(self, Profile::Current, out))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_canonical(f, |out| write_item(self, Profile::Current, out))
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_canonical(f, |out| write_parameters(self, Profile::Current, out))
    }
}

impl fmt::Display for InnerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_canonical(f, |out| write_inner_list(self, Profile::Current, out))
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_canonical(f, |out| write_member(self, Profile::Current, out))
    }
}

impl fmt::Display for OuterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Serializer::default().list(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Serializer::default().dictionary(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Display for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Serializer::default().field_node(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_decimal(*self, &mut out);
        f.write_str(&out)
    }
}

impl fmt::Display for AsciiString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_string(self, &mut out);
        f.write_str(&out)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ByteSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}:", self.encoded())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.unix_seconds())
    }
}

impl fmt::Display for DisplayString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_display_string(self, &mut out);
        f.write_str(&out)
    }
}
