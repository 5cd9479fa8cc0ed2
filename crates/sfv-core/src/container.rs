//! Structural nodes: items, parameter maps, inner lists, outer lists,
//! and dictionaries.
//!
//! All containers are immutable after construction. Builder-style
//! methods (`with_*`, `without_*`) consume the receiver and return a new
//! node, so every value that exists satisfies the grammar and can be
//! serialized without further checks.
//!
//! Ordered maps are `Vec<(Key, V)>` rather than a hash map: fields are
//! small, order is semantic on the wire, and this keeps the crate free
//! of an `IndexMap` dependency. Inserting an existing key replaces its
//! value and moves the entry to the end, which is also how duplicate
//! keys behave during parsing.

use crate::error::{Result, SfvError};
use crate::scalar::ScalarValue;

/// True for bytes that may start a key: lowercase ALPHA or `*`.
pub(crate) fn is_key_start(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte == b'*'
}

/// True for bytes that may continue a key.
pub(crate) fn is_key_char(byte: u8) -> bool {
    byte.is_ascii_lowercase()
        || byte.is_ascii_digit()
        || matches!(byte, b'_' | b'-' | b'.' | b'*')
}

/// Resolves a possibly negative index against a container of `len`
/// members. `-1` is the last member. Out of range resolves to `None`.
pub(crate) fn resolve_index(index: isize, len: usize) -> Option<usize> {
    if index >= 0 {
        let resolved = index as usize;
        (resolved < len).then_some(resolved)
    } else {
        len.checked_sub(index.unsigned_abs())
    }
}

/// Replace-and-move-to-end insertion shared by every ordered map.
fn insert_entry<V>(entries: &mut Vec<(Key, V)>, key: Key, value: V) {
    entries.retain(|(existing, _)| existing != &key);
    entries.push((key, value));
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A dictionary or parameter key.
///
/// Keys are lowercase-only: the first byte is a lowercase letter or `*`,
/// the rest add digits, `_`, `-`, and `.`. Uppercase input is rejected
/// rather than folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(String);

impl Key {
    /// Wraps `name`, rejecting anything the key grammar cannot carry.
    /// The error offset is the byte position within `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let bytes = name.as_bytes();
        match bytes.first() {
            None => {
                return Err(SfvError::Syntax {
                    offset: 0,
                    message: "a key cannot be empty".into(),
                })
            }
            Some(&first) if !is_key_start(first) => {
                return Err(SfvError::Syntax {
                    offset: 0,
                    message: "a key must start with a lowercase letter or '*'".into(),
                })
            }
            Some(_) => {}
        }
        if let Some(pos) = bytes.iter().position(|&b| !is_key_char(b)) {
            return Err(SfvError::Syntax {
                offset: pos,
                message: "invalid character in key".into(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Key {
    type Error = SfvError;

    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// An ordered key-to-scalar map attached to an item, inner list, or
/// dictionary member.
///
/// Parameter values are scalars, never bare booleans with their own
/// parameters: the grammar gives parameters exactly one nesting level,
/// and storing [`ScalarValue`] directly makes deeper nesting
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parameters(Vec<(Key, ScalarValue)>);

impl Parameters {
    /// An empty parameter map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Collects pairs in order, applying the replace-and-move-to-end
    /// rule to duplicate keys.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Key, ScalarValue)>) -> Self {
        let mut entries = Vec::new();
        for (key, value) in pairs {
            insert_entry(&mut entries, key, value);
        }
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value under `key`, or `None` when absent.
    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing.as_str() == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The entry at `index`; negative indexes count from the end.
    pub fn get_index(&self, index: isize) -> Option<(&Key, &ScalarValue)> {
        resolve_index(index, self.0.len())
            .and_then(|i| self.0.get(i))
            .map(|(key, value)| (key, value))
    }

    /// Like [`Parameters::get`], but absence is an error.
    pub fn by_key(&self, key: &str) -> Result<&ScalarValue> {
        self.get(key).ok_or_else(|| SfvError::InvalidOffset {
            offset: key.to_owned(),
        })
    }

    /// Like [`Parameters::get_index`], but absence is an error.
    pub fn by_index(&self, index: isize) -> Result<(&Key, &ScalarValue)> {
        self.get_index(index).ok_or_else(|| SfvError::InvalidOffset {
            offset: index.to_string(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.0.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &ScalarValue)> {
        self.0.iter().map(|(key, value)| (key, value))
    }

    /// Returns a copy with `key` set to `value` (replace and move to
    /// end when the key already exists).
    pub fn with(mut self, key: &str, value: impl Into<ScalarValue>) -> Result<Self> {
        let key = Key::new(key)?;
        insert_entry(&mut self.0, key, value.into());
        Ok(self)
    }

    /// Returns a copy without `key`. Removing an absent key is a no-op.
    pub fn without(mut self, key: &str) -> Self {
        self.0.retain(|(existing, _)| existing.as_str() != key);
        self
    }
}

impl IntoIterator for Parameters {
    type Item = (Key, ScalarValue);
    type IntoIter = std::vec::IntoIter<(Key, ScalarValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a (Key, ScalarValue);
    type IntoIter = std::slice::Iter<'a, (Key, ScalarValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Key, ScalarValue)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (Key, ScalarValue)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A single scalar value plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    value: ScalarValue,
    parameters: Parameters,
}

impl Item {
    /// An item with no parameters.
    pub fn new(value: impl Into<ScalarValue>) -> Self {
        Self {
            value: value.into(),
            parameters: Parameters::new(),
        }
    }

    /// An item with the given parameters.
    pub fn with_parameters(value: impl Into<ScalarValue>, parameters: Parameters) -> Self {
        Self {
            value: value.into(),
            parameters,
        }
    }

    pub fn value(&self) -> &ScalarValue {
        &self.value
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns a copy with the scalar replaced, parameters kept.
    pub fn with_value(mut self, value: impl Into<ScalarValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Returns a copy with one parameter set.
    pub fn with_parameter(mut self, key: &str, value: impl Into<ScalarValue>) -> Result<Self> {
        self.parameters = self.parameters.with(key, value)?;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// InnerList
// ---------------------------------------------------------------------------

/// A parenthesized sequence of items with its own parameters.
///
/// Inner lists hold items only; the grammar does not nest them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InnerList {
    items: Vec<Item>,
    parameters: Parameters,
}

impl InnerList {
    /// An inner list with no parameters.
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().collect(),
            parameters: Parameters::new(),
        }
    }

    /// An inner list with the given parameters.
    pub fn with_parameters(items: impl IntoIterator<Item = Item>, parameters: Parameters) -> Self {
        Self {
            items: items.into_iter().collect(),
            parameters,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at `index`; negative indexes count from the end.
    pub fn get(&self, index: isize) -> Option<&Item> {
        resolve_index(index, self.items.len()).and_then(|i| self.items.get(i))
    }

    /// Like [`InnerList::get`], but absence is an error.
    pub fn by_index(&self, index: isize) -> Result<&Item> {
        self.get(index).ok_or_else(|| SfvError::InvalidOffset {
            offset: index.to_string(),
        })
    }

    /// Returns a copy with `item` appended.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// One member of an outer list or dictionary: an item or an inner list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Item(Item),
    InnerList(InnerList),
}

impl Member {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Member::Item(item) => Some(item),
            Member::InnerList(_) => None,
        }
    }

    pub fn as_inner_list(&self) -> Option<&InnerList> {
        match self {
            Member::InnerList(list) => Some(list),
            Member::Item(_) => None,
        }
    }

    /// The member's own parameters, whichever shape it has.
    pub fn parameters(&self) -> &Parameters {
        match self {
            Member::Item(item) => item.parameters(),
            Member::InnerList(list) => list.parameters(),
        }
    }
}

impl From<Item> for Member {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl From<InnerList> for Member {
    fn from(list: InnerList) -> Self {
        Self::InnerList(list)
    }
}

// ---------------------------------------------------------------------------
// OuterList
// ---------------------------------------------------------------------------

/// A top-level list field: zero or more members.
///
/// An empty list is representable in the model but has no wire form; it
/// serializes to the empty string, which on the wire means omitting the
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OuterList(Vec<Member>);

impl OuterList {
    /// An empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_members(members: impl IntoIterator<Item = Member>) -> Self {
        Self(members.into_iter().collect())
    }

    pub fn members(&self) -> &[Member] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The member at `index`; negative indexes count from the end.
    pub fn get(&self, index: isize) -> Option<&Member> {
        resolve_index(index, self.0.len()).and_then(|i| self.0.get(i))
    }

    /// Like [`OuterList::get`], but absence is an error.
    pub fn by_index(&self, index: isize) -> Result<&Member> {
        self.get(index).ok_or_else(|| SfvError::InvalidOffset {
            offset: index.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.0.iter()
    }

    /// Returns a copy with `member` appended.
    pub fn with_member(mut self, member: impl Into<Member>) -> Self {
        self.0.push(member.into());
        self
    }
}

impl IntoIterator for OuterList {
    type Item = Member;
    type IntoIter = std::vec::IntoIter<Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a OuterList {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Member> for OuterList {
    fn from_iter<T: IntoIterator<Item = Member>>(iter: T) -> Self {
        Self::from_members(iter)
    }
}

// ---------------------------------------------------------------------------
// Dictionary
// ---------------------------------------------------------------------------

/// A top-level dictionary field: an ordered map from keys to members.
///
/// Like every ordered map here, inserting an existing key replaces the
/// member and moves the entry to the end. An empty dictionary serializes
/// to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dictionary(Vec<(Key, Member)>);

impl Dictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Collects entries in order, applying the replace-and-move-to-end
    /// rule to duplicate keys.
    pub fn from_members(members: impl IntoIterator<Item = (Key, Member)>) -> Self {
        let mut entries = Vec::new();
        for (key, member) in members {
            insert_entry(&mut entries, key, member);
        }
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The member under `key`, or `None` when absent.
    pub fn get(&self, key: &str) -> Option<&Member> {
        self.0
            .iter()
            .find(|(existing, _)| existing.as_str() == key)
            .map(|(_, member)| member)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The entry at `index`; negative indexes count from the end.
    pub fn get_index(&self, index: isize) -> Option<(&Key, &Member)> {
        resolve_index(index, self.0.len())
            .and_then(|i| self.0.get(i))
            .map(|(key, member)| (key, member))
    }

    /// Like [`Dictionary::get`], but absence is an error.
    pub fn by_key(&self, key: &str) -> Result<&Member> {
        self.get(key).ok_or_else(|| SfvError::InvalidOffset {
            offset: key.to_owned(),
        })
    }

    /// Like [`Dictionary::get_index`], but absence is an error.
    pub fn by_index(&self, index: isize) -> Result<(&Key, &Member)> {
        self.get_index(index).ok_or_else(|| SfvError::InvalidOffset {
            offset: index.to_string(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.0.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Member)> {
        self.0.iter().map(|(key, member)| (key, member))
    }

    /// Returns a copy with `key` set to `member` (replace and move to
    /// end when the key already exists).
    pub fn with_member(mut self, key: &str, member: impl Into<Member>) -> Result<Self> {
        let key = Key::new(key)?;
        insert_entry(&mut self.0, key, member.into());
        Ok(self)
    }

    /// Returns a copy without `key`. Removing an absent key is a no-op.
    pub fn without_member(mut self, key: &str) -> Self {
        self.0.retain(|(existing, _)| existing.as_str() != key);
        self
    }
}

impl IntoIterator for Dictionary {
    type Item = (Key, Member);
    type IntoIter = std::vec::IntoIter<(Key, Member)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a (Key, Member);
    type IntoIter = std::slice::Iter<'a, (Key, Member)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Key, Member)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (Key, Member)>>(iter: T) -> Self {
        Self::from_members(iter)
    }
}

// ---------------------------------------------------------------------------
// FieldNode
// ---------------------------------------------------------------------------

/// Any node of the data model, for code that works across shapes
/// (for example [`crate::serializer::Serializer::field_node`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNode {
    Item(Item),
    Parameters(Parameters),
    InnerList(InnerList),
    OuterList(OuterList),
    Dictionary(Dictionary),
}

impl From<Item> for FieldNode {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl From<Parameters> for FieldNode {
    fn from(parameters: Parameters) -> Self {
        Self::Parameters(parameters)
    }
}

impl From<InnerList> for FieldNode {
    fn from(list: InnerList) -> Self {
        Self::InnerList(list)
    }
}

impl From<OuterList> for FieldNode {
    fn from(list: OuterList) -> Self {
        Self::OuterList(list)
    }
}

impl From<Dictionary> for FieldNode {
    fn from(dictionary: Dictionary) -> Self {
        Self::Dictionary(dictionary)
    }
}

/// Borrowing conversion into [`FieldNode`], implemented by every
/// structural type.
pub trait ToFieldNode {
    fn to_field_node(&self) -> FieldNode;
}

impl ToFieldNode for Item {
    fn to_field_node(&self) -> FieldNode {
        FieldNode::Item(self.clone())
    }
}

impl ToFieldNode for Parameters {
    fn to_field_node(&self) -> FieldNode {
        FieldNode::Parameters(self.clone())
    }
}

impl ToFieldNode for InnerList {
    fn to_field_node(&self) -> FieldNode {
        FieldNode::InnerList(self.clone())
    }
}

impl ToFieldNode for OuterList {
    fn to_field_node(&self) -> FieldNode {
        FieldNode::OuterList(self.clone())
    }
}

impl ToFieldNode for Dictionary {
    fn to_field_node(&self) -> FieldNode {
        FieldNode::Dictionary(self.clone())
    }
}
