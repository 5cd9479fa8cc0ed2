//! # sfv-core
//!
//! Parser, canonical serializer, and validation layer for **structured
//! field values** (RFC 8941 / RFC 9651), the typed syntax of HTTP
//! fields such as `Priority`, `Accept-CH`, and `Permissions-Policy`.
//!
//! Field text parses into an immutable typed model (eight scalar kinds,
//! parameters, inner lists, lists, dictionaries) that validates every
//! invariant at construction time. Serialization is the exact inverse:
//! equal values always produce byte-identical canonical text, and any
//! valid text survives a parse/serialize round trip unchanged. A
//! [`Profile`] gate keeps the newer value kinds (dates, display
//! strings) away from peers that only speak the older grammar, and the
//! [`validation`] module layers declarative, reusable rule sets on top.
//!
//! ## Quick start
//!
//! ```rust
//! use sfv_core::{parse_dictionary, serialize_dictionary};
//!
//! let dict = parse_dictionary("a=1,   b;x=\"y\"").unwrap();
//! assert_eq!(dict.len(), 2);
//!
//! // Canonical form: one space after commas, shortest boolean form.
//! assert_eq!(serialize_dictionary(&dict).unwrap(), "a=1, b;x=\"y\"");
//! ```
//!
//! ## Modules
//!
//! - [`parser`] — field text → model (`parse_item`, `parse_list`, `parse_dictionary`)
//! - [`serializer`] — model → canonical field text
//! - [`scalar`] — the eight scalar kinds and their bounds
//! - [`container`] — items, parameters, inner lists, lists, dictionaries
//! - [`profile`] — legacy/current grammar gate
//! - [`validation`] — declarative rule sets over items and parameters
//! - [`error`] — error types shared by all of the above

pub mod container;
pub mod error;
pub mod parser;
pub mod profile;
pub mod scalar;
pub mod serializer;
pub mod validation;

#[cfg(feature = "serde")]
mod serde_impls;

pub use container::{
    Dictionary, FieldNode, InnerList, Item, Key, Member, OuterList, Parameters, ToFieldNode,
};
pub use error::{Result, SfvError};
pub use parser::{parse_dictionary, parse_item, parse_list, Parser};
pub use profile::Profile;
pub use scalar::{
    AsciiString, ByteSequence, Date, Decimal, DisplayString, Integer, ScalarKind, ScalarValue,
    Token,
};
pub use serializer::{serialize_dictionary, serialize_item, serialize_list, Serializer};
pub use validation::{
    FilteredData, IndexRule, ItemValidator, KeyRule, ParametersValidator, ValidatedItem,
    ValidatedParameters, Violation, ViolationList,
};
