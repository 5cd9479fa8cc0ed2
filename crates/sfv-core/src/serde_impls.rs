//! Serde support: field values as their canonical text.
//!
//! Enabled with the `serde` feature. The three field shapes serialize
//! as strings holding their canonical current-profile form and
//! deserialize by parsing, so a JSON or YAML document can carry field
//! values verbatim:
//!
//! ```json
//! { "accept": "text/html;q=1.0, */*;q=0.1" }
//! ```

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Error as _, Serialize, Serializer};

use crate::container::{Dictionary, Item, OuterList};
use crate::parser::{parse_dictionary, parse_item, parse_list};
use crate::serializer::{serialize_dictionary, serialize_item, serialize_list};

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = serialize_item(self).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_item(&text).map_err(D::Error::custom)
    }
}

impl Serialize for OuterList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = serialize_list(self).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for OuterList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_list(&text).map_err(D::Error::custom)
    }
}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = serialize_dictionary(self).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_dictionary(&text).map_err(D::Error::custom)
    }
}
