//! Declarative validation for items and their parameters.
//!
//! Validators are built once and applied many times: rules are boxed
//! `Send + Sync` predicates, so a validator can live in a `static` and
//! be shared across threads. Validation never stops at the first
//! problem; every configured rule runs and every failure lands in the
//! returned [`ViolationList`]. The `Ok` side carries the inspected
//! value plus the parameter entries the rules selected.
//!
//! Rule messages may use `{key}`, `{index}`, and `{value}`
//! placeholders. The engine fills them in where the rule's context is
//! known, rendering `{value}` as canonical field text.
//!
//! # Example
//! ```
//! use sfv_core::{parse_item, ItemValidator, KeyRule, ParametersValidator, Violation};
//!
//! let validator = ItemValidator::new()
//!     .value(|value| {
//!         value.as_token().map(drop).ok_or_else(|| Violation::new("expected a token"))
//!     })
//!     .parameters(ParametersValidator::new().key(
//!         "q",
//!         KeyRule::new().check(|value| {
//!             if value.as_decimal().is_some() {
//!                 Ok(())
//!             } else {
//!                 Err(Violation::new("parameter {key} must be a decimal, got {value}"))
//!             }
//!         }),
//!     ));
//!
//! let item = parse_item("sugar;q=0.5").unwrap();
//! assert!(validator.validate(&item).is_ok());
//! ```

use std::fmt;

use crate::container::{Item, Key, Parameters};
use crate::error::SfvError;
use crate::scalar::ScalarValue;

type ValuePredicate = Box<dyn Fn(&ScalarValue) -> Result<(), Violation> + Send + Sync>;
type CriteriaPredicate = Box<dyn Fn(&Parameters) -> Result<(), Violation> + Send + Sync>;
type IndexedPredicate = Box<dyn Fn(&ScalarValue, &Key) -> Result<(), Violation> + Send + Sync>;

/// One failed rule, described for humans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    message: String,
}

impl Violation {
    /// A violation with the given message. `{key}`, `{index}`, and
    /// `{value}` placeholders are filled in by the engine when the
    /// rule's context is known.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every failure collected during one validation pass.
///
/// This is ordinary data, not an error type; wrap it into
/// [`SfvError::Validation`] (via `From`) at the boundary where a single
/// error channel is wanted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViolationList(Vec<Violation>);

impl ViolationList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }
}

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            f.write_str(violation.message())?;
        }
        Ok(())
    }
}

impl From<Violation> for ViolationList {
    fn from(violation: Violation) -> Self {
        Self(vec![violation])
    }
}

impl From<ViolationList> for SfvError {
    fn from(list: ViolationList) -> Self {
        SfvError::Validation(list)
    }
}

impl Extend<Violation> for ViolationList {
    fn extend<T: IntoIterator<Item = Violation>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ViolationList {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The parameter entries a successful validation selected.
///
/// Shaped like the rule set that produced it: key rules yield entries
/// under their configured names, index rules under their configured
/// positions. An entry is `None` when the parameter was absent and the
/// rule had no default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteredData {
    /// No member rules were configured (criteria-only validation).
    None,
    ByKey(Vec<(String, Option<ScalarValue>)>),
    ByIndex(Vec<(isize, Option<ScalarValue>)>),
}

impl FilteredData {
    pub fn is_none(&self) -> bool {
        matches!(self, FilteredData::None)
    }

    pub fn len(&self) -> usize {
        match self {
            FilteredData::None => 0,
            FilteredData::ByKey(entries) => entries.len(),
            FilteredData::ByIndex(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value recorded under a configured key rule name.
    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        match self {
            FilteredData::ByKey(entries) => entries
                .iter()
                .find(|(name, _)| name.as_str() == key)
                .and_then(|(_, value)| value.as_ref()),
            _ => None,
        }
    }

    /// The value recorded under a configured index rule position.
    pub fn get_index(&self, index: isize) -> Option<&ScalarValue> {
        match self {
            FilteredData::ByIndex(entries) => entries
                .iter()
                .find(|(configured, _)| *configured == index)
                .and_then(|(_, value)| value.as_ref()),
            _ => None,
        }
    }
}

/// The `Ok` side of [`ParametersValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParameters {
    data: FilteredData,
}

impl ValidatedParameters {
    pub fn data(&self) -> &FilteredData {
        &self.data
    }

    pub fn into_data(self) -> FilteredData {
        self.data
    }
}

/// The `Ok` side of [`ItemValidator::validate`]: the item's scalar
/// plus whatever its parameter rules selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedItem {
    value: ScalarValue,
    parameters: ValidatedParameters,
}

impl ValidatedItem {
    pub fn value(&self) -> &ScalarValue {
        &self.value
    }

    pub fn parameters(&self) -> &ValidatedParameters {
        &self.parameters
    }
}

/// Constraints on one parameter, looked up by key.
#[derive(Default)]
pub struct KeyRule {
    predicate: Option<ValuePredicate>,
    required: bool,
    default: Option<ScalarValue>,
}

impl KeyRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absence of the parameter becomes a violation. A required rule
    /// ignores any configured default.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Predicate run against the parameter value when present.
    pub fn check(
        mut self,
        predicate: impl Fn(&ScalarValue) -> Result<(), Violation> + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Value recorded in the filtered data when the parameter is
    /// absent.
    pub fn default_value(mut self, value: impl Into<ScalarValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl fmt::Debug for KeyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRule")
            .field("required", &self.required)
            .field("has_check", &self.predicate.is_some())
            .field("default", &self.default)
            .finish()
    }
}

/// Constraints on one parameter, looked up by position. Negative
/// positions count from the end, as everywhere in this crate.
#[derive(Default)]
pub struct IndexRule {
    predicate: Option<IndexedPredicate>,
    required: bool,
    default: Option<ScalarValue>,
}

impl IndexRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absence of the position becomes a violation. A required rule
    /// ignores any configured default.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Predicate run against the entry when present. It receives the
    /// value and the key found at the position.
    pub fn check(
        mut self,
        predicate: impl Fn(&ScalarValue, &Key) -> Result<(), Violation> + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Value recorded in the filtered data when the position is
    /// absent.
    pub fn default_value(mut self, value: impl Into<ScalarValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl fmt::Debug for IndexRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexRule")
            .field("required", &self.required)
            .field("has_check", &self.predicate.is_some())
            .field("default", &self.default)
            .finish()
    }
}

/// Per-member rules are keyed either by name or by position, never
/// both. Configuring one family discards the other.
#[derive(Default)]
enum MemberRules {
    #[default]
    None,
    Keys(Vec<(String, KeyRule)>),
    Indices(Vec<(isize, IndexRule)>),
}

/// A reusable rule set for a [`Parameters`] map.
#[derive(Default)]
pub struct ParametersValidator {
    criteria: Option<CriteriaPredicate>,
    members: MemberRules,
}

impl ParametersValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole-map predicate, run after the member rules. Use it for
    /// cross-parameter constraints a single-member rule cannot see.
    pub fn criteria(
        mut self,
        predicate: impl Fn(&Parameters) -> Result<(), Violation> + Send + Sync + 'static,
    ) -> Self {
        self.criteria = Some(Box::new(predicate));
        self
    }

    /// Adds a rule for the parameter under `name`. Any previously
    /// configured index rules are discarded.
    pub fn key(mut self, name: impl Into<String>, rule: KeyRule) -> Self {
        match &mut self.members {
            MemberRules::Keys(rules) => rules.push((name.into(), rule)),
            _ => self.members = MemberRules::Keys(vec![(name.into(), rule)]),
        }
        self
    }

    /// Adds a rule for the parameter at `index`. Any previously
    /// configured key rules are discarded.
    pub fn index(mut self, index: isize, rule: IndexRule) -> Self {
        match &mut self.members {
            MemberRules::Indices(rules) => rules.push((index, rule)),
            _ => self.members = MemberRules::Indices(vec![(index, rule)]),
        }
        self
    }

    /// Runs every rule and returns either the selected entries or the
    /// full list of failures. A validator with no rules at all fails
    /// with a single "no rules" violation rather than silently
    /// passing.
    pub fn validate(&self, parameters: &Parameters) -> Result<ValidatedParameters, ViolationList> {
        let mut violations = ViolationList::default();
        let configured = self.criteria.is_some() || !matches!(self.members, MemberRules::None);
        if !configured {
            violations.push(Violation::new(
                "no validation rules were configured for the parameters",
            ));
            return Err(violations);
        }
        let data = match &self.members {
            MemberRules::None => FilteredData::None,
            MemberRules::Keys(rules) => {
                let mut entries = Vec::new();
                for (name, rule) in rules {
                    match parameters.get(name) {
                        Some(value) => {
                            let outcome = match &rule.predicate {
                                Some(predicate) => predicate(value),
                                None => Ok(()),
                            };
                            match outcome {
                                Ok(()) => entries.push((name.clone(), Some(value.clone()))),
                                Err(violation) => violations.push(contextualize(
                                    violation,
                                    Some(name),
                                    None,
                                    Some(value),
                                )),
                            }
                        }
                        None if rule.required => violations.push(Violation::new(format!(
                            "required parameter \"{name}\" is absent"
                        ))),
                        None => entries.push((name.clone(), rule.default.clone())),
                    }
                }
                FilteredData::ByKey(entries)
            }
            MemberRules::Indices(rules) => {
                let mut entries = Vec::new();
                for (index, rule) in rules {
                    match parameters.get_index(*index) {
                        Some((key, value)) => {
                            let outcome = match &rule.predicate {
                                Some(predicate) => predicate(value, key),
                                None => Ok(()),
                            };
                            match outcome {
                                Ok(()) => entries.push((*index, Some(value.clone()))),
                                Err(violation) => violations.push(contextualize(
                                    violation,
                                    Some(key.as_str()),
                                    Some(*index),
                                    Some(value),
                                )),
                            }
                        }
                        None if rule.required => violations.push(Violation::new(format!(
                            "required parameter at index {index} is absent"
                        ))),
                        None => entries.push((*index, rule.default.clone())),
                    }
                }
                FilteredData::ByIndex(entries)
            }
        };
        if let Some(criteria) = &self.criteria {
            if let Err(violation) = criteria(parameters) {
                violations.push(violation);
            }
        }
        if violations.is_empty() {
            Ok(ValidatedParameters { data })
        } else {
            Err(violations)
        }
    }
}

impl fmt::Debug for ParametersValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = match &self.members {
            MemberRules::None => "none".to_owned(),
            MemberRules::Keys(rules) => format!("{} key rule(s)", rules.len()),
            MemberRules::Indices(rules) => format!("{} index rule(s)", rules.len()),
        };
        f.debug_struct("ParametersValidator")
            .field("has_criteria", &self.criteria.is_some())
            .field("members", &members)
            .finish()
    }
}

/// A reusable rule set for an [`Item`].
///
/// Unlike [`ParametersValidator`], an item validator with no rules
/// passes everything: it checks exactly what was configured.
#[derive(Default)]
pub struct ItemValidator {
    value: Option<ValuePredicate>,
    parameters: Option<ParametersValidator>,
}

impl ItemValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicate run against the item's scalar value.
    pub fn value(
        mut self,
        predicate: impl Fn(&ScalarValue) -> Result<(), Violation> + Send + Sync + 'static,
    ) -> Self {
        self.value = Some(Box::new(predicate));
        self
    }

    /// Rule set applied to the item's parameters.
    pub fn parameters(mut self, validator: ParametersValidator) -> Self {
        self.parameters = Some(validator);
        self
    }

    /// Runs the value predicate and the parameter rules, aggregating
    /// failures from both.
    pub fn validate(&self, item: &Item) -> Result<ValidatedItem, ViolationList> {
        let mut violations = ViolationList::default();
        if let Some(predicate) = &self.value {
            if let Err(violation) = predicate(item.value()) {
                violations.push(contextualize(violation, None, None, Some(item.value())));
            }
        }
        let parameters = match &self.parameters {
            Some(validator) => match validator.validate(item.parameters()) {
                Ok(validated) => Some(validated),
                Err(list) => {
                    violations.extend(list);
                    None
                }
            },
            None => Some(ValidatedParameters {
                data: FilteredData::None,
            }),
        };
        match parameters {
            Some(parameters) if violations.is_empty() => Ok(ValidatedItem {
                value: item.value().clone(),
                parameters,
            }),
            _ => Err(violations),
        }
    }
}

impl fmt::Debug for ItemValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemValidator")
            .field("has_value_check", &self.value.is_some())
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Fill `{key}`, `{index}`, and `{value}` placeholders with whatever
/// context the failed rule had.
fn contextualize(
    violation: Violation,
    key: Option<&str>,
    index: Option<isize>,
    value: Option<&ScalarValue>,
) -> Violation {
    let mut message = violation.message;
    if let Some(key) = key {
        message = message.replace("{key}", key);
    }
    if let Some(index) = index {
        message = message.replace("{index}", &index.to_string());
    }
    if let Some(value) = value {
        message = message.replace("{value}", &value.to_string());
    }
    Violation { message }
}
