//! Contains the list filter behind the `filter` and `filter_all` helpers.
//!
//! A [`ListFilter`] evaluates an ordered sequence of criterion groups against
//! a collection of records, where a record is any [`Value::Object`] and a
//! criterion pairs a field path with an expected value. Field paths may use
//! `.` to descend into nested objects, so `author.name` reaches inside the
//! `author` object of each record.
//!
//! Two evaluation modes exist. The [`apply`][`ListFilter::apply`] method
//! reproduces the behavior of the legacy CMS `filter` helper: only the first
//! criterion of the first group decides whether a record is retained, and an
//! empty filter retains nothing. The [`apply_all`][`ListFilter::apply_all`]
//! method is the corrected form, where a group matches when all of its
//! criteria match, and a record is retained when any group matches it.
//!
//! # Examples
//!
//! ```
//! use mortar::filter::ListFilter;
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"id": 1, "type": "page"}),
//!     json!({"id": 2, "type": "post"}),
//!     json!({"id": 3, "type": "page"}),
//! ];
//!
//! let filter = ListFilter::from_value(&json!([{"type": "page"}])).unwrap();
//! let retained = filter.apply(&records);
//!
//! assert_eq!(retained, vec![
//!     json!({"id": 1, "type": "page"}),
//!     json!({"id": 3, "type": "page"}),
//! ]);
//! ```

use crate::log::{Error, INVALID_FILTER_SPEC};
use serde::Serialize;
use serde_json::{to_value, Value};

/// A single field expectation within a [`Group`].
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    /// Path to the field, with `.` separating nested object keys.
    pub path: String,
    /// Value the field must loosely equal.
    pub expected: Value,
}

impl Criterion {
    /// Create a new Criterion.
    #[inline]
    pub fn new<T>(path: T, expected: Value) -> Self
    where
        T: Into<String>,
    {
        Self {
            path: path.into(),
            expected,
        }
    }
}

/// An ordered group of [`Criterion`] instances evaluated together.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    criteria: Vec<Criterion>,
}

impl Group {
    /// Create a new Group.
    #[inline]
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    /// Return true if every [`Criterion`] in the Group matches the record.
    ///
    /// An empty Group matches any record.
    pub fn matches(&self, record: &Value) -> bool {
        self.criteria.iter().all(|criterion| {
            resolve_path(record, &criterion.path)
                .is_some_and(|found| loose_eq(found, &criterion.expected))
        })
    }
}

/// Evaluates criterion groups against a collection of records.
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    groups: Vec<Group>,
}

impl ListFilter {
    /// Create a new ListFilter.
    #[inline]
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Create a new ListFilter from a [`Value`].
    ///
    /// The Value must be an array of objects, one object per [`Group`].
    /// Criteria keep the order they have in the document.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the Value is not an array, or any element
    /// of the array is not an object.
    pub fn from_value(spec: &Value) -> Result<Self, Error> {
        let items = spec.as_array().ok_or_else(|| {
            Error::build(INVALID_FILTER_SPEC)
                .with_help(format!("expected an array of objects, found `{spec}`"))
        })?;

        let mut groups = Vec::with_capacity(items.len());
        for item in items {
            let object = item.as_object().ok_or_else(|| {
                Error::build(INVALID_FILTER_SPEC).with_help(format!(
                    "every group in a filter must be an object, found `{item}`"
                ))
            })?;

            let criteria = object
                .iter()
                .map(|(path, expected)| Criterion::new(path.as_str(), expected.clone()))
                .collect();
            groups.push(Group::new(criteria));
        }

        Ok(Self::new(groups))
    }

    /// Create a new ListFilter by serializing the given spec.
    ///
    /// Accepts anything that serializes to an array of objects, such as a
    /// `Vec` of maps.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the serialization fails, or the serialized
    /// form is not an array of objects.
    pub fn from_spec<T>(spec: &T) -> Result<Self, Error>
    where
        T: Serialize,
    {
        let value = to_value(spec).map_err(|_| {
            Error::build(INVALID_FILTER_SPEC).with_help("spec is unserializable")
        })?;

        Self::from_value(&value)
    }

    /// Return true if the ListFilter has no groups.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Return true if the record is retained under the legacy semantics.
    ///
    /// Only the first [`Criterion`] of the first [`Group`] is consulted:
    /// the record is retained when that criterion resolves and matches,
    /// and rejected in every other case. An empty ListFilter, or one whose
    /// groups are all empty, rejects every record.
    pub fn retains(&self, record: &Value) -> bool {
        for group in &self.groups {
            for criterion in &group.criteria {
                return resolve_path(record, &criterion.path)
                    .is_some_and(|found| loose_eq(found, &criterion.expected));
            }
        }

        false
    }

    /// Return the records retained by [`retains`][`ListFilter::retains`],
    /// in input order.
    pub fn apply(&self, records: &[Value]) -> Vec<Value> {
        records
            .iter()
            .filter(|record| self.retains(record))
            .cloned()
            .collect()
    }

    /// Return true if the record is retained under the corrected semantics.
    ///
    /// A [`Group`] matches when all of its criteria match, and the record
    /// is retained when any Group matches it. An empty ListFilter retains
    /// every record.
    pub fn retains_all(&self, record: &Value) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|group| group.matches(record))
    }

    /// Return the records retained by
    /// [`retains_all`][`ListFilter::retains_all`], in input order.
    pub fn apply_all(&self, records: &[Value]) -> Vec<Value> {
        records
            .iter()
            .filter(|record| self.retains_all(record))
            .cloned()
            .collect()
    }
}

/// Resolve a dotted path against a record to return the [`Value`] it
/// points at, if any.
///
/// Each `.` separated segment descends one level into a nested object.
/// Resolution fails if any segment lands on a missing key, or on a value
/// that is not an object while segments remain.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut value = record;
    for segment in path.split('.') {
        value = value.as_object()?.get(segment)?;
    }

    Some(value)
}

/// Compare two [`Value`] instances for loose equality.
///
/// Numbers compare as f64, and a numeric string equals its numeric
/// counterpart. Booleans only equal booleans, so `0` and `false` are not
/// loosely equal. Arrays and objects compare element-wise with loose
/// equality. Any other pair of types is unequal; the comparison itself
/// never fails.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(le), Value::Bool(ri)) => le == ri,
        (Value::Number(le), Value::Number(ri)) => le.as_f64() == ri.as_f64(),
        (Value::String(le), Value::String(ri)) => le == ri,
        (Value::Number(nu), Value::String(st)) | (Value::String(st), Value::Number(nu)) => st
            .parse::<f64>()
            .is_ok_and(|parsed| nu.as_f64() == Some(parsed)),
        (Value::Array(le), Value::Array(ri)) => {
            le.len() == ri.len() && le.iter().zip(ri).all(|(a, b)| loose_eq(a, b))
        }
        (Value::Object(le), Value::Object(ri)) => {
            le.len() == ri.len()
                && le
                    .iter()
                    .all(|(key, value)| ri.get(key).is_some_and(|other| loose_eq(value, other)))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{loose_eq, resolve_path, ListFilter};
    use serde_json::{json, Value};

    #[test]
    fn test_empty_spec_rejects_everything() {
        let filter = ListFilter::from_value(&json!([])).unwrap();
        assert_eq!(filter.apply(&get_test_records()), Vec::<Value>::new());
    }

    #[test]
    fn test_single_criterion() {
        let records = vec![
            json!({"status": "active", "id": 1}),
            json!({"status": "closed", "id": 2}),
            json!({"id": 3}),
            json!({"status": "active", "id": 4}),
        ];
        let filter = ListFilter::from_value(&json!([{"status": "active"}])).unwrap();

        assert_eq!(
            filter.apply(&records),
            vec![
                json!({"status": "active", "id": 1}),
                json!({"status": "active", "id": 4}),
            ]
        );
    }

    #[test]
    fn test_missing_field_rejects() {
        let filter = ListFilter::from_value(&json!([{"missing": "anything"}])).unwrap();
        assert!(filter.apply(&get_test_records()).is_empty());
    }

    #[test]
    fn test_dotted_path() {
        let filter = ListFilter::from_value(&json!([{"author.name": "Ann"}])).unwrap();

        assert!(filter.retains(&json!({"author": {"name": "Ann"}})));
        assert!(!filter.retains(&json!({"author": {}})));
        assert!(!filter.retains(&json!({"author": "Ann"})));
    }

    #[test]
    fn test_first_criterion_wins() {
        // Legacy semantics: the second criterion never runs, even though
        // it would reject the record.
        let filter = ListFilter::from_value(&json!([{"type": "page", "id": 99}])).unwrap();
        assert!(filter.retains(&json!({"type": "page", "id": 1})));

        // Neither does the second group.
        let filter = ListFilter::from_value(&json!([{"type": "page"}, {"id": 99}])).unwrap();
        assert!(filter.retains(&json!({"type": "page", "id": 1})));
    }

    #[test]
    fn test_empty_group_rejects() {
        // Legacy semantics: an empty group holds no criterion to return
        // on, so nothing is ever retained.
        let filter = ListFilter::from_value(&json!([{}])).unwrap();

        assert!(!filter.retains(&json!({"type": "page"})));
        assert!(filter.apply(&get_test_records()).is_empty());
    }

    #[test]
    fn test_empty_group_falls_through() {
        // Legacy semantics: an empty first group is skipped, so the first
        // criterion of the second group decides.
        let filter = ListFilter::from_value(&json!([{}, {"type": "page"}])).unwrap();

        assert!(filter.retains(&json!({"type": "page"})));
        assert!(!filter.retains(&json!({"type": "post"})));
    }

    #[test]
    fn test_all_empty_group_matches_everything() {
        // Corrected semantics: an empty group is vacuously true, so a
        // filter containing one retains every record.
        let filter = ListFilter::from_value(&json!([{}])).unwrap();
        assert_eq!(filter.apply_all(&get_test_records()), get_test_records());

        let filter = ListFilter::from_value(&json!([{}, {"type": "page"}])).unwrap();
        assert!(filter.retains_all(&json!({"type": "post"})));
    }

    #[test]
    fn test_order_preserved() {
        let records = get_test_records();
        let filter = ListFilter::from_value(&json!([{"type": "page"}])).unwrap();

        assert_eq!(
            filter.apply(&records),
            vec![
                json!({"id": 1, "type": "page"}),
                json!({"id": 3, "type": "page"}),
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let records = get_test_records();
        let filter = ListFilter::from_value(&json!([{"type": "page"}])).unwrap();

        let once = filter.apply(&records);
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_unmodified() {
        let records = get_test_records();
        let filter = ListFilter::from_value(&json!([{"type": "post"}])).unwrap();
        filter.apply(&records);

        assert_eq!(records, get_test_records());
    }

    #[test]
    fn test_all_groups() {
        let records = get_test_records();
        let filter =
            ListFilter::from_value(&json!([{"type": "page", "id": 3}, {"id": 2}])).unwrap();

        assert_eq!(
            filter.apply_all(&records),
            vec![
                json!({"id": 2, "type": "post"}),
                json!({"id": 3, "type": "page"}),
            ]
        );
    }

    #[test]
    fn test_all_empty_spec_retains_everything() {
        let records = get_test_records();
        let filter = ListFilter::from_value(&json!([])).unwrap();

        assert_eq!(filter.apply_all(&records), records);
    }

    #[test]
    fn test_from_spec() {
        let spec = vec![std::collections::BTreeMap::from([("type", "page")])];
        let filter = ListFilter::from_spec(&spec).unwrap();

        assert_eq!(
            filter.apply(&get_test_records()),
            vec![
                json!({"id": 1, "type": "page"}),
                json!({"id": 3, "type": "page"}),
            ]
        );
    }

    #[test]
    fn test_from_value_rejects_malformed() {
        assert!(ListFilter::from_value(&json!({"type": "page"})).is_err());
        assert!(ListFilter::from_value(&json!(["type"])).is_err());
    }

    #[test]
    fn test_resolve_path() {
        let record = json!({"a": {"b": {"c": 3}}});

        assert_eq!(resolve_path(&record, "a.b.c"), Some(&json!(3)));
        assert_eq!(resolve_path(&record, "a.b"), Some(&json!({"c": 3})));
        assert_eq!(resolve_path(&record, "a.x.c"), None);
        assert_eq!(resolve_path(&record, "a.b.c.d"), None);
    }

    #[test]
    fn test_loose_eq_numeric_string() {
        assert!(loose_eq(&json!(1), &json!("1")));
        assert!(loose_eq(&json!("2.5"), &json!(2.5)));
        assert!(!loose_eq(&json!(1), &json!("one")));
    }

    #[test]
    fn test_loose_eq_bool_is_strict() {
        assert!(loose_eq(&json!(true), &json!(true)));
        assert!(!loose_eq(&json!(0), &json!(false)));
        assert!(!loose_eq(&json!(1), &json!(true)));
        assert!(!loose_eq(&json!("true"), &json!(true)));
    }

    #[test]
    fn test_loose_eq_structural() {
        assert!(loose_eq(&json!([1, "2"]), &json!(["1", 2])));
        assert!(!loose_eq(&json!([1]), &json!([1, 1])));
        assert!(loose_eq(&json!({"n": "3"}), &json!({"n": 3})));
        assert!(!loose_eq(&json!({"n": 3}), &json!({"m": 3})));
        assert!(!loose_eq(&json!({"n": 3}), &json!([3])));
    }

    /// Return a collection of records used to test ListFilter.
    fn get_test_records() -> Vec<Value> {
        vec![
            json!({"id": 1, "type": "page"}),
            json!({"id": 2, "type": "post"}),
            json!({"id": 3, "type": "page"}),
        ]
    }
}
