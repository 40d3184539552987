//! JSON value types.
//!
//! [`Value`] is what the JSON codec encodes and decodes. Arrays and objects
//! are shared handles: cloning a `Value::Array` clones the handle, not the
//! elements, and mutation through one handle is visible through all of them.
//! That makes self-referential structures expressible, which the stringifier
//! detects by comparing handle identity.
//!
//! Objects produced by the decoder are lazy. They keep the parsed
//! `serde_json` map and convert a member only when it is first read. Any
//! mutation turns the object into a plain ordered map first.
//!
//! ```
//! use chunkwise::{Array, Value};
//!
//! let list = Array::new();
//! list.push(Value::from(1));
//! let alias = Value::Array(list.clone());
//! list.push(Value::from("two"));
//! assert_eq!(alias.to_string(), r#"[1,"two"]"#);
//! ```
use alloc::{borrow::ToOwned, collections::BTreeMap, rc::Rc, string::String, vec::Vec};
use core::{cell::RefCell, fmt, hash::BuildHasher, mem};

use indexmap::IndexMap;

use crate::{converter::Converter, error::BoxError, json::JsonEncoder};

/// A JSON value, or an [`Opaque`] value that knows how to become one.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Array),
    Object(Object),
    Opaque(Opaque),
}

/// A JSON number. Integers that fit in `i64` keep their exact value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[must_use]
    pub fn is_finite(self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Float(f) => f.is_finite(),
        }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

/// Floats use the shortest representation that reads back to the same
/// value, and always carry a `.` or an exponent.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<&serde_json::Number> for Number {
    #[expect(clippy::cast_precision_loss)]
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Self::Int(i)
        } else if let Some(u) = n.as_u64() {
            Self::Float(u as f64)
        } else {
            Self::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Array
// ------------------------------------------------------------------------------------------------

/// A shared, mutable list of values.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_vec(values: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(values)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop()
    }

    /// Replaces the element at `index` and returns the old one, or returns
    /// `None` if `index` is out of bounds.
    pub fn set(&self, index: usize, value: Value) -> Option<Value> {
        self.0
            .borrow_mut()
            .get_mut(index)
            .map(|slot| mem::replace(slot, value))
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// A snapshot of the elements. The elements themselves are handles, so
    /// nested arrays and objects are shared with the snapshot.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Whether both handles refer to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>().addr()
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Self::from_vec(values)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = RefCell::default();
        fmt::Debug::fmt(
            &GuardedArray {
                array: self,
                active: &active,
            },
            f,
        )
    }
}

// ------------------------------------------------------------------------------------------------
// Object
// ------------------------------------------------------------------------------------------------

/// A shared, mutable, insertion-ordered map from strings to values.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<ObjectState>>);

/// Members of a materialized object. The hasher is explicit because
/// `IndexMap` only has a default one with `std`.
type Members = IndexMap<String, Value, foldhash::fast::RandomState>;

enum ObjectState {
    /// Parsed members not yet converted. Converted members are cached in
    /// `memo` and their slot in `raw` is left as `null`; `raw` still holds
    /// every key in order.
    Lazy {
        raw: serde_json::Map<String, serde_json::Value>,
        memo: BTreeMap<String, Value>,
    },
    Materialized(Members),
}

impl Default for ObjectState {
    fn default() -> Self {
        Self::Materialized(Members::default())
    }
}

impl ObjectState {
    fn upgrade(&mut self) -> &mut Members {
        if let Self::Lazy { raw, memo } = self {
            log::debug!(
                "materializing lazy object with {} members ({} already read)",
                raw.len(),
                memo.len()
            );
            let mut memo = mem::take(memo);
            let map = mem::take(raw)
                .into_iter()
                .map(|(key, raw_value)| {
                    let value = memo
                        .remove(&key)
                        .unwrap_or_else(|| Value::from_lazy(raw_value));
                    (key, value)
                })
                .collect();
            *self = Self::Materialized(map);
        }
        match self {
            Self::Materialized(map) => map,
            Self::Lazy { .. } => unreachable!("lazy object state was just replaced"),
        }
    }
}

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a parsed map without converting any member.
    #[must_use]
    pub fn lazy(raw: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(Rc::new(RefCell::new(ObjectState::Lazy {
            raw,
            memo: BTreeMap::new(),
        })))
    }

    /// Whether the object has been turned into a plain map, either because
    /// it was built that way or because it was mutated.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        matches!(*self.0.borrow(), ObjectState::Materialized(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &*self.0.borrow() {
            ObjectState::Lazy { raw, .. } => raw.len(),
            ObjectState::Materialized(map) => map.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        match &*self.0.borrow() {
            ObjectState::Lazy { raw, .. } => raw.contains_key(key),
            ObjectState::Materialized(map) => map.contains_key(key),
        }
    }

    /// Returns the member named `key`.
    ///
    /// On a lazy object the member is converted on first read and the result
    /// is kept, so reading the same key twice yields the same handle.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut state = self.0.borrow_mut();
        match &mut *state {
            ObjectState::Materialized(map) => map.get(key).cloned(),
            ObjectState::Lazy { raw, memo } => {
                if let Some(value) = memo.get(key) {
                    return Some(value.clone());
                }
                let raw_value = mem::take(raw.get_mut(key)?);
                let value = Value::from_lazy(raw_value);
                memo.insert(key.to_owned(), value.clone());
                Some(value)
            }
        }
    }

    /// The keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match &*self.0.borrow() {
            ObjectState::Lazy { raw, .. } => raw.keys().cloned().collect(),
            ObjectState::Materialized(map) => map.keys().cloned().collect(),
        }
    }

    /// A snapshot of all members in insertion order. Reads every member of
    /// a lazy object but does not materialize it.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        if let ObjectState::Materialized(map) = &*self.0.borrow() {
            return map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        }
        self.keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.get(&key)?;
                Some((key, value))
            })
            .collect()
    }

    /// Inserts a member, keeping the position of an existing key.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().upgrade().insert(key.into(), value)
    }

    /// Removes a member, keeping the order of the others.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().upgrade().shift_remove(key)
    }

    /// Removes every member. A lazy object becomes an empty plain map
    /// without converting its members first.
    pub fn clear(&self) {
        *self.0.borrow_mut() = ObjectState::Materialized(Members::default());
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>().addr()
    }
}

impl<S: BuildHasher> From<IndexMap<String, Value, S>> for Object {
    fn from(map: IndexMap<String, Value, S>) -> Self {
        let members = map.into_iter().collect();
        Self(Rc::new(RefCell::new(ObjectState::Materialized(members))))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let members = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self(Rc::new(RefCell::new(ObjectState::Materialized(members))))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = RefCell::default();
        fmt::Debug::fmt(
            &GuardedObject {
                object: self,
                active: &active,
            },
            f,
        )
    }
}

// ------------------------------------------------------------------------------------------------
// Debug of shared containers
// ------------------------------------------------------------------------------------------------

/// Identities of the arrays and objects whose `Debug` output is being
/// written, outermost first.
type ActiveSet = RefCell<Vec<usize>>;

/// Formats a value the way the derived `Debug` does, except that a
/// container already in `active` is written as a placeholder.
struct Guarded<'v> {
    value: &'v Value,
    active: &'v ActiveSet,
}

struct GuardedArray<'v> {
    array: &'v Array,
    active: &'v ActiveSet,
}

struct GuardedObject<'v> {
    object: &'v Object,
    active: &'v ActiveSet,
}

/// A member of a lazy object: converted, or still the parsed value.
enum LazyMember<'v> {
    Converted(Guarded<'v>),
    Raw(&'v serde_json::Value),
}

impl fmt::Debug for Guarded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Array(array) => f
                .debug_tuple("Array")
                .field(&GuardedArray {
                    array,
                    active: self.active,
                })
                .finish(),
            Value::Object(object) => f
                .debug_tuple("Object")
                .field(&GuardedObject {
                    object,
                    active: self.active,
                })
                .finish(),
            scalar => fmt::Debug::fmt(scalar, f),
        }
    }
}

impl fmt::Debug for GuardedArray<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.active;
        guarded(self.array.identity(), active, f, "[..]", |f| {
            f.debug_list()
                .entries(
                    self.array
                        .0
                        .borrow()
                        .iter()
                        .map(|value| Guarded { value, active }),
                )
                .finish()
        })
    }
}

impl fmt::Debug for GuardedObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.active;
        guarded(self.object.identity(), active, f, "{..}", |f| {
            match &*self.object.0.borrow() {
                ObjectState::Materialized(map) => f
                    .debug_map()
                    .entries(map.iter().map(|(k, value)| (k, Guarded { value, active })))
                    .finish(),
                ObjectState::Lazy { raw, memo } => f
                    .debug_map()
                    .entries(raw.iter().map(|(k, v)| {
                        let shown = match memo.get(k) {
                            Some(value) => LazyMember::Converted(Guarded { value, active }),
                            None => LazyMember::Raw(v),
                        };
                        (k, shown)
                    }))
                    .finish(),
            }
        })
    }
}

impl fmt::Debug for LazyMember<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted(value) => fmt::Debug::fmt(value, f),
            Self::Raw(raw) => fmt::Debug::fmt(raw, f),
        }
    }
}

/// Runs `body` unless `identity` is already in `active`, in which case
/// `placeholder` is written instead.
fn guarded(
    identity: usize,
    active: &ActiveSet,
    f: &mut fmt::Formatter<'_>,
    placeholder: &str,
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    if active.borrow().contains(&identity) {
        return f.write_str(placeholder);
    }
    active.borrow_mut().push(identity);
    let result = body(f);
    active.borrow_mut().pop();
    result
}

// ------------------------------------------------------------------------------------------------
// Opaque
// ------------------------------------------------------------------------------------------------

/// Conversion of an application type into a [`Value`] the stringifier can
/// write. Used by the default `to_encodable` hook.
pub trait ToJson: fmt::Debug {
    /// # Errors
    ///
    /// Returns an error if the value has no JSON representation.
    fn to_json(&self) -> Result<Value, BoxError>;
}

/// A shared handle to an application value that is not JSON by itself.
#[derive(Clone)]
pub struct Opaque(Rc<dyn ToJson>);

impl Opaque {
    pub fn new<T: ToJson + 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// # Errors
    ///
    /// Propagates the error of [`ToJson::to_json`].
    pub fn to_json(&self) -> Result<Value, BoxError> {
        self.0.to_json()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>().addr()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

// ------------------------------------------------------------------------------------------------
// Value
// ------------------------------------------------------------------------------------------------

impl Value {
    /// Converts a parsed value, leaving every object in it lazy.
    #[must_use]
    pub fn from_lazy(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_lazy).collect())
            }
            serde_json::Value::Object(map) => Self::Object(Object::lazy(map)),
            scalar => Self::from(scalar),
        }
    }

    /// Identity of the shared allocation behind an array, object or opaque
    /// value.
    #[must_use]
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Array(a) => Some(a.identity()),
            Self::Object(o) => Some(o.identity()),
            Self::Opaque(o) => Some(o.identity()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(Number::Int(i)) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

/// Structural equality. Objects compare without regard to key order.
/// Comparing a cyclic value with a different, equally shaped cyclic value
/// does not terminate.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b) || a.to_vec() == b.to_vec(),
            (Self::Object(a), Self::Object(b)) => {
                a.ptr_eq(b)
                    || (a.len() == b.len()
                        && a.entries()
                            .into_iter()
                            .all(|(key, value)| b.get(&key).is_some_and(|v| v == value)))
            }
            (Self::Opaque(a), Self::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Writes compact JSON.
///
/// Formatting fails with [`fmt::Error`] for values the JSON encoder rejects,
/// such as cyclic values or non-finite numbers.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = JsonEncoder::new().convert(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(Number::Int(i64::from(v)))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Number(Number::Int(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(Number::Float(v))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(Array::from_vec(v))
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl From<Opaque> for Value {
    fn from(v: Opaque) -> Self {
        Self::Opaque(v)
    }
}

/// Converts eagerly: objects come out materialized.
impl From<serde_json::Value> for Value {
    fn from(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => Self::Number(Number::from(&n)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
