//! Runtime value representation
//!
//! The dynamically typed values a host hands to native functions.
//! - Nil, Bool, Number: Immediate values
//! - Strings: Heap-allocated, reference-counted (Arc<String>), immutable
//! - Tables: Copy-on-write ordered key/value aggregate with optional metatable
//! - LightUserData / UserData: Opaque handles to native objects
//! - Function: Native function callable from scripts
//!
//! "No value" (an argument the caller did not pass) is not a `Value`; it is a
//! position past the end of the call frame and reports [`SlotType::None`].

use crate::native::NativeFunction;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Polymorphic stringify override attached through a metatable
pub type ToStringHook = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Per-object behaviour overrides
#[derive(Clone, Default)]
pub struct Metatable {
    tostring: Option<ToStringHook>,
}

impl Metatable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a stringify override
    pub fn with_tostring<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.tostring = Some(Arc::new(hook));
        self
    }

    pub fn tostring(&self) -> Option<&ToStringHook> {
        self.tostring.as_ref()
    }
}

impl fmt::Debug for Metatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metatable")
            .field("tostring", &self.tostring.is_some())
            .finish()
    }
}

/// Opaque handle to a native object.
///
/// The payload is never inspected here; only the cast registry knows how to
/// turn it back into a concrete type.
#[derive(Clone)]
pub struct Handle {
    payload: Arc<dyn Any + Send + Sync>,
    meta: Option<Arc<Metatable>>,
}

impl Handle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Handle {
            payload: value,
            meta: None,
        }
    }

    pub fn with_metatable(mut self, meta: Metatable) -> Self {
        self.meta = Some(Arc::new(meta));
        self
    }

    pub fn metatable(&self) -> Option<&Metatable> {
        self.meta.as_deref()
    }

    /// Type of the wrapped payload (not of the Arc around it)
    pub fn payload_type_id(&self) -> TypeId {
        Any::type_id(self.payload.as_ref())
    }

    /// Exact-type recovery of the payload
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.payload).downcast::<T>().ok()
    }

    /// Identity of the payload allocation
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.payload) as *const () as usize
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.address())
    }
}

/// Copy-on-write ordered table. Cheap to clone (refcount bump).
/// Iteration order is insertion order.
#[derive(Clone, Debug, Default)]
pub struct ValueTable {
    entries: Arc<Vec<(Value, Value)>>,
    meta: Option<Arc<Metatable>>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence: keys 1..=n in order
    pub fn from_sequence(values: impl IntoIterator<Item = Value>) -> Self {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Value::Number((i + 1) as f64), v))
            .collect();
        ValueTable {
            entries: Arc::new(entries),
            meta: None,
        }
    }

    pub fn with_metatable(mut self, meta: Metatable) -> Self {
        self.meta = Some(Arc::new(meta));
        self
    }

    pub fn metatable(&self) -> Option<&Metatable> {
        self.meta.as_deref()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace; replacing keeps the original position.
    /// Copies the entries first when they are shared.
    pub fn insert(&mut self, key: Value, value: Value) {
        let entries = Arc::make_mut(&mut self.entries);
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Value, Value)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.entries) as usize
    }
}

impl PartialEq for ValueTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.as_slice() == other.entries.as_slice()
    }
}

impl FromIterator<(Value, Value)> for ValueTable {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut table = ValueTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Dynamic type tag of a call-frame slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotType {
    /// Past the end of the frame
    None,
    Nil,
    Boolean,
    LightUserData,
    Number,
    String,
    Table,
    Function,
    UserData,
}

impl SlotType {
    /// Host type name
    pub fn name(self) -> &'static str {
        match self {
            SlotType::None => "none",
            SlotType::Nil => "nil",
            SlotType::Boolean => "boolean",
            SlotType::LightUserData => "userdata",
            SlotType::Number => "number",
            SlotType::String => "string",
            SlotType::Table => "table",
            SlotType::Function => "function",
            SlotType::UserData => "userdata",
        }
    }

    pub fn is_none(self) -> bool {
        self == SlotType::None
    }

    pub fn is_nil(self) -> bool {
        self == SlotType::Nil
    }

    /// Absent or nil: the slots where defaults apply
    pub fn is_none_or_nil(self) -> bool {
        matches!(self, SlotType::None | SlotType::Nil)
    }

    pub fn is_bool(self) -> bool {
        self == SlotType::Boolean
    }

    /// Either handle representation
    pub fn is_user_data(self) -> bool {
        matches!(self, SlotType::UserData | SlotType::LightUserData)
    }

    pub fn is_light_user_data(self) -> bool {
        self == SlotType::LightUserData
    }

    pub fn is_number(self) -> bool {
        self == SlotType::Number
    }

    pub fn is_string(self) -> bool {
        self == SlotType::String
    }

    pub fn is_table(self) -> bool {
        self == SlotType::Table
    }

    pub fn is_function(self) -> bool {
        self == SlotType::Function
    }

    /// Numbers and strings coerce into each other
    pub fn could_be_number(self) -> bool {
        self.is_number() || self.is_string()
    }

    pub fn could_be_string(self) -> bool {
        self.is_number() || self.is_string()
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value type
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    /// IEEE 754 double-precision
    Number(f64),
    /// Reference-counted, immutable
    String(Arc<String>),
    Table(ValueTable),
    /// Raw handle without metatable support
    LightUserData(Handle),
    /// Host-managed handle
    UserData(Handle),
    Function(NativeFunction),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create a sequence table value
    pub fn sequence(values: Vec<Value>) -> Self {
        Value::Table(ValueTable::from_sequence(values))
    }

    pub fn light_user_data<T: Any + Send + Sync>(value: T) -> Self {
        Value::LightUserData(Handle::new(value))
    }

    pub fn user_data<T: Any + Send + Sync>(value: T) -> Self {
        Value::UserData(Handle::new(value))
    }

    pub fn slot_type(&self) -> SlotType {
        match self {
            Value::Nil => SlotType::Nil,
            Value::Bool(_) => SlotType::Boolean,
            Value::Number(_) => SlotType::Number,
            Value::String(_) => SlotType::String,
            Value::Table(_) => SlotType::Table,
            Value::LightUserData(_) => SlotType::LightUserData,
            Value::UserData(_) => SlotType::UserData,
            Value::Function(_) => SlotType::Function,
        }
    }

    /// Get the host type name of this value
    pub fn type_name(&self) -> &'static str {
        self.slot_type().name()
    }

    /// Host "to number": numbers as-is, strings parsed, everything else `None`
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => text_to_number(s),
            _ => None,
        }
    }

    /// Host "to text": only numbers and strings have a text form
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Number(n) => Some(number_to_text(*n)),
            Value::String(s) => Some(s.as_ref().clone()),
            _ => None,
        }
    }

    /// Stringify override from the value's metatable, if any
    pub fn tostring_hook(&self) -> Option<&ToStringHook> {
        match self {
            Value::Table(t) => t.metatable().and_then(Metatable::tostring),
            Value::UserData(h) => h.metatable().and_then(Metatable::tostring),
            _ => None,
        }
    }

    /// Identity of reference values, 0 for immediates
    pub fn address(&self) -> usize {
        match self {
            Value::String(s) => Arc::as_ptr(s) as usize,
            Value::Table(t) => t.address(),
            Value::LightUserData(h) | Value::UserData(h) => h.address(),
            Value::Function(f) => f.address(),
            _ => 0,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

/// Render a number the way the host does (`%.14g`)
pub fn number_to_text(n: f64) -> String {
    const PRECISION: i32 = 14;

    if n.is_nan() {
        return if n.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round to 14 significant digits first; the exponent after rounding
    // decides between fixed and exponent notation.
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Parse text the way the host converts strings to numbers.
///
/// Surrounding whitespace is allowed, as are decimal and exponent forms,
/// `0x` hexadecimal integers and the `inf`/`nan` words.
pub fn text_to_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        let magnitude = u64::from_str_radix(hex, 16).ok()? as f64;
        return Some(if negative { -magnitude } else { magnitude });
    }

    trimmed.parse::<f64>().ok()
}

impl PartialEq for Value {
    /// Immediates and strings compare by content, tables by entries,
    /// handles and functions by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::LightUserData(a), Value::LightUserData(b)) => a == b,
            (Value::UserData(a), Value::UserData(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.address() == b.address(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", number_to_text(*n)),
            Value::String(s) => write!(f, "{}", s.as_ref()),
            Value::Table(t) => write!(f, "table: {:#x}", t.address()),
            Value::LightUserData(h) | Value::UserData(h) => write!(f, "userdata: {:#x}", h.address()),
            Value::Function(func) => write!(f, "function: {}", func.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Table(t) => write!(f, "Table({:?})", t.entries.as_slice()),
            Value::LightUserData(h) => write!(f, "LightUserData({:?})", h),
            Value::UserData(h) => write!(f, "UserData({:?})", h),
            Value::Function(func) => write!(f, "Function({:?})", func.name()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::new(s))
    }
}

impl From<ValueTable> for Value {
    fn from(t: ValueTable) -> Self {
        Value::Table(t)
    }
}
