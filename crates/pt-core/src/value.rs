use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::reference::EntityRef;

/// A typed property value.
///
/// The variant a property holds is its kind, and stays fixed for the
/// property's lifetime once the first value is stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A true/false switch.
    Boolean(bool),
    /// A signed integer.
    Integer(i64),
    /// Free text, possibly spanning several lines.
    Text(String),
    /// One member of a registered enum family.
    Enum(EnumValue),
    /// A set of members of a registered flags family.
    Flags(FlagsValue),
    /// A lazy reference to another entity.
    Ref(EntityRef),
    /// An ordered list of lazy references.
    RefList(Vec<EntityRef>),
    /// An ordered list of strings. Has no free-text decode path.
    TextList(Vec<String>),
    /// A value of some other registered type.
    Other(CustomValue),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Text(_) => ValueKind::Text,
            Self::Enum(v) => ValueKind::Enum(v.type_name.to_string()),
            Self::Flags(v) => ValueKind::Flags(v.type_name.to_string()),
            Self::Ref(_) => ValueKind::Ref,
            Self::RefList(_) => ValueKind::RefList,
            Self::TextList(_) => ValueKind::TextList,
            Self::Other(v) => ValueKind::Other(v.type_name().to_string()),
        }
    }

    /// The contained text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The contained integer, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The contained boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Every entity reference held by this value.
    pub fn refs(&self) -> &[EntityRef] {
        match self {
            Self::Ref(r) => std::slice::from_ref(r),
            Self::RefList(list) => list,
            _ => &[],
        }
    }
}

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// See [`Value::Boolean`].
    Boolean,
    /// See [`Value::Integer`].
    Integer,
    /// See [`Value::Text`].
    Text,
    /// See [`Value::Enum`]; carries the family's type name.
    Enum(String),
    /// See [`Value::Flags`]; carries the family's type name.
    Flags(String),
    /// See [`Value::Ref`].
    Ref,
    /// See [`Value::RefList`].
    RefList,
    /// See [`Value::TextList`].
    TextList,
    /// See [`Value::Other`]; carries the registered type name.
    Other(String),
}

impl ValueKind {
    /// The registry type name this kind dispatches through, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Enum(name) | Self::Flags(name) | Self::Other(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "text"),
            Self::Enum(name) => write!(f, "enum {name}"),
            Self::Flags(name) => write!(f, "flags {name}"),
            Self::Ref => write!(f, "reference"),
            Self::RefList => write!(f, "reference list"),
            Self::TextList => write!(f, "text list"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A member of an enum family, identified by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// The family's registered type name.
    pub type_name: Arc<str>,
    /// Position of the member in the family's declaration.
    pub ordinal: u32,
}

/// A set of flags from a flags family, as a bit mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagsValue {
    /// The family's registered type name.
    pub type_name: Arc<str>,
    /// Bit `1 << i` is set when the `i`-th declared flag is present.
    pub bits: u32,
}

impl FlagsValue {
    /// Whether the flag at declaration position `index` is set.
    pub fn contains(&self, index: u32) -> bool {
        index < u32::BITS && self.bits & (1 << index) != 0
    }
}

/// A Rust type that can be stored as a registered "other" property value.
pub trait CustomType: Any + Clone + PartialEq + fmt::Debug + Send + Sync {
    /// The name the type is registered under.
    const TYPE_NAME: &'static str;
}

trait ErasedCustom: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn ErasedCustom>;
    fn eq_erased(&self, other: &dyn ErasedCustom) -> bool;
}

impl<T: CustomType> ErasedCustom for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn ErasedCustom> {
        Box::new(self.clone())
    }

    fn eq_erased(&self, other: &dyn ErasedCustom) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }
}

/// A type-erased value of some [`CustomType`].
#[derive(Debug)]
pub struct CustomValue(Box<dyn ErasedCustom>);

impl CustomValue {
    /// Wrap a concrete value.
    pub fn new<T: CustomType>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// The registered type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Borrow the wrapped value if it is a `T`.
    pub fn downcast_ref<T: CustomType>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl Clone for CustomValue {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_erased(other.0.as_ref())
    }
}
