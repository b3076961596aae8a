use std::fmt;

/// Unique identifier for an entity in a room.
///
/// Stable for the lifetime of the entity. Fresh identifiers are never
/// handed out twice; a destroyed identifier only comes back if a caller
/// explicitly asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Caller-chosen identifier for alarms and similar keyed state.
///
/// Value equality with stable hashing: `Key::from(3)` always matches
/// another `Key::from(3)`, `Key::from("spawn")` matches `"spawn"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
    Entity(EntityId),
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Int(v as i64)
    }
}

impl From<u32> for Key {
    fn from(v: u32) -> Self {
        Key::Int(v as i64)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Str(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Str(v)
    }
}

impl From<EntityId> for Key {
    fn from(v: EntityId) -> Self {
        Key::Entity(v)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{v}"),
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Entity(id) => write!(f, "{id}"),
        }
    }
}

/// Whether an entity runs its normal notifications and automatic updates,
/// or the `inactive_*` variants with no automatic movement.
///
/// Inactive entities still take part in collisions when
/// `detects_collisions` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Activity {
    #[default]
    Active,
    Inactive,
}

impl Activity {
    pub fn is_active(self) -> bool {
        self == Activity::Active
    }
}

/// Side of an entity's bounding box that another entity entered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}
