//! Mapped types and member access.
//!
//! A [`Record`] exposes its members by name, which is what statement builders read
//! row values through and what the expression compiler walks when folding captured
//! values. An [`Entity`] additionally describes its table mapping.
//!
//! Both are normally implemented by `#[derive(Entity)]`:
//!
//! ```ignore
//! use tsorm::Entity;
//!
//! #[derive(Debug, Entity)]
//! #[orm(table = "Person")]
//! struct Person {
//!     #[orm(column = "Id", primary_key)]
//!     id: i32,
//!     #[orm(column = "Name")]
//!     name: String,
//! }
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::OrmResult;
use crate::schema::EntityDescriptor;
use crate::value::Value;

/// An object whose members can be read by name.
pub trait Record: fmt::Debug + Send + Sync + 'static {
    /// Identity of the implementing type.
    fn type_key(&self) -> TypeKey;

    /// Read a member by its host-side name. `None` if the type has no such member.
    fn member(&self, name: &str) -> Option<Value>;

    /// Like [`Record::member`], but reports a member that exists and cannot be
    /// converted (a JSON field whose serialization fails).
    fn try_member(&self, name: &str) -> OrmResult<Option<Value>> {
        Ok(self.member(name))
    }
}

/// A record type mapped onto a table.
pub trait Entity: Record + Sized {
    /// Declared table and member mapping, validated by [`crate::schema::discover`].
    fn describe() -> EntityDescriptor;
}

/// Identity of a host type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Unqualified type name (`Person` for `app::model::Person`).
    pub fn name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }

    /// Fully qualified type name.
    pub fn full_name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased handle on an [`Entity`] type: its identity plus its descriptor.
#[derive(Clone, Copy)]
pub struct EntityType {
    key: TypeKey,
    describe: fn() -> EntityDescriptor,
}

impl EntityType {
    pub fn of<T: Entity>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            describe: T::describe,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    pub(crate) fn descriptor(&self) -> EntityDescriptor {
        (self.describe)()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for EntityType {}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityType").field(&self.key).finish()
    }
}
