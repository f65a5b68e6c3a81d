use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use super::attrs::{
    EntityDescriptor, EnumBehavior, InsertUpdateBehavior, KeyBehavior,
};
use crate::entity::{Entity, EntityType, Record};
use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::literal::{LiteralOptions, render_literal};
use crate::value::{SqlKind, Value};

/// Validated mapping of one member onto a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Host-side member name.
    pub member: &'static str,
    /// Column name in the table.
    pub name: String,
    pub kind: SqlKind,
    pub insert_update: InsertUpdateBehavior,
    pub key: KeyBehavior,
    pub enum_behavior: EnumBehavior,
    pub json: bool,
    pub auto_generate: bool,
}

impl ColumnDescriptor {
    pub fn is_primary_key(&self) -> bool {
        self.key == KeyBehavior::PrimaryKey
    }

    /// Written by INSERT statements.
    pub fn is_insertable(&self) -> bool {
        self.insert_update != InsertUpdateBehavior::NeitherInsertNorUpdate
    }

    /// Written by UPDATE statements (never true for keys).
    pub fn is_updatable(&self) -> bool {
        self.insert_update == InsertUpdateBehavior::InsertAndUpdate && !self.is_primary_key()
    }

    /// `[Name]`
    pub fn quoted_name(&self) -> String {
        ident::quote_unchecked(&self.name)
    }

    /// Literal policy for values of this column.
    pub fn literal_options(&self) -> LiteralOptions {
        LiteralOptions::new()
            .enum_as(self.enum_behavior)
            .json(self.json)
    }

    /// Read this column's value from a record, filling auto-generated values.
    pub fn read(&self, record: &dyn Record) -> OrmResult<Value> {
        let value = record.try_member(self.member)?.ok_or_else(|| {
            OrmError::schema(format!(
                "member `{}` cannot be read from `{}`",
                self.member,
                record.type_key().name()
            ))
        })?;
        if self.auto_generate {
            return Ok(self.auto_fill(value));
        }
        Ok(value)
    }

    /// Read and render this column's value as a literal.
    pub fn render(&self, record: &dyn Record) -> OrmResult<String> {
        render_literal(&self.read(record)?, self.literal_options())
    }

    fn auto_fill(&self, value: Value) -> Value {
        let now = Utc::now();
        match value {
            Value::Null => match self.kind {
                SqlKind::Guid => Value::Uuid(Uuid::new_v4()),
                SqlKind::DateTime => Value::DateTimeUtc(now),
                SqlKind::DateTimeOffset => Value::DateTimeOffset(now.fixed_offset()),
                _ => Value::Null,
            },
            Value::Uuid(id) if id.is_nil() => Value::Uuid(Uuid::new_v4()),
            Value::DateTime(ts) if ts == NaiveDateTime::default() || ts == NaiveDateTime::MIN => {
                Value::DateTime(now.naive_utc())
            }
            Value::DateTimeUtc(ts) if ts == DateTime::<Utc>::default() || ts == DateTime::<Utc>::MIN_UTC => {
                Value::DateTimeUtc(now)
            }
            Value::DateTimeOffset(ts) if ts.timestamp() == 0 || ts.naive_utc() == NaiveDateTime::MIN => {
                Value::DateTimeOffset(now.fixed_offset())
            }
            other => other,
        }
    }
}

/// Validated, immutable schema of a mapped type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    pub type_name: &'static str,
    pub schema: String,
    pub table: String,
    pub soft_delete: bool,
    /// Mapped columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TypeMetadata {
    /// Validate a type's declared mapping.
    ///
    /// Primary keys declared as insert-and-update are normalized to insert-only here,
    /// so no key ever reaches a SET list.
    pub fn from_descriptor(descriptor: EntityDescriptor) -> OrmResult<Self> {
        let type_name = descriptor.type_name;
        let table = descriptor.table.ok_or_else(|| {
            OrmError::schema(format!("type `{type_name}` has no table mapping"))
        })?;
        if table.name.trim().is_empty() {
            return Err(OrmError::schema(format!(
                "type `{type_name}` maps to a blank table name"
            )));
        }
        if table.schema.trim().is_empty() {
            return Err(OrmError::schema(format!(
                "type `{type_name}` maps to a blank schema name"
            )));
        }

        let mut columns: Vec<ColumnDescriptor> = Vec::with_capacity(descriptor.members.len());
        for member in descriptor.members {
            let Some(attr) = member.column else {
                continue;
            };
            if attr.name.trim().is_empty() {
                return Err(OrmError::schema(format!(
                    "member `{type_name}.{}` maps to a blank column name",
                    member.name
                )));
            }
            if columns.iter().any(|c| ident::same_name(&c.name, &attr.name)) {
                return Err(OrmError::schema(format!(
                    "column `{}` is mapped more than once on `{type_name}`",
                    attr.name
                )));
            }
            if attr.auto_generate && !member.kind.supports_auto_generate() {
                return Err(OrmError::configuration(format!(
                    "member `{type_name}.{}` is marked auto_generate but is not a GUID or timestamp",
                    member.name
                )));
            }

            let mut insert_update = attr.insert_update;
            if attr.key == KeyBehavior::PrimaryKey
                && insert_update == InsertUpdateBehavior::InsertAndUpdate
            {
                insert_update = InsertUpdateBehavior::OnlyInsert;
            }

            columns.push(ColumnDescriptor {
                member: member.name,
                name: attr.name,
                kind: member.kind,
                insert_update,
                key: attr.key,
                enum_behavior: attr.enum_behavior,
                json: attr.json,
                auto_generate: attr.auto_generate,
            });
        }

        Ok(Self {
            type_name,
            schema: table.schema,
            table: table.name,
            soft_delete: table.soft_delete,
            columns,
        })
    }

    /// `[schema].[table]`
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}",
            ident::quote_unchecked(&self.schema),
            ident::quote_unchecked(&self.table)
        )
    }

    /// Whether `name` refers to this table, bare or qualified (case-insensitive).
    pub fn matches_table_name(&self, name: &str) -> bool {
        ident::same_name(name, &self.table)
            || ident::same_name(name, &format!("{}.{}", self.schema, self.table))
            || ident::same_name(name, &self.qualified_name())
    }

    /// Column mapped from a host-side member.
    pub fn column_for_member(&self, member: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.member == member)
    }

    /// Column by table-side name (case-insensitive).
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| ident::same_name(&c.name, name))
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_primary_key())
    }

    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_insertable())
    }

    pub fn updatable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_updatable())
    }
}

type MetadataCache = RwLock<HashMap<TypeId, Arc<TypeMetadata>>>;

fn cache() -> &'static MetadataCache {
    static CACHE: OnceLock<MetadataCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Discover (and cache) the schema of a mapped type.
pub fn discover<T: Entity>() -> OrmResult<Arc<TypeMetadata>> {
    discover_type(EntityType::of::<T>())
}

/// Discover (and cache) the schema of a type-erased mapped type.
///
/// Failures are not cached; a type that fails validation fails every time.
pub fn discover_type(ty: EntityType) -> OrmResult<Arc<TypeMetadata>> {
    let id = ty.key().id();
    if let Some(found) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Ok(Arc::clone(found));
    }

    let metadata = Arc::new(TypeMetadata::from_descriptor(ty.descriptor())?);
    tracing::trace!(
        target: "tsorm::schema",
        type_name = metadata.type_name,
        table = %metadata.qualified_name(),
        columns = metadata.columns.len(),
        "discovered table mapping"
    );

    let mut guard = cache().write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(guard.entry(id).or_insert(metadata)))
}
