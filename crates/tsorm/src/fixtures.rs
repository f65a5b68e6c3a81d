//! Hand-written mapped types shared by the unit tests.

use std::sync::Arc;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::entity::{Entity, Record, TypeKey};
use crate::schema::{
    ColumnAttr, EntityDescriptor, EnumBehavior, InsertUpdateBehavior, MemberDescriptor,
    TableAttr,
};
use crate::value::{EnumInfo, EnumValue, EnumVariant, SqlEnum, SqlKind, SqlType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active = 1,
    Inactive = 2,
}

static STATUS: EnumInfo = EnumInfo {
    name: "Status",
    variants: &[
        EnumVariant {
            name: "Active",
            discriminant: Status::Active as i64,
        },
        EnumVariant {
            name: "Inactive",
            discriminant: Status::Inactive as i64,
        },
    ],
};

impl SqlEnum for Status {
    fn enum_info() -> &'static EnumInfo {
        &STATUS
    }

    fn enum_value(&self) -> EnumValue {
        match self {
            Status::Active => EnumValue {
                info: &STATUS,
                name: "Active",
                discriminant: 1,
            },
            Status::Inactive => EnumValue {
                info: &STATUS,
                name: "Inactive",
                discriminant: 2,
            },
        }
    }
}

impl SqlType for Status {
    fn sql_kind() -> SqlKind {
        SqlKind::Enum(&STATUS)
    }

    fn to_value(&self) -> Value {
        Value::Enum(self.enum_value())
    }
}

/// `[dbo].[Person]`, soft delete.
#[derive(Debug, Clone)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub status: Status,
    pub nickname: Option<String>,
}

impl Person {
    pub fn new(id: i32, name: &str, status: Status) -> Self {
        Self {
            id,
            name: name.to_string(),
            status,
            nickname: None,
        }
    }
}

impl Record for Person {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            "status" => Some(self.status.to_value()),
            "nickname" => Some(self.nickname.to_value()),
            _ => None,
        }
    }
}

impl Entity for Person {
    fn describe() -> EntityDescriptor {
        EntityDescriptor::new("Person")
            .table(TableAttr::new("Person"))
            .member(MemberDescriptor::mapped(
                "id",
                i32::sql_kind(),
                ColumnAttr::new("Id").primary_key(),
            ))
            .member(MemberDescriptor::mapped(
                "name",
                String::sql_kind(),
                ColumnAttr::new("Name"),
            ))
            .member(MemberDescriptor::mapped(
                "status",
                Status::sql_kind(),
                ColumnAttr::new("Status").enum_as(EnumBehavior::AsString),
            ))
            .member(MemberDescriptor::unmapped(
                "nickname",
                <Option<String>>::sql_kind(),
            ))
    }
}

/// `[sales].[Orders]`, hard delete.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: i32,
    pub person_id: i32,
    pub total: f64,
    pub status: Status,
}

impl Record for Order {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.to_value()),
            "person_id" => Some(self.person_id.to_value()),
            "total" => Some(self.total.to_value()),
            "status" => Some(self.status.to_value()),
            _ => None,
        }
    }
}

impl Entity for Order {
    fn describe() -> EntityDescriptor {
        EntityDescriptor::new("Order")
            .table(TableAttr::new("Orders").schema("sales").soft_delete(false))
            .member(MemberDescriptor::mapped(
                "id",
                i32::sql_kind(),
                ColumnAttr::new("Id").primary_key(),
            ))
            .member(MemberDescriptor::mapped(
                "person_id",
                i32::sql_kind(),
                ColumnAttr::new("PersonId"),
            ))
            .member(MemberDescriptor::mapped(
                "total",
                f64::sql_kind(),
                ColumnAttr::new("Total"),
            ))
            .member(MemberDescriptor::mapped(
                "status",
                Status::sql_kind(),
                ColumnAttr::new("Status"),
            ))
    }
}

/// `[dbo].[Audit]`: auto-generated key and stamp, JSON payload, computed column.
#[derive(Debug, Clone)]
pub struct Audit {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
    pub payload: serde_json::Value,
    pub row_version: i64,
}

impl Record for Audit {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.to_value()),
            "created_at" => Some(self.created_at.to_value()),
            "payload" => Some(self.payload.to_value()),
            "row_version" => Some(self.row_version.to_value()),
            _ => None,
        }
    }
}

impl Entity for Audit {
    fn describe() -> EntityDescriptor {
        EntityDescriptor::new("Audit")
            .table(TableAttr::new("Audit").soft_delete(false))
            .member(MemberDescriptor::mapped(
                "id",
                Uuid::sql_kind(),
                ColumnAttr::new("Id").primary_key().auto_generate(),
            ))
            .member(MemberDescriptor::mapped(
                "created_at",
                NaiveDateTime::sql_kind(),
                ColumnAttr::new("CreatedAt")
                    .insert_update(InsertUpdateBehavior::OnlyInsert)
                    .auto_generate(),
            ))
            .member(MemberDescriptor::mapped(
                "payload",
                SqlKind::Json,
                ColumnAttr::new("Payload").json(),
            ))
            .member(MemberDescriptor::mapped(
                "row_version",
                i64::sql_kind(),
                ColumnAttr::new("RowVersion")
                    .insert_update(InsertUpdateBehavior::NeitherInsertNorUpdate),
            ))
    }
}

/// A type with no table mapping.
#[derive(Debug)]
pub struct Draft;

impl Record for Draft {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn member(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl Entity for Draft {
    fn describe() -> EntityDescriptor {
        EntityDescriptor::new("Draft")
    }
}

/// Captured closure environment for constant folding.
#[derive(Debug)]
pub struct Filter {
    pub min_total: f64,
    pub name: String,
    pub ids: Vec<i32>,
    pub inner: Option<Arc<Filter>>,
}

impl Filter {
    pub fn new(min_total: f64, name: &str) -> Self {
        Self {
            min_total,
            name: name.to_string(),
            ids: Vec::new(),
            inner: None,
        }
    }
}

impl Record for Filter {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            "min_total" => Some(self.min_total.to_value()),
            "name" => Some(self.name.to_value()),
            "ids" => Some(Value::list(self.ids.iter().copied())),
            "inner" => Some(match &self.inner {
                Some(inner) => Value::Record(inner.clone()),
                None => Value::Null,
            }),
            _ => None,
        }
    }
}
