//! Declarative table/column mapping, as written by `#[derive(Entity)]` or by hand.

use crate::value::SqlKind;

/// Which statements may write a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertUpdateBehavior {
    #[default]
    InsertAndUpdate,
    /// Written by INSERT only (primary keys, creation stamps).
    OnlyInsert,
    /// Never written (computed, identity, rowversion columns).
    NeitherInsertNorUpdate,
}

/// Key role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyBehavior {
    #[default]
    None,
    PrimaryKey,
}

/// How enum values are rendered as literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumBehavior {
    /// Discriminant as a plain integer.
    #[default]
    AsInt,
    /// Variant name as a quoted string.
    AsString,
}

/// Table mapping of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAttr {
    /// Schema name (default `dbo`).
    pub schema: String,
    /// Table name (required).
    pub name: String,
    /// Whether deletes flip the soft-delete column instead of removing rows (default true).
    pub soft_delete: bool,
}

impl TableAttr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: "dbo".to_string(),
            name: name.into(),
            soft_delete: true,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn soft_delete(mut self, enabled: bool) -> Self {
        self.soft_delete = enabled;
        self
    }
}

/// Column mapping of a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAttr {
    pub name: String,
    pub insert_update: InsertUpdateBehavior,
    pub key: KeyBehavior,
    pub enum_behavior: EnumBehavior,
    /// Render the member's value as a JSON document.
    pub json: bool,
    /// Fill an unset GUID or timestamp when the value is read for writing.
    pub auto_generate: bool,
}

impl ColumnAttr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insert_update: InsertUpdateBehavior::default(),
            key: KeyBehavior::default(),
            enum_behavior: EnumBehavior::default(),
            json: false,
            auto_generate: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.key = KeyBehavior::PrimaryKey;
        self
    }

    pub fn insert_update(mut self, behavior: InsertUpdateBehavior) -> Self {
        self.insert_update = behavior;
        self
    }

    pub fn enum_as(mut self, behavior: EnumBehavior) -> Self {
        self.enum_behavior = behavior;
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn auto_generate(mut self) -> Self {
        self.auto_generate = true;
        self
    }
}

/// One member of a type, mapped or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    /// Host-side member name, as passed to [`crate::Record::member`].
    pub name: &'static str,
    pub kind: SqlKind,
    /// `None` for members that are not part of the table.
    pub column: Option<ColumnAttr>,
}

impl MemberDescriptor {
    pub fn mapped(name: &'static str, kind: SqlKind, column: ColumnAttr) -> Self {
        Self {
            name,
            kind,
            column: Some(column),
        }
    }

    pub fn unmapped(name: &'static str, kind: SqlKind) -> Self {
        Self {
            name,
            kind,
            column: None,
        }
    }
}

/// Everything a type declares about its mapping, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub type_name: &'static str,
    pub table: Option<TableAttr>,
    pub members: Vec<MemberDescriptor>,
}

impl EntityDescriptor {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            table: None,
            members: Vec::new(),
        }
    }

    pub fn table(mut self, table: TableAttr) -> Self {
        self.table = Some(table);
        self
    }

    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }
}
