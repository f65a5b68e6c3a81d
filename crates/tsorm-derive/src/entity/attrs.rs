//! Attribute parsing for the Entity and Record derive macros.
//!
//! Handles struct-level and field-level `#[orm(...)]` attributes.

use syn::punctuated::Punctuated;
use syn::{DeriveInput, Expr, ExprLit, Lit, Meta, Result, Token};

/// Struct-level `#[orm(table = "...", schema = "...", soft_delete = bool)]`.
#[derive(Default)]
pub(super) struct StructAttr {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub soft_delete: Option<bool>,
}

pub(super) fn parse_struct_attrs(input: &DeriveInput) -> Result<StructAttr> {
    let mut out = StructAttr::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let nested = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in nested {
            let Meta::NameValue(nv) = &meta else {
                return Err(syn::Error::new_spanned(
                    &meta,
                    "expected `table = \"...\"`, `schema = \"...\"` or `soft_delete = bool`",
                ));
            };
            let Expr::Lit(ExprLit { lit, .. }) = &nv.value else {
                return Err(syn::Error::new_spanned(&nv.value, "expected a literal"));
            };
            match (nv.path.get_ident().map(|i| i.to_string()).as_deref(), lit) {
                (Some("table"), Lit::Str(s)) => out.table = Some(s.value()),
                (Some("schema"), Lit::Str(s)) => out.schema = Some(s.value()),
                (Some("soft_delete"), Lit::Bool(b)) => out.soft_delete = Some(b.value),
                (Some("table" | "schema"), _) => {
                    return Err(syn::Error::new_spanned(lit, "expected a string literal"));
                }
                (Some("soft_delete"), _) => {
                    return Err(syn::Error::new_spanned(lit, "expected `true` or `false`"));
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        &nv.path,
                        "unknown orm attribute; expected `table`, `schema` or `soft_delete`",
                    ));
                }
            }
        }
    }

    if out.table.is_none() && (out.schema.is_some() || out.soft_delete.is_some()) {
        return Err(syn::Error::new_spanned(
            input,
            "`schema` and `soft_delete` require #[orm(table = \"...\")]",
        ));
    }

    Ok(out)
}

/// `insert_update = "..."` values.
#[derive(Clone, Copy)]
pub(super) enum InsertUpdate {
    InsertAndUpdate,
    OnlyInsert,
    Neither,
}

/// `enum_as = "..."` values.
#[derive(Clone, Copy)]
pub(super) enum EnumAs {
    Int,
    String,
}

/// Field-level `#[orm(...)]`.
#[derive(Default)]
pub(super) struct FieldAttr {
    /// `column` was given, with or without an explicit name.
    pub mapped: bool,
    pub column: Option<String>,
    pub primary_key: bool,
    pub insert_update: Option<InsertUpdate>,
    pub enum_as: Option<EnumAs>,
    pub json: bool,
    pub auto_generate: bool,
    pub ignore: bool,
}

impl FieldAttr {
    fn merge(&mut self, other: FieldAttr) {
        self.mapped |= other.mapped;
        if other.column.is_some() {
            self.column = other.column;
        }
        self.primary_key |= other.primary_key;
        if other.insert_update.is_some() {
            self.insert_update = other.insert_update;
        }
        if other.enum_as.is_some() {
            self.enum_as = other.enum_as;
        }
        self.json |= other.json;
        self.auto_generate |= other.auto_generate;
        self.ignore |= other.ignore;
    }

    fn has_column_options(&self) -> bool {
        self.primary_key
            || self.insert_update.is_some()
            || self.enum_as.is_some()
            || self.json
            || self.auto_generate
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut out = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            let key = ident.to_string();

            if input.peek(Token![=]) {
                let _: Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                match key.as_str() {
                    "column" => {
                        out.mapped = true;
                        out.column = Some(value.value());
                    }
                    "insert_update" => {
                        out.insert_update = Some(match value.value().as_str() {
                            "insert_and_update" => InsertUpdate::InsertAndUpdate,
                            "only_insert" => InsertUpdate::OnlyInsert,
                            "neither" => InsertUpdate::Neither,
                            _ => {
                                return Err(syn::Error::new_spanned(
                                    &value,
                                    "expected \"insert_and_update\", \"only_insert\" or \"neither\"",
                                ));
                            }
                        });
                    }
                    "enum_as" => {
                        out.enum_as = Some(match value.value().as_str() {
                            "int" => EnumAs::Int,
                            "string" => EnumAs::String,
                            _ => {
                                return Err(syn::Error::new_spanned(
                                    &value,
                                    "expected \"int\" or \"string\"",
                                ));
                            }
                        });
                    }
                    _ => {
                        return Err(syn::Error::new(
                            ident.span(),
                            format!("unknown orm attribute `{key}`"),
                        ));
                    }
                }
            } else {
                match key.as_str() {
                    "column" => out.mapped = true,
                    "primary_key" => out.primary_key = true,
                    "json" => out.json = true,
                    "auto_generate" => out.auto_generate = true,
                    "ignore" => out.ignore = true,
                    _ => {
                        return Err(syn::Error::new(
                            ident.span(),
                            format!("unknown orm attribute `{key}`"),
                        ));
                    }
                }
            }

            if input.peek(Token![,]) {
                let _: Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }

        Ok(out)
    }
}

/// Collect every `#[orm(...)]` on a field into one [`FieldAttr`].
pub(super) fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        out.merge(attr.parse_args::<FieldAttr>()?);
    }

    if out.ignore && (out.mapped || out.has_column_options()) {
        return Err(syn::Error::new_spanned(
            field,
            "`ignore` cannot be combined with other orm attributes",
        ));
    }
    if !out.mapped && out.has_column_options() {
        return Err(syn::Error::new_spanned(
            field,
            "column options require `column` or `column = \"...\"`",
        ));
    }

    Ok(out)
}
