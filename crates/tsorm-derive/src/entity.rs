//! `#[derive(Entity)]` and `#[derive(Record)]` implementation.
//!
//! Both derives read the same field attributes. `Record` emits member access only,
//! `Entity` adds the declarative descriptor that `tsorm::schema::discover` validates.

mod attrs;

use heck::ToUpperCamelCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use attrs::{EnumAs, FieldAttr, InsertUpdate, StructAttr};

struct FieldSpec<'a> {
    ident: &'a syn::Ident,
    ty: &'a syn::Type,
    /// Host-side member name (raw identifiers unescaped).
    member: String,
    attr: FieldAttr,
}

fn collect_fields(input: &DeriveInput) -> Result<Vec<FieldSpec<'_>>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "tsorm derives only support structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "tsorm derives can only be derived for structs",
            ));
        }
    };

    let mut out = Vec::new();
    for field in fields {
        let attr = attrs::parse_field_attrs(field)?;
        if attr.ignore {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        out.push(FieldSpec {
            ident,
            ty: &field.ty,
            member: ident.unraw().to_string(),
            attr,
        });
    }
    Ok(out)
}

pub fn expand_record(input: DeriveInput) -> Result<TokenStream> {
    let fields = collect_fields(&input)?;
    Ok(record_impl(&input, &fields))
}

pub fn expand_entity(input: DeriveInput) -> Result<TokenStream> {
    let table = attrs::parse_struct_attrs(&input)?;
    let fields = collect_fields(&input)?;

    let record = record_impl(&input, &fields);
    let entity = entity_impl(&input, &table, &fields);

    Ok(quote! {
        #record
        #entity
    })
}

fn record_impl(input: &DeriveInput, fields: &[FieldSpec<'_>]) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let arms = fields.iter().map(|f| {
        let ident = f.ident;
        let ty = f.ty;
        let member = &f.member;
        if f.attr.json {
            if is_option(ty) {
                quote! {
                    #member => match &self.#ident {
                        ::std::option::Option::Some(v) => ::tsorm::Value::json(v)?,
                        ::std::option::Option::None => ::tsorm::Value::Null,
                    },
                }
            } else {
                quote! {
                    #member => ::tsorm::Value::json(&self.#ident)?,
                }
            }
        } else {
            quote! {
                #member => <#ty as ::tsorm::SqlType>::to_value(&self.#ident),
            }
        }
    });

    quote! {
        impl #impl_generics ::tsorm::Record for #name #ty_generics #where_clause {
            fn type_key(&self) -> ::tsorm::TypeKey {
                ::tsorm::TypeKey::of::<Self>()
            }

            fn member(&self, name: &str) -> ::std::option::Option<::tsorm::Value> {
                self.try_member(name).ok().flatten()
            }

            #[allow(unreachable_code)]
            fn try_member(
                &self,
                name: &str,
            ) -> ::tsorm::OrmResult<::std::option::Option<::tsorm::Value>> {
                let value = match name {
                    #(#arms)*
                    _ => return ::std::result::Result::Ok(::std::option::Option::None),
                };
                ::std::result::Result::Ok(::std::option::Option::Some(value))
            }
        }
    }
}

fn entity_impl(input: &DeriveInput, table: &StructAttr, fields: &[FieldSpec<'_>]) -> TokenStream {
    let name = &input.ident;
    let type_name = name.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let table_attr = table.table.as_ref().map(|table_name| {
        let schema = table.schema.as_ref().map(|s| quote! { .schema(#s) });
        let soft_delete = table.soft_delete.map(|b| quote! { .soft_delete(#b) });
        quote! {
            .table(::tsorm::TableAttr::new(#table_name) #schema #soft_delete)
        }
    });

    let members = fields.iter().map(member_descriptor);

    quote! {
        impl #impl_generics ::tsorm::Entity for #name #ty_generics #where_clause {
            fn describe() -> ::tsorm::EntityDescriptor {
                ::tsorm::EntityDescriptor::new(#type_name)
                    #table_attr
                    #(#members)*
            }
        }
    }
}

fn member_descriptor(f: &FieldSpec<'_>) -> TokenStream {
    let ty = f.ty;
    let member = &f.member;
    let attr = &f.attr;

    let kind = if attr.json {
        quote! { ::tsorm::SqlKind::Json }
    } else {
        quote! { <#ty as ::tsorm::SqlType>::sql_kind() }
    };

    if !attr.mapped {
        return quote! {
            .member(::tsorm::MemberDescriptor::unmapped(#member, #kind))
        };
    }

    let column = attr
        .column
        .clone()
        .unwrap_or_else(|| member.to_upper_camel_case());

    let mut options = Vec::new();
    if attr.primary_key {
        options.push(quote! { .primary_key() });
    }
    if let Some(behavior) = attr.insert_update {
        let variant = match behavior {
            InsertUpdate::InsertAndUpdate => quote! { InsertAndUpdate },
            InsertUpdate::OnlyInsert => quote! { OnlyInsert },
            InsertUpdate::Neither => quote! { NeitherInsertNorUpdate },
        };
        options.push(quote! { .insert_update(::tsorm::InsertUpdateBehavior::#variant) });
    }
    if let Some(enum_as) = attr.enum_as {
        let variant = match enum_as {
            EnumAs::Int => quote! { AsInt },
            EnumAs::String => quote! { AsString },
        };
        options.push(quote! { .enum_as(::tsorm::EnumBehavior::#variant) });
    }
    if attr.json {
        options.push(quote! { .json() });
    }
    if attr.auto_generate {
        options.push(quote! { .auto_generate() });
    }

    quote! {
        .member(::tsorm::MemberDescriptor::mapped(
            #member,
            #kind,
            ::tsorm::ColumnAttr::new(#column) #(#options)*,
        ))
    }
}

/// `Option<T>` under any path (`Option`, `std::option::Option`, ...).
fn is_option(ty: &syn::Type) -> bool {
    let syn::Type::Path(type_path) = ty else {
        return false;
    };
    type_path.qself.is_none()
        && type_path.path.segments.last().is_some_and(|seg| {
            seg.ident == "Option"
                && matches!(&seg.arguments, syn::PathArguments::AngleBracketed(args) if args.args.len() == 1)
        })
}
