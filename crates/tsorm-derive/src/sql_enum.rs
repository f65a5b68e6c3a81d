//! `#[derive(SqlEnum)]`: variant table for a fieldless enum.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Expr, ExprLit, Fields, Lit, Meta, Result, Token};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(e) => &e.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "SqlEnum can only be derived for enums",
            ));
        }
    };

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "SqlEnum cannot be derived for generic enums",
        ));
    }
    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "SqlEnum requires at least one variant",
        ));
    }

    let type_name = name.unraw().to_string();
    let mut table_entries = Vec::new();
    let mut name_arms = Vec::new();

    for variant in variants {
        if !matches!(&variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "SqlEnum variants must be unit variants (no fields)",
            ));
        }

        let variant_ident = &variant.ident;
        let sql_name = parse_rename(variant)?.unwrap_or_else(|| variant_ident.unraw().to_string());

        table_entries.push(quote! {
            ::tsorm::EnumVariant {
                name: #sql_name,
                discriminant: #name::#variant_ident as i64,
            },
        });
        name_arms.push(quote! {
            #name::#variant_ident => #sql_name,
        });
    }

    Ok(quote! {
        impl ::tsorm::SqlEnum for #name {
            fn enum_info() -> &'static ::tsorm::EnumInfo {
                static INFO: ::tsorm::EnumInfo = ::tsorm::EnumInfo {
                    name: #type_name,
                    variants: &[#(#table_entries)*],
                };
                &INFO
            }

            fn enum_value(&self) -> ::tsorm::EnumValue {
                let name: &'static str = match self {
                    #(#name_arms)*
                };
                ::tsorm::EnumValue {
                    info: <Self as ::tsorm::SqlEnum>::enum_info(),
                    name,
                    discriminant: *self as i64,
                }
            }
        }

        impl ::tsorm::SqlType for #name {
            fn sql_kind() -> ::tsorm::SqlKind {
                ::tsorm::SqlKind::Enum(<Self as ::tsorm::SqlEnum>::enum_info())
            }

            fn to_value(&self) -> ::tsorm::Value {
                ::tsorm::Value::Enum(<Self as ::tsorm::SqlEnum>::enum_value(self))
            }
        }
    })
}

/// Parse `#[orm(rename = "...")]` from a variant's attributes.
fn parse_rename(variant: &syn::Variant) -> Result<Option<String>> {
    let mut rename = None;
    for attr in &variant.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let nested = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in &nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename") => match &nv.value {
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) => rename = Some(s.value()),
                    other => {
                        return Err(syn::Error::new_spanned(other, "expected a string literal"));
                    }
                },
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown orm attribute; expected `rename = \"...\"`",
                    ));
                }
            }
        }
    }
    Ok(rename)
}
