//! Entity derive macro implementation

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

struct FieldSpec<'a> {
    ident: &'a syn::Ident,
    ty: &'a syn::Type,
    name: String,
    nested: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let entity_name = name.to_string();
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let mut specs = Vec::new();
    for field in fields {
        let attrs = parse_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let ident = field.ident.as_ref().unwrap();
        if attrs.nested && !is_option(&field.ty) {
            return Err(syn::Error::new_spanned(
                field,
                "nested entity fields must be Option<T>",
            ));
        }
        specs.push(FieldSpec {
            ident,
            ty: &field.ty,
            name: attrs.column.unwrap_or_else(|| ident.to_string().to_snake_case()),
            nested: attrs.nested,
        });
    }

    let field_defs = specs.iter().map(|spec| {
        let field_name = &spec.name;
        let kind = if spec.nested {
            quote!(sqlbind::FieldKind::Nested)
        } else {
            quote!(sqlbind::FieldKind::Scalar)
        };
        quote! {
            sqlbind::FieldDef { name: #field_name, kind: #kind }
        }
    });

    let get_arms = specs.iter().filter(|spec| !spec.nested).map(|spec| {
        let field_name = &spec.name;
        let ident = spec.ident;
        quote! {
            #field_name => ::core::option::Option::Some(
                sqlbind::ToValue::to_value(&self.#ident)
            ),
        }
    });

    let set_arms = specs.iter().filter(|spec| !spec.nested).map(|spec| {
        let field_name = &spec.name;
        let ident = spec.ident;
        let ty = spec.ty;
        quote! {
            #field_name => {
                if let ::core::option::Option::Some(v) =
                    <#ty as sqlbind::FromValue>::from_value(&value)
                {
                    self.#ident = v;
                }
                true
            }
        }
    });

    let nested_arms = specs.iter().filter(|spec| spec.nested).map(|spec| {
        let field_name = &spec.name;
        let ident = spec.ident;
        quote! {
            #field_name => ::core::option::Option::Some(
                self.#ident.get_or_insert_with(::core::default::Default::default)
                    as &mut dyn sqlbind::Reflect
            ),
        }
    });

    Ok(quote! {
        impl #impl_generics sqlbind::Reflect for #name #ty_generics #where_clause {
            fn entity_name(&self) -> &'static str {
                #entity_name
            }

            fn fields(&self) -> &'static [sqlbind::FieldDef] {
                const FIELDS: &[sqlbind::FieldDef] = &[#(#field_defs),*];
                FIELDS
            }

            fn get(&self, field: &str) -> ::core::option::Option<sqlbind::Value> {
                match field {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set(&mut self, field: &str, value: sqlbind::Value) -> bool {
                match field {
                    #(#set_arms)*
                    _ => false,
                }
            }

            fn nested_mut(
                &mut self,
                field: &str,
            ) -> ::core::option::Option<&mut dyn sqlbind::Reflect> {
                match field {
                    #(#nested_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

#[derive(Default)]
struct EntityAttrs {
    column: Option<String>,
    nested: bool,
    skip: bool,
}

fn parse_attrs(field: &syn::Field) -> Result<EntityAttrs> {
    let mut attrs = EntityAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("nested") {
                attrs.nested = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
                Ok(())
            } else if meta.path.is_ident("column") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                attrs.column = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute"))
            }
        })?;
    }
    Ok(attrs)
}

fn is_option(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        _ => false,
    }
}
