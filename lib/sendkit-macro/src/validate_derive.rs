//! Validate derive macro implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Expr, Fields, GenericArgument, PathArguments, Type, parse2};

/// A rule attached to a field with `#[validate(...)]`.
#[derive(Debug, Clone)]
enum FieldRule {
    /// `email`: string (or each string of a `Vec`) is an email address.
    Email,
    /// `range(min = .., max = ..)`: numeric value within bounds.
    Range { min: Expr, max: Expr },
    /// `count(min = .., max = ..)`: collection length within bounds.
    Count { min: Expr, max: Expr },
    /// `nested`: delegate to the field's own `Validatable` impl.
    Nested,
}

/// Expand the `#[derive(Validate)]` macro.
pub fn expand_validate_derive(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let custom = parse_struct_rules(&input.attrs)?;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Validate derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Validate derive only supports structs",
            ));
        }
    };

    let mut field_checks = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let rules = parse_field_rules(&field.attrs)?;
        if rules.is_empty() {
            continue;
        }
        field_checks.push(generate_field_checks(field_name, &field.ty, &rules));
    }

    Ok(quote! {
        impl #impl_generics ::sendkit::Validatable for #name #ty_generics #where_clause {
            fn validate(&self) -> ::core::result::Result<(), ::sendkit::ValidationError> {
                #(#custom(self)?;)*
                #(#field_checks)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

/// Parse struct-level `#[validate(custom = "path")]` functions.
fn parse_struct_rules(attrs: &[syn::Attribute]) -> syn::Result<Vec<syn::Path>> {
    let mut custom = Vec::new();

    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("custom") {
                let value: syn::LitStr = meta.value()?.parse()?;
                custom.push(value.parse::<syn::Path>()?);
                Ok(())
            } else {
                Err(meta.error("expected `custom = \"path::to::fn\"`"))
            }
        })?;
    }

    Ok(custom)
}

/// Parse field rules, keeping the order in which they are written.
fn parse_field_rules(attrs: &[syn::Attribute]) -> syn::Result<Vec<FieldRule>> {
    let mut rules = Vec::new();

    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("email") {
                rules.push(FieldRule::Email);
            } else if meta.path.is_ident("nested") {
                rules.push(FieldRule::Nested);
            } else if meta.path.is_ident("range") {
                let (min, max) = parse_bounds(&meta)?;
                rules.push(FieldRule::Range { min, max });
            } else if meta.path.is_ident("count") {
                let (min, max) = parse_bounds(&meta)?;
                rules.push(FieldRule::Count { min, max });
            } else {
                return Err(meta.error(
                    "unknown validation rule, expected one of: email, range, count, nested",
                ));
            }
            Ok(())
        })?;
    }

    Ok(rules)
}

/// Parse `(min = .., max = ..)`; both bounds are required.
fn parse_bounds(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<(Expr, Expr)> {
    let mut min = None;
    let mut max = None;

    meta.parse_nested_meta(|bound| {
        if bound.path.is_ident("min") {
            min = Some(bound.value()?.parse::<Expr>()?);
        } else if bound.path.is_ident("max") {
            max = Some(bound.value()?.parse::<Expr>()?);
        } else {
            return Err(bound.error("expected `min` or `max`"));
        }
        Ok(())
    })?;

    match (min, max) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(meta.error("both `min` and `max` are required")),
    }
}

/// Generate the checks of a single field.
fn generate_field_checks(field_name: &syn::Ident, field_ty: &Type, rules: &[FieldRule]) -> TokenStream {
    let (inner_ty, is_option) = match option_inner_type(field_ty) {
        Some(inner) => (inner, true),
        None => (field_ty, false),
    };
    let is_vec = is_vec_type(inner_ty);
    let label = field_name.to_string();

    let checks = rules.iter().map(|rule| match rule {
        FieldRule::Email if is_vec => quote! {
            for item in value.iter() {
                ::sendkit::validate::email(item)?;
            }
        },
        FieldRule::Email => quote! {
            ::sendkit::validate::email(value)?;
        },
        FieldRule::Range { min, max } => quote! {
            ::sendkit::validate::range(*value, (#min)..=(#max))?;
        },
        FieldRule::Count { min, max } => quote! {
            ::sendkit::validate::count(#label, value.len(), (#min)..=(#max))?;
        },
        FieldRule::Nested => quote! {
            ::sendkit::Validatable::validate(value)?;
        },
    });

    if is_option {
        quote! {
            if let ::core::option::Option::Some(value) = &self.#field_name {
                #(#checks)*
            }
        }
    } else {
        quote! {
            {
                let value = &self.#field_name;
                #(#checks)*
            }
        }
    }
}

/// The `T` of an `Option<T>` type.
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

/// Check if a type is `Vec<T>`.
fn is_vec_type(ty: &Type) -> bool {
    matches!(ty, Type::Path(type_path)
        if type_path.path.segments.last()
            .is_some_and(|seg| seg.ident == "Vec"))
}
