//! Procedural macros for sendkit.
//!
//! - `#[derive(Validate)]` - Generate a fail-fast `Validatable` impl from
//!   field attributes
//!
//! Use the macro through the `sendkit` crate, which re-exports it together
//! with the validators the generated code calls.

mod validate_derive;

use proc_macro::TokenStream;

/// Derive the `Validatable` trait for a struct.
///
/// The generated `validate` runs struct-level rules first, then field rules
/// in declaration order (and attribute order within a field), returning the
/// first violation.
///
/// # Struct Attributes
///
/// - `#[validate(custom = "path::to::fn")]` - Call `fn(&Self) -> Result<(), ValidationError>`
///
/// # Field Attributes
///
/// - `#[validate(email)]` - Email syntax; applied to each item of a `Vec`
/// - `#[validate(range(min = 1, max = 500))]` - Integer bounds, inclusive
/// - `#[validate(count(min = 1, max = 1000))]` - Collection length, inclusive
/// - `#[validate(nested)]` - Delegate to the field's own `Validatable` impl
///
/// `Option<T>` fields are only checked when they hold a value.
///
/// # Example
///
/// ```ignore
/// use sendkit::Validate;
///
/// #[derive(Validate)]
/// struct Personalization {
///     #[validate(count(min = 1, max = 1000), nested)]
///     to: Vec<Address>,
///     #[validate(email)]
///     reply_to: Option<String>,
/// }
/// ```
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    validate_derive::expand_validate_derive(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
