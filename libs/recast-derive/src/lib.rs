use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, parse_macro_input};

/// Derive macro for reflective member declarations.
///
/// Generates three impls on the annotated struct:
///
/// - `Reflect`: one `Field` member per named field, then one `Getter` member
///   per method listed in `#[reflect(getters(...))]`.
/// - `Describe`: the struct describes itself as `Shape::Object`.
/// - `IntoValue`: the struct reads as a `Value::Record` of its members.
///
/// Every field type must implement `Describe` and `IntoValue` unless it is
/// marked `#[reflect(skip)]`. Getters take `&self` and return an owned value.
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect)]
/// #[reflect(getters(total))]
/// pub struct Order {
///     pub id: String,
///     pub items: Vec<i64>,
///     #[reflect(skip)]
///     pub cache: Option<Cache>,
/// }
///
/// impl Order {
///     pub fn total(&self) -> i64 {
///         self.items.iter().sum()
///     }
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect only supports structs with named fields",
                ));
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Reflect only supports structs")),
    };

    // Parse #[reflect(getters(a, b))] on the struct.
    let mut getters: Vec<Ident> = Vec::new();
    for attr in &input.attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("getters") {
                meta.parse_nested_meta(|getter| {
                    let ident = getter.path.get_ident().cloned().ok_or_else(|| {
                        getter.error("expected a method name")
                    })?;
                    getters.push(ident);
                    Ok(())
                })
            } else {
                Err(meta.error("unknown reflect attribute (expected `getters(...)`)"))
            }
        })?;
    }

    let mut member_tokens = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.to_string();
        let field_ty = &field.ty;

        // Parse #[reflect(skip)] on the field.
        let mut skip = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown reflect attribute (expected `skip`)"))
                }
            })?;
        }
        if skip {
            continue;
        }

        member_tokens.push(quote! {
            ::recast_api::reflect::Member::new(
                #field_name_str,
                ::recast_api::reflect::MemberKind::Field,
                <#field_ty as ::recast_api::reflect::Describe>::shape(),
                |__target: &Self| ::recast_api::reflect::IntoValue::to_value(&__target.#field_name),
            )
        });
    }

    for getter in &getters {
        let getter_str = getter.to_string();
        member_tokens.push(quote! {
            ::recast_api::reflect::Member::new(
                #getter_str,
                ::recast_api::reflect::MemberKind::Getter,
                ::recast_api::reflect::returned_shape::<Self, _>(Self::#getter),
                |__target: &Self| ::recast_api::reflect::IntoValue::to_value(&__target.#getter()),
            )
        });
    }

    let expanded = quote! {
        impl ::recast_api::reflect::Reflect for #name {
            fn type_name() -> &'static str {
                #name_str
            }

            fn members() -> Vec<::recast_api::reflect::Member<Self>> {
                vec![
                    #(#member_tokens),*
                ]
            }
        }

        impl ::recast_api::reflect::Describe for #name {
            fn shape() -> ::recast_api::reflect::Shape {
                ::recast_api::reflect::Shape::Object(#name_str)
            }
        }

        impl ::recast_api::reflect::IntoValue for #name {
            fn to_value(&self) -> ::recast_api::value::Value {
                ::recast_api::value::Value::Record(
                    <Self as ::recast_api::reflect::Reflect>::members()
                        .iter()
                        .map(|m| (m.name, m.read(self)))
                        .collect(),
                )
            }
        }
    };

    Ok(TokenStream::from(expanded))
}
