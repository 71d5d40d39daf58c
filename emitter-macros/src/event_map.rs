use crate::utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, parse_macro_input};

/// #[event_map] 宏实现
/// - 仅支持无泛型的单元结构体
/// - 合并/追加派生：Debug, Clone, Copy, Default
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::TokenStream::from(attr).span(),
            "#[event_map] takes no arguments",
        )
        .to_compile_error()
        .into();
    }

    let mut input = parse_macro_input!(item as Item);
    let st = match &mut input {
        Item::Struct(st) => st,
        other => {
            return syn::Error::new(other.span(), "#[event_map] only supports unit struct")
                .to_compile_error()
                .into();
        }
    };

    if !matches!(st.fields, syn::Fields::Unit) || !st.generics.params.is_empty() {
        return syn::Error::new(
            st.span(),
            "#[event_map] expects a unit struct without generics, e.g., pub struct AppEvents;",
        )
        .to_compile_error()
        .into();
    }

    apply_derives(
        &mut st.attrs,
        vec![
            syn::parse_quote!(Debug),
            syn::parse_quote!(Clone),
            syn::parse_quote!(Copy),
            syn::parse_quote!(Default),
        ],
    );

    let ident = &st.ident;
    let out = quote! {
        #st

        impl ::emitter::event::EventMap for #ident {}
    };

    TokenStream::from(out)
}
