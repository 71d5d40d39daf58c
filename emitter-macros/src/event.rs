use crate::utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Ident, Item, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input,
};

/// #[event] 宏实现
/// - 支持结构体与枚举
/// - 合并/追加派生：Debug, Clone
/// - 参数：`map = T`（至少一个，可重复）、`name = "..."`（可选，默认类型名）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EventAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let required: Vec<syn::Path> = vec![syn::parse_quote!(Debug), syn::parse_quote!(Clone)];

    let (ident, generics) = match &mut input {
        Item::Struct(st) => {
            apply_derives(&mut st.attrs, required);
            (st.ident.clone(), st.generics.clone())
        }
        Item::Enum(en) => {
            apply_derives(&mut en.attrs, required);
            (en.ident.clone(), en.generics.clone())
        }
        other => {
            return syn::Error::new(other.span(), "#[event] only supports struct or enum")
                .to_compile_error()
                .into();
        }
    };

    let name = cfg
        .name
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let impls = cfg.maps.iter().map(|map| {
        quote! {
            impl #impl_generics ::emitter::event::Event<#map> for #ident #ty_generics #where_clause {
                const NAME: &'static str = #name;
            }
        }
    });

    let out = quote! {
        #input

        #( #impls )*
    };

    TokenStream::from(out)
}

// -------- parsing --------

// 解析 event 宏键值参数：map = <Type>（可重复）、name = "<str>"
struct EventAttrConfig {
    maps: Vec<Type>,
    name: Option<LitStr>,
}

impl Parse for EventAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let span = input.span();
        let mut maps: Vec<Type> = Vec::new();
        let mut name: Option<LitStr> = None;

        let pairs: Punctuated<EventAttrKv, Token![,]> = Punctuated::parse_terminated(input)?;
        for kv in pairs {
            match kv {
                EventAttrKv::Map(ty) => {
                    let key = quote!(#ty).to_string();
                    if maps.iter().any(|m| quote!(#m).to_string() == key) {
                        return Err(syn::Error::new(ty.span(), "duplicate map in attribute"));
                    }
                    maps.push(ty);
                }
                EventAttrKv::Name(lit) => {
                    if name.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'name' in attribute",
                        ));
                    }
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "event name must not be empty"));
                    }
                    name = Some(lit);
                }
            }
        }

        if maps.is_empty() {
            return Err(syn::Error::new(
                span,
                "missing 'map = ...'; e.g., #[event(map = AppEvents)]",
            ));
        }

        Ok(Self { maps, name })
    }
}

enum EventAttrKv {
    Map(Type),
    Name(LitStr),
}

impl Parse for EventAttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        match key.to_string().as_str() {
            "map" => Ok(Self::Map(input.parse()?)),
            "name" => Ok(Self::Name(input.parse()?)),
            _ => Err(syn::Error::new(
                key.span(),
                "unknown key; expected 'map' | 'name'",
            )),
        }
    }
}
