use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Attribute,
    Expr,
    Fields,
    Ident,
    ItemStruct,
    Result,
    Token,
};

/// A single `name = value` pair inside the `error` attribute.
struct Tag {
    name: Ident,
    value: Expr,
}

impl Parse for Tag {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse()?;
        input.parse::<Token![=]>()?;
        Ok(Tag { name, value: input.parse()? })
    }
}

/// The values given to the `error` attribute. Each tag may appear at most once.
#[derive(Default)]
struct ReportTags {
    message: Option<Expr>,
    labels: Option<Expr>,
    help: Option<Expr>,
    note: Option<Expr>,
}

impl ReportTags {
    fn set(&mut self, tag: Tag) -> Result<()> {
        let slot = match tag.name.to_string().as_str() {
            "message" => &mut self.message,
            "labels" => &mut self.labels,
            "help" => &mut self.help,
            "note" => &mut self.note,
            other => {
                return Err(syn::Error::new_spanned(&tag.name, format!("unknown tag `{}`", other)));
            },
        };
        if slot.is_some() {
            return Err(syn::Error::new_spanned(&tag.name, format!("duplicate tag `{}`", tag.name)));
        }
        *slot = Some(tag.value);
        Ok(())
    }

    /// Reads the tags from the first `error` attribute, if there is one.
    fn from_attributes(attributes: &[Attribute]) -> Result<Self> {
        let mut tags = ReportTags::default();
        let Some(attr) = attributes.iter().find(|attr| attr.path().is_ident("error")) else {
            return Ok(tags);
        };
        for tag in attr.parse_args_with(Punctuated::<Tag, Token![,]>::parse_terminated)? {
            tags.set(tag)?;
        }
        Ok(tags)
    }
}

/// A struct deriving `ErrorKind`.
pub struct ErrorKindTarget {
    pub name: Ident,
    fields: Fields,
    tags: ReportTags,
}

impl Parse for ErrorKindTarget {
    fn parse(input: ParseStream) -> Result<Self> {
        // doc comments are outer attributes too
        let attributes = input.call(Attribute::parse_outer)?;
        let item = input.parse::<ItemStruct>()?;
        Ok(ErrorKindTarget {
            name: item.ident,
            fields: item.fields,
            tags: ReportTags::from_attributes(&attributes)?,
        })
    }
}

impl ErrorKindTarget {
    /// Brings the named fields of `self` into scope for the tag expressions.
    fn bind_fields(&self) -> TokenStream2 {
        let name = &self.name;
        match &self.fields {
            Fields::Named(fields) => {
                let names = fields.named.iter().map(|field| &field.ident);
                quote! {
                    #[allow(unused_variables)]
                    let #name { #(#names),* } = self;
                }
            },
            Fields::Unnamed(_) => quote_spanned! {
                name.span() => compile_error!("`ErrorKind` cannot be derived for tuple structs");
            },
            Fields::Unit => TokenStream2::new(),
        }
    }

    /// The report message, defaulting to the name of the struct.
    fn message(&self) -> TokenStream2 {
        match &self.tags.message {
            Some(message) => message.to_token_stream(),
            None => {
                let name = self.name.to_string();
                quote! { #name }
            },
        }
    }
}

impl ToTokens for ErrorKindTarget {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let bind_fields = self.bind_fields();
        let message = self.message();
        let labels = match &self.tags.labels {
            Some(labels) => labels.to_token_stream(),
            None => quote! { [""] },
        };
        let help = self.tags.help.iter();
        let note = self.tags.note.iter();

        tokens.extend(quote! {
            fn build_report<'a>(
                &self,
                src_id: &'a str,
                spans: &[::std::ops::Range<usize>],
            ) -> ::ariadne::Report<(&'a str, ::std::ops::Range<usize>)> {
                #bind_fields

                let offset = spans.first().map_or(0, |span| span.start);
                let labels = #labels
                    .into_iter()
                    .zip(spans)
                    .map(|(text, span)| {
                        let label = ::ariadne::Label::new((src_id, span.clone()))
                            .with_color(::btm_error::EXPR);
                        if text.is_empty() {
                            label
                        } else {
                            label.with_message(text)
                        }
                    });

                let mut report = ::ariadne::Report::build(::ariadne::ReportKind::Error, src_id, offset)
                    .with_message(#message)
                    .with_labels(labels);
                #( report.set_help(#help); )*
                #( report.set_note(#note); )*
                report.finish()
            }
        });
    }
}
