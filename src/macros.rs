/// Declare a property set: a struct of optional fields plus its closed tag
/// and property enums.
///
/// ```
/// portal::property_set! {
///     /// Content of a text field.
///     pub struct TextFieldContent / TextFieldTag / TextFieldProperty {
///         text: String => Text,
///         placeholder: String => Placeholder,
///     }
/// }
///
/// let content = TextFieldContent {
///     text: Some("hello".into()),
///     ..Default::default()
/// };
/// assert_eq!(content.placeholder, None);
/// ```
///
/// Field order is schema order. Every generated match is exhaustive, so
/// adding a field updates tags, diffing and patching together. Field types
/// must implement `Eq`; wrap floats in a type with total equality.
#[macro_export]
macro_rules! property_set {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident / $tag:ident / $prop:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty => $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: ::std::option::Option<$ty>,
            )*
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $tag {
            $( $variant, )*
        }

        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $prop {
            $( $variant($ty), )*
        }

        impl $crate::changeset::PropertySet for $name {
            type Tag = $tag;
            type Property = $prop;

            const TAGS: &'static [$tag] = &[ $( $tag::$variant, )* ];

            fn tag_of(property: &$prop) -> $tag {
                match property {
                    $( $prop::$variant(_) => $tag::$variant, )*
                }
            }

            fn get(&self, tag: $tag) -> ::std::option::Option<$prop> {
                match tag {
                    $( $tag::$variant => self.$field.clone().map($prop::$variant), )*
                }
            }

            fn is_set(&self, tag: $tag) -> bool {
                match tag {
                    $( $tag::$variant => self.$field.is_some(), )*
                }
            }

            fn differs(&self, other: &Self, tag: $tag) -> bool {
                match tag {
                    $( $tag::$variant => self.$field != other.$field, )*
                }
            }

            fn set(&mut self, property: $prop) {
                match property {
                    $( $prop::$variant(value) => self.$field = ::std::option::Option::Some(value), )*
                }
            }

            fn unset(&mut self, tag: $tag) {
                match tag {
                    $( $tag::$variant => self.$field = ::std::option::Option::None, )*
                }
            }
        }
    };
}
