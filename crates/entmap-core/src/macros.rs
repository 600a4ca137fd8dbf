/// Declare an entity subtype: a marker type plus its static model.
/// `MODEL` always points at the one `static`, so models compare by address.
///
/// ```ignore
/// entity! {
///     pub struct Book {
///         name: "Book",
///         identity: "id",
///         fields {
///             "id" => "id",
///             "title" => "title",
///             "author" => "author",
///             "authorData" => "authorData",
///         }
///         relations {
///             Author => "authorData": Single via "author",
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity {
    (@foreign_key) => {
        ::core::option::Option::None
    };
    (@foreign_key $fk:literal) => {
        ::core::option::Option::Some($fk)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            name: $entity_name:literal,
            identity: $identity:literal,
            fields { $( $storage:literal => $exposed:literal ),* $(,)? }
            $(
                relations {
                    $( $target:ty => $field:literal : $card:ident $( via $fk:literal )? ),* $(,)?
                }
            )?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
        $vis struct $name;

        impl $crate::traits::EntityKind for $name {
            const MODEL: &'static $crate::model::EntityModel = {
                static DECLARED: $crate::model::EntityModel = $crate::model::EntityModel {
                    entity_name: $entity_name,
                    identity_key: $identity,
                    fields: &[
                        $( $crate::model::FieldMapping::new($storage, $exposed) ),*
                    ],
                    relations: &[
                        $($(
                            $crate::model::RelationModel {
                                target: <$target as $crate::traits::EntityKind>::ENTITY_NAME,
                                field: $field,
                                cardinality: $crate::model::Cardinality::$card,
                                foreign_key: $crate::entity!(@foreign_key $($fk)?),
                            }
                        ),*)?
                    ],
                };

                &DECLARED
            };
        }
    };
}
