use crate::{model::EntityRegistry, record::RawRecord};

crate::entity! {
    /// Author fixture; storage names differ from exposed names.
    pub struct Author {
        name: "Author",
        identity: "id",
        fields {
            "id" => "id",
            "first_name" => "firstName",
            "last_name" => "lastName",
            "email" => "email",
        }
    }
}

crate::entity! {
    /// Book fixture with a single author relation resolved via `author`.
    pub struct Book {
        name: "Book",
        identity: "id",
        fields {
            "id" => "id",
            "title" => "title",
            "description" => "description",
            "author" => "author",
            "publisher" => "publisher",
            "topic" => "topic",
            "price" => "price",
            "authorData" => "authorData",
        }
        relations {
            Author => "authorData": Single via "author",
        }
    }
}

crate::entity! {
    /// Shelf fixture with a multiple-cardinality book relation.
    pub struct Shelf {
        name: "Shelf",
        identity: "id",
        fields {
            "id" => "id",
            "label" => "label",
            "books" => "books",
        }
        relations {
            Book => "books": Multiple via "book_ids",
        }
    }
}

crate::entity! {
    /// Three plain fields, for gap handling.
    pub struct Triple {
        name: "Triple",
        identity: "a",
        fields {
            "a" => "a",
            "b" => "b",
            "c" => "c",
        }
    }
}

/// Registry with every fixture entity.
pub fn registry() -> EntityRegistry {
    let mut registry = EntityRegistry::new();
    registry.register_kind::<Author>().expect("Author should register");
    registry.register_kind::<Book>().expect("Book should register");
    registry.register_kind::<Shelf>().expect("Shelf should register");
    registry.register_kind::<Triple>().expect("Triple should register");
    registry
}

pub fn author_record() -> RawRecord {
    RawRecord::new()
        .with("id", 101)
        .with("first_name", "Jerome")
        .with("last_name", "K. Jerome")
        .with("email", "jkj@hotmail.com")
}

pub fn book_record() -> RawRecord {
    RawRecord::new()
        .with("id", 201)
        .with("title", "Three Men In A Boat")
        .with("description", "Three Englishmen and one dog on the Thames.")
        .with("author", "101")
        .with("publisher", "Aziloth Books")
        .with("topic", "Comedy")
        .with("price", "5.99")
}
