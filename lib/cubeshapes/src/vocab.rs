//! Control vocabulary used by shape documents to compose each other.

pub mod code {
    //! The `https://code.described.at/` namespace.
    use oxrdf::NamedNodeRef;

    /// Links a document to another shape document that must be merged with it.
    pub const IMPORTS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://code.described.at/imports");
    /// Declares a code extension point. Never interpreted by the loader.
    pub const EXTENSION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://code.described.at/extension");
}
