pub mod collection;

pub use collection::{Catalog, Collection, CollectionRef, InMemoryCatalog};
