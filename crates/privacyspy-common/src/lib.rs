pub mod api;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod markup;
pub mod nlp;
pub mod pipeline;
pub mod scorer;
pub mod weights;
