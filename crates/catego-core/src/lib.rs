pub mod index;
pub mod request;

pub use index::{CategoryIndex, IndexError};
pub use request::{
    CategorizeRequest, CategorizeResponse, ErrorBody, Method, TextEntry, UnknownMethod,
};
