#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod document;
mod error;
mod resolver;
pub mod vocab;

pub use crate::document::{file_base_iri, parse_document};
pub use crate::error::ImportError;
pub use crate::resolver::{ShapesLoader, import_target, is_directive, load_shapes, resolve};
