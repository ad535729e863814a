#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod constraint;
mod error;
mod graph;
mod model;
mod path;
mod report;
mod validator;
mod value;
pub mod vocab;

pub use crate::constraint::{Constraint, ConstraintComponent, NodeKind};
pub use crate::error::{ShaclError, ShaclParseError, ShaclValidationError};
pub use crate::model::{Shape, ShapeId, ShapesGraph, Target};
pub use crate::path::PropertyPath;
pub use crate::report::{Severity, ValidationReport, ValidationResult};
pub use crate::validator::ShaclValidator;
