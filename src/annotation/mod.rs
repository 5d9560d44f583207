//! Comments and folder messages.
//!
//! Folder comments, file comments and folder messages are one append-only
//! record type told apart by [`AnnotationTarget`].

mod repository;
pub mod service;

pub use repository::{
    Annotation, AnnotationKind, AnnotationRepository, AnnotationTarget, NewAnnotation,
};
