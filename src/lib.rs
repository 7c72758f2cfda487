//! Core library for the slidedeck command line application.
//!
//! Decks are folders under a configurable root managed by
//! [`slidedeck::tools::store`]. Presentations are built from declarative
//! slide descriptors in [`slidedeck::tools::generate`], checked by
//! [`slidedeck::tools::validate`], and bundled for delivery by
//! [`slidedeck::tools::distribute`]. The PPTX codec lives under
//! [`slidedeck::tools::io`] and the document model inside
//! [`slidedeck::tools::model`]. [`slidedeck::tools::facade`] exposes all of
//! it as flat tool operations.

pub mod slidedeck;

pub use slidedeck::tools::{
    Result, ToolError, config, distribute, error, facade, generate, io, model, store, validate,
};
