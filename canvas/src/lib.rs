//! Annotation and signature canvas engine for rendered PDF documents.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! editing lifecycle over a multi-page document: translating raw DOM pointer
//! events into stroke/image mutations, mapping client coordinates into
//! document space, erasing, dragging, undo/redo, and painting each page from
//! a cached background bitmap plus its annotations. The host layer is
//! responsible for loading the document, wiring DOM events to the engine, and
//! submitting the final annotation set.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] tool state machine |
//! | [`doc`] | Annotation store: strokes, placed images, signer tags |
//! | [`camera`] | Client ↔ canvas ↔ document mapping, page geometry, display zoom |
//! | [`input`] | Tools, UI settings, and the gesture state |
//! | [`hit`] | Eraser and image hit-testing |
//! | [`history`] | Bounded undo/redo snapshot stack |
//! | [`cache`] | Per-page rasterized bitmap cache and the rasterizer trait |
//! | [`render`] | 2D-context painting and the JavaScript rasterizer bridge |
//! | [`consts`] | Shared numeric constants (history depth, eraser radius, zoom limits) |

pub mod cache;
pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod history;
pub mod input;
pub mod render;
