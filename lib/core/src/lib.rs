//! # vismatch Core
//!
//! Core types for the vismatch visual product search engine.
//!
//! - [`FeatureVector`] - Fixed-length image descriptor
//! - [`CatalogItem`] - A product with an image reference and optional persisted features
//! - [`EngineConfig`] - Timeouts, concurrency and batch settings
//! - [`Error`] - Error taxonomy shared by every vismatch crate
//!
//! ## Example
//!
//! ```rust
//! use vismatch_core::{CatalogItem, FeatureVector};
//!
//! let item = CatalogItem::new(1, "Canvas Sneaker", "Footwear", 59.9, "images/1.jpg")
//!     .with_features(FeatureVector::new(vec![0.5; 64]));
//! assert_eq!(item.persisted_features().map(|f| f.dim()), Some(64));
//! ```

pub mod config;
pub mod error;
pub mod item;
pub mod vector;

pub use config::EngineConfig;
pub use error::{Error, ErrorKind, ErrorResponse, Result};
pub use item::{CatalogItem, ItemId};
pub use vector::{FeatureVector, FEATURE_DIM};
