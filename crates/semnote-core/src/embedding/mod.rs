//! Embedding models: the capability trait, its boxed wrapper, the model
//! catalog, provider configuration resolution and the backend factory.

pub mod box_model;
pub mod catalog;
pub mod factory;
pub mod model;
pub mod resolver;
