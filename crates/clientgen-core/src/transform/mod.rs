pub mod client_emitter;
pub mod conversion;
pub mod extension;
pub mod grouping;
pub mod name_normalizer;
pub mod operation_builder;
pub mod policy;
pub mod type_resolver;

pub use client_emitter::{ClientEmitter, ClientRenderer};
pub use conversion::ConversionEmitter;
pub use extension::ExtensionBundle;
pub use operation_builder::{OperationBuilder, prepare};
pub use policy::MaterializationPolicy;
pub use type_resolver::TypeResolver;
