pub mod emitters;
pub mod error;
pub mod generator;
pub mod type_mapper;

pub use emitters::TypeScriptRenderer;
pub use error::TypeScriptError;
pub use generator::TypeScriptGenerator;
