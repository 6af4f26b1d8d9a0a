//! Static analyzer adapters wrapping the external linters.

pub mod cpp;
pub mod python;

pub use cpp::CppAnalyzer;
pub use python::PythonAnalyzer;
