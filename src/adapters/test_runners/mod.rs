//! Dynamic test runner adapters.

pub mod cpp;
pub mod python;

pub use cpp::CppTestRunner;
pub use python::PythonTestRunner;
