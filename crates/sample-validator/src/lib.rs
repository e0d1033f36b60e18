//! Sample Validation
//!
//! Range checking and sanity validation for metric samples before they reach
//! the detection pipeline. A sample failing any check is rejected whole.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{SampleValidator, ValidationConfig};
