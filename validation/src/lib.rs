//! Structured request-body validation
//!
//! Turns a failed bind of a JSON body into a stable field → message map
//! instead of a single opaque error. Each input type declares its fields and
//! constraints in a [`FieldRule`] table; [`bind`] consults that table, so no
//! runtime reflection is involved.
//!
//! ```
//! use serde::Deserialize;
//! use validation::{bind, Constraint, FieldRule, InputShape};
//!
//! #[derive(Debug, Deserialize)]
//! struct Login {
//!     email: String,
//!     password: String,
//! }
//!
//! impl InputShape for Login {
//!     const RULES: &'static [FieldRule] = &[
//!         FieldRule::text("email", &[Constraint::Required, Constraint::Email]),
//!         FieldRule::text("password", &[Constraint::Required]),
//!     ];
//! }
//!
//! let errors = bind::<Login>(br#"{"email": "nope"}"#).unwrap_err();
//! assert_eq!(errors.get("email"), Some("Must be a valid email address"));
//! assert_eq!(errors.get("password"), Some("This field is required"));
//!
//! let login = bind::<Login>(br#"{"email": "ann@x.com", "password": "secret123"}"#).unwrap();
//! assert_eq!(login.email, "ann@x.com");
//! ```

pub mod errors;
pub mod mapper;
pub mod rules;

pub use errors::ValidationErrors;
pub use errors::BODY_FIELD;
pub use mapper::bind;
pub use mapper::validate_input;
pub use mapper::InputShape;
pub use rules::Constraint;
pub use rules::DateLayout;
pub use rules::FieldKind;
pub use rules::FieldRule;
