//! Provider functions

mod unsafe_parse_jwt;

pub use unsafe_parse_jwt::{parse_claims, UnsafeParseJwt};
