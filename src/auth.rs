//! Auth-domain identifiers, scopes, token sets, userinfo, and canonical results.

pub mod id;
pub mod result;
pub mod scope;
pub mod token;
pub mod userinfo;

pub use id::*;
pub use result::*;
pub use scope::*;
pub use token::{secret::*, set::*};
pub use userinfo::*;
