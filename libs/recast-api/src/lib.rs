//! Value model, output records and reflection surface shared by every
//! recast crate.

pub mod error;
pub mod record;
pub mod reflect;
pub mod types;
pub mod value;

pub use error::{DataError, ErrorKind};
pub use record::{OrderedRecord, OrderedRecordProvider, Record, RecordProvider, provider_from_name};
pub use recast_derive::Reflect;
pub use reflect::{Describe, IntoValue, Member, MemberKind, Reflect, Shape};
pub use types::{ScalarKind, Type, TypedValue};
pub use value::{Map, Value};
