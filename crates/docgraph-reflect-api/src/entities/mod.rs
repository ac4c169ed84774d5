mod class;
mod member;
mod namespace;
mod object;
mod overrides;
mod signature;

pub use class::ClassInfo;
pub use member::{is_public, MemberInfo, MemberKind, RoutineDecorator};
pub use namespace::NamespaceInfo;
pub use object::{ObjectId, TypeRef};
pub use overrides::OverrideValue;
pub use signature::{ParamKind, Parameter, Signature};
