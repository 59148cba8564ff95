//! Empty options sentinels, one per descriptor kind.
//!
//! Descriptors that declare no options answer `options()` with these shared
//! instances, so callers can compare by pointer to tell "nothing declared"
//! from "declared but empty".

use prost_types::{
    EnumOptions, EnumValueOptions, ExtensionRangeOptions, FieldOptions, FileOptions,
    MessageOptions, MethodOptions, OneofOptions, ServiceOptions,
};
use std::sync::{Arc, LazyLock};

/// A deferred options accessor as supplied by the builder.
pub type OptionsFn<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;

/// Wrap already-decoded options in an accessor.
pub fn constant<T: Send + Sync + 'static>(options: T) -> OptionsFn<T> {
    let options = Arc::new(options);
    Arc::new(move || Arc::clone(&options))
}

pub(crate) fn resolve<T>(f: Option<&OptionsFn<T>>, sentinel: &Arc<T>) -> Arc<T> {
    match f {
        Some(f) => f(),
        None => Arc::clone(sentinel),
    }
}

pub static FILE: LazyLock<Arc<FileOptions>> = LazyLock::new(Default::default);
pub static MESSAGE: LazyLock<Arc<MessageOptions>> = LazyLock::new(Default::default);
pub static FIELD: LazyLock<Arc<FieldOptions>> = LazyLock::new(Default::default);
pub static ONEOF: LazyLock<Arc<OneofOptions>> = LazyLock::new(Default::default);
pub static EXTENSION_RANGE: LazyLock<Arc<ExtensionRangeOptions>> =
    LazyLock::new(Default::default);
pub static ENUM: LazyLock<Arc<EnumOptions>> = LazyLock::new(Default::default);
pub static ENUM_VALUE: LazyLock<Arc<EnumValueOptions>> = LazyLock::new(Default::default);
pub static SERVICE: LazyLock<Arc<ServiceOptions>> = LazyLock::new(Default::default);
pub static METHOD: LazyLock<Arc<MethodOptions>> = LazyLock::new(Default::default);
