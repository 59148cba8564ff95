//! The file descriptor: root of the graph and owner of its deferred data.
//!
//! A file stores every descendant in flat arenas. The eager arenas
//! ([`FileL1`]) are filled by the builder up front: names, parents, nesting,
//! and the few fields that are cheap to compute. Everything else lives in
//! [`FileL2`], produced in a single pass by the builder's deferred routine the
//! first time any descendant needs it, and published as a whole.
//!
//! ```text
//!   File ─┬─ FileL1 ── arena { enums[], messages[], extensions[], services[] }
//!         │                       ▲ EnumId / MessageId / ... index these
//!         └─ LazyCell<FileL2> ── { options, imports,
//!                                  enums[], messages[], extensions[], services[] }
//!                                  (aligned with the L1 arenas by id)
//! ```

use crate::base::{self, AnyDescriptor, Descriptor, ParentRef};
use crate::descopts::{self, OptionsFn};
use crate::enums::{EnumDescriptor, EnumId, EnumL2, EnumNode};
use crate::extension::{ExtensionDescriptor, ExtensionId, ExtensionL2, ExtensionNode};
use crate::lazy::LazyCell;
use crate::list::{Enums, Extensions, FileImport, FileImports, Messages, Services};
use crate::message::{MessageDescriptor, MessageId, MessageL2, MessageNode};
use crate::service::{ServiceDescriptor, ServiceId, ServiceL2, ServiceNode};
use crate::types::{FullName, Syntax};
use prost_types::FileOptions;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// The builder's routine producing a file's deferred data.
///
/// It receives the file under construction so it can read eager state and
/// recognize references into the same file. It must not call any accessor
/// that reaches this file's deferred data.
pub type DeferredInit = Box<dyn FnOnce(&File) -> FileL2 + Send>;

// ============================================================================
// Storage
// ============================================================================

/// Eagerly initialized part of a file.
#[derive(Default)]
pub struct FileL1 {
    pub syntax: Syntax,
    pub path: String,
    pub package: FullName,

    /// Top-level declarations, in declaration order.
    pub enums: Vec<EnumId>,
    pub messages: Vec<MessageId>,
    pub extensions: Vec<ExtensionId>,
    pub services: Vec<ServiceId>,

    pub arena: Arena,
}

/// Every enum, message, extension and service declared in a file, at any
/// nesting depth. Ids index these vectors.
#[derive(Default)]
pub struct Arena {
    pub enums: Vec<EnumNode>,
    pub messages: Vec<MessageNode>,
    pub extensions: Vec<ExtensionNode>,
    pub services: Vec<ServiceNode>,
}

impl Arena {
    pub fn push_enum(&mut self, node: EnumNode) -> EnumId {
        self.enums.push(node);
        EnumId(self.enums.len() - 1)
    }

    pub fn push_message(&mut self, node: MessageNode) -> MessageId {
        self.messages.push(node);
        MessageId(self.messages.len() - 1)
    }

    pub fn push_extension(&mut self, node: ExtensionNode) -> ExtensionId {
        self.extensions.push(node);
        ExtensionId(self.extensions.len() - 1)
    }

    pub fn push_service(&mut self, node: ServiceNode) -> ServiceId {
        self.services.push(node);
        ServiceId(self.services.len() - 1)
    }
}

/// Lazily initialized part of a file. The per-kind vectors are aligned with
/// the [`Arena`] vectors of the same kind.
#[derive(Default)]
pub struct FileL2 {
    pub options: Option<OptionsFn<FileOptions>>,
    pub imports: Vec<FileImport>,
    pub enums: Vec<EnumL2>,
    pub messages: Vec<MessageL2>,
    pub extensions: Vec<ExtensionL2>,
    pub services: Vec<ServiceL2>,
}

#[derive(Debug, Clone, Copy)]
enum DeclRef {
    Enum(EnumId),
    Message(MessageId),
    Extension(ExtensionId),
    Service(ServiceId),
}

pub struct File {
    l1: FileL1,
    raw: Vec<u8>,
    surrogate: Option<FileDescriptor>,
    lazy: LazyCell<FileL2, DeferredInit>,
    names: OnceLock<HashMap<FullName, DeclRef>>,
}

impl File {
    /// A file whose deferred data is produced by `init` on first access.
    pub fn new(
        l1: FileL1,
        raw: Vec<u8>,
        init: impl FnOnce(&File) -> FileL2 + Send + 'static,
    ) -> FileDescriptor {
        let init: DeferredInit = Box::new(init);
        FileDescriptor(Arc::new(File {
            l1,
            raw,
            surrogate: None,
            lazy: LazyCell::new(init),
            names: OnceLock::new(),
        }))
    }

    /// A file constructed as a literal, with its deferred data supplied up front.
    pub fn ready(l1: FileL1, raw: Vec<u8>, l2: FileL2) -> FileDescriptor {
        let file = File {
            l1,
            raw,
            surrogate: None,
            lazy: LazyCell::ready(l2),
            names: OnceLock::new(),
        };
        file.check_aligned(file.lazy_init());
        FileDescriptor(Arc::new(file))
    }

    /// An arena for descriptors that have no real file and only need a syntax.
    pub fn new_standalone(syntax: Syntax, mut l1: FileL1, l2: FileL2) -> FileDescriptor {
        l1.syntax = syntax;
        let file = File {
            l1,
            raw: Vec::new(),
            surrogate: Some(base::surrogate(syntax).clone()),
            lazy: LazyCell::ready(l2),
            names: OnceLock::new(),
        };
        file.check_aligned(file.lazy_init());
        FileDescriptor(Arc::new(file))
    }

    pub(crate) fn surrogate(syntax: Syntax) -> FileDescriptor {
        FileDescriptor(Arc::new(File {
            l1: FileL1 {
                syntax,
                ..FileL1::default()
            },
            raw: Vec::new(),
            surrogate: None,
            lazy: LazyCell::ready(FileL2::default()),
            names: OnceLock::new(),
        }))
    }

    pub fn l1(&self) -> &FileL1 {
        &self.l1
    }

    pub fn syntax(&self) -> Syntax {
        match &self.surrogate {
            Some(s) => s.syntax(),
            None => self.l1.syntax,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.lazy.is_initialized()
    }

    /// The deferred data, running the builder's routine if nobody has yet.
    pub fn lazy_init(&self) -> &FileL2 {
        self.lazy.get_with(|init| {
            let started = Instant::now();
            let l2 = init(self);
            self.check_aligned(&l2);
            tracing::debug!(
                path = %self.l1.path,
                enums = l2.enums.len(),
                messages = l2.messages.len(),
                extensions = l2.extensions.len(),
                services = l2.services.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "initialized deferred descriptors"
            );
            l2
        })
    }

    fn check_aligned(&self, l2: &FileL2) {
        let arena = &self.l1.arena;
        assert!(
            l2.enums.len() == arena.enums.len()
                && l2.messages.len() == arena.messages.len()
                && l2.extensions.len() == arena.extensions.len()
                && l2.services.len() == arena.services.len(),
            "deferred data for {:?} does not match its declarations",
            self.l1.path
        );
    }

    fn names(&self) -> &HashMap<FullName, DeclRef> {
        self.names.get_or_init(|| {
            let arena = &self.l1.arena;
            let mut names = HashMap::new();
            for (i, n) in arena.enums.iter().enumerate() {
                names.insert(n.base.full_name.clone(), DeclRef::Enum(EnumId(i)));
            }
            for (i, n) in arena.messages.iter().enumerate() {
                names.insert(n.base.full_name.clone(), DeclRef::Message(MessageId(i)));
            }
            for (i, n) in arena.extensions.iter().enumerate() {
                names.insert(n.base.full_name.clone(), DeclRef::Extension(ExtensionId(i)));
            }
            for (i, n) in arena.services.iter().enumerate() {
                names.insert(n.base.full_name.clone(), DeclRef::Service(ServiceId(i)));
            }
            names
        })
    }

    fn lookup(&self, name: &str) -> Option<DeclRef> {
        self.names().get(name).copied()
    }

    pub fn find_enum_id(&self, name: &str) -> Option<EnumId> {
        match self.lookup(name)? {
            DeclRef::Enum(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_message_id(&self, name: &str) -> Option<MessageId> {
        match self.lookup(name)? {
            DeclRef::Message(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_extension_id(&self, name: &str) -> Option<ExtensionId> {
        match self.lookup(name)? {
            DeclRef::Extension(id) => Some(id),
            _ => None,
        }
    }

    pub fn find_service_id(&self, name: &str) -> Option<ServiceId> {
        match self.lookup(name)? {
            DeclRef::Service(id) => Some(id),
            _ => None,
        }
    }
}

// ============================================================================
// FileDescriptor
// ============================================================================

/// Shared handle to a [`File`].
#[derive(Clone)]
pub struct FileDescriptor(Arc<File>);

impl FileDescriptor {
    pub fn file(&self) -> &File {
        &self.0
    }

    pub fn ptr_eq(&self, other: &FileDescriptor) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn lazy_init(&self) -> &FileL2 {
        self.0.lazy_init()
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.0.l1.arena
    }

    /// `Some(self)` unless this is a surrogate or a standalone arena linked to one.
    pub(crate) fn real_file(&self) -> Option<FileDescriptor> {
        if self.0.surrogate.is_some() || self.is_surrogate() {
            None
        } else {
            Some(self.clone())
        }
    }

    pub fn is_surrogate(&self) -> bool {
        base::is_surrogate(&self.0)
    }

    pub fn is_initialized(&self) -> bool {
        self.0.is_initialized()
    }

    pub fn syntax(&self) -> Syntax {
        self.0.syntax()
    }

    pub fn path(&self) -> &str {
        &self.0.l1.path
    }

    pub fn package(&self) -> &FullName {
        &self.0.l1.package
    }

    pub fn options(&self) -> Arc<FileOptions> {
        descopts::resolve(self.lazy_init().options.as_ref(), &descopts::FILE)
    }

    pub fn imports(&self) -> FileImports<'_> {
        FileImports::new(&self.lazy_init().imports)
    }

    pub fn enums(&self) -> Enums<'_> {
        Enums::new(self, &self.0.l1.enums)
    }

    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self, &self.0.l1.messages)
    }

    pub fn extensions(&self) -> Extensions<'_> {
        Extensions::new(self, &self.0.l1.extensions)
    }

    pub fn services(&self) -> Services<'_> {
        Services::new(self, &self.0.l1.services)
    }

    /// The serialized descriptor this file was built from, verbatim.
    pub fn legacy_raw_descriptor(&self) -> &[u8] {
        &self.0.raw
    }

    /// Find a message declared anywhere in this file by full name.
    pub fn find_message(&self, name: &str) -> Option<MessageDescriptor> {
        let id = self.0.find_message_id(name)?;
        Some(MessageDescriptor::new(self.clone(), id))
    }

    pub fn find_enum(&self, name: &str) -> Option<EnumDescriptor> {
        let id = self.0.find_enum_id(name)?;
        Some(EnumDescriptor::new(self.clone(), id))
    }

    pub fn find_extension(&self, name: &str) -> Option<ExtensionDescriptor> {
        let id = self.0.find_extension_id(name)?;
        Some(ExtensionDescriptor::new(self.clone(), id))
    }

    pub fn find_service(&self, name: &str) -> Option<ServiceDescriptor> {
        let id = self.0.find_service_id(name)?;
        Some(ServiceDescriptor::new(self.clone(), id))
    }
}

impl Descriptor for FileDescriptor {
    fn full_name(&self) -> &FullName {
        self.package()
    }

    fn parent_file(&self) -> Option<FileDescriptor> {
        Some(self.clone())
    }

    fn parent(&self) -> Option<AnyDescriptor> {
        ParentRef::None.resolve(self)
    }

    fn index(&self) -> usize {
        0
    }

    fn syntax(&self) -> Syntax {
        FileDescriptor::syntax(self)
    }
}

impl PartialEq for FileDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for FileDescriptor {}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("path", &self.path())
            .field("package", &self.package().as_str())
            .field("syntax", &self.syntax())
            .finish()
    }
}
