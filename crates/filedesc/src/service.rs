//! Service and method descriptors.

use crate::base::{impl_descriptor, Base};
use crate::descopts::{self, OptionsFn};
use crate::file::FileDescriptor;
use crate::list::Methods;
use crate::message::{MessageDescriptor, MessageRef};
use prost_types::{MethodOptions, ServiceOptions};
use std::fmt;
use std::sync::Arc;

/// Position of a service in its file's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(pub usize);

pub struct ServiceNode {
    pub base: Base,
}

#[derive(Default)]
pub struct ServiceL2 {
    pub options: Option<OptionsFn<ServiceOptions>>,
    pub methods: Vec<MethodNode>,
}

pub struct MethodNode {
    pub base: Base,
    pub options: Option<OptionsFn<MethodOptions>>,
    pub input: MessageRef,
    pub output: MessageRef,
    pub is_streaming_client: bool,
    pub is_streaming_server: bool,
}

// ============================================================================
// ServiceDescriptor
// ============================================================================

#[derive(Clone)]
pub struct ServiceDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) id: ServiceId,
}

impl ServiceDescriptor {
    pub(crate) fn new(file: FileDescriptor, id: ServiceId) -> Self {
        ServiceDescriptor { file, id }
    }

    pub fn id(&self) -> ServiceId {
        self.id
    }

    fn base(&self) -> &Base {
        &self.file.arena().services[self.id.0].base
    }

    fn lazy(&self) -> &ServiceL2 {
        &self.file.lazy_init().services[self.id.0]
    }

    pub fn options(&self) -> Arc<ServiceOptions> {
        descopts::resolve(self.lazy().options.as_ref(), &descopts::SERVICE)
    }

    pub fn methods(&self) -> Methods<'_> {
        Methods::new(&self.file, self.id, &self.lazy().methods)
    }
}

impl_descriptor!(ServiceDescriptor);

impl PartialEq for ServiceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.id == other.id
    }
}

impl Eq for ServiceDescriptor {}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceDescriptor")
            .field(&self.base().full_name.as_str())
            .finish()
    }
}

// ============================================================================
// MethodDescriptor
// ============================================================================

#[derive(Clone)]
pub struct MethodDescriptor {
    pub(crate) file: FileDescriptor,
    pub(crate) service: ServiceId,
    pub(crate) index: usize,
}

impl MethodDescriptor {
    pub(crate) fn new(file: FileDescriptor, service: ServiceId, index: usize) -> Self {
        MethodDescriptor {
            file,
            service,
            index,
        }
    }

    fn node(&self) -> &MethodNode {
        &self.file.lazy_init().services[self.service.0].methods[self.index]
    }

    fn base(&self) -> &Base {
        &self.node().base
    }

    pub fn options(&self) -> Arc<MethodOptions> {
        descopts::resolve(self.node().options.as_ref(), &descopts::METHOD)
    }

    pub fn input(&self) -> MessageDescriptor {
        self.node().input.resolve(&self.file)
    }

    pub fn output(&self) -> MessageDescriptor {
        self.node().output.resolve(&self.file)
    }

    pub fn is_streaming_client(&self) -> bool {
        self.node().is_streaming_client
    }

    pub fn is_streaming_server(&self) -> bool {
        self.node().is_streaming_server
    }
}

impl_descriptor!(MethodDescriptor);

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.file.ptr_eq(&other.file) && self.service == other.service && self.index == other.index
    }
}

impl Eq for MethodDescriptor {}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodDescriptor")
            .field(&self.base().full_name.as_str())
            .finish()
    }
}
