//! Live objects
//!
//! An [`Object`] is a live instance of a [`DataType`]: its own instance memory
//! group (one unset slot per visible property), an optional host-native
//! payload, and a per-object invocation lock.
//!
//! Objects are shared through [`ObjectRef`]; equality of references is
//! identity. The instance group is released when the last reference drops.
//! Objects that reference each other through fields are never released, as
//! there is no cycle collector.

use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use uuid::Uuid;

use dblang_core::{
    DataType, Error, FromNative, NativeValue, PropertyKey, QualifiedName, Result, Typed,
};
use dblang_memory::{GroupHandle, GroupId, GroupScope, MemoryArena};

/// Arena type holding every memory group of a runtime
pub type Memory = MemoryArena<ObjectRef>;

/// Unique object identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generate a fresh identity
    pub fn new() -> Self {
        ObjectId(Uuid::new_v4())
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live instance of a type
pub struct Object {
    id: ObjectId,
    ty: Arc<DataType>,
    payload: RwLock<Option<NativeValue>>,
    instance: GroupHandle<ObjectRef>,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Object {
    /// Create an instance of `ty` with every slot unset and no payload
    pub fn instantiate(memory: &Arc<Memory>, ty: Arc<DataType>) -> ObjectRef {
        let instance = memory.allocate_with(GroupScope::Instance, ty.properties().cloned());
        ObjectRef(Arc::new(Object {
            id: ObjectId::new(),
            ty,
            payload: RwLock::new(None),
            instance,
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }))
    }

    /// Create an instance of `ty` carrying `value` as its payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binding`] if `ty` does not accept the value's kind.
    pub fn bind(memory: &Arc<Memory>, ty: Arc<DataType>, value: NativeValue) -> Result<ObjectRef> {
        let object = Self::instantiate(memory, ty);
        object.try_set_payload(value)?;
        Ok(object)
    }

    /// Object identity
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Runtime type
    pub fn ty(&self) -> &Arc<DataType> {
        &self.ty
    }

    /// Instance memory group
    pub fn instance(&self) -> GroupId {
        self.instance.id()
    }

    /// Per-object invocation lock
    pub fn invocation_lock(&self) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(&self.lock)
    }

    /// Bind a native payload, replacing any prior one
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binding`] if the type has no binding constraint or
    /// the constraint does not accept the value's kind. The prior payload is
    /// kept on failure.
    pub fn try_set_payload(&self, value: NativeValue) -> Result<()> {
        let kind = value.kind();
        if !self.ty.is_compatible_native(kind) {
            return Err(Error::Binding {
                type_name: self.ty.name().to_string(),
                expected: self
                    .ty
                    .binding()
                    .map(|c| c.kind().to_string())
                    .unwrap_or_else(|| "no native binding".to_string()),
                actual: kind.to_string(),
            });
        }
        let previous = self.payload.write().replace(value);
        drop(previous);
        Ok(())
    }

    /// Whether a payload is bound
    pub fn has_payload(&self) -> bool {
        self.payload.read().is_some()
    }

    /// Copy of the bound payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binding`] if no payload is bound.
    pub fn payload_value(&self) -> Result<NativeValue> {
        self.payload
            .read()
            .clone()
            .ok_or_else(|| self.unbound("payload"))
    }

    /// Bound payload read as `T`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binding`] if no payload is bound or the stored kind
    /// is not `T`'s kind.
    pub fn payload<T: FromNative>(&self) -> Result<T> {
        let guard = self.payload.read();
        let value = guard
            .as_ref()
            .ok_or_else(|| self.unbound(&T::native_kind().to_string()))?;
        T::from_native(value).ok_or_else(|| Error::Binding {
            type_name: self.ty.name().to_string(),
            expected: T::native_kind().to_string(),
            actual: value.kind().to_string(),
        })
    }

    /// Bound opaque host payload downcast to `T`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binding`] if no payload is bound or it is not a `T`.
    pub fn host_payload<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        let guard = self.payload.read();
        let value = guard
            .as_ref()
            .ok_or_else(|| self.unbound(std::any::type_name::<T>()))?;
        value.downcast_host::<T>().ok_or_else(|| Error::Binding {
            type_name: self.ty.name().to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: value.kind().to_string(),
        })
    }

    fn unbound(&self, expected: &str) -> Error {
        Error::Binding {
            type_name: self.ty.name().to_string(),
            expected: expected.to_string(),
            actual: "no payload".to_string(),
        }
    }

    /// Visible property named `name`; private ones only with `include_private`
    pub fn member_key(&self, name: &str, include_private: bool) -> Result<PropertyKey> {
        self.ty
            .property(name, include_private)
            .cloned()
            .ok_or_else(|| Error::missing_key(format!("{}.{}", self.ty.name(), name)))
    }

    /// Read a field
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if the type has no such visible property.
    pub fn read_member(
        &self,
        memory: &Memory,
        name: &str,
        include_private: bool,
    ) -> Result<Option<ObjectRef>> {
        let key = self.member_key(name, include_private)?;
        memory.read(self.instance(), |g| g.get(&key))?
    }

    /// Write a field
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if the type has no such visible property
    /// and [`Error::TypeMismatch`] if `value`'s type does not satisfy it.
    pub fn write_member(
        &self,
        memory: &Memory,
        name: &str,
        include_private: bool,
        value: Option<ObjectRef>,
    ) -> Result<()> {
        let key = self.member_key(name, include_private)?;
        let mut value = value;
        let result = memory.write(self.instance(), |g| g.replace(&key, &mut value));
        drop(value);
        result?
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("type", &self.ty.name().as_str())
            .field("payload", &*self.payload.read())
            .finish()
    }
}

/// Shared reference to a live object; equality is identity
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

impl ObjectRef {
    /// Whether both references point at the same object
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for ObjectRef {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.0
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Typed for ObjectRef {
    fn type_name(&self) -> &QualifiedName {
        self.ty.name()
    }

    fn satisfies(&self, declared: &QualifiedName) -> bool {
        self.ty.is_named(declared)
    }
}
