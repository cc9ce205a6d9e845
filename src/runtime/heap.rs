/*!
 * Managed Heap
 * In-process object model: UTF-16 strings, reference arrays, classes with
 * static fields
 */

use super::descriptor::FieldType;
use super::ManagedEnv;
use crate::core::{ClassRef, FieldId, InlineString, ObjectRef, RuntimeError, RuntimeResult};
use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::ops::BitOr;
use tracing::debug;

pub const OBJECT_CLASS: &str = "java/lang/Object";
pub const STRING_CLASS: &str = "java/lang/String";
pub const SYSTEM_CLASS: &str = "java/lang/System";
const INPUT_STREAM_CLASS: &str = "java/io/InputStream";
const PRINT_STREAM_CLASS: &str = "java/io/PrintStream";

/// Field access flags, using class-file bit values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const PUBLIC: Self = Self(0x0001);
    pub const STATIC: Self = Self(0x0008);
    pub const FINAL: Self = Self(0x0010);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Declarative class definition passed to [`Heap::define_class`]
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: InlineString,
    fields: Vec<(InlineString, InlineString, Modifiers)>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<InlineString>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a static field. `STATIC` is implied.
    ///
    /// If a name/descriptor pair is declared twice, the first declaration
    /// shadows the second.
    pub fn static_field(
        mut self,
        name: impl Into<InlineString>,
        descriptor: impl Into<InlineString>,
        modifiers: Modifiers,
    ) -> Self {
        self.fields
            .push((name.into(), descriptor.into(), modifiers | Modifiers::STATIC));
        self
    }
}

#[derive(Debug)]
enum HeapObject {
    Str(Box<[u16]>),
    Array {
        element: InlineString,
        slots: Box<[Option<ObjectRef>]>,
    },
    Instance {
        class: ClassRef,
    },
}

impl HeapObject {
    fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Array { .. } => "array",
            Self::Instance { .. } => "instance",
        }
    }
}

#[derive(Debug)]
struct StaticField {
    name: InlineString,
    descriptor: InlineString,
    ty: FieldType,
    modifiers: Modifiers,
    value: Option<ObjectRef>,
}

#[derive(Debug)]
struct ClassDef {
    name: InlineString,
    fields: Vec<StaticField>,
}

#[derive(Debug, Default)]
struct HeapState {
    objects: Vec<HeapObject>,
    classes: Vec<ClassDef>,
    class_index: HashMap<InlineString, ClassRef, RandomState>,
}

impl HeapState {
    fn object(&self, obj: ObjectRef) -> RuntimeResult<&HeapObject> {
        self.objects
            .get(obj.slot() as usize)
            .ok_or(RuntimeError::InvalidHandle(obj.slot()))
    }

    fn class(&self, class: ClassRef) -> RuntimeResult<&ClassDef> {
        self.classes
            .get(class.slot() as usize)
            .ok_or(RuntimeError::InvalidHandle(class.slot()))
    }

    fn push_class(&mut self, name: InlineString, fields: Vec<StaticField>) -> ClassRef {
        let class = ClassRef::from_slot(self.classes.len() as u32);
        self.class_index.insert(name.clone(), class);
        self.classes.push(ClassDef { name, fields });
        class
    }

    fn alloc(&mut self, object: HeapObject) -> ObjectRef {
        let slot = self.objects.len() as u32;
        self.objects.push(object);
        ObjectRef::from_slot(slot)
    }

    fn static_field(&self, class: ClassRef, field: FieldId) -> RuntimeResult<&StaticField> {
        if field.class != class {
            return Err(RuntimeError::InvalidHandle(field.index));
        }
        self.class(class)?
            .fields
            .get(field.index as usize)
            .ok_or(RuntimeError::InvalidHandle(field.index))
    }

    fn static_field_mut(
        &mut self,
        class: ClassRef,
        field: FieldId,
    ) -> RuntimeResult<&mut StaticField> {
        if field.class != class {
            return Err(RuntimeError::InvalidHandle(field.index));
        }
        self.classes
            .get_mut(class.slot() as usize)
            .ok_or(RuntimeError::InvalidHandle(class.slot()))?
            .fields
            .get_mut(field.index as usize)
            .ok_or(RuntimeError::InvalidHandle(field.index))
    }

    fn store_static(
        &mut self,
        class: ClassRef,
        field: FieldId,
        value: Option<ObjectRef>,
        honour_final: bool,
    ) -> RuntimeResult<()> {
        if let Some(obj) = value {
            self.object(obj)?;
        }
        let class_name = self.class(class)?.name.clone();
        let slot = self.static_field_mut(class, field)?;
        if !slot.ty.is_reference() {
            return Err(RuntimeError::wrong_kind(
                "reference field",
                slot.descriptor.as_str(),
            ));
        }
        if honour_final && slot.modifiers.contains(Modifiers::FINAL) {
            return Err(RuntimeError::IllegalAccess {
                class: class_name,
                name: slot.name.clone(),
            });
        }
        slot.value = value;
        Ok(())
    }
}

/// Managed heap shared behind a read/write lock
///
/// Objects are never collected; handles stay valid for the heap's lifetime.
#[derive(Debug)]
pub struct Heap {
    state: RwLock<HeapState>,
}

impl Heap {
    /// Heap with only `java/lang/Object` and `java/lang/String` loaded
    pub fn new() -> Self {
        let mut state = HeapState::default();
        for name in [OBJECT_CLASS, STRING_CLASS] {
            state.push_class(name.into(), Vec::new());
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Heap with `java/lang/System` and its standard-stream fields declared
    pub fn with_system_class() -> Self {
        let heap = Self::new();
        let stream = |name: &str, class: &str| StaticField {
            name: name.into(),
            descriptor: format!("L{};", class).into(),
            ty: FieldType::Object(class.into()),
            modifiers: Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL,
            value: None,
        };
        {
            let mut state = heap.state.write();
            state.push_class(INPUT_STREAM_CLASS.into(), Vec::new());
            state.push_class(PRINT_STREAM_CLASS.into(), Vec::new());
            state.push_class(
                SYSTEM_CLASS.into(),
                vec![
                    stream("in", INPUT_STREAM_CLASS),
                    stream("out", PRINT_STREAM_CLASS),
                    stream("err", PRINT_STREAM_CLASS),
                ],
            );
        }
        heap
    }

    /// Load a class, validating every field descriptor
    pub fn define_class(&self, builder: ClassBuilder) -> RuntimeResult<ClassRef> {
        let fields = builder
            .fields
            .into_iter()
            .map(|(name, descriptor, modifiers)| {
                let ty = FieldType::parse(&descriptor)?;
                Ok(StaticField {
                    name,
                    descriptor,
                    ty,
                    modifiers,
                    value: None,
                })
            })
            .collect::<RuntimeResult<Vec<_>>>()?;

        let mut state = self.state.write();
        if state.class_index.contains_key(builder.name.as_str()) {
            return Err(RuntimeError::DuplicateClass(builder.name));
        }
        debug!(class = %builder.name, fields = fields.len(), "class defined");
        Ok(state.push_class(builder.name, fields))
    }

    /// Allocate a plain instance of a loaded class
    pub fn new_instance(&self, class: ClassRef) -> RuntimeResult<ObjectRef> {
        let mut state = self.state.write();
        state.class(class)?;
        Ok(state.alloc(HeapObject::Instance { class }))
    }

    /// Allocate a string from raw UTF-16 units, which need not be well formed
    pub fn new_string_utf16(&self, units: &[u16]) -> ObjectRef {
        self.state.write().alloc(HeapObject::Str(units.into()))
    }

    /// Binary name of an object's runtime class (`[Ljava/lang/String;` for arrays)
    pub fn class_of(&self, obj: ObjectRef) -> RuntimeResult<String> {
        let state = self.state.read();
        match state.object(obj)? {
            HeapObject::Str(_) => Ok(STRING_CLASS.to_string()),
            HeapObject::Array { element, .. } => Ok(format!("[L{};", element)),
            HeapObject::Instance { class } => Ok(state.class(*class)?.name.to_string()),
        }
    }

    /// Managed-semantics static store: rejects writes to `final` fields
    pub fn put_static(
        &self,
        class: ClassRef,
        field: FieldId,
        value: Option<ObjectRef>,
    ) -> RuntimeResult<()> {
        self.state.write().store_static(class, field, value, true)
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.state.read().objects.len()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedEnv for Heap {
    fn find_class(&self, name: &str) -> RuntimeResult<ClassRef> {
        self.state
            .read()
            .class_index
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::ClassNotFound(name.into()))
    }

    fn class_name(&self, class: ClassRef) -> RuntimeResult<String> {
        Ok(self.state.read().class(class)?.name.to_string())
    }

    fn new_string(&self, text: &str) -> ObjectRef {
        let units: Box<[u16]> = text.encode_utf16().collect();
        self.state.write().alloc(HeapObject::Str(units))
    }

    fn string_chars(&self, string: Option<ObjectRef>) -> RuntimeResult<String> {
        let string = string.ok_or_else(|| RuntimeError::null_reference("string"))?;
        let state = self.state.read();
        let units = match state.object(string)? {
            HeapObject::Str(units) => units,
            other => return Err(RuntimeError::wrong_kind(STRING_CLASS, other.kind())),
        };

        let mut text = String::with_capacity(units.len());
        let mut index = 0;
        for decoded in char::decode_utf16(units.iter().copied()) {
            let ch = decoded.map_err(|_| RuntimeError::MalformedUtf16 { index })?;
            index += ch.len_utf16();
            text.push(ch);
        }
        Ok(text)
    }

    fn new_string_array(&self, len: usize) -> ObjectRef {
        self.state.write().alloc(HeapObject::Array {
            element: STRING_CLASS.into(),
            slots: vec![None; len].into_boxed_slice(),
        })
    }

    fn array_length(&self, array: ObjectRef) -> RuntimeResult<usize> {
        match self.state.read().object(array)? {
            HeapObject::Array { slots, .. } => Ok(slots.len()),
            other => Err(RuntimeError::wrong_kind("array", other.kind())),
        }
    }

    fn array_element(&self, array: ObjectRef, index: usize) -> RuntimeResult<Option<ObjectRef>> {
        match self.state.read().object(array)? {
            HeapObject::Array { slots, .. } => {
                slots
                    .get(index)
                    .copied()
                    .ok_or(RuntimeError::ArrayIndexOutOfBounds {
                        index,
                        len: slots.len(),
                    })
            }
            other => Err(RuntimeError::wrong_kind("array", other.kind())),
        }
    }

    fn set_array_element(
        &self,
        array: ObjectRef,
        index: usize,
        value: Option<ObjectRef>,
    ) -> RuntimeResult<()> {
        let mut state = self.state.write();
        let value_kind = match value {
            Some(obj) => Some(state.object(obj)?.kind()),
            None => None,
        };

        let slot = array.slot() as usize;
        match state.objects.get_mut(slot) {
            Some(HeapObject::Array { element, slots }) => {
                if let Some(kind) = value_kind {
                    if element.as_str() == STRING_CLASS && kind != "string" {
                        return Err(RuntimeError::ArrayStore {
                            element: element.clone(),
                            found: kind.into(),
                        });
                    }
                }
                let len = slots.len();
                let target = slots
                    .get_mut(index)
                    .ok_or(RuntimeError::ArrayIndexOutOfBounds { index, len })?;
                *target = value;
                Ok(())
            }
            Some(other) => Err(RuntimeError::wrong_kind("array", other.kind())),
            None => Err(RuntimeError::InvalidHandle(array.slot())),
        }
    }

    fn static_field_id(
        &self,
        class: ClassRef,
        name: &str,
        signature: &str,
    ) -> RuntimeResult<FieldId> {
        FieldType::parse(signature)?;
        let state = self.state.read();
        let def = state.class(class)?;
        def.fields
            .iter()
            .position(|f| f.name.as_str() == name && f.descriptor.as_str() == signature)
            .map(|index| FieldId {
                class,
                index: index as u32,
            })
            .ok_or_else(|| RuntimeError::NoSuchField {
                class: def.name.clone(),
                name: name.into(),
                signature: signature.into(),
            })
    }

    fn set_static_object_field(
        &self,
        class: ClassRef,
        field: FieldId,
        value: Option<ObjectRef>,
    ) -> RuntimeResult<()> {
        self.state.write().store_static(class, field, value, false)
    }

    fn get_static_object_field(
        &self,
        class: ClassRef,
        field: FieldId,
    ) -> RuntimeResult<Option<ObjectRef>> {
        Ok(self.state.read().static_field(class, field)?.value)
    }
}
