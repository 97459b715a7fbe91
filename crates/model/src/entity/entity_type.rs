//! Entity types and their builder
//!
//! A type is declared once through [`EntityTypeBuilder`]. Building resolves
//! every field into an attribute descriptor, merges the parent's slots with
//! the declared ones, and links the new type under its parent so resolved
//! names can be walked downwards during decode.

use std::cell::{OnceCell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::attribute::{resolver, Attribute, Field, FieldMeta};
use crate::config::{ModelConfig, Validation};
use crate::error::ModelError;
use crate::factory::Builder;
use crate::store::EntityStore;
use crate::value::{Map, Value};

use super::{identity_token, Entity, WeakEntity, IDENTITY_SLOT, RESOLVED_NAME_KEY};

/// Hook run on every new instance after its fields are applied.
pub type Initializer = Rc<dyn Fn(&Entity) -> Result<(), ModelError>>;

/// A concrete or abstract entity type.
pub struct EntityType {
    name: String,
    resolved_name: String,
    parent: Option<Rc<EntityType>>,
    declared: Vec<Rc<Attribute>>,
    attributes: Vec<Rc<Attribute>>,
    index: HashMap<String, usize>,
    metadata: OnceCell<BTreeMap<String, FieldMeta>>,
    validation: Validation,
    initializer: Option<Initializer>,
    children: RefCell<Vec<Weak<EntityType>>>,
    instances: RefCell<Vec<WeakEntity>>,
    store: RefCell<Option<Rc<dyn EntityStore>>>,
}

impl EntityType {
    pub fn builder(name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dot-joined chain of type names from the root to this type.
    pub fn resolved_name(&self) -> &str {
        &self.resolved_name
    }

    pub fn parent(&self) -> Option<&Rc<EntityType>> {
        self.parent.as_ref()
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// All slots, root to leaf, with redeclared slots replaced in place.
    pub fn attributes(&self) -> &[Rc<Attribute>] {
        &self.attributes
    }

    /// Slots declared by this type itself.
    pub fn declared_attributes(&self) -> &[Rc<Attribute>] {
        &self.declared
    }

    pub fn attribute(&self, name: &str) -> Option<&Rc<Attribute>> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|attr| attr.name())
    }

    /// Slot names decode passes to the constructor.
    pub fn init_params(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|attr| attr.is_init())
            .map(|attr| attr.name())
    }

    /// True for this type and every type it descends from.
    pub fn is_subtype_of(&self, other: &EntityType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if std::ptr::eq(ty, other) {
                return true;
            }
            current = ty.parent.as_deref();
        }
        false
    }

    fn chain(&self) -> Vec<&EntityType> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            chain.push(ty);
            current = ty.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    pub fn root(self: &Rc<Self>) -> Rc<EntityType> {
        let mut current = self.clone();
        while let Some(parent) = current.parent.clone() {
            current = parent;
        }
        current
    }

    /// Live direct subtypes.
    pub fn children(&self) -> Vec<Rc<EntityType>> {
        let mut children = self.children.borrow_mut();
        children.retain(|child| child.strong_count() > 0);
        children.iter().filter_map(Weak::upgrade).collect()
    }

    /// Depth-first search of this type and its subtypes, case-insensitive.
    pub fn find_subtype(self: &Rc<Self>, name: &str) -> Option<Rc<EntityType>> {
        if self.name.eq_ignore_ascii_case(name) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find_subtype(name))
    }

    /// Walk a resolved name from this type's root, component by component.
    pub fn resolve_name(self: &Rc<Self>, dotted: &str) -> Result<Rc<EntityType>, ModelError> {
        let components: Vec<&str> = dotted.split('.').collect();
        let (first, rest) = components
            .split_first()
            .ok_or_else(|| ModelError::unresolved(dotted, dotted))?;
        let start = self
            .root()
            .find_subtype(first)
            .ok_or_else(|| ModelError::unresolved(dotted, *first))?;
        descend(start, rest, dotted)
    }

    /// Per-slot metadata merged across the ancestry, computed once.
    pub fn metadata(&self) -> &BTreeMap<String, FieldMeta> {
        self.metadata.get_or_init(|| {
            let mut merged = BTreeMap::new();
            for ty in self.chain() {
                for attr in &ty.declared {
                    if attr.meta().is_empty() {
                        merged.remove(attr.name());
                    } else {
                        merged.insert(attr.name().to_string(), attr.meta().clone());
                    }
                }
            }
            merged
        })
    }

    /// A builder bound to this type with no arguments.
    pub fn factory(self: &Rc<Self>) -> Builder {
        Builder::for_type(self)
    }

    /// Create an instance from initial values.
    ///
    /// Unknown keys and missing required slots are rejected before anything
    /// is written. Values are then applied in declaration order; a failing
    /// write aborts construction with earlier writes already applied to the
    /// discarded instance.
    pub fn construct(self: &Rc<Self>, mut values: Map) -> Result<Entity, ModelError> {
        if let Some(unknown) = values.keys().find(|key| !self.index.contains_key(key.as_str())) {
            return Err(ModelError::unknown_field(&self.name, unknown));
        }
        if let Some(missing) = self
            .attributes
            .iter()
            .find(|attr| attr.is_required() && !values.contains_key(attr.name()))
        {
            return Err(ModelError::missing_required(&self.name, missing.name()));
        }

        let entity = Entity::blank(self.clone());
        for attr in &self.attributes {
            if let Some(value) = values.remove(attr.name()) {
                entity.set(attr.name(), value)?;
            }
        }
        if self.index.contains_key(IDENTITY_SLOT) && !entity.is_frozen(IDENTITY_SLOT) {
            entity.set(IDENTITY_SLOT, identity_token())?;
        }
        for ty in self.chain() {
            if let Some(init) = &ty.initializer {
                init(&entity)?;
            }
        }
        for ty in self.chain() {
            ty.instances.borrow_mut().push(entity.downgrade());
        }
        Ok(entity)
    }

    /// Live instances of this type and its subtypes, as a snapshot.
    pub fn instances(&self) -> Vec<Entity> {
        let mut live = Vec::new();
        self.instances.borrow_mut().retain(|weak| match weak.upgrade() {
            Some(entity) => {
                live.push(entity);
                true
            }
            None => false,
        });
        live
    }

    /// Attach a persistence store consulted by [`find_by_id`](Self::find_by_id)
    /// for this type and its subtypes.
    pub fn attach_store(&self, store: Rc<dyn EntityStore>) {
        *self.store.borrow_mut() = Some(store);
    }

    /// The nearest attached store in the ancestry.
    pub fn store(&self) -> Option<Rc<dyn EntityStore>> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(store) = ty.store.borrow().as_ref() {
                return Some(store.clone());
            }
            current = ty.parent.as_deref();
        }
        None
    }

    /// Resolve an identity token: live instances first, then the store.
    pub fn find_by_id(self: &Rc<Self>, id: &str) -> Result<Entity, ModelError> {
        if let Some(entity) = self.instances().into_iter().find(|e| e.id() == id) {
            return Ok(entity);
        }
        if let Some(store) = self.store() {
            if let Some(data) = store.fetch(&self.resolved_name, id)? {
                debug!(type_name = %self.resolved_name, id, "Loaded entity from store");
                return self.from_dict(&data);
            }
        }
        Err(ModelError::reference_not_found(&self.name, id))
    }
}

/// Follow `components` downwards from `start`, one subtype search each.
pub(crate) fn descend(
    start: Rc<EntityType>,
    components: &[&str],
    dotted: &str,
) -> Result<Rc<EntityType>, ModelError> {
    components.iter().try_fold(start, |current, component| {
        current
            .children()
            .iter()
            .find_map(|child| child.find_subtype(component))
            .ok_or_else(|| ModelError::unresolved(dotted, *component))
    })
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("resolved_name", &self.resolved_name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("validation", &self.validation)
            .finish()
    }
}

/// Declares an entity type.
///
/// ```ignore
/// let weapon = EntityType::builder("Weapon")
///     .extends(&item)
///     .field(Field::int("damage").range(0, 1000).required())
///     .build()?;
/// ```
pub struct EntityTypeBuilder {
    name: String,
    parent: Option<Rc<EntityType>>,
    fields: Vec<Field>,
    validation: Validation,
    freeze_all: bool,
    initializer: Option<Initializer>,
}

impl EntityTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            validation: Validation::default(),
            freeze_all: false,
            initializer: None,
        }
    }

    pub fn extends(mut self, parent: &Rc<EntityType>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn config(self, config: &ModelConfig) -> Self {
        self.validation(config.validation)
    }

    /// Freeze every slot this type declares after its first write.
    pub fn freeze_all(mut self) -> Self {
        self.freeze_all = true;
        self
    }

    pub fn on_init(mut self, init: impl Fn(&Entity) -> Result<(), ModelError> + 'static) -> Self {
        self.initializer = Some(Rc::new(init));
        self
    }

    pub fn build(self) -> Result<Rc<EntityType>, ModelError> {
        let Self {
            name,
            parent,
            fields,
            validation,
            freeze_all,
            initializer,
        } = self;

        if name.is_empty() || name.contains('.') {
            return Err(ModelError::invalid_definition(format!(
                "invalid entity type name '{name}'"
            )));
        }

        let mut declared_fields = Vec::with_capacity(fields.len() + 1);
        if parent.is_none() {
            declared_fields.push(
                Field::text(IDENTITY_SLOT)
                    .default_with(|| Value::Str(identity_token()))
                    .freeze()
                    .private(),
            );
        }
        for field in fields {
            if field.name() == IDENTITY_SLOT || field.name() == RESOLVED_NAME_KEY {
                return Err(ModelError::invalid_definition(format!(
                    "'{}' is reserved and cannot be declared on {name}",
                    field.name()
                )));
            }
            if declared_fields.iter().any(|f: &Field| f.name() == field.name()) {
                return Err(ModelError::invalid_definition(format!(
                    "'{}' declared twice on {name}",
                    field.name()
                )));
            }
            declared_fields.push(if freeze_all { field.freeze() } else { field });
        }

        let declared = declared_fields
            .into_iter()
            .map(|field| resolver::build_attribute(field, validation).map(Rc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let mut attributes = parent
            .as_ref()
            .map(|p| p.attributes.clone())
            .unwrap_or_default();
        let mut index: HashMap<String, usize> = parent
            .as_ref()
            .map(|p| p.index.clone())
            .unwrap_or_default();
        for attr in &declared {
            match index.get(attr.name()) {
                Some(&i) => attributes[i] = attr.clone(),
                None => {
                    index.insert(attr.name().to_string(), attributes.len());
                    attributes.push(attr.clone());
                }
            }
        }

        let resolved_name = match &parent {
            Some(p) => format!("{}.{}", p.resolved_name, name),
            None => name.clone(),
        };

        if !validation.is_enforced() {
            warn!(type_name = %resolved_name, "Entity type defined with validation skipped");
        }
        debug!(
            type_name = %resolved_name,
            declared = declared.len(),
            slots = attributes.len(),
            "Defined entity type"
        );

        let ty = Rc::new(EntityType {
            name,
            resolved_name,
            parent,
            declared,
            attributes,
            index,
            metadata: OnceCell::new(),
            validation,
            initializer,
            children: RefCell::new(Vec::new()),
            instances: RefCell::new(Vec::new()),
            store: RefCell::new(None),
        });
        if let Some(parent) = &ty.parent {
            parent.children.borrow_mut().push(Rc::downgrade(&ty));
        }
        Ok(ty)
    }
}
