//! Field contracts: the statically declared binding metadata of a target type.
//!
//! A [`Contract`] lists, in declaration order, how each field of a target
//! type maps to an external request value. Contracts are built once (usually
//! by `#[derive(Bind)]`) and shared read-only across binding calls.

use crate::coerce::Coercer;
use crate::error::{BindError, BindResult, ContractError, ValueOrigin};
use crate::{FieldValue, MediaType, ParamValue, TypeDescriptor};
use std::collections::HashSet;
use std::fmt;

/// Declarative binding metadata for one field.
///
/// # Example
///
/// ```rust
/// use reqbind::FieldSpec;
///
/// let spec = FieldSpec::new("favoriteNumbers").default_value("1,2,3");
/// assert_eq!(spec.name, "favoriteNumbers");
/// assert!(!spec.required);
/// assert_eq!(spec.default_value, "1,2,3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// External name used to look up the raw value.
    pub name: String,
    /// Whether absence is a violation.
    pub required: bool,
    /// Raw default used when the field is absent and not required; empty means none.
    pub default_value: String,
    /// Override for the missing-parameter message; empty means the external name.
    pub message: String,
}

impl FieldSpec {
    /// Creates an optional field with no default.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default_value: String::new(),
            message: String::new(),
        }
    }

    /// Sets whether the field is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the raw default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Sets the missing-parameter message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Returns the default to bind when the field is absent, if any.
    #[must_use]
    pub fn effective_default(&self) -> Option<&str> {
        (!self.required && !self.default_value.is_empty()).then_some(self.default_value.as_str())
    }
}

type Setter<T> = Box<dyn Fn(&mut T, ParamValue) -> Result<(), String> + Send + Sync>;

/// One field's spec, declared type, and assignment into the target.
pub struct FieldContract<T> {
    spec: FieldSpec,
    descriptor: TypeDescriptor,
    setter: Setter<T>,
}

impl<T> FieldContract<T> {
    /// Returns the declarative spec.
    #[must_use]
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Returns the external name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Coerces `raw` into the declared type and stores it in `target`.
    pub(crate) fn apply(
        &self,
        coercer: &Coercer,
        target: &mut T,
        raw: &[String],
        origin: ValueOrigin,
    ) -> BindResult<()> {
        let value = coercer
            .coerce(raw, &self.descriptor)
            .map_err(|e| e.into_bind_error(self.name(), origin))?;
        (self.setter)(target, value).map_err(|cause| BindError::invalid_value(self.name(), origin, cause))
    }

    /// Binds the effective default into `target`, if the field has one.
    ///
    /// Returns true if a default was applied.
    pub(crate) fn apply_default(&self, coercer: &Coercer, target: &mut T) -> BindResult<bool> {
        let Some(default) = self.spec.effective_default() else {
            return Ok(false);
        };
        self.apply(coercer, target, std::slice::from_ref(&default.to_string()), ValueOrigin::Default)?;
        Ok(true)
    }
}

impl<T> fmt::Debug for FieldContract<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldContract")
            .field("spec", &self.spec)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// The ordered field contracts of a target type plus its factory.
///
/// # Example
///
/// ```rust
/// use reqbind::{Contract, FieldSpec};
///
/// #[derive(Debug, Default)]
/// struct Paging {
///     page: i32,
///     tags: Vec<String>,
/// }
///
/// let contract = Contract::builder(Paging::default)
///     .field(FieldSpec::new("page").default_value("1"), |p: &mut Paging, v: i32| p.page = v)
///     .field(FieldSpec::new("tags"), |p: &mut Paging, v: Vec<String>| p.tags = v)
///     .build();
///
/// assert_eq!(contract.len(), 2);
/// assert_eq!(contract.field("tags").unwrap().descriptor().to_string(), "list<string>");
/// ```
pub struct Contract<T> {
    type_name: &'static str,
    factory: fn() -> T,
    fields: Vec<FieldContract<T>>,
    accepts: Vec<MediaType>,
}

impl<T: 'static> Contract<T> {
    /// Starts a contract whose target instances are created by `factory`.
    #[must_use]
    pub fn builder(factory: fn() -> T) -> ContractBuilder<T> {
        ContractBuilder {
            contract: Self {
                type_name: std::any::type_name::<T>(),
                factory,
                fields: Vec::new(),
                accepts: MediaType::ALL.to_vec(),
            },
        }
    }
}

impl<T> Contract<T> {
    /// Returns the Rust type name of the target, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the field contracts in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldContract<T>] {
        &self.fields
    }

    /// Returns the contract of the field with external name `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldContract<T>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the contract has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the body formats this target may be bound from.
    #[must_use]
    pub fn accepted(&self) -> &[MediaType] {
        &self.accepts
    }

    /// Returns true if bodies of `media_type` may be bound into this target.
    #[must_use]
    pub fn accepts(&self, media_type: MediaType) -> bool {
        self.accepts.contains(&media_type)
    }

    /// Creates a fresh target instance.
    #[must_use]
    pub fn instantiate(&self) -> T {
        (self.factory)()
    }

    /// Coerces and assigns every effective default into a scratch instance.
    ///
    /// Call this at startup to surface bad defaults before the first request.
    ///
    /// # Errors
    ///
    /// Returns the first invalid default as
    /// [`BindError::InvalidFieldValue`] with origin [`ValueOrigin::Default`],
    /// or [`BindError::UnsupportedFieldType`].
    pub fn verify_defaults(&self, coercer: &Coercer) -> BindResult<()> {
        let mut scratch = self.instantiate();
        for field in &self.fields {
            field.apply_default(coercer, &mut scratch)?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Contract<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Contract`].
#[derive(Debug)]
#[must_use]
pub struct ContractBuilder<T> {
    contract: Contract<T>,
}

impl<T: 'static> ContractBuilder<T> {
    /// Appends a field bound through `setter`.
    ///
    /// The field's declared type is taken from `V`.
    pub fn field<V, F>(mut self, spec: FieldSpec, setter: F) -> Self
    where
        V: FieldValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.contract.fields.push(FieldContract {
            spec,
            descriptor: V::descriptor(),
            setter: Box::new(move |target: &mut T, value: ParamValue| {
                setter(target, V::from_param(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Restricts the body formats this target may be bound from.
    pub fn accept(mut self, media_types: &[MediaType]) -> Self {
        self.contract.accepts = media_types.to_vec();
        self
    }

    /// Overrides the type name used in diagnostics.
    pub fn type_name(mut self, type_name: &'static str) -> Self {
        self.contract.type_name = type_name;
        self
    }

    /// Validates and returns the contract.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if a field name is empty or repeated.
    pub fn try_build(self) -> Result<Contract<T>, ContractError> {
        let mut seen = HashSet::with_capacity(self.contract.fields.len());
        for (position, field) in self.contract.fields.iter().enumerate() {
            if field.name().is_empty() {
                return Err(ContractError::EmptyName { position });
            }
            if !seen.insert(field.name()) {
                return Err(ContractError::DuplicateName {
                    name: field.name().to_string(),
                });
            }
        }
        Ok(self.contract)
    }

    /// Validates and returns the contract.
    ///
    /// # Panics
    ///
    /// Panics if a field name is empty or repeated. Contracts are static
    /// declarations, so this only fires on a programming error.
    #[must_use]
    pub fn build(self) -> Contract<T> {
        let type_name = self.contract.type_name;
        match self.try_build() {
            Ok(contract) => contract,
            Err(e) => panic!("invalid binding contract for {type_name}: {e}"),
        }
    }
}

/// A type with a statically declared binding contract.
///
/// Usually implemented with `#[derive(Bind)]`.
pub trait Bindable: Sized + 'static {
    /// Returns the shared contract of this type.
    fn contract() -> &'static Contract<Self>;
}
