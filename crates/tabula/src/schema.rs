//! Record kinds defined at runtime.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::fields::FieldMap;
use crate::policy::Policy;
use crate::record::{Record, RecordKind};

/// A named policy loaded at runtime, usable as a [`RecordKind`].
///
/// Cloning is cheap: the name and policy are shared.
///
/// ```
/// use tabula::{fields, Policy, Schema};
///
/// let schema = Schema::new("Point", Policy::new().with_fields(["x", "y"]));
/// let point = schema.record(fields! { "x" => 1 })?;
///
/// assert_eq!(point.to_string(), "<Point, {x: 1, y: null}>");
/// # Ok::<(), tabula::RecordError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

#[derive(PartialEq, Eq)]
struct SchemaInner {
    name: String,
    policy: Policy,
}

impl Schema {
    pub fn new(name: impl Into<String>, policy: Policy) -> Self {
        Self {
            inner: Arc::new(SchemaInner {
                name: name.into(),
                policy,
            }),
        }
    }

    /// Validates `raw` and builds a record of this schema.
    pub fn record(&self, raw: FieldMap) -> Result<Record<Schema>> {
        Record::new(self.clone(), (), raw)
    }
}

impl RecordKind for Schema {
    type Attributes = ();

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn policy(&self) -> &Policy {
        &self.inner.policy
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.inner.name)
            .field("policy", &self.inner.policy)
            .finish()
    }
}
