use crate::error::{Error, Result};
use crate::schema::Schema;
use indexmap::IndexMap;
use log::debug;

/// Highest numeric suffix tried before a name collision becomes an error
const MAX_SUFFIX: usize = 100;

/// Deduplicating store of named component schemas for one document.
///
/// Names are unique and never reassigned: registering a different shape
/// under a taken name yields `Name2`, `Name3`, ... or fails with
/// [`Error::SchemaNameCollision`] when suffixing is disabled or exhausted.
/// Shapes registered without a name are keyed by a structural hash, so
/// identical anonymous shapes share one entry.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Schema>,
    suffixing: bool,
}

impl SchemaRegistry {
    pub fn new(suffixing: bool) -> Self {
        Self {
            schemas: IndexMap::new(),
            suffixing,
        }
    }

    /// Store `shape` and return the token (component name) it is reachable under.
    pub fn register(&mut self, name_hint: Option<&str>, shape: Schema) -> Result<String> {
        let base = match name_hint {
            Some(name) => name.to_string(),
            None => anonymous_name(&shape)?,
        };

        match self.schemas.get(&base) {
            None => {
                debug!("Registering schema {}", base);
                self.schemas.insert(base.clone(), shape);
                return Ok(base);
            }
            Some(existing) if *existing == shape => return Ok(base),
            Some(_) => {}
        }

        if !self.suffixing {
            return Err(Error::SchemaNameCollision { name: base });
        }

        for suffix in 2..=MAX_SUFFIX {
            let candidate = format!("{}{}", base, suffix);
            match self.schemas.get(&candidate) {
                None => {
                    debug!("Schema name {} taken, registering as {}", base, candidate);
                    self.schemas.insert(candidate.clone(), shape);
                    return Ok(candidate);
                }
                Some(existing) if *existing == shape => return Ok(candidate),
                Some(_) => {}
            }
        }

        Err(Error::SchemaNameCollision { name: base })
    }

    /// The shape stored under `token`.
    pub fn resolve(&self, token: &str) -> Result<&Schema> {
        self.schemas
            .get(token)
            .ok_or_else(|| Error::unknown_reference(token))
    }

    /// A `$ref` schema pointing at `token`, which must be registered.
    pub fn reference_to(&self, token: &str) -> Result<Schema> {
        self.resolve(token)?;
        Ok(Schema::reference(token))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.schemas.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All registered schemas in registration order
    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}

/// `Schema` followed by the FNV-1a hash of the shape's canonical JSON
fn anonymous_name(shape: &Schema) -> Result<String> {
    let canonical = serde_json::to_string(shape)?;
    Ok(format!("Schema{:08x}", fnv1a(canonical.as_bytes()) as u32))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}
