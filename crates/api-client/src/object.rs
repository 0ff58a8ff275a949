//! Lifecycle of one remote object: create, read, update, delete and import.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::ApiClient;
use crate::config::Operation;
use crate::error::{Error, Result};
use crate::payload::{self, JsonObject};

/// The known state of a remote object.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    /// Collection path the object was created under.
    pub path: String,
    /// Identifier assigned by the API.
    pub id: String,
    /// Last known representation.
    pub data: JsonObject,
}

impl RemoteObject {
    /// Read a field of the known state by `/`-delimited path.
    pub fn field(&self, path: &str) -> Option<&Value> {
        payload::lookup(&self.data, path).ok()
    }

    /// The known state as a JSON string.
    pub fn to_json(&self) -> String {
        Value::Object(self.data.clone()).to_string()
    }
}

/// An import identifier of the form `<path>,<identifier>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    pub path: String,
    pub id: String,
}

impl ImportId {
    /// Split on the first comma.
    pub fn parse(import_id: &str) -> Result<Self> {
        let (path, id) = import_id.split_once(',').ok_or_else(|| {
            Error::decoding(format!(
                "import identifier '{}' must have the form <path>,<identifier>",
                import_id
            ))
        })?;

        if path.is_empty() || id.is_empty() {
            return Err(Error::decoding(format!(
                "import identifier '{}' has an empty path or identifier",
                import_id
            )));
        }

        Ok(Self {
            path: path.to_string(),
            id: id.to_string(),
        })
    }
}

impl std::str::FromStr for ImportId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl ApiClient {
    fn object_path(&self, path: &str, id: &str) -> String {
        self.config().addressing.object_path(path, id)
    }

    async fn send_operation(&self, op: Operation, path: &str, body: &str) -> Result<String> {
        let method = self.config().method_for(op).clone();
        self.send_request(method.as_str(), path, body).await
    }

    /// Create an object under `path` and return its state.
    ///
    /// The identifier is taken from the response. The response becomes the
    /// state when the API returns full objects on create; otherwise the new
    /// object is read back.
    #[instrument(skip(self, body))]
    pub async fn create_object(&self, path: &str, body: &str) -> Result<RemoteObject> {
        let response = self.send_operation(Operation::Create, path, body).await?;
        let data = payload::decode_object(&response)?;
        let id = payload::lookup_string(&data, &self.config().id_attribute)?;
        debug!(id = %id, "Object created");

        if self.config().returns_object(Operation::Create) {
            return Ok(RemoteObject {
                path: path.to_string(),
                id,
                data,
            });
        }

        self.read_object(path, &id).await
    }

    /// Read the object `id` under `path`.
    #[instrument(skip(self))]
    pub async fn read_object(&self, path: &str, id: &str) -> Result<RemoteObject> {
        let body = self.config().read_data.clone().unwrap_or_default();
        let response = self
            .send_operation(Operation::Read, &self.object_path(path, id), &body)
            .await?;

        Ok(RemoteObject {
            path: path.to_string(),
            id: id.to_string(),
            data: payload::decode_object(&response)?,
        })
    }

    /// Send new data for a known object and return its updated state.
    ///
    /// Copy keys are carried from the known state into the outgoing body.
    #[instrument(skip(self, known, body), fields(path = %known.path, id = %known.id))]
    pub async fn update_object(&self, known: &RemoteObject, body: &str) -> Result<RemoteObject> {
        let body = payload::apply_copy_keys(body, &known.data, &self.config().copy_keys)?;
        let response = self
            .send_operation(
                Operation::Update,
                &self.object_path(&known.path, &known.id),
                &body,
            )
            .await?;

        if self.config().returns_object(Operation::Update) {
            return Ok(RemoteObject {
                path: known.path.clone(),
                id: known.id.clone(),
                data: payload::decode_object(&response)?,
            });
        }

        self.read_object(&known.path, &known.id).await
    }

    /// Delete a known object.
    #[instrument(skip(self, known), fields(path = %known.path, id = %known.id))]
    pub async fn delete_object(&self, known: &RemoteObject) -> Result<()> {
        let body = self.config().destroy_data.clone().unwrap_or_default();
        self.send_operation(
            Operation::Destroy,
            &self.object_path(&known.path, &known.id),
            &body,
        )
        .await?;
        debug!("Object deleted");
        Ok(())
    }

    /// Derive an object's state from an import identifier, by reading it.
    pub async fn import_object(&self, import_id: &str) -> Result<RemoteObject> {
        let ImportId { path, id } = ImportId::parse(import_id)?;
        self.read_object(&path, &id).await
    }
}
