//! Schema-less resource description
//!
//! [`DynamicResource`] addresses any collection by path and carries its
//! attributes as a JSON map. It is what the CLI drives the engine with, and
//! a reference for implementing the hook traits.

use super::hooks::{PaginationSupportHook, RequestBodyHook, ResponseDecodeHook};
use super::types::{Endpoint, Object};
use crate::context::OperationContext;
use crate::error::{Error, Result};
use crate::identifier::{Describe, Fields};
use crate::types::{JsonObject, JsonValue, Operation};
use serde::{Deserialize, Serialize};

/// Attribute key the identifier is read back from after decoding
const IDENTIFIER_KEY: &str = "identifier";

/// A resource known only by its collection path and JSON attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicResource {
    #[serde(skip)]
    path: String,
    #[serde(skip)]
    identifier: String,
    #[serde(skip)]
    filters: Vec<(String, String)>,
    #[serde(skip)]
    unpaged: bool,
    #[serde(flatten)]
    attributes: JsonObject,
}

impl DynamicResource {
    /// A resource in the collection at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Replace the attributes; fails unless `attributes` is a JSON object
    pub fn with_attributes(mut self, attributes: JsonValue) -> Result<Self> {
        self.attributes = into_object(attributes)?;
        Ok(self)
    }

    /// Add a List filter query parameter
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Declare the collection as not paginated
    #[must_use]
    pub fn unpaged(mut self) -> Self {
        self.unpaged = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn attributes(&self) -> &JsonObject {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.attributes.get(key)
    }
}

fn into_object(value: JsonValue) -> Result<JsonObject> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(Error::decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

impl Describe for DynamicResource {
    fn fields(&self) -> Fields<'_> {
        Fields::new().identifier(IDENTIFIER_KEY, &self.identifier)
    }
}

impl Object for DynamicResource {
    fn endpoint_url(&self, ctx: &OperationContext) -> Result<Endpoint> {
        let endpoint: Endpoint = self.path.parse()?;
        if ctx.operation() == Operation::List {
            Ok(endpoint.extend_query(self.filters.iter().cloned()))
        } else {
            Ok(endpoint)
        }
    }

    fn as_request_body_hook(&self) -> Option<&dyn RequestBodyHook> {
        Some(self)
    }

    fn as_response_decode_hook(&mut self) -> Option<&mut dyn ResponseDecodeHook> {
        Some(self)
    }

    fn as_pagination_support_hook(&self) -> Option<&dyn PaginationSupportHook> {
        Some(self)
    }
}

impl RequestBodyHook for DynamicResource {
    fn request_body(&self, _ctx: &OperationContext) -> Result<JsonValue> {
        Ok(JsonValue::Object(self.attributes.clone()))
    }
}

impl ResponseDecodeHook for DynamicResource {
    fn decode_response(&mut self, _ctx: &OperationContext, body: &[u8]) -> Result<()> {
        self.attributes = into_object(serde_json::from_slice(body)?)?;
        if let Some(JsonValue::String(id)) = self.attributes.get(IDENTIFIER_KEY) {
            self.identifier.clone_from(id);
        }
        Ok(())
    }
}

impl PaginationSupportHook for DynamicResource {
    fn has_pagination(&self, _ctx: &OperationContext) -> Result<bool> {
        Ok(!self.unpaged)
    }
}
