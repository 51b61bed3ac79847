use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// OpenAPI 3.0 Document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: InfoObject,
    #[serde(default)]
    pub paths: IndexMap<String, PathItemObject>,
    #[serde(default)]
    pub components: ComponentsObject,
}

/// Info Object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoObject {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Path Item Object: maps HTTP methods to operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItemObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<OperationObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationObject>,
}

/// Operation Object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationObject {
    pub summary: String,
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyObject>,
    pub responses: IndexMap<String, ResponseObject>,
}

/// Parameter Object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: serde_json::Value,
}

/// Request Body Object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBodyObject {
    pub required: bool,
    pub content: IndexMap<String, MediaTypeObject>,
}

/// Media Type Object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTypeObject {
    pub schema: serde_json::Value,
}

/// Response Object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseObject {
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeObject>,
}

/// Components Object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentsObject {
    #[serde(default)]
    pub schemas: IndexMap<String, serde_json::Value>,
}
