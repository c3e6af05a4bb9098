use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WineType {
    #[default]
    Red,
    White,
    Rose,
}

/// A wine document as stored in the `wines` collection. The `_id` is
/// driver-assigned; lookups key on `name`, which carries a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wine {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub year: String,
    pub country: String,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}
