use crate::models::{Wine, WineType};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

/// Payload for POST /addWine.
#[derive(Debug, Deserialize, Validate)]
pub struct NewWine {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(deserialize_with = "year_string")]
    #[validate(custom(function = validate_year))]
    pub year: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[serde(rename = "type", default)]
    pub wine_type: WineType,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
}

impl From<NewWine> for Wine {
    fn from(payload: NewWine) -> Self {
        Wine {
            id: None,
            name: payload.name,
            year: payload.year,
            country: payload.country,
            wine_type: payload.wine_type,
            description: payload.description,
            price: payload.price,
        }
    }
}

/// Partial-replacement payload for PUT /updateWine/:name. Only fields
/// present in the body end up in the `$set` document.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWine {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_year_string",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom(function = validate_year))]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Country must not be empty"))]
    pub country: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<WineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
}

impl UpdateWine {
    /// Serializes the supplied fields into a BSON document suitable for
    /// a `$set` update. Empty when the request body carried no fields.
    pub fn to_set_document(&self) -> Result<mongodb::bson::Document, mongodb::bson::ser::Error> {
        mongodb::bson::to_document(self)
    }
}

/// A wine as echoed to clients; strips the internal BSON `_id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WineResponse {
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

impl From<Wine> for WineResponse {
    fn from(wine: Wine) -> Self {
        Self {
            name: wine.name,
            year: wine.year,
            country: wine.country,
            wine_type: wine.wine_type,
            description: wine.description,
            price: wine.price,
        }
    }
}

fn validate_year(year: &str) -> Result<(), ValidationError> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("year");
        error.message = Some(format!("{} is not a valid year", year).into());
        Err(error)
    }
}

// The original clients send the year either as a number or a string;
// accept both and store the canonical string form.
#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Number(i64),
    Text(String),
}

impl From<YearRepr> for String {
    fn from(value: YearRepr) -> Self {
        match value {
            YearRepr::Number(n) => n.to_string(),
            YearRepr::Text(s) => s,
        }
    }
}

fn year_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    YearRepr::deserialize(deserializer).map(String::from)
}

fn optional_year_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<YearRepr>::deserialize(deserializer).map(|year| year.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> serde_json::Value {
        serde_json::json!({
            "name": "leBlanc",
            "year": "2022",
            "country": "germany",
            "type": "red",
            "description": "dry but not too dry",
            "price": 25
        })
    }

    #[test]
    fn accepts_a_valid_payload() {
        let payload: NewWine = serde_json::from_value(valid_payload()).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.year, "2022");
        assert_eq!(payload.price, Some(25.0));
    }

    #[test]
    fn year_may_be_a_number() {
        let mut body = valid_payload();
        body["year"] = serde_json::json!(2002);
        let payload: NewWine = serde_json::from_value(body).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.year, "2002");
    }

    #[test]
    fn rejects_a_malformed_year() {
        for bad in ["22", "20222", "twenty", "20a2"] {
            let mut body = valid_payload();
            body["year"] = serde_json::json!(bad);
            let payload: NewWine = serde_json::from_value(body).unwrap();
            assert!(payload.validate().is_err(), "year {:?} should fail", bad);
        }
    }

    #[test]
    fn rejects_a_negative_price() {
        let mut body = valid_payload();
        body["price"] = serde_json::json!(-1.5);
        let payload: NewWine = serde_json::from_value(body).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn type_defaults_to_red_when_omitted() {
        let mut body = valid_payload();
        body.as_object_mut().unwrap().remove("type");
        let payload: NewWine = serde_json::from_value(body).unwrap();
        assert_eq!(payload.wine_type, WineType::Red);
    }

    #[test]
    fn missing_required_field_fails_deserialization() {
        let mut body = valid_payload();
        body.as_object_mut().unwrap().remove("country");
        assert!(serde_json::from_value::<NewWine>(body).is_err());
    }

    #[test]
    fn set_document_contains_only_supplied_fields() {
        let update: UpdateWine =
            serde_json::from_value(serde_json::json!({ "price": 20, "type": "rose" })).unwrap();
        assert!(update.validate().is_ok());

        let doc = update.to_set_document().unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get_f64("price").unwrap(), 20.0);
        assert_eq!(doc.get_str("type").unwrap(), "rose");
    }

    #[test]
    fn empty_update_body_yields_an_empty_set_document() {
        let update: UpdateWine = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(update.to_set_document().unwrap().is_empty());
    }

    #[test]
    fn update_rejects_a_negative_price() {
        let update: UpdateWine =
            serde_json::from_value(serde_json::json!({ "price": -20 })).unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn response_strips_the_internal_id() {
        let wine = Wine {
            id: Some(mongodb::bson::oid::ObjectId::new()),
            name: "leBlanc".to_string(),
            year: "2022".to_string(),
            country: "germany".to_string(),
            wine_type: WineType::Rose,
            description: None,
            price: Some(20.0),
        };
        let body = serde_json::to_value(WineResponse::from(wine)).unwrap();
        assert!(body.get("_id").is_none());
        assert_eq!(body["type"], "rose");
        assert_eq!(body["price"], 20.0);
    }
}
