use serde_json::{Map, Number, Value};

use crate::form::FlightQuery;
use crate::variants::{FormVariant, WireType};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PayloadError {
    #[error("field {field} has no value")]
    MissingValue { field: &'static str },
    #[error("field {field} expects {expected}, got '{value}'")]
    InvalidNumber {
        field: &'static str,
        value: String,
        expected: WireType,
    },
}

/// Map a query onto the variant's wire schema.
///
/// Field names are the service's literal names. Numeric fields are parsed
/// from their string form; a value that does not parse is rejected here
/// instead of being sent as a meaningless number.
pub fn build_payload(
    variant: &FormVariant,
    query: &FlightQuery,
) -> Result<Map<String, Value>, PayloadError> {
    let mut payload = Map::new();

    for field in &variant.fields {
        let raw = query
            .get(field.name)
            .filter(|v| !v.is_empty())
            .ok_or(PayloadError::MissingValue { field: field.name })?;

        let invalid = || PayloadError::InvalidNumber {
            field: field.name,
            value: raw.to_string(),
            expected: field.wire_type,
        };

        let value = match field.wire_type {
            WireType::Text => Value::String(raw.to_string()),
            WireType::Int => {
                let n: i64 = raw.trim().parse().map_err(|_| invalid())?;
                Value::Number(n.into())
            }
            WireType::Float => {
                let n: f64 = raw.trim().parse().map_err(|_| invalid())?;
                Number::from_f64(n).map(Value::Number).ok_or_else(invalid)?
            }
        };
        payload.insert(field.wire_name.to_string(), value);
    }

    for (name, value) in &variant.constants {
        payload.insert(name.to_string(), Value::Number((*value).into()));
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::Catalog;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::new("http://cloud.test", "http://local.test")
    }

    #[test]
    fn test_render_cloud_wire_shape() {
        let variant = catalog().find("render-cloud").unwrap();
        let mut query = FlightQuery::empty(&variant);
        query.set("dayOfWeek", "6");
        query.set("day", "14");
        query.set("origin", "ATL");
        query.set("dest", "LAX");
        query.set("depDelay", "-5");

        let payload = build_payload(&variant, &query).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({
                "DayOfWeek": 6,
                "Origin": "ATL",
                "Dest": "LAX",
                "DepDelay": -5.0,
                "Month": 3,
                "Day": 14,
            })
        );
    }

    #[test]
    fn test_local_wire_shape() {
        let variant = catalog().find("local").unwrap();
        let mut query = FlightQuery::empty(&variant);
        query.set("dayOfMonth", "28");
        query.set("airline", "WN");
        query.set("tailNumber", "N404WN");
        query.set("origin", "PHX");
        query.set("dest", "DEN");
        query.set("depHour", "19");
        query.set("isWeekend", "1");

        let payload = build_payload(&variant, &query).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({
                "DayofMonth": 28,
                "Operating_Airline": "WN",
                "Tail_Number": "N404WN",
                "Origin": "PHX",
                "Dest": "DEN",
                "DepHour": 19,
                "IsWeekend": 1,
            })
        );
    }

    #[test]
    fn test_malformed_number_rejected() {
        let variant = catalog().find("render-cloud").unwrap();
        let mut query = FlightQuery::empty(&variant);
        query.set("dayOfWeek", "Friday");
        query.set("day", "14");
        query.set("origin", "ATL");
        query.set("dest", "LAX");
        query.set("depDelay", "10");

        assert_eq!(
            build_payload(&variant, &query).unwrap_err(),
            PayloadError::InvalidNumber {
                field: "dayOfWeek",
                value: "Friday".to_string(),
                expected: WireType::Int,
            }
        );
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let variant = catalog().find("render-cloud").unwrap();
        let mut query = FlightQuery::empty(&variant);
        query.set("dayOfWeek", "1");
        query.set("day", "1");
        query.set("origin", "ATL");
        query.set("dest", "LAX");
        query.set("depDelay", "NaN");

        assert!(matches!(
            build_payload(&variant, &query),
            Err(PayloadError::InvalidNumber { field: "depDelay", .. })
        ));
    }

    #[test]
    fn test_missing_value_rejected() {
        let variant = catalog().find("local").unwrap();
        let query = FlightQuery::empty(&variant);
        assert_eq!(
            build_payload(&variant, &query).unwrap_err(),
            PayloadError::MissingValue {
                field: "dayOfMonth"
            }
        );
    }
}
