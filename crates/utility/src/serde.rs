pub mod date_time {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize as _, Deserializer};

    /// Parses an ISO-8601 timestamp. Values without an offset are read as UTC,
    /// a bare date as midnight UTC.
    pub fn parse_utc(s: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(date_time) = DateTime::parse_from_rfc3339(s) {
            return Ok(date_time.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("'{}' is not an ISO-8601 timestamp", s))
    }

    pub fn deserialize_utc_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse_utc(&s).map(Some).map_err(Error::custom),
            None => Ok(None),
        }
    }
}

/// Deserializers for sparse records: a missing value, `null` or a value of an
/// unexpected type all become `None` instead of an error.
///
/// Use together with `#[serde(default)]` so missing keys are accepted as well.
pub mod lenient {
    use serde::{de::DeserializeOwned, Deserialize as _, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(Option::<Value>::deserialize(deserializer)?
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Like `deserialize`, but also accepts numbers, which are kept in their
    /// textual form. Zip codes arrive both ways.
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Whole numbers, also when exported as a double like `2016.0`. Fractions
    /// and values out of range for `T` become `None`.
    pub fn integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
                        .map(|n| n as i64)
                })
                .and_then(|n| T::try_from(n).ok()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde::Deserialize;

    use super::{date_time, lenient};

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = date_time::parse_utc("2016-10-01T08:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2016, 10, 1, 6, 30, 0).unwrap());
    }

    #[test]
    fn parses_naive_values_as_utc() {
        assert_eq!(
            date_time::parse_utc("2016-10-01T08:30:00").unwrap(),
            Utc.with_ymd_and_hms(2016, 10, 1, 8, 30, 0).unwrap()
        );
        assert_eq!(
            date_time::parse_utc("2016-10-01").unwrap(),
            Utc.with_ymd_and_hms(2016, 10, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(date_time::parse_utc("yesterday").is_err());
    }

    #[derive(Deserialize)]
    struct Sparse {
        #[serde(default, deserialize_with = "lenient::deserialize")]
        rating: Option<f64>,
        #[serde(default, deserialize_with = "lenient::string")]
        zip: Option<String>,
        #[serde(default, deserialize_with = "lenient::integer")]
        year: Option<i32>,
    }

    #[test]
    fn lenient_fields_degrade_to_none() {
        let sparse: Sparse =
            serde_json::from_str(r#"{"rating": "five", "zip": [1]}"#).unwrap();
        assert_eq!(sparse.rating, None);
        assert_eq!(sparse.zip, None);

        let sparse: Sparse = serde_json::from_str(r#"{"rating": null}"#).unwrap();
        assert_eq!(sparse.rating, None);
        assert_eq!(sparse.zip, None);
    }

    #[test]
    fn lenient_fields_keep_valid_values() {
        let sparse: Sparse =
            serde_json::from_str(r#"{"rating": 4, "zip": 78701}"#).unwrap();
        assert_eq!(sparse.rating, Some(4.0));
        assert_eq!(sparse.zip.as_deref(), Some("78701"));
    }

    #[test]
    fn lenient_integers_accept_whole_doubles() {
        let sparse: Sparse = serde_json::from_str(r#"{"year": 2016.0}"#).unwrap();
        assert_eq!(sparse.year, Some(2016));

        let sparse: Sparse = serde_json::from_str(r#"{"year": 2016}"#).unwrap();
        assert_eq!(sparse.year, Some(2016));

        for json in [
            r#"{"year": 2016.5}"#,
            r#"{"year": "2016"}"#,
            r#"{"year": 1e12}"#,
        ] {
            let sparse: Sparse = serde_json::from_str(json).unwrap();
            assert_eq!(sparse.year, None, "{}", json);
        }
    }
}
