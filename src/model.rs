use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::series::parse_time;

/// One row of `GetNodeListResult`.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    /// Every field the service returned for this node.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Node {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// One row of `GetChannelListResult`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Channel {
    pub name: String,
    /// Last reported value. The service encodes it as a string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub last_value: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Channel {
    /// Parses `LastValue` as a float.
    pub fn last_value_f64(&self) -> Result<f64> {
        let raw = self
            .last_value
            .as_deref()
            .ok_or_else(|| anyhow!("channel '{}' has no LastValue", self.name))?;
        raw.trim()
            .parse::<f64>()
            .with_context(|| format!("channel '{}' LastValue '{}' is not numeric", self.name, raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: NaiveDateTime,
    pub value: f64,
}

/// Samples of one channel, indexed by time, in the order the service returned them.
pub type TimeSeries = Vec<Sample>;

/// A data result with its `Samples` converted into a [`TimeSeries`].
#[derive(Debug, Clone)]
pub struct ChannelData {
    pub samples: TimeSeries,
    /// Remaining fields of the result object (channel id, name, units...).
    pub fields: Map<String, Value>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RawSample {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Value")]
    value: Value,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RawChannelData {
    #[serde(rename = "Samples")]
    samples: Vec<RawSample>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl RawChannelData {
    pub(crate) fn into_channel_data(self) -> Result<ChannelData> {
        let samples = self
            .samples
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.to_sample().with_context(|| format!("bad sample #{}", i)))
            .collect::<Result<TimeSeries>>()?;
        Ok(ChannelData {
            samples,
            fields: self.fields,
        })
    }
}

impl RawSample {
    fn to_sample(&self) -> Result<Sample> {
        let time = parse_time(&self.time)?;
        let value = match &self.value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| anyhow!("sample value {} out of range", n))?,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("sample value '{}' is not numeric", s))?,
            // gaps in a record come back as null
            Value::Null => f64::NAN,
            other => return Err(anyhow!("sample value {} is not numeric", other)),
        };
        Ok(Sample { time, value })
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_keeps_unknown_fields() {
        let ch: Channel = serde_json::from_value(json!({
            "Name": "Barometric Pressure(AVG)",
            "LastValue": "1050.5",
            "Id": 77,
            "Units": "hPa"
        }))
        .unwrap();
        assert_eq!(ch.name, "Barometric Pressure(AVG)");
        assert_eq!(ch.last_value_f64().unwrap(), 1050.5);
        assert_eq!(ch.fields.get("Id"), Some(&json!(77)));
        assert!(!ch.fields.contains_key("Name"));
    }

    #[test]
    fn channel_without_name_is_rejected() {
        let row = serde_json::from_value::<Channel>(json!({"LastValue": "1050.5", "Id": 3}));
        assert!(row.is_err());
    }

    #[test]
    fn numeric_last_value_is_accepted() {
        let ch: Channel = serde_json::from_value(json!({"Name": "x", "LastValue": 12.5})).unwrap();
        assert_eq!(ch.last_value_f64().unwrap(), 12.5);
    }

    #[test]
    fn missing_or_bad_last_value_is_an_error() {
        let ch: Channel = serde_json::from_value(json!({"Name": "x", "LastValue": null})).unwrap();
        assert!(ch.last_value_f64().is_err());

        let ch: Channel = serde_json::from_value(json!({"Name": "x", "LastValue": "n/a"})).unwrap();
        let err = ch.last_value_f64().unwrap_err().to_string();
        assert!(err.contains("n/a"), "{err}");
    }

    #[test]
    fn samples_become_time_indexed_floats() {
        let raw: RawChannelData = serde_json::from_value(json!({
            "ChannelId": 5,
            "Samples": [
                {"Time": "2020-01-01T00:00:00", "Value": "1.5"},
                {"Time": "2020-01-01T00:10:00", "Value": 2}
            ]
        }))
        .unwrap();
        let data = raw.into_channel_data().unwrap();

        assert_eq!(data.samples.len(), 2);
        assert_eq!(data.samples[0].time, parse_time("2020-01-01T00:00:00").unwrap());
        assert_eq!(data.samples[0].value, 1.5);
        assert_eq!(data.samples[1].value, 2.0);
        assert_eq!(data.fields.get("ChannelId"), Some(&json!(5)));
    }

    #[test]
    fn null_sample_is_a_gap() {
        let raw: RawChannelData = serde_json::from_value(json!({
            "Samples": [{"Time": "2020-01-01T00:00:00", "Value": null}]
        }))
        .unwrap();
        assert!(raw.into_channel_data().unwrap().samples[0].value.is_nan());
    }

    #[test]
    fn result_without_samples_is_rejected() {
        let raw = serde_json::from_value::<RawChannelData>(json!({"ChannelId": 5}));
        assert!(raw.is_err());
    }

    #[test]
    fn bad_sample_time_fails_conversion() {
        let raw: RawChannelData = serde_json::from_value(json!({
            "Samples": [{"Time": "01/01/2020 00:00", "Value": "1"}]
        }))
        .unwrap();
        assert!(raw.into_channel_data().is_err());
    }
}
