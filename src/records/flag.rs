use serde::{Deserialize, Deserializer};

/// Boolean cells as written by R and pandas exports: `true`/`false`,
/// `TRUE`/`FALSE`, `True`/`False`, `T`/`F`, `1`/`0` or `yes`/`no`.
/// Empty and `NA` cells read as `None`.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "" | "na" => Ok(None),
            "true" | "t" | "1" | "yes" => Ok(Some(true)),
            "false" | "f" | "0" | "no" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!("invalid flag value '{}'", other))),
        },
    }
}
