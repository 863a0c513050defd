use serde::Serialize;

use crate::error::OpenClinicError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, OpenClinicError> {
    Ok(serde_json::to_string_pretty(value)?)
}
