//! Request body validation for user creation.

use crate::error::AppError;
use crate::model::NewUser;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// `name` must be present, non-null and a string. Empty strings pass; other fields are ignored.
    pub fn new_user(body: Value) -> Result<NewUser, AppError> {
        let mut body = body_to_map(body)?;
        match body.remove("name") {
            None | Some(Value::Null) => Err(AppError::Validation("name is required".into())),
            Some(Value::String(name)) => Ok(NewUser { name }),
            Some(_) => Err(AppError::Validation("name must be a string".into())),
        }
    }
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
