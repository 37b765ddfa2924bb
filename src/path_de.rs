//! Typed decoding with JSON-path context in error messages.
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::brand::Term;
use crate::error::DecodeError;

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_decode_error)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_decode_error)
}

pub fn from_value_with_path<T: DeserializeOwned>(value: &Value) -> Result<T, DecodeError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(into_decode_error)
}

fn into_decode_error(err: serde_path_to_error::Error<serde_json::Error>) -> DecodeError {
    DecodeError {
        path: err.path().to_string(),
        source: err.into_inner(),
    }
}

impl Term {
    /// Deserialize the validated value into a Rust type.
    ///
    /// ```
    /// use json_brand::{number, object, string};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct User { id: u32, name: String }
    ///
    /// let user = object([("id", number()), ("name", string())]);
    /// let term = user.call(&serde_json::json!({ "id": "7", "name": "ada" })).unwrap();
    /// let user: User = term.decode().unwrap();
    /// assert_eq!((user.id, user.name.as_str()), (7, "ada"));
    /// ```
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        from_value_with_path(self.value())
    }
}
