//! User wire shapes for the `/api/v1` surface.
//!
//! The identifier is serialized as `ID` while every other field is snake_case.
//! Existing clients depend on that spelling.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Vec<String>,
}

/// Body of `POST /api/v1/create_user`. Missing fields decode as empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub last_name: String,
    pub role: Vec<String>,
}

/// Body of `PUT /api/v1/update_user`. `ID` is required; the rest default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserDto {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Vec<String>,
}
