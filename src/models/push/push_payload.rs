//! JSON body POSTed to the push endpoint.

use serde::Serialize;

pub const PUSH_SOUND: &str = "minuet.caf";
pub const PUSH_GROUP: &str = "Email";
pub const PUSH_ICON: &str = "https://www.google.com/gmail/about/static/images/logo-gmail.png";
pub const PUSH_LEVEL: &str = "active";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub badge: u32,
    pub sound: String,
    pub group: String,
    pub icon: String,
    pub is_archive: u8,
    pub level: String,
    pub url: String,
}
