use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub followers: u32,
    pub following: u32,
}

/// The identity the credential resolves to (`GET /user`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewer {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerEntry {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
}
