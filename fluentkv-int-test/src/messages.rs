//! Protobuf messages shared by the integration tests.
use bytes::Bytes;

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserProfile {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint32, tag = "2")]
    pub age: u32,
    #[prost(bytes = "bytes", tag = "3")]
    pub avatar: Bytes,
    #[prost(string, repeated, tag = "4")]
    pub tags: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AuditEvent {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub action: String,
}

pub fn user_profile(name: &str, age: u32) -> UserProfile {
    UserProfile {
        name: name.to_string(),
        age,
        avatar: Bytes::from_static(&[0x89, 0x50, 0x4e, 0x47]),
        tags: vec!["staff".to_string(), name.to_lowercase()],
    }
}

pub fn audit_event(id: u64, action: &str) -> AuditEvent {
    AuditEvent {
        id,
        action: action.to_string(),
    }
}
