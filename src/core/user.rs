use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Account state. Transitions made by the batch engine are one-directional:
/// ACTIVE -> INACTIVE. Inactive records are never selected again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
}

/// Membership grade. Closed enumeration; the partitioner derives its
/// partition count from `Grade::ALL`, never from the caller's grid hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    Vip,
    Gold,
    Normal,
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::Vip, Grade::Gold, Grade::Normal];

    pub fn name(&self) -> &'static str {
        match self {
            Grade::Vip => "VIP",
            Grade::Gold => "GOLD",
            Grade::Normal => "NORMAL",
        }
    }
}

/// Login provider the account was created through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialType {
    Facebook,
    Google,
    Kakao,
}

/// A user account as held by the eligibility store.
///
/// The engine treats records as value snapshots: it reads them out of the
/// store, transforms copies, and writes whole chunks back. It never mutates
/// a record in place inside the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub idx: u64,
    pub name: String,
    pub password: String,
    pub email: String,
    pub principal: String,
    pub social_type: SocialType,
    pub status: UserStatus,
    pub grade: Grade,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Identity is (idx, email), matching the store's uniqueness guarantees.
impl PartialEq for UserRecord {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.email == other.email
    }
}

impl Eq for UserRecord {}

impl Hash for UserRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
        self.email.hash(state);
    }
}

impl UserRecord {
    /// Start building a record. `idx` must be unique within the store.
    pub fn builder(idx: u64) -> UserRecordBuilder {
        UserRecordBuilder::new(idx)
    }

    /// Pure ACTIVE -> INACTIVE transition; stamps `updated_at` and leaves
    /// every other field untouched.
    pub fn into_inactive(mut self, now: DateTime<Utc>) -> Self {
        self.status = UserStatus::Inactive;
        self.updated_at = now;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Builder for [`UserRecord`]
#[derive(Debug, Clone)]
pub struct UserRecordBuilder {
    idx: u64,
    name: String,
    password: String,
    email: String,
    principal: String,
    social_type: SocialType,
    status: UserStatus,
    grade: Grade,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecordBuilder {
    fn new(idx: u64) -> Self {
        let now = Utc::now();
        Self {
            idx,
            name: String::new(),
            password: String::new(),
            email: String::new(),
            principal: String::new(),
            social_type: SocialType::Google,
            status: UserStatus::Active,
            grade: Grade::Normal,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub fn principal(mut self, principal: &str) -> Self {
        self.principal = principal.to_string();
        self
    }

    pub fn social_type(mut self, social_type: SocialType) -> Self {
        self.social_type = social_type;
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn grade(mut self, grade: Grade) -> Self {
        self.grade = grade;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        self
    }

    pub fn build(self) -> UserRecord {
        UserRecord {
            idx: self.idx,
            name: self.name,
            password: self.password,
            email: self.email,
            principal: self.principal,
            social_type: self.social_type,
            status: self.status,
            grade: self.grade,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
