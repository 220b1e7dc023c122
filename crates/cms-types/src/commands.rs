//! Validated commands handed to the stores.
//!
//! Request bodies are checked and normalised here, at the HTTP boundary, so the
//! credential and document stores only ever see well-formed input.

use std::collections::HashSet;

use thiserror::Error;

use crate::api::{ModifyRequest, SignupRequest, UploadRequest};

pub const MAX_HANDLE_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("handle must be 1-64 bytes without control characters")]
    Handle,
    #[error("password must not be empty")]
    Password,
    #[error("title must not be empty")]
    Title,
    #[error("tags must not be empty strings")]
    Tag,
}

/// Signup input. No `Debug`: it carries a plaintext password.
#[derive(Clone)]
pub struct Credentials {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub tags: Vec<String>,
    pub draft: bool,
    pub archived: bool,
    pub body: String,
}

/// Fields to overwrite on an existing post. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub draft: Option<bool>,
    pub archived: Option<bool>,
    pub body: Option<String>,
}

/// A modify call: target post plus the fields to overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyPost {
    pub id: i64,
    pub changes: PostChanges,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.tags.is_none()
            && self.draft.is_none()
            && self.archived.is_none()
            && self.body.is_none()
    }
}

pub fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    if handle.is_empty() || handle.len() > MAX_HANDLE_LEN || handle.chars().any(char::is_control) {
        return Err(ValidationError::Handle);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Password);
    }
    Ok(())
}

/// Titles are stored as sent; only a blank one is refused.
fn check_title(title: String) -> Result<String, ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::Title);
    }
    Ok(title)
}

/// Drops exact repeats, keeping first-seen order. Tags are otherwise stored as sent.
fn dedupe_tags(tags: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        if tag.is_empty() {
            return Err(ValidationError::Tag);
        }
        if seen.insert(tag.clone()) {
            out.push(tag);
        }
    }
    Ok(out)
}

impl TryFrom<SignupRequest> for Credentials {
    type Error = ValidationError;

    fn try_from(req: SignupRequest) -> Result<Self, Self::Error> {
        validate_handle(&req.handle)?;
        validate_password(&req.password)?;
        Ok(Self {
            handle: req.handle,
            password: req.password,
        })
    }
}

impl TryFrom<UploadRequest> for NewPost {
    type Error = ValidationError;

    fn try_from(req: UploadRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: check_title(req.title)?,
            tags: dedupe_tags(req.tags)?,
            draft: req.draft,
            archived: req.archived,
            body: req.body,
        })
    }
}

impl TryFrom<ModifyRequest> for ModifyPost {
    type Error = ValidationError;

    fn try_from(req: ModifyRequest) -> Result<Self, Self::Error> {
        let changes = PostChanges {
            title: req.title.map(check_title).transpose()?,
            tags: req.tags.map(dedupe_tags).transpose()?,
            draft: req.draft,
            archived: req.archived,
            body: req.body,
        };
        Ok(Self {
            id: req.id,
            changes,
        })
    }
}
