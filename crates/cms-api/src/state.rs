use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::documents::DocumentStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub credentials: CredentialStore,
    pub documents: DocumentStore,
}
