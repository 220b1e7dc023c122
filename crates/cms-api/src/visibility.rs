use cms_types::models::{PostSummary, PublicPost};

/// Drafts and archived posts are hidden from anonymous callers.
pub fn needs_auth(draft: bool, archived: bool) -> bool {
    draft || archived
}

/// The anonymous view of a post listing: private posts dropped, metadata
/// reduced to id, title and tags.
pub fn public_posts(posts: Vec<PostSummary>) -> Vec<PublicPost> {
    posts
        .into_iter()
        .filter(|p| !needs_auth(p.draft, p.archived))
        .map(PublicPost::from)
        .collect()
}
