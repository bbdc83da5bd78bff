//! Standard lifecycle handlers

use std::sync::Arc;

use super::LifecycleError;
use crate::models::{Category, Post, User};
use crate::services::email::{MailQueue, WelcomeMessage};
use crate::services::password::CredentialHasher;
use crate::services::slug::slugify;

/// User pre-create: replace the plaintext password with its hash
pub fn hash_credentials(
    hasher: Arc<dyn CredentialHasher>,
) -> impl Fn(&mut User) -> Result<(), LifecycleError> + Send + Sync + 'static {
    move |user: &mut User| {
        let hashed = hasher.hash(&*user, &user.password)?;
        user.password = hashed;
        Ok(())
    }
}

pub const ALIAS_REQUIRED: &str = "N'oubliez pas votre alias.";

/// Slug of `source`, rejected when nothing URL-safe is left
fn derive_alias(source: &str) -> Result<String, LifecycleError> {
    let alias = slugify(source);
    if alias.is_empty() {
        return Err(LifecycleError::Invalid(ALIAS_REQUIRED.to_string()));
    }
    Ok(alias)
}

/// Post pre-create: alias from the title
pub fn derive_post_alias(post: &mut Post) -> Result<(), LifecycleError> {
    post.alias = derive_alias(&post.title)?;
    Ok(())
}

/// Category pre-create: alias from the name
pub fn derive_category_alias(category: &mut Category) -> Result<(), LifecycleError> {
    category.alias = derive_alias(&category.name)?;
    Ok(())
}

/// User post-create: queue the welcome message.
///
/// Only enqueues; delivery happens on the mail worker.
pub fn send_welcome_email(
    queue: MailQueue,
    welcome: WelcomeMessage,
) -> impl Fn(&User) -> Result<(), LifecycleError> + Send + Sync + 'static {
    move |user: &User| {
        queue.enqueue(welcome.for_user(user))?;
        tracing::debug!(to = %user.email, "Welcome email queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::email::DeliveryError;
    use crate::services::password::Argon2CredentialHasher;

    fn user(password: &str) -> User {
        User::new(
            "reader@actu.news".to_string(),
            "Ada".to_string(),
            "Reader".to_string(),
            password.to_string(),
        )
    }

    #[test]
    fn test_hash_credentials_replaces_plaintext() {
        let hasher = Arc::new(Argon2CredentialHasher::new());
        let handler = hash_credentials(hasher.clone());
        let mut user = user("p@ss");

        handler(&mut user).unwrap();

        assert_ne!(user.password, "p@ss");
        assert!(hasher.verify("p@ss", &user.password).unwrap());
    }

    #[test]
    fn test_hash_credentials_rejects_empty_password() {
        let handler = hash_credentials(Arc::new(Argon2CredentialHasher::new()));
        let mut user = user("");

        let result = handler(&mut user);

        assert!(matches!(result, Err(LifecycleError::Hashing(_))));
        assert!(user.password.is_empty());
    }

    #[test]
    fn test_derive_post_alias() {
        let mut post = Post::new(
            "Breaking News: Big Event".to_string(),
            "Body".to_string(),
            "cover.jpg".to_string(),
            1,
            1,
            Vec::new(),
        );

        derive_post_alias(&mut post).unwrap();

        assert_eq!(post.alias, "breaking-news-big-event");
    }

    #[test]
    fn test_derive_category_alias() {
        let mut category = Category::new("Politique".to_string());

        derive_category_alias(&mut category).unwrap();

        assert_eq!(category.alias, "politique");
    }

    #[test]
    fn test_derive_alias_rejects_titles_without_ascii_alphanumerics() {
        for title in ["日本語", "!!!", "é"] {
            let mut post = Post::new(
                title.to_string(),
                "Body".to_string(),
                "cover.jpg".to_string(),
                1,
                1,
                Vec::new(),
            );

            let result = derive_post_alias(&mut post);

            assert!(
                matches!(result, Err(LifecycleError::Invalid(ref msg)) if msg == ALIAS_REQUIRED),
                "title {:?} should be rejected",
                title
            );
            assert!(post.alias.is_empty());
        }

        let mut category = Category::new("日本語".to_string());
        assert!(matches!(
            derive_category_alias(&mut category),
            Err(LifecycleError::Invalid(_))
        ));
    }

    #[test]
    fn test_send_welcome_email_reports_full_queue() {
        let (queue, _worker) = MailQueue::new(1);
        let handler = send_welcome_email(queue, WelcomeMessage::default());
        let user = user("p@ss");

        handler(&user).unwrap();
        let result = handler(&user);

        assert!(matches!(
            result,
            Err(LifecycleError::Delivery(DeliveryError::QueueFull))
        ));
    }
}
