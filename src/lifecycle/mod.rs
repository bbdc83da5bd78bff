//! Entity lifecycle pipeline
//!
//! Create operations run through two extension points:
//! - pre-create: handlers may mutate the entity or reject it before the first write
//! - post-create: handlers observe the persisted entity; failures are logged only
//!
//! Handlers are registered per entity type. Each entity type selects its own
//! typed `HandlerTable`, so a handler only ever sees the type it was written for.

pub mod handlers;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{Category, Comment, Post, Tag, User};
use crate::services::email::{DeliveryError, MailQueue, WelcomeMessage};
use crate::services::password::{CredentialHasher, HashingError};

/// Entity kinds known to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Post,
    Category,
    Tag,
    Comment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Post => "post",
            EntityKind::Category => "category",
            EntityKind::Tag => "tag",
            EntityKind::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// Progress of a single create operation. Linear, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unpersisted,
    PreHooksRunning,
    Persisted,
    PostHooksRunning,
    Settled,
}

/// Error raised by a lifecycle handler
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("{0}")]
    Invalid(String),
}

/// Error returned by `LifecyclePipeline::run_create`
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    /// A pre-create handler failed; nothing was written
    #[error("{kind} rejected by '{handler}': {source}")]
    Rejected {
        kind: EntityKind,
        handler: &'static str,
        #[source]
        source: LifecycleError,
    },

    /// The write itself failed; post-create handlers did not run
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

/// Pre-create handler: may mutate the entity or reject it
pub type PreCreateHandler<T> = Arc<dyn Fn(&mut T) -> Result<(), LifecycleError> + Send + Sync>;

/// Post-create handler: observes the persisted entity
pub type PostCreateHandler<T> = Arc<dyn Fn(&T) -> Result<(), LifecycleError> + Send + Sync>;

struct Registered<H> {
    name: &'static str,
    handler: H,
}

/// Handlers for one entity type, in registration order
pub struct HandlerTable<T> {
    pre_create: Vec<Registered<PreCreateHandler<T>>>,
    post_create: Vec<Registered<PostCreateHandler<T>>>,
}

impl<T> Default for HandlerTable<T> {
    fn default() -> Self {
        Self {
            pre_create: Vec::new(),
            post_create: Vec::new(),
        }
    }
}

impl<T> HandlerTable<T> {
    pub fn pre_create_names(&self) -> Vec<&'static str> {
        self.pre_create.iter().map(|r| r.name).collect()
    }

    pub fn post_create_names(&self) -> Vec<&'static str> {
        self.post_create.iter().map(|r| r.name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pre_create.is_empty() && self.post_create.is_empty()
    }
}

/// An entity type that can flow through the pipeline
pub trait LifecycleEntity: Send + Sized + 'static {
    const KIND: EntityKind;

    fn handlers(pipeline: &LifecyclePipeline) -> &HandlerTable<Self>;

    fn handlers_mut(pipeline: &mut LifecyclePipeline) -> &mut HandlerTable<Self>;
}

macro_rules! lifecycle_entity {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl LifecycleEntity for $ty {
            const KIND: EntityKind = $kind;

            fn handlers(pipeline: &LifecyclePipeline) -> &HandlerTable<Self> {
                &pipeline.$field
            }

            fn handlers_mut(pipeline: &mut LifecyclePipeline) -> &mut HandlerTable<Self> {
                &mut pipeline.$field
            }
        }
    };
}

lifecycle_entity!(User, EntityKind::User, users);
lifecycle_entity!(Post, EntityKind::Post, posts);
lifecycle_entity!(Category, EntityKind::Category, categories);
lifecycle_entity!(Tag, EntityKind::Tag, tags);
lifecycle_entity!(Comment, EntityKind::Comment, comments);

/// Registry of lifecycle handlers, shared by all services
#[derive(Default)]
pub struct LifecyclePipeline {
    users: HandlerTable<User>,
    posts: HandlerTable<Post>,
    categories: HandlerTable<Category>,
    tags: HandlerTable<Tag>,
    comments: HandlerTable<Comment>,
}

impl LifecyclePipeline {
    /// Create a pipeline with no handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the pipeline with the standard handlers:
    /// - User pre-create: `hash_credentials`
    /// - Post pre-create: `derive_post_alias`
    /// - Category pre-create: `derive_category_alias`
    /// - User post-create: `send_welcome_email`
    pub fn standard(
        hasher: Arc<dyn CredentialHasher>,
        mail_queue: MailQueue,
        welcome: WelcomeMessage,
    ) -> Self {
        let mut pipeline = Self::new();
        pipeline.register_pre_create::<User, _>(
            "hash_credentials",
            handlers::hash_credentials(hasher),
        );
        pipeline.register_pre_create::<Post, _>("derive_post_alias", handlers::derive_post_alias);
        pipeline.register_pre_create::<Category, _>(
            "derive_category_alias",
            handlers::derive_category_alias,
        );
        pipeline.register_post_create::<User, _>(
            "send_welcome_email",
            handlers::send_welcome_email(mail_queue, welcome),
        );
        pipeline
    }

    /// Append a pre-create handler for `E`
    pub fn register_pre_create<E, F>(&mut self, name: &'static str, handler: F)
    where
        E: LifecycleEntity,
        F: Fn(&mut E) -> Result<(), LifecycleError> + Send + Sync + 'static,
    {
        E::handlers_mut(self).pre_create.push(Registered {
            name,
            handler: Arc::new(handler),
        });
        debug!("Registered pre-create handler '{}' for {}", name, E::KIND);
    }

    /// Append a post-create handler for `E`
    pub fn register_post_create<E, F>(&mut self, name: &'static str, handler: F)
    where
        E: LifecycleEntity,
        F: Fn(&E) -> Result<(), LifecycleError> + Send + Sync + 'static,
    {
        E::handlers_mut(self).post_create.push(Registered {
            name,
            handler: Arc::new(handler),
        });
        debug!("Registered post-create handler '{}' for {}", name, E::KIND);
    }

    /// Handlers registered for `E`
    pub fn handlers_for<E: LifecycleEntity>(&self) -> &HandlerTable<E> {
        E::handlers(self)
    }

    /// Run pre-create handlers in order. The first failure stops the phase.
    pub fn pre_create<E: LifecycleEntity>(&self, entity: &mut E) -> Result<(), CreateError> {
        for registered in &E::handlers(self).pre_create {
            (registered.handler)(entity).map_err(|source| CreateError::Rejected {
                kind: E::KIND,
                handler: registered.name,
                source,
            })?;
        }
        Ok(())
    }

    /// Run post-create handlers in order. Failures are logged and never
    /// propagated; every handler runs.
    pub fn post_create<E: LifecycleEntity>(&self, entity: &E) {
        for registered in &E::handlers(self).post_create {
            if let Err(e) = (registered.handler)(entity) {
                warn!(
                    entity = %E::KIND,
                    handler = registered.name,
                    error = %e,
                    "Post-create handler failed"
                );
            }
        }
    }

    /// Drive one create operation:
    /// `Unpersisted -> PreHooksRunning -> Persisted -> PostHooksRunning -> Settled`.
    ///
    /// `persist` receives the prepared entity and returns it as written. It is
    /// not called when a pre-create handler fails.
    pub async fn run_create<E, F, Fut>(&self, mut entity: E, persist: F) -> Result<E, CreateError>
    where
        E: LifecycleEntity,
        F: FnOnce(E) -> Fut,
        Fut: Future<Output = anyhow::Result<E>>,
    {
        let mut state = LifecycleState::Unpersisted;

        advance::<E>(&mut state, LifecycleState::PreHooksRunning);
        self.pre_create(&mut entity)?;

        let persisted = persist(entity).await?;
        advance::<E>(&mut state, LifecycleState::Persisted);

        advance::<E>(&mut state, LifecycleState::PostHooksRunning);
        self.post_create(&persisted);

        advance::<E>(&mut state, LifecycleState::Settled);
        Ok(persisted)
    }
}

fn advance<E: LifecycleEntity>(state: &mut LifecycleState, next: LifecycleState) {
    debug!(entity = %E::KIND, from = ?*state, to = ?next, "Lifecycle transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::email::test_support::RecordingNotifier;
    use crate::services::email::{MailWorker, MailWorkerStats};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct PrefixHasher;

    impl CredentialHasher for PrefixHasher {
        fn hash(&self, _identity: &User, plaintext: &str) -> Result<String, HashingError> {
            Ok(format!("hashed:{}", plaintext))
        }

        fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError> {
            Ok(hash == format!("hashed:{}", plaintext))
        }
    }

    struct BrokenHasher;

    impl CredentialHasher for BrokenHasher {
        fn hash(&self, _identity: &User, _plaintext: &str) -> Result<String, HashingError> {
            Err(HashingError::Backend("unavailable".to_string()))
        }

        fn verify(&self, _plaintext: &str, _hash: &str) -> Result<bool, HashingError> {
            Err(HashingError::Backend("unavailable".to_string()))
        }
    }

    fn user() -> User {
        User::new(
            "reader@actu.news".to_string(),
            "Ada".to_string(),
            "Reader".to_string(),
            "p@ss".to_string(),
        )
    }

    /// Persist step that assigns an id without touching a database
    fn with_id<E>(
        id: i64,
        set: impl FnOnce(&mut E, i64),
    ) -> impl FnOnce(E) -> std::future::Ready<anyhow::Result<E>> {
        move |mut entity| {
            set(&mut entity, id);
            std::future::ready(Ok(entity))
        }
    }

    async fn drain(queue: MailQueue, worker: MailWorker) -> (MailWorkerStats, Arc<RecordingNotifier>) {
        drop(queue);
        let notifier = Arc::new(RecordingNotifier::default());
        let stats = worker.run(notifier.clone()).await;
        (stats, notifier)
    }

    #[test]
    fn test_standard_registration() {
        let (queue, _worker) = MailQueue::new(1);
        let pipeline =
            LifecyclePipeline::standard(Arc::new(PrefixHasher), queue, WelcomeMessage::default());

        assert_eq!(pipeline.handlers_for::<User>().pre_create_names(), vec!["hash_credentials"]);
        assert_eq!(pipeline.handlers_for::<User>().post_create_names(), vec!["send_welcome_email"]);
        assert_eq!(pipeline.handlers_for::<Post>().pre_create_names(), vec!["derive_post_alias"]);
        assert_eq!(
            pipeline.handlers_for::<Category>().pre_create_names(),
            vec!["derive_category_alias"]
        );
        assert!(pipeline.handlers_for::<Tag>().is_empty());
        assert!(pipeline.handlers_for::<Comment>().is_empty());
    }

    #[tokio::test]
    async fn test_user_is_hashed_before_persist_and_welcomed_after() {
        let (queue, worker) = MailQueue::new(4);
        let pipeline = LifecyclePipeline::standard(
            Arc::new(PrefixHasher),
            queue.clone(),
            WelcomeMessage::default(),
        );

        let created = pipeline
            .run_create(user(), |u: User| async move {
                assert_eq!(u.password, "hashed:p@ss");
                Ok(User { id: 7, ..u })
            })
            .await
            .unwrap();

        assert_eq!(created.id, 7);
        drop(pipeline);
        let (stats, notifier) = drain(queue, worker).await;
        assert_eq!(stats.delivered, 1);
        let sent = notifier.sent();
        assert_eq!(sent[0].to, "reader@actu.news");
        assert_eq!(sent[0].subject, "Bienvenue sur notre site Actunews !");
    }

    #[tokio::test]
    async fn test_hashing_failure_skips_persist_and_mail() {
        let (queue, worker) = MailQueue::new(4);
        let pipeline = LifecyclePipeline::standard(
            Arc::new(BrokenHasher),
            queue.clone(),
            WelcomeMessage::default(),
        );
        let persisted = AtomicUsize::new(0);

        let result = pipeline
            .run_create(user(), |u: User| {
                persisted.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Ok(u))
            })
            .await;

        match result {
            Err(CreateError::Rejected { kind, handler, source }) => {
                assert_eq!(kind, EntityKind::User);
                assert_eq!(handler, "hash_credentials");
                assert!(matches!(source, LifecycleError::Hashing(_)));
            }
            other => panic!("expected rejection, got {:?}", other.map(|u| u.id)),
        }
        assert_eq!(persisted.load(Ordering::SeqCst), 0);

        drop(pipeline);
        let (stats, _) = drain(queue, worker).await;
        assert_eq!(stats, MailWorkerStats::default());
    }

    #[tokio::test]
    async fn test_persistence_failure_skips_post_create() {
        let (queue, worker) = MailQueue::new(4);
        let pipeline = LifecyclePipeline::standard(
            Arc::new(PrefixHasher),
            queue.clone(),
            WelcomeMessage::default(),
        );

        let result = pipeline
            .run_create(user(), |_u: User| async { Err(anyhow::anyhow!("disk full")) })
            .await;

        assert!(matches!(result, Err(CreateError::Persistence(_))));
        drop(pipeline);
        let (stats, _) = drain(queue, worker).await;
        assert_eq!(stats, MailWorkerStats::default());
    }

    #[tokio::test]
    async fn test_post_create_failure_is_swallowed() {
        let (queue, worker) = MailQueue::new(1);
        drop(worker);
        let pipeline =
            LifecyclePipeline::standard(Arc::new(PrefixHasher), queue, WelcomeMessage::default());

        let created = pipeline
            .run_create(user(), with_id(3, |u: &mut User, id| u.id = id))
            .await
            .unwrap();

        assert_eq!(created.id, 3);
        assert_eq!(created.password, "hashed:p@ss");
    }

    #[tokio::test]
    async fn test_post_alias_derived_from_title() {
        let (queue, _worker) = MailQueue::new(1);
        let pipeline =
            LifecyclePipeline::standard(Arc::new(PrefixHasher), queue, WelcomeMessage::default());
        let post = Post::new(
            "Breaking News: Big Event".to_string(),
            "Body".to_string(),
            "cover.jpg".to_string(),
            1,
            1,
            Vec::new(),
        );

        let created = pipeline
            .run_create(post, with_id(1, |p: &mut Post, id| p.id = id))
            .await
            .unwrap();

        assert_eq!(created.alias, "breaking-news-big-event");
    }

    #[tokio::test]
    async fn test_category_alias_derived_from_name() {
        let (queue, _worker) = MailQueue::new(1);
        let pipeline =
            LifecyclePipeline::standard(Arc::new(PrefixHasher), queue, WelcomeMessage::default());

        let created = pipeline
            .run_create(
                Category::new("Politique".to_string()),
                with_id(1, |c: &mut Category, id| c.id = id),
            )
            .await
            .unwrap();

        assert_eq!(created.alias, "politique");
    }

    #[tokio::test]
    async fn test_tag_passes_through_unchanged() {
        let pipeline = LifecyclePipeline::new();

        let created = pipeline
            .run_create(Tag::new("Élections".to_string()), with_id(2, |t: &mut Tag, id| t.id = id))
            .await
            .unwrap();

        assert_eq!(created, Tag { id: 2, name: "Élections".to_string() });
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = LifecyclePipeline::new();

        for name in ["first", "second", "third"] {
            let calls = calls.clone();
            pipeline.register_pre_create::<Comment, _>(name, move |_c| {
                calls.lock().unwrap().push(name);
                Ok(())
            });
        }

        let mut comment = Comment::new(1, 1, "Bravo".to_string());
        pipeline.pre_create(&mut comment).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_pre_create_failure_stops_phase() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = LifecyclePipeline::new();

        pipeline.register_pre_create::<Tag, _>("reject", |_t| {
            Err(LifecycleError::Invalid("no".to_string()))
        });
        let seen = calls.clone();
        pipeline.register_pre_create::<Tag, _>("after", move |_t| {
            seen.lock().unwrap().push("after");
            Ok(())
        });

        let mut tag = Tag::new("x".to_string());
        let result = pipeline.pre_create(&mut tag);

        assert!(matches!(result, Err(CreateError::Rejected { handler: "reject", .. })));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_post_create_runs_every_handler_despite_failures() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = LifecyclePipeline::new();

        pipeline.register_post_create::<Post, _>("fails", |_p| {
            Err(LifecycleError::Invalid("boom".to_string()))
        });
        let seen = calls.clone();
        pipeline.register_post_create::<Post, _>("records", move |p: &Post| {
            seen.lock().unwrap().push(p.id);
            Ok(())
        });

        let mut post = Post::new(
            "T".to_string(),
            "C".to_string(),
            "i.jpg".to_string(),
            1,
            1,
            Vec::new(),
        );
        post.id = 9;
        pipeline.post_create(&post);

        assert_eq!(*calls.lock().unwrap(), vec![9]);
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Category.to_string(), "category");
        assert_eq!(EntityKind::User.to_string(), "user");
    }
}
