//! Services layer - Business logic
//!
//! This module contains the business logic of the ActuNews backend.
//! Services are responsible for:
//! - Validating input
//! - Driving create operations through the lifecycle pipeline
//! - Coordinating repositories for reads, updates and deletes

pub mod category;
pub mod comment;
pub mod email;
pub mod password;
pub mod post;
pub mod slug;
pub mod tag;
pub mod user;
pub mod validation;

pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use email::{
    notifier_from_config, DeliveryError, DisabledNotifier, MailQueue, MailWorker, Notifier,
    OutboundEmail, SmtpNotifier, WelcomeMessage,
};
pub use password::{Argon2CredentialHasher, CredentialHasher, HashingError};
pub use post::{PostRepositories, PostService, PostServiceError};
pub use slug::slugify;
pub use tag::{TagService, TagServiceError};
pub use user::{UserService, UserServiceError};
