//! Data models
//!
//! Database entities (Post, Category, Tag, Comment, User) and the input types
//! accepted by the services and the HTTP API.

mod category;
mod comment;
mod post;
mod tag;
mod user;

pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{Comment, CreateCommentInput};
pub use post::{CreatePostInput, Post, PostDetail, UpdatePostInput};
pub use tag::{CreateTagInput, Tag};
pub use user::{CreateUserInput, User, ROLE_USER};
