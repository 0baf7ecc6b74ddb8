//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the operations for a specific entity; status
//! changes for every workflow kind go through [`StatusRepository`].

pub mod appointment;
pub mod article;
pub mod category;
pub mod comment;
pub mod notification;
pub mod session;
pub mod status;
pub mod testimonial;
pub mod user;
pub mod video;
pub mod webinar;

pub use appointment::{AppointmentRepository, SqlxAppointmentRepository};
pub use article::{ArticleRepository, SqlxArticleRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use status::{SqlxStatusRepository, StatusRepository};
pub use testimonial::{SqlxTestimonialRepository, TestimonialRepository};
pub use user::{SqlxUserRepository, UserRepository};
pub use video::{SqlxVideoRepository, VideoRepository};
pub use webinar::{SqlxWebinarRepository, WebinarRepository};
