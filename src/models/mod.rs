//! Data models
//!
//! Entities persisted by the repositories, the inputs accepted by the
//! services, and the status workflow definitions shared by both.

mod appointment;
mod article;
mod category;
mod comment;
mod notification;
mod session;
mod testimonial;
mod user;
mod video;
mod webinar;
pub mod workflow;

pub use appointment::{Appointment, CreateAppointmentInput, NewAppointment};
pub use article::{Article, CreateArticleInput, UpdateArticleInput};
pub use category::{slugify, Category, CreateCategoryInput};
pub use comment::{Comment, CreateCommentInput, NewComment, ReplyCommentInput};
pub use notification::{Notification, NotificationStatus};
pub use session::Session;
pub use testimonial::{CreateTestimonialInput, Testimonial, UpdateTestimonialInput};
pub use user::{CreateUserInput, Identity, Staff, User, UserRole, UserStatus};
pub use video::{CreateVideoInput, UpdateVideoInput, Video};
pub use webinar::{CreateWebinarInput, Webinar};
pub use workflow::{
    validate_status, AppointmentStatus, EntityKind, ModerationStatus, PublicationStatus,
    StatusDomain, WorkflowError, STATUS_DOMAINS,
};
