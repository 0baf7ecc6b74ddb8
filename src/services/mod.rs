//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - Validating input before any storage access
//! - Routing every status change through the workflow engine
//! - Authorising against the typed caller identity

pub mod appointment;
pub mod article;
pub mod category;
pub mod comment;
pub mod error;
pub mod notification;
pub mod notifier;
pub mod password;
pub mod testimonial;
pub mod user;
pub mod validate;
pub mod video;
pub mod webinar;
pub mod workflow;

pub use appointment::AppointmentService;
pub use article::ArticleService;
pub use category::CategoryService;
pub use comment::CommentService;
pub use error::{ServiceError, ServiceResult};
pub use notification::NotificationService;
pub use notifier::{
    build_dispatcher, LogDispatcher, NotificationDispatcher, NotificationError,
    TwilioWhatsAppNotifier,
};
pub use password::{hash_password, verify_password};
pub use testimonial::TestimonialService;
pub use user::{LoginInput, UserService};
pub use video::VideoService;
pub use webinar::WebinarService;
pub use workflow::{Transition, WorkflowService};
