mod new_subscriber;
mod project;
mod subscriber_email;

pub use new_subscriber::NewSubscriber;
pub use project::{DEFAULT_PROJECT_STATUS, NewProject, Project, ProjectName};
pub use subscriber_email::SubscriberEmail;
