pub mod models;
pub mod views;

pub use models::{
    Message, ParentAccount, Reply, Role, SessionSnapshot, StudentAccount, StudentProgress,
    TeacherAccount,
};
pub use views::{MessageView, ReplyView};
