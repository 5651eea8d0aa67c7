//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod init;
mod list;
mod menu;
mod pdf;
mod serve;
mod video;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use list::run_list;
pub use menu::run_menu;
pub use pdf::run_pdf;
pub use serve::run_serve;
pub use video::run_video;
