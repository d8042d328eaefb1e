pub mod command;
pub mod dispatcher;
pub mod help;
pub mod reply;
