pub mod notification_reader;
pub mod state_writer;
