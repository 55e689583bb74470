pub mod gateway;
pub mod report_writer;

pub use gateway::QuestionGateway;
pub use report_writer::ReportWriter;
