pub mod exam;
pub mod level;
pub mod loaders;
pub mod question;

pub use exam::ExamSummary;
pub use level::Level;
pub use loaders::load_review_settings;
pub use question::{Answer, NewQuestion, QuestionRecord};
