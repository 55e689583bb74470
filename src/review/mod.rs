//! 模型输出校验核心
//!
//! ```text
//! 原始文本 → sanitize → parser → validator (→ originals 对齐) → ReviewResult
//! ```

pub mod originals;
pub mod parser;
pub mod result;
pub mod sanitize;
pub mod validator;

pub use originals::Originals;
pub use parser::{parse_batch, BatchParse};
pub use result::{ChangedFields, ReviewResult, SaveSummary};
pub use sanitize::sanitize;
pub use validator::{validate_new, validate_update};
