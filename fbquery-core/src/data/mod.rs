mod value;
mod r#type;

pub use value::*;
pub use r#type::*;

pub use chrono;
pub use rust_decimal;
pub use uuid;
