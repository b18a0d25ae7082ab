pub mod add;
pub mod extract;
pub mod list;

pub use add::run as add;
pub use extract::run as extract;
pub use list::run as list;
