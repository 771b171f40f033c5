pub mod scheduler;
pub mod sender;
pub mod dispatcher;

pub use scheduler::*;
pub use sender::*;
pub use dispatcher::*;
