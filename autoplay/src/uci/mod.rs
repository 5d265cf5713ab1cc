pub mod io;
pub mod link;
pub mod opts;
pub mod sanitize;

pub use io::{BestMove, Command, Info, Message, MsgParseError, parse_msg};
pub use link::{Event, Link};
pub use opts::{Opts, Val};
