//! Script layout and writing.
//!
//! Every object becomes one file at
//! `<database>/<schema>/<kind directory>[/<table>]/<name>.sql`, encoded as
//! UTF-8 with a byte order mark and fully rewritten on each run.

mod path;
mod writer;

pub use path::{relative_path, resolve, ScriptPath};
pub use writer::{render, save_object, save_objects, write_script, UTF8_BOM};
