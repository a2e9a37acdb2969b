// Lantern browser shell: the session core of a tabbed browser front-end.
//
// The shell owns the deck of open frames, mediates navigation commands,
// and keeps per-frame state (title, favicon, security, progress, zoom)
// synchronized with the asynchronous event stream of a host browser
// engine. The engine itself is a capability the embedder provides through
// the `engine::Engine` trait.

// Stateful services
pub mod engine;
pub mod history;
pub mod search;
pub mod settings;
pub mod shell;

// Frame state
pub mod state;

// Pure logic modules
pub mod modules;

pub use engine::{Engine, EngineEvent};
pub use shell::Shell;
pub use state::Frame;
