// Host-engine surface: the commands the shell issues and the events it
// consumes. The real embedding implements `Engine` on top of whatever
// webview runtime hosts the content; the shell never talks to the engine
// any other way.

use crate::state::SecurityState;

/// Per-frame events emitted by the engine as a document loads.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    LoadStart,
    /// First response bytes arrived; the connection phase is over.
    Connected,
    LoadEnd {
        success: bool,
    },
    LocationChanged {
        url: String,
        can_go_back: bool,
        can_go_forward: bool,
    },
    TitleChanged {
        title: String,
    },
    IconChanged {
        href: String,
    },
    MetaChanged {
        name: String,
        content: String,
    },
    SecurityChanged {
        state: SecurityState,
        extended_validation: bool,
    },
    FirstPaint,
    /// The page asked for a new window (target=_blank and friends).
    OpenWindow {
        url: String,
    },
    /// The frame closed itself (window.close or a crash).
    Closed,
}

/// Frame-addressed commands the shell issues. Engines treat unknown frame
/// ids as no-ops; the shell may race a command against a frame closing
/// itself.
pub trait Engine {
    fn create_frame(&mut self, id: &str, url: &str);
    fn destroy_frame(&mut self, id: &str);
    fn navigate(&mut self, id: &str, url: &str);
    fn stop(&mut self, id: &str);
    fn reload(&mut self, id: &str, hard: bool);
    fn go_back(&mut self, id: &str);
    fn go_forward(&mut self, id: &str);
    fn set_zoom(&mut self, id: &str, zoom: f64);
    fn set_visible(&mut self, id: &str, visible: bool);
}

/// Recorded engine command, used by the recording double below.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    CreateFrame { id: String, url: String },
    DestroyFrame { id: String },
    Navigate { id: String, url: String },
    Stop { id: String },
    Reload { id: String, hard: bool },
    GoBack { id: String },
    GoForward { id: String },
    SetZoom { id: String, zoom: f64 },
    SetVisible { id: String, visible: bool },
}

/// An engine that records every command instead of executing it. The test
/// suites and the smoke driver run the shell against this.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub commands: Vec<EngineCommand>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Commands issued against one frame, in order.
    pub fn commands_for(&self, id: &str) -> Vec<&EngineCommand> {
        self.commands
            .iter()
            .filter(|command| match command {
                EngineCommand::CreateFrame { id: i, .. }
                | EngineCommand::DestroyFrame { id: i }
                | EngineCommand::Navigate { id: i, .. }
                | EngineCommand::Stop { id: i }
                | EngineCommand::Reload { id: i, .. }
                | EngineCommand::GoBack { id: i }
                | EngineCommand::GoForward { id: i }
                | EngineCommand::SetZoom { id: i, .. }
                | EngineCommand::SetVisible { id: i, .. } => i == id,
            })
            .collect()
    }
}

impl Engine for RecordingEngine {
    fn create_frame(&mut self, id: &str, url: &str) {
        self.commands.push(EngineCommand::CreateFrame {
            id: id.to_string(),
            url: url.to_string(),
        });
    }

    fn destroy_frame(&mut self, id: &str) {
        self.commands.push(EngineCommand::DestroyFrame { id: id.to_string() });
    }

    fn navigate(&mut self, id: &str, url: &str) {
        self.commands.push(EngineCommand::Navigate {
            id: id.to_string(),
            url: url.to_string(),
        });
    }

    fn stop(&mut self, id: &str) {
        self.commands.push(EngineCommand::Stop { id: id.to_string() });
    }

    fn reload(&mut self, id: &str, hard: bool) {
        self.commands.push(EngineCommand::Reload {
            id: id.to_string(),
            hard,
        });
    }

    fn go_back(&mut self, id: &str) {
        self.commands.push(EngineCommand::GoBack { id: id.to_string() });
    }

    fn go_forward(&mut self, id: &str) {
        self.commands.push(EngineCommand::GoForward { id: id.to_string() });
    }

    fn set_zoom(&mut self, id: &str, zoom: f64) {
        self.commands.push(EngineCommand::SetZoom {
            id: id.to_string(),
            zoom,
        });
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        self.commands.push(EngineCommand::SetVisible {
            id: id.to_string(),
            visible,
        });
    }
}
