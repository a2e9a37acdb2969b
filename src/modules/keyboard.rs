// Keybinding dispatcher: normalizes chorded key input into canonical chord
// strings and maps them to shell commands.
//
// A chord is the sorted, lowercased, space-joined set of modifiers plus
// key, so "Shift+Accel+]" and "accel shift ]" land on the same table
// entry. "accel" resolves to meta on macOS and control elsewhere.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    fn accel(&self) -> &'static str {
        match self {
            Platform::MacOs => "meta",
            _ => "control",
        }
    }
}

/// Commands the shell understands. Keybindings, menus and buttons all
/// funnel into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenLocation,
    NewFrame,
    CloseFrame,
    RestoreFrame,
    SelectNext,
    SelectPrevious,
    CommitSelection,
    Reload,
    HardReload,
    GoBack,
    GoForward,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Cancel,
}

/// A key event as reported by the embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub meta: bool,
    pub control: bool,
    pub alt: bool,
    pub shift: bool,
    /// True for key releases. Released chords ignore modifier flags since
    /// engines report them inconsistently at release time.
    pub released: bool,
}

impl KeyEvent {
    pub fn down(key: &str) -> Self {
        KeyEvent {
            key: key.to_string(),
            meta: false,
            control: false,
            alt: false,
            shift: false,
            released: false,
        }
    }

    pub fn up(key: &str) -> Self {
        KeyEvent {
            released: true,
            ..Self::down(key)
        }
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn control(mut self) -> Self {
        self.control = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

fn normalize_key(key: &str, platform: Platform) -> String {
    match key {
        "ctrl" => "control".to_string(),
        "accel" => platform.accel().to_string(),
        "ArrowLeft" => "left".to_string(),
        "ArrowRight" => "right".to_string(),
        "ArrowUp" => "up".to_string(),
        "ArrowDown" => "down".to_string(),
        "esc" => "escape".to_string(),
        other => other.to_lowercase(),
    }
}

/// Canonical chord for a binding spec like "accel shift =".
fn read_chord(spec: &str, platform: Platform) -> String {
    let mut parts: Vec<String> = spec
        .split_whitespace()
        .map(|part| normalize_key(part, platform))
        .collect();
    parts.sort();
    parts.join(" ")
}

/// Canonical chord for an observed key event.
fn write_chord(event: &KeyEvent, platform: Platform) -> String {
    let mut parts = BTreeSet::new();
    if !event.released {
        if event.meta {
            parts.insert("meta".to_string());
        }
        if event.control {
            parts.insert("control".to_string());
        }
        if event.alt {
            parts.insert("alt".to_string());
        }
        if event.shift {
            parts.insert("shift".to_string());
        }
    }
    parts.insert(normalize_key(&event.key, platform));
    parts.into_iter().collect::<Vec<_>>().join(" ")
}

pub struct KeyBindings {
    platform: Platform,
    pressed: HashMap<String, Command>,
    released: HashMap<String, Command>,
}

impl KeyBindings {
    pub fn new(platform: Platform) -> Self {
        KeyBindings {
            platform,
            pressed: HashMap::new(),
            released: HashMap::new(),
        }
    }

    /// The stock shell bindings. Frame cycling previews on the chord and
    /// commits when the held modifier is released.
    pub fn defaults(platform: Platform) -> Self {
        let mut bindings = Self::new(platform);
        bindings.bind("accel l", Command::OpenLocation);
        bindings.bind("accel t", Command::NewFrame);
        bindings.bind("accel w", Command::CloseFrame);
        bindings.bind("accel shift t", Command::RestoreFrame);
        bindings.bind("accel shift ]", Command::SelectNext);
        bindings.bind("accel shift [", Command::SelectPrevious);
        bindings.bind("control tab", Command::SelectNext);
        bindings.bind("control shift tab", Command::SelectPrevious);
        bindings.bind("accel r", Command::Reload);
        bindings.bind("accel shift r", Command::HardReload);
        bindings.bind("accel 0", Command::ResetZoom);
        bindings.bind("accel -", Command::ZoomOut);
        bindings.bind("accel =", Command::ZoomIn);
        bindings.bind("accel shift =", Command::ZoomIn);
        bindings.bind("escape", Command::Cancel);

        // Browsing history moves on accel+arrows, except on Linux where
        // accel+arrows belong to text editing and alt is conventional.
        let history_modifier = match platform {
            Platform::Linux => "alt",
            _ => "accel",
        };
        bindings.bind(&format!("{} left", history_modifier), Command::GoBack);
        bindings.bind(&format!("{} right", history_modifier), Command::GoForward);

        bindings.bind_release("control", Command::CommitSelection);
        bindings.bind_release("accel", Command::CommitSelection);
        bindings
    }

    pub fn bind(&mut self, spec: &str, command: Command) {
        self.pressed.insert(read_chord(spec, self.platform), command);
    }

    pub fn bind_release(&mut self, spec: &str, command: Command) {
        self.released.insert(read_chord(spec, self.platform), command);
    }

    /// Look up the command for an event. `Some` means the event is
    /// consumed and must not reach the page.
    pub fn dispatch(&self, event: &KeyEvent) -> Option<Command> {
        let chord = write_chord(event, self.platform);
        let table = if event.released {
            &self.released
        } else {
            &self.pressed
        };
        table.get(&chord).copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::defaults(Platform::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // Modifier order and case do not matter.
    #[case("Shift Accel =", "accel shift =")]
    #[case("accel shift =", "shift accel =")]
    #[case("CTRL TAB", "control tab")]
    // Aliases fold to canonical names.
    #[case("ctrl w", "control w")]
    #[case("esc", "escape")]
    #[case("accel ArrowLeft", "accel left")]
    fn chord_specs_normalize_identically(#[case] a: &str, #[case] b: &str) {
        let platform = Platform::Linux;
        assert_eq!(read_chord(a, platform), read_chord(b, platform));
    }

    #[test]
    fn accel_resolves_per_platform() {
        assert_eq!(read_chord("accel l", Platform::MacOs), "l meta");
        assert_eq!(read_chord("accel l", Platform::Linux), "control l");
        assert_eq!(read_chord("accel l", Platform::Windows), "control l");
    }

    #[test]
    fn dispatch_matches_modified_keydown() {
        let bindings = KeyBindings::defaults(Platform::Linux);
        let event = KeyEvent::down("l").control();
        assert_eq!(bindings.dispatch(&event), Some(Command::OpenLocation));
    }

    #[test]
    fn dispatch_on_macos_uses_meta() {
        let bindings = KeyBindings::defaults(Platform::MacOs);
        assert_eq!(
            bindings.dispatch(&KeyEvent::down("t").meta()),
            Some(Command::NewFrame)
        );
        // Control+t is unbound on macOS.
        assert_eq!(bindings.dispatch(&KeyEvent::down("t").control()), None);
    }

    #[test]
    fn unbound_chords_pass_through() {
        let bindings = KeyBindings::defaults(Platform::Linux);
        assert_eq!(bindings.dispatch(&KeyEvent::down("k").control()), None);
        assert_eq!(bindings.dispatch(&KeyEvent::down("l")), None);
    }

    #[test]
    fn frame_cycling_and_commit_on_release() {
        let bindings = KeyBindings::defaults(Platform::Linux);
        assert_eq!(
            bindings.dispatch(&KeyEvent::down("tab").control()),
            Some(Command::SelectNext)
        );
        assert_eq!(
            bindings.dispatch(&KeyEvent::down("tab").control().shift()),
            Some(Command::SelectPrevious)
        );
        assert_eq!(
            bindings.dispatch(&KeyEvent::up("control")),
            Some(Command::CommitSelection)
        );
    }

    #[test]
    fn released_chords_ignore_modifier_flags() {
        let bindings = KeyBindings::defaults(Platform::Linux);
        // Engines may still report control held on its own release event.
        let event = KeyEvent {
            control: true,
            ..KeyEvent::up("control")
        };
        assert_eq!(bindings.dispatch(&event), Some(Command::CommitSelection));
    }

    #[test]
    fn history_navigation_uses_alt_on_linux() {
        let linux = KeyBindings::defaults(Platform::Linux);
        assert_eq!(
            linux.dispatch(&KeyEvent::down("ArrowLeft").alt()),
            Some(Command::GoBack)
        );
        let mac = KeyBindings::defaults(Platform::MacOs);
        assert_eq!(
            mac.dispatch(&KeyEvent::down("ArrowRight").meta()),
            Some(Command::GoForward)
        );
    }

    #[test]
    fn escape_cancels() {
        let bindings = KeyBindings::defaults(Platform::Linux);
        assert_eq!(
            bindings.dispatch(&KeyEvent::down("Escape")),
            Some(Command::Cancel)
        );
    }

    #[test]
    fn custom_bindings_can_shadow_defaults() {
        let mut bindings = KeyBindings::defaults(Platform::Linux);
        bindings.bind("control r", Command::HardReload);
        assert_eq!(
            bindings.dispatch(&KeyEvent::down("r").control()),
            Some(Command::HardReload)
        );
    }
}
