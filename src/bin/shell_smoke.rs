// Scripted end-to-end drive of the shell against the recording engine.
// Opens frames, replays a load lifecycle, cycles and closes, then dumps
// the deck and the engine command log.

use lantern_browser::engine::{EngineEvent, RecordingEngine};
use lantern_browser::modules::keyboard::{Command, KeyBindings, KeyEvent, Platform};
use lantern_browser::shell::Shell;
use lantern_browser::state::SecurityState;

fn dump_deck(shell: &Shell<RecordingEngine>, label: &str) {
    println!("== {} ==", label);
    for frame in shell.deck().frames() {
        let marker = if shell.deck().selected_id() == Some(frame.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {} [{}] loading={} secure={} zoom={:.1} progress={:.2}",
            marker,
            frame.id,
            frame.display_title(),
            frame.is_loading,
            frame.security.is_secure(),
            frame.zoom,
            frame.progress.value(),
        );
    }
    println!("location bar: {}", shell.location_bar().value());
}

fn main() {
    let data_dir = std::env::temp_dir().join("lantern-shell-smoke");
    let mut shell = Shell::new(RecordingEngine::new(), data_dir);
    let bindings = KeyBindings::defaults(Platform::current());

    // Open a frame by typing into the location bar.
    let first = shell.open_frame("example.com");
    shell.handle_event(&first, EngineEvent::LoadStart, 0);
    shell.handle_event(&first, EngineEvent::Connected, 120);
    shell.handle_event(
        &first,
        EngineEvent::SecurityChanged {
            state: SecurityState::Secure,
            extended_validation: false,
        },
        130,
    );
    shell.handle_event(
        &first,
        EngineEvent::TitleChanged {
            title: "Example Domain".to_string(),
        },
        300,
    );
    shell.tick(600);
    dump_deck(&shell, "mid-load");

    shell.handle_event(&first, EngineEvent::LoadEnd { success: true }, 900);
    shell.tick(1_200);
    dump_deck(&shell, "loaded");

    // A second frame via the new-frame keybinding.
    let chord = match Platform::current() {
        Platform::MacOs => KeyEvent::down("t").meta(),
        _ => KeyEvent::down("t").control(),
    };
    match bindings.dispatch(&chord) {
        Some(command) => shell.handle_command(command),
        None => shell.handle_command(Command::NewFrame),
    }
    dump_deck(&shell, "after new frame");

    // Cycle back to the first frame and commit.
    shell.handle_command(Command::SelectNext);
    shell.handle_command(Command::CommitSelection);
    dump_deck(&shell, "after cycling");

    // Awesomebar round: type, read history suggestions, submit.
    shell.handle_command(Command::OpenLocation);
    shell.input_location("example");
    for suggestion in shell.suggestions().entries() {
        println!("suggestion: {:?} {} -> {}", suggestion.kind, suggestion.text, suggestion.href);
    }
    shell.submit_location();

    // Close the selected frame and restore it.
    shell.handle_command(Command::CloseFrame);
    dump_deck(&shell, "after close");
    shell.handle_command(Command::RestoreFrame);
    dump_deck(&shell, "after restore");

    println!("== engine command log ==");
    for command in &shell.engine().commands {
        println!("{:?}", command);
    }
}
