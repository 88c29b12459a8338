use tui_textarea::Input;
use tui_textarea::Key;

use super::map_input;
use crate::domain::models::Event;

fn ctrl(c: char) -> Input {
    return Input {
        key: Key::Char(c),
        ctrl: true,
        alt: false,
    };
}

fn key(key: Key) -> Input {
    return Input {
        key,
        ctrl: false,
        alt: false,
    };
}

#[test]
fn it_maps_chat_hotkeys() {
    assert!(matches!(map_input(ctrl('c')), Event::KeyboardCTRLC()));
    assert!(matches!(map_input(ctrl('r')), Event::KeyboardCTRLR()));
    assert!(matches!(map_input(ctrl('t')), Event::KeyboardCTRLT()));
    assert!(matches!(map_input(key(Key::Enter)), Event::KeyboardEnter()));
}

#[test]
fn it_maps_scrolling_keys() {
    assert!(matches!(map_input(key(Key::Up)), Event::UIScrollUp()));
    assert!(matches!(map_input(key(Key::MouseScrollDown)), Event::UIScrollDown()));
    assert!(matches!(map_input(ctrl('u')), Event::UIScrollPageUp()));
    assert!(matches!(map_input(key(Key::PageDown)), Event::UIScrollPageDown()));
}

#[test]
fn it_passes_text_through_to_the_prompt() {
    match map_input(key(Key::Char('t'))) {
        Event::KeyboardCharInput(input) => assert_eq!(input.key, Key::Char('t')),
        _ => panic!("expected text input"),
    }
}
