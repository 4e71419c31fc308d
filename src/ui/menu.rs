use fltk::{
    app::Sender,
    enums::{Key, Shortcut},
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::domain::messages::Message;
use crate::app::domain::preferences::ThemeMode;

pub fn build_menu(menu: &mut MenuBar, sender: &Sender<Message>, theme: ThemeMode, sidebar_open: bool) {
    let s = sender;

    // Guide
    menu.add("Guide/Previous Page", Shortcut::Alt | Key::Left, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::PreviousDocument) });
    menu.add("Guide/Next Page", Shortcut::Alt | Key::Right, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::NextDocument) });
    menu.add("Guide/Reload", Shortcut::None | Key::F5, MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::RetryFetch) });
    menu.add("Guide/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::WindowClose) });

    // View
    let sb_flag = if sidebar_open { MenuFlag::Toggle | MenuFlag::Value } else { MenuFlag::Toggle };
    menu.add("View/Toggle Sidebar", Shortcut::Ctrl | 'b', sb_flag, { let s = *s; move |_| s.send(Message::ToggleSidebar) });
    for mode in ThemeMode::all() {
        let flag = if *mode == theme { MenuFlag::Radio | MenuFlag::Value } else { MenuFlag::Radio };
        let path = format!("View/Theme/{}", mode.display_name());
        menu.add(&path, Shortcut::None, flag, { let s = *s; let mode = *mode; move |_| s.send(Message::SetTheme(mode)) });
    }

    // Help
    menu.add("Help/Open Verification Portal", Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::OpenPortal) });
}
