use fltk::{enums::Color, prelude::*};

use super::main_window::MainWidgets;

pub fn apply_theme(w: &mut MainWidgets, is_dark: bool) {
    let (bg, panel, fg, selection, input_bg) = if is_dark {
        (
            Color::from_rgb(0, 0, 0),
            Color::from_rgb(24, 24, 27),
            Color::from_rgb(228, 228, 231),
            Color::from_rgb(76, 29, 149),
            Color::from_rgb(39, 39, 42),
        )
    } else {
        (
            Color::from_rgb(255, 255, 255),
            Color::from_rgb(244, 244, 245),
            Color::Black,
            Color::from_rgb(221, 214, 254),
            Color::White,
        )
    };

    w.wind.set_color(bg);
    w.wind.set_label_color(fg);
    w.flex.set_color(bg);
    w.body.set_color(bg);
    w.content_col.set_color(bg);

    w.header.set_color(panel);
    w.menu.set_color(panel);
    w.menu.set_text_color(fg);
    w.menu.set_selection_color(selection); // Hover color
    w.title.set_label_color(fg);
    w.lang_search.set_color(input_bg);
    w.lang_search.set_text_color(fg);
    w.lang_search.set_cursor_color(fg);
    w.lang_choice.set_color(input_bg);
    w.lang_choice.set_text_color(fg);
    w.lang_choice.set_selection_color(selection);

    w.sidebar.set_color(panel);
    w.sidebar.set_text_color(fg);
    w.sidebar.set_selection_color(selection);

    w.content.set_color(bg);

    w.footer.set_color(panel);
    for btn in [&mut w.prev_btn, &mut w.next_btn, &mut w.retry, &mut w.notice_ok] {
        btn.set_color(input_bg);
        btn.set_label_color(fg);
    }

    if is_dark {
        w.notice_frame.set_color(Color::from_rgb(139, 128, 0)); // Darker yellow/olive
        w.notice_frame.set_label_color(Color::White);
    } else {
        w.notice_frame.set_color(Color::from_rgb(255, 250, 205)); // Lemon chiffon
        w.notice_frame.set_label_color(Color::Black);
    }

    w.wind.redraw();
}

/// Set Windows title bar theme (Windows 10 build 1809+)
/// Must be called AFTER window.show() to have a valid HWND
#[cfg(target_os = "windows")]
pub fn set_windows_titlebar_theme(window: &fltk::window::Window, is_dark: bool) {
    use std::mem::size_of;
    use std::ptr::from_ref;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::Graphics::Dwm::{DWMWINDOWATTRIBUTE, DwmSetWindowAttribute};

    unsafe {
        let hwnd = HWND(window.raw_handle() as *mut std::ffi::c_void);

        let on: i32 = if is_dark { 1 } else { 0 };

        // Attribute 20 on Windows 11 / Windows 10 2004+, 19 on 1809-1903
        for attribute in [20, 19] {
            let _ = DwmSetWindowAttribute(
                hwnd,
                DWMWINDOWATTRIBUTE(attribute),
                from_ref(&on).cast(),
                size_of::<i32>() as u32,
            );
        }
    }
}
