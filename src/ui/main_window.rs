use fltk::{
    app::{self, Sender},
    browser::HoldBrowser,
    button::Button,
    enums::{Align, CallbackTrigger, Color, Event, FrameType},
    frame::Frame,
    group::{Flex, FlexType},
    input::Input,
    menu::{Choice, MenuBar},
    misc::HelpView,
    prelude::*,
    window::Window,
};

use crate::app::domain::messages::Message;

pub const HEADER_HEIGHT: i32 = 34;
pub const NOTICE_HEIGHT: i32 = 30;
pub const FOOTER_HEIGHT: i32 = 40;
pub const SIDEBAR_WIDTH: i32 = 220;
pub const RETRY_HEIGHT: i32 = 30;

pub struct MainWidgets {
    pub wind: Window,
    pub flex: Flex,
    pub header: Flex,
    pub menu: MenuBar,
    pub title: Frame,
    pub lang_search: Input,
    pub lang_choice: Choice,
    pub notice_row: Flex,
    pub notice_frame: Frame,
    pub notice_ok: Button,
    pub body: Flex,
    pub sidebar: HoldBrowser,
    pub content_col: Flex,
    pub content: HelpView,
    pub retry: Button,
    pub footer: Flex,
    pub prev_btn: Button,
    pub next_btn: Button,
}

pub fn build_main_window(sender: &Sender<Message>) -> MainWidgets {
    let s = sender;

    let mut wind = Window::new(100, 100, 960, 640, "Guide");
    wind.set_xclass("GuidePad");

    let mut flex = Flex::new(0, 0, 960, 640, None);
    flex.set_type(FlexType::Column);

    // Header: menu, current guide title, language search + picker
    let mut header = Flex::default();
    header.set_type(FlexType::Row);
    let menu = MenuBar::default();
    header.fixed(&menu, 170);
    let mut title = Frame::default();
    title.set_label_size(15);
    title.set_align(Align::Left | Align::Inside);
    let mut lang_search = Input::default();
    lang_search.set_tooltip("Search languages");
    lang_search.set_trigger(CallbackTrigger::Changed);
    lang_search.set_callback({ let s = *s; move |_| s.send(Message::FilterLanguages) });
    header.fixed(&lang_search, 140);
    let mut lang_choice = Choice::default();
    lang_choice.set_tooltip("Language");
    lang_choice.set_callback({ let s = *s; move |c| s.send(Message::LanguageChosen(c.value())) });
    header.fixed(&lang_choice, 170);
    header.end();
    flex.fixed(&header, HEADER_HEIGHT);

    // Notice banner (initially hidden)
    let mut notice_row = Flex::default();
    notice_row.set_type(FlexType::Row);
    let mut notice_frame = Frame::default();
    notice_frame.set_frame(FrameType::FlatBox);
    notice_frame.set_color(Color::from_rgb(255, 250, 205));
    notice_frame.set_label_color(Color::Black);
    notice_frame.set_label_size(13);
    notice_frame.set_align(Align::Left | Align::Inside);
    let mut notice_ok = Button::default().with_label("OK");
    notice_ok.set_callback({ let s = *s; move |_| s.send(Message::DismissNotice) });
    notice_row.fixed(&notice_ok, 50);
    notice_row.end();
    notice_row.hide();
    flex.fixed(&notice_row, 0);

    // Body: sidebar + content
    let mut body = Flex::default();
    body.set_type(FlexType::Row);
    let mut sidebar = HoldBrowser::default();
    sidebar.set_text_size(14);
    sidebar.set_callback({ let s = *s; move |_| s.send(Message::SidebarClicked) });
    body.fixed(&sidebar, SIDEBAR_WIDTH);

    let mut content_col = Flex::default();
    content_col.set_type(FlexType::Column);
    let mut content = HelpView::default();
    content.set_text_size(16);
    let mut retry = Button::default().with_label("Retry");
    retry.set_callback({ let s = *s; move |_| s.send(Message::RetryFetch) });
    retry.hide();
    content_col.fixed(&retry, 0);
    content_col.end();
    body.end();

    // Footer: previous / next page
    let mut footer = Flex::default();
    footer.set_type(FlexType::Row);
    footer.set_margin(4);
    let mut prev_btn = Button::default();
    prev_btn.set_align(Align::Left | Align::Inside);
    prev_btn.set_callback({ let s = *s; move |_| s.send(Message::PreviousDocument) });
    footer.fixed(&prev_btn, 260);
    Frame::default();
    let mut next_btn = Button::default();
    next_btn.set_align(Align::Right | Align::Inside);
    next_btn.set_callback({ let s = *s; move |_| s.send(Message::NextDocument) });
    footer.fixed(&next_btn, 260);
    footer.end();
    flex.fixed(&footer, FOOTER_HEIGHT);

    flex.end();
    wind.resizable(&flex);
    wind.end();

    // Escape dismisses the notice instead of closing the window
    wind.set_callback({
        let s = *s;
        move |_| {
            if app::event() == Event::Close {
                s.send(Message::WindowClose);
            } else {
                s.send(Message::DismissNotice);
            }
        }
    });

    MainWidgets {
        wind,
        flex,
        header,
        menu,
        title,
        lang_search,
        lang_choice,
        notice_row,
        notice_frame,
        notice_ok,
        body,
        sidebar,
        content_col,
        content,
        retry,
        footer,
        prev_btn,
        next_btn,
    }
}
