use pulldown_cmark::{Options, Parser, html};

use crate::app::domain::preferences::EffectiveTheme;

/// Page colors for the HelpView body.
struct PagePalette {
    background: &'static str,
    text: &'static str,
    link: &'static str,
}

fn palette(theme: EffectiveTheme) -> PagePalette {
    match theme {
        EffectiveTheme::Dark => PagePalette {
            background: "#000000",
            text: "#ffffff",
            link: "#a78bfa",
        },
        EffectiveTheme::Light => PagePalette {
            background: "#ffffff",
            text: "#000000",
            link: "#5b21b6",
        },
    }
}

/// Render markdown text to raw HTML.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

/// Wrap rendered HTML in a themed page HelpView can display.
pub fn page_html(body: &str, theme: EffectiveTheme) -> String {
    let colors = palette(theme);
    format!(
        "<html><body bgcolor=\"{}\" text=\"{}\" link=\"{}\"><font face=\"Helvetica\" size=\"4\">{}</font></body></html>",
        colors.background, colors.text, colors.link, body
    )
}

/// A centered one-line status page ("Loading guide...", errors).
pub fn status_page(message: &str, theme: EffectiveTheme) -> String {
    let body = format!("<br><br><center><p>{}</p></center>", escape_html(message));
    page_html(&body, theme)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    match pulldown_cmark_escape::escape_html(&mut escaped, text) {
        Ok(()) => escaped,
        Err(_) => unreachable!("writing to a String cannot fail"),
    }
}
