//! Message display rendered on the host terminal
use console::{style, Term};
use tank_arena::MessageDisplay;

const COLOR_OPEN: &str = "<color=";
const COLOR_CLOSE: &str = "</color>";

/// Replace `<color=#rrggbb>name</color>` spans with bold terminal text
pub fn render_rich_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(COLOR_OPEN) {
        out.push_str(&rest[..start]);
        let tagged = &rest[start + COLOR_OPEN.len()..];
        let Some(close_bracket) = tagged.find('>') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let inner = &tagged[close_bracket + 1..];
        match inner.find(COLOR_CLOSE) {
            Some(end) => {
                out.push_str(&style(&inner[..end]).bold().to_string());
                rest = &inner[end + COLOR_CLOSE.len()..];
            }
            None => {
                out.push_str(inner);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Shows the game text on the console
#[derive(Debug)]
pub struct TermDisplay {
    term: Term,
}

impl TermDisplay {
    pub fn new(term: Term) -> Self {
        Self { term }
    }

    fn render(&self, text: &str) -> std::io::Result<()> {
        self.term.clear_screen()?;
        self.term.move_cursor_to(0, 0)?;
        self.term.write_line("=== z_tanks host ===")?;
        self.term.write_line("")?;
        for line in render_rich_text(text).lines() {
            self.term.write_line(line)?;
        }
        self.term.write_line("")?;
        self.term.write_line("q - Quit")?;
        self.term.flush()
    }
}

impl MessageDisplay for TermDisplay {
    fn set_text(&mut self, text: &str) {
        if let Err(e) = self.render(text) {
            tracing::warn!("Failed to render display text: {}", e);
        }
    }
}

/// Sends each text to two displays
#[derive(Debug)]
pub struct Mirrored<A, B>(pub A, pub B);

impl<A: MessageDisplay, B: MessageDisplay> MessageDisplay for Mirrored<A, B> {
    fn set_text(&mut self, text: &str) {
        self.0.set_text(text);
        self.1.set_text(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(render_rich_text("ROUND 2"), "ROUND 2");
    }

    #[test]
    fn test_color_tags_are_removed() {
        console::set_colors_enabled(false);
        let text = "<color=#E52E28>alice</color> WINS THE ROUND!";
        assert_eq!(render_rich_text(text), "alice WINS THE ROUND!");

        let text = "<color=#E52E28>red</color>: 1 WINS\n<color=#2A64B4>blue</color>: 0 WINS";
        assert_eq!(render_rich_text(text), "red: 1 WINS\nblue: 0 WINS");
    }

    #[test]
    fn test_unterminated_tag_keeps_content() {
        assert_eq!(render_rich_text("<color=#FFFFFF>bob"), "bob");
        assert_eq!(render_rich_text("a <color=#FFFFFF"), "a <color=#FFFFFF");
    }
}
