//! Advance widths for the standard Helvetica faces, in 1/1000 em, covering
//! printable ASCII. Other characters measure as the default width.

const DEFAULT_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn char_width(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match c {
        ' '..='~' => table[c as usize - 32],
        _ => DEFAULT_WIDTH,
    }
}

/// Width of `text` set in Helvetica at `font_size` points.
pub fn text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, bold) as u32).sum();
    units as f32 * font_size / 1000.0
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width`.
pub fn truncate_to_width(text: &str, font_size: f32, bold: bool, max_width: f32) -> String {
    if text_width(text, font_size, bold) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "...";
        if text_width(&candidate, font_size, bold) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Greedy word wrap. Words wider than `max_width` get a line of their own.
pub fn wrap_text(text: &str, font_size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if current.is_empty() || text_width(&candidate, font_size, bold) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_known_widths() {
        // "Hi" = 722 + 222 units
        assert!((text_width("Hi", 10.0, false) - 9.44).abs() < 1e-4);
        assert!(text_width("Total", 12.0, true) > text_width("Total", 12.0, false));
    }

    #[test]
    fn truncates_long_text() {
        let out = truncate_to_width("Leather Chelsea Boot - Cognac", 10.0, false, 60.0);
        assert!(out.ends_with("..."));
        assert!(text_width(&out, 10.0, false) <= 60.0);
        assert_eq!(truncate_to_width("Boot", 10.0, false, 60.0), "Boot");
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("Thank you for shopping with us today", 10.0, false, 80.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "Thank you for shopping with us today");
        for line in &lines {
            assert!(text_width(line, 10.0, false) <= 80.0);
        }
        assert!(wrap_text("   ", 10.0, false, 80.0).is_empty());
    }
}
