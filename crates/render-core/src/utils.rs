/// Convert layout Y coordinate to PDF Y coordinate (flip origin)
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// PDF base font name for the standard Helvetica family.
pub fn helvetica_font_name(bold: bool) -> &'static str {
    if bold { "Helvetica-Bold" } else { "Helvetica" }
}

/// Encodes text for a simple font using `WinAnsiEncoding`. Characters the
/// encoding cannot represent become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\t' | '\n' | '\r' => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_maps_latin1_and_punctuation() {
        assert_eq!(encode_win_ansi("Zoë – R 5"), vec![b'Z', b'o', 0xEB, b' ', 0x96, b' ', b'R', b' ', b'5']);
        assert_eq!(encode_win_ansi("日"), b"?".to_vec());
    }

    #[test]
    fn flips_y() {
        assert_eq!(flip_y(10.0, 842.0), 832.0);
    }
}
