//! Decimal digit classification over all Unicode scripts.
//!
//! Oracle answers and foreign codes sometimes arrive with full-width (`１２`)
//! or other non-ASCII decimal digits. Every Unicode `Nd` character belongs to
//! a run of ten consecutive code points starting at a zero.

/// First code point (the zero) of every `Nd` run, ascending.
const ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0,
    0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50,
    0x11DA0, 0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6,
    0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// Value of `c` if it is a decimal digit in any script.
pub fn decimal_value(c: char) -> Option<u32> {
    let cp = u32::from(c);
    let run = ZEROS.partition_point(|&zero| zero <= cp).checked_sub(1)?;
    let offset = cp - ZEROS[run];
    (offset < 10).then_some(offset)
}

pub fn is_decimal_digit(c: char) -> bool {
    decimal_value(c).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_digits() {
        for (i, c) in ('0'..='9').enumerate() {
            assert_eq!(decimal_value(c), Some(i as u32));
        }
        assert_eq!(decimal_value('/'), None);
        assert_eq!(decimal_value(':'), None);
        assert_eq!(decimal_value('a'), None);
    }

    #[test]
    fn full_width_and_other_scripts() {
        assert_eq!(decimal_value('０'), Some(0));
        assert_eq!(decimal_value('９'), Some(9));
        assert_eq!(decimal_value('٣'), Some(3));
        assert_eq!(decimal_value('७'), Some(7));
        assert_eq!(decimal_value('𝟘'), Some(0));
    }

    #[test]
    fn numerals_that_are_not_decimal_digits() {
        assert!(!is_decimal_digit('一'));
        assert!(!is_decimal_digit('Ⅳ'));
        assert!(!is_decimal_digit('½'));
        assert!(!is_decimal_digit('²'));
        assert!(!is_decimal_digit('\u{FF1A}'));
        assert!(!is_decimal_digit('\u{0000}'));
    }

    #[test]
    fn zeros_are_sorted_and_runs_do_not_overlap() {
        assert!(ZEROS.windows(2).all(|w| w[1] - w[0] >= 10));
    }
}
