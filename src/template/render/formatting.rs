//! Formatting helpers for the template workbook

use rust_xlsxwriter::*;

use crate::template::rich_text::Emphasis;

pub const COLOR_PRIMARY_RED: u32 = 0xF5333F;
pub const COLOR_PRIMARY_BLUE: u32 = 0x011E41;

const COLOR_ALTERNATE_ROW: u32 = 0xF2F2F2;
const COLOR_CELL_BORDER: u32 = 0xBFBFBF;
const COLOR_DESCRIPTION_TEXT: u32 = 0x3F3F3F;

pub const FONT_FAMILY_HEADER: &str = "Montserrat";
pub const FONT_FAMILY_BODY: &str = "Poppins";

/// Banner style of a heading row, picked by outline level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    H1,
    H2,
    H3,
}

impl HeadingStyle {
    pub fn for_level(outline_level: u8) -> Self {
        match outline_level {
            0 => HeadingStyle::H1,
            1 => HeadingStyle::H2,
            _ => HeadingStyle::H3,
        }
    }
}

pub fn create_header_format() -> Format {
    Format::new()
        .set_font_name(FONT_FAMILY_HEADER)
        .set_font_size(14)
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(COLOR_PRIMARY_RED))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn with_cell_border(format: Format) -> Format {
    format
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(COLOR_CELL_BORDER))
}

pub fn create_heading_format(style: HeadingStyle, outline_level: u8) -> Format {
    let format = Format::new()
        .set_font_name(FONT_FAMILY_HEADER)
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_indent(outline_level.saturating_mul(2));

    let format = match style {
        HeadingStyle::H1 => format
            .set_font_size(12)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(COLOR_PRIMARY_BLUE)),
        HeadingStyle::H2 => format.set_font_color(Color::RGB(COLOR_PRIMARY_RED)),
        HeadingStyle::H3 => format.set_font_color(Color::RGB(COLOR_PRIMARY_BLUE)),
    };
    with_cell_border(format)
}

fn create_body_format(shaded: bool) -> Format {
    let format = Format::new()
        .set_font_name(FONT_FAMILY_BODY)
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    let format = if shaded {
        format.set_background_color(Color::RGB(COLOR_ALTERNATE_ROW))
    } else {
        format
    };
    with_cell_border(format)
}

pub fn create_label_format(outline_level: u8, shaded: bool) -> Format {
    create_body_format(shaded).set_indent(outline_level.saturating_mul(2))
}

pub fn create_value_format(shaded: bool) -> Format {
    create_body_format(shaded)
}

pub fn create_description_format(shaded: bool) -> Format {
    create_body_format(shaded)
        .set_font_size(10)
        .set_font_color(Color::RGB(COLOR_DESCRIPTION_TEXT))
}

pub fn create_wrap_format() -> Format {
    Format::new().set_text_wrap()
}

/// Layer run emphasis over the font of the cell it sits in
pub fn create_run_format(base: &Format, emphasis: Emphasis) -> Format {
    let mut format = base.clone();
    if emphasis.bold {
        format = format.set_bold();
    }
    if emphasis.italic {
        format = format.set_italic();
    }
    if emphasis.underline {
        format = format.set_underline(FormatUnderline::Single);
    }
    format
}

// Cover sheet

pub fn create_cover_title_format() -> Format {
    Format::new()
        .set_font_name(FONT_FAMILY_HEADER)
        .set_font_family(2)
        .set_bold()
        .set_font_size(20)
        .set_font_color(Color::RGB(COLOR_PRIMARY_RED))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

pub fn create_cover_subtitle_format() -> Format {
    Format::new()
        .set_font_name(FONT_FAMILY_HEADER)
        .set_font_family(2)
        .set_bold()
        .set_font_size(16)
        .set_font_color(Color::RGB(COLOR_PRIMARY_BLUE))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

pub fn create_cover_section_format() -> Format {
    Format::new()
        .set_font_name(FONT_FAMILY_HEADER)
        .set_font_family(2)
        .set_bold()
        .set_font_size(11)
        .set_font_color(Color::RGB(COLOR_PRIMARY_RED))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

pub fn create_cover_text_format() -> Format {
    Format::new()
        .set_font_name(FONT_FAMILY_BODY)
        .set_font_family(2)
        .set_font_size(11)
        .set_text_wrap()
        .set_align(FormatAlign::VerticalCenter)
}

/// Thin white grid that hides the default gridlines on the cover
pub fn create_cover_border_format() -> Format {
    Format::new()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_style_by_level() {
        assert_eq!(HeadingStyle::for_level(0), HeadingStyle::H1);
        assert_eq!(HeadingStyle::for_level(1), HeadingStyle::H2);
        assert_eq!(HeadingStyle::for_level(2), HeadingStyle::H3);
        assert_eq!(HeadingStyle::for_level(6), HeadingStyle::H3);
    }

    #[test]
    fn test_run_format_keeps_base_font() {
        let base = create_description_format(false);
        let plain = create_run_format(&base, Emphasis::NONE);
        assert_eq!(plain, base);
        assert_ne!(create_run_format(&base, Emphasis::bold()), base);
    }
}
