//! Cover sheet: logo, banners and instruction blocks in merged ranges.

use anyhow::{Context, Result, bail};
use log::debug;
use rust_xlsxwriter::*;

use super::content::write_rich_text;
use super::formatting::*;
use crate::template::rich_text::RichText;

/// Logo footprint, roughly A1:B6 at default column and row sizes
const LOGO_WIDTH_PX: u32 = 128;
const LOGO_HEIGHT_PX: u32 = 120;

/// Inclusive zero-based cell rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    /// Parse `A1` or `C1:L3`
    pub fn parse(range: &str) -> Result<Self> {
        let (start, end) = range.split_once(':').unwrap_or((range, range));
        let (first_row, first_col) = parse_cell(start)?;
        let (last_row, last_col) = parse_cell(end)?;

        if last_row < first_row || last_col < first_col {
            bail!("Range '{}' is reversed", range);
        }
        Ok(Self {
            first_row,
            first_col,
            last_row,
            last_col,
        })
    }

    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }

    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }
}

fn parse_cell(cell: &str) -> Result<(u32, u16)> {
    let cell = cell.trim();
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .with_context(|| format!("Cell '{}' has no row number", cell))?;
    let (letters, digits) = cell.split_at(split);

    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("Cell '{}' has no column letters", cell);
    }

    let mut col: u32 = 0;
    for letter in letters.chars() {
        col = col
            .checked_mul(26)
            .and_then(|col| col.checked_add(letter.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
            .with_context(|| format!("Column of '{}' is out of range", cell))?;
    }
    let col = u16::try_from(col - 1).with_context(|| format!("Column of '{}' is out of range", cell))?;

    let row: u32 = digits
        .parse()
        .with_context(|| format!("Row of '{}' is not a number", cell))?;
    if row == 0 {
        bail!("Row numbers start at 1 in '{}'", cell);
    }

    Ok((row - 1, col))
}

/// Tracks merged ranges so they never overlap and are skipped when bordering
#[derive(Debug, Default)]
pub struct MergeRegistry {
    ranges: Vec<CellRange>,
}

impl MergeRegistry {
    pub fn register(&mut self, range: CellRange) -> Result<()> {
        if let Some(existing) = self.ranges.iter().find(|existing| existing.overlaps(&range)) {
            bail!("Merged range {:?} overlaps {:?}", range, existing);
        }
        self.ranges.push(range);
        Ok(())
    }

    pub fn is_merged(&self, row: u32, col: u16) -> bool {
        self.ranges.iter().any(|range| range.contains(row, col))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStyle {
    Title,
    Subtitle,
    Section,
    Text,
}

impl CoverStyle {
    fn format(self) -> Format {
        match self {
            CoverStyle::Title => create_cover_title_format(),
            CoverStyle::Subtitle => create_cover_subtitle_format(),
            CoverStyle::Section => create_cover_section_format(),
            CoverStyle::Text => create_cover_text_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverBlock {
    pub range: String,
    pub text: RichText,
    pub style: CoverStyle,
}

impl CoverBlock {
    /// Block whose text uses the `<b>`/`<i>`/`<u>` markup
    pub fn new(range: &str, markup: &str, style: CoverStyle) -> Self {
        Self {
            range: range.to_string(),
            text: RichText::parse_markup(markup),
            style,
        }
    }
}

/// Static copy of a cover sheet
#[derive(Debug, Clone, PartialEq)]
pub struct CoverContent {
    pub sheet_name: String,
    pub blocks: Vec<CoverBlock>,
    /// Area that gets a white grid, e.g. `A1:Z48`
    pub bordered_area: Option<String>,
}

pub fn create_cover_sheet(
    workbook: &mut Workbook,
    content: &CoverContent,
    logo: Option<&[u8]>,
) -> Result<MergeRegistry> {
    let mut merges = MergeRegistry::default();

    let sheet = workbook.add_worksheet();
    sheet.set_name(&content.sheet_name)?;
    sheet.set_tab_color(Color::RGB(COLOR_PRIMARY_RED));

    if let Some(bytes) = logo {
        let image = Image::new_from_buffer(bytes)
            .context("Failed to read logo image")?
            .set_scale_to_size(LOGO_WIDTH_PX, LOGO_HEIGHT_PX, true);
        sheet.insert_image(0, 0, &image)?;
    }

    for block in &content.blocks {
        let range = CellRange::parse(&block.range)
            .with_context(|| format!("Invalid cover range '{}'", block.range))?;
        let format = block.style.format();

        if range.is_single_cell() {
            write_rich_text(sheet, range.first_row, range.first_col, &block.text, &format)?;
            continue;
        }

        merges.register(range)?;
        sheet.merge_range(
            range.first_row,
            range.first_col,
            range.last_row,
            range.last_col,
            "",
            &format,
        )?;
        write_rich_text(sheet, range.first_row, range.first_col, &block.text, &format)?;
    }

    if let Some(area) = &content.bordered_area {
        let area = CellRange::parse(area).with_context(|| format!("Invalid cover area '{}'", area))?;
        let border = create_cover_border_format();
        let written: Vec<CellRange> = content
            .blocks
            .iter()
            .filter_map(|block| CellRange::parse(&block.range).ok())
            .collect();

        for row in area.first_row..=area.last_row {
            for col in area.first_col..=area.last_col {
                let occupied = merges.is_merged(row, col)
                    || written.iter().any(|range| range.contains(row, col));
                if !occupied {
                    sheet.write_blank(row, col, &border)?;
                }
            }
        }
    }

    debug!(
        "Cover sheet '{}' written with {} merged blocks",
        content.sheet_name,
        merges.len()
    );
    Ok(merges)
}
