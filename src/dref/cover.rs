use crate::template::render::cover::{CoverBlock, CoverContent, CoverStyle};

pub const COVER_SHEET_NAME: &str = "DREF Import";

const COVER_AREA: &str = "A1:Z48";

const OVERVIEW_TEXT: &str = "This template is designed to assist National Societies (NS) in submitting a Disaster Relief Emergency Fund (DREF) request. The completed template will be imported into the GO platform to generate the DREF application form. Please ensure that all required fields are completed correctly, as the import can only be done once. After importing, further edits should be made directly in the GO platform.";

const CRITERIA_TEXT: &str = "Before completing the template, ensure you meet the following criteria:\n\n\
--- A Field Report has been published to inform the DREF decision.\n\
--- NS has no overdue DREF reports.\n\
--- The support cost is no more than 40% (check under the “Resource Budget Summary” tab).\n\
--- The operation supports at least 100 households (HH).\n\
--- The budget allows no more than CHF100 per person (Total Budget ÷ Number of Targeted People).\n\
--- If requesting more than CHF500,000, check the IFRC categorisation with the Regional Office Information Management (RO IM) team (yellow category ceiling).";

const TIMING_TEXT: &str = "<b>Ensure your DREF request reaches the Regional Office (RO) with enough time for a 24-hour technical review</b>, addressing comments, and getting approval within 10 days (sudden onset) or 14 days (slow onset/replenishment) from the trigger date.";

const HOW_TO_USE_TEXT: &str = "<b>Mandatory fields</b>\n\
Input required information in the “Value” column. Do not add data outside of these designated fields.\n\n\
<b>Collaboration</b>\n\
This Excel file can be uploaded to OneDrive/SharePoint/Google Drive for multiple users to work on simultaneously. Please note that only one user can edit any specific cell at a time.\n\n\
<b>Entry limits</b>\n\
Some sections, like sources of information, risks and mitigation, and indicators, have a maximum of <b>5 entries</b>. Please do not attempt to add more.";

const STRUCTURE_TEXT: &str = "The template is divided into the following sections:\n\n\
<b><i>Operation Overview</i></b> – general context of the emergency operation.\n\
<b><i>Event Details</i></b> – information on the event triggering the DREF request.\n\
<b><i>Actions and Needs</i></b> – description of key actions and needs.\n\
<b><i>Operation Plan</i></b> – outline of the planned operation and identified risks.\n\
<b><i>Timeframes and Contacts</i></b> – key timeframes and relevant contact details.";

const IMPORT_STEPS_TEXT: &str = "1. Ensure the template is fully completed and all fields are correctly filled.\n\
2. Log in to the GO platform.\n\
3. Create a “New DREF Application” and use the <b>Import</b> function to upload this Excel file.\n\
4. After importing, any additional work on the application should be done directly in the GO platform.";

/// Instructions sheet placed in front of the content sheets
pub fn dref_cover() -> CoverContent {
    CoverContent {
        sheet_name: COVER_SHEET_NAME.to_string(),
        blocks: vec![
            CoverBlock::new("C1:L3", "DISASTER RESPONSE EMERGENCY FUND", CoverStyle::Title),
            CoverBlock::new("C4:L6", "<b><i>Import template</i></b>", CoverStyle::Subtitle),
            CoverBlock::new("C11:L11", "Overview", CoverStyle::Section),
            CoverBlock::new("C12:L18", OVERVIEW_TEXT, CoverStyle::Text),
            CoverBlock::new("C21:L21", "Criteria and Eligibility", CoverStyle::Section),
            CoverBlock::new("C22:L33", CRITERIA_TEXT, CoverStyle::Text),
            CoverBlock::new("C36:L40", TIMING_TEXT, CoverStyle::Text),
            CoverBlock::new("P11:Y11", "How to use the template", CoverStyle::Section),
            CoverBlock::new("P12:Y24", HOW_TO_USE_TEXT, CoverStyle::Text),
            CoverBlock::new("P27:Y27", "Structure of the template", CoverStyle::Section),
            CoverBlock::new("P28:Y36", STRUCTURE_TEXT, CoverStyle::Text),
            CoverBlock::new("P39:Y39", "Steps for importing the template", CoverStyle::Section),
            CoverBlock::new("P40:Y46", IMPORT_STEPS_TEXT, CoverStyle::Text),
        ],
        bordered_area: Some(COVER_AREA.to_string()),
    }
}
