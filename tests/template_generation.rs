use std::io::Cursor;

use calamine::{Data, Reader, SheetVisible, Xlsx};
use dref_import_template::api::ReferenceData;
use dref_import_template::dref::{
    CONTENT_SHEETS, COVER_SHEET_NAME, DrefTemplate, SectorDescriptions,
};
use dref_import_template::template::flatten::RowKind;
use dref_import_template::template::render::{
    OPTIONS_SHEET_NAME, RenderedTemplate, ValidationRule, render_template,
};

const REFERENCE_DATA: &str = include_str!("fixtures/reference_data.json");

fn dref_template(slot_count: usize) -> DrefTemplate {
    let reference: ReferenceData = serde_json::from_str(REFERENCE_DATA).unwrap();
    let descriptions = SectorDescriptions::embedded().unwrap();
    DrefTemplate::build(&reference, &descriptions, slot_count).unwrap()
}

fn render(template: &DrefTemplate) -> RenderedTemplate {
    render_template(template.source(), &template.render_settings()).unwrap()
}

fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    Xlsx::new(Cursor::new(bytes)).unwrap()
}

#[test]
fn test_workbook_has_cover_content_and_hidden_options_sheets() {
    let template = dref_template(5);
    let mut rendered = render(&template);
    let workbook = open(rendered.to_buffer().unwrap());

    let mut expected = vec![COVER_SHEET_NAME.to_string()];
    expected.extend(CONTENT_SHEETS.iter().map(|sheet| sheet.to_string()));
    expected.push(OPTIONS_SHEET_NAME.to_string());
    assert_eq!(workbook.sheet_names(), expected);

    let options = workbook
        .sheets_metadata()
        .iter()
        .find(|sheet| sheet.name == OPTIONS_SHEET_NAME)
        .unwrap();
    assert_eq!(options.visible, SheetVisible::Hidden);
}

#[test]
fn test_generation_produces_no_warnings_for_complete_reference_data() {
    let template = dref_template(5);
    let rendered = render(&template);
    assert!(rendered.warnings.is_empty(), "{:?}", rendered.warnings);
}

#[test]
fn test_slot_lists_have_fixed_cardinality() {
    let template = dref_template(5);
    let rendered = render(&template);
    let options = &rendered.layout.options;

    for key in ["source_information", "planned_interventions_indicators", "risk_security"] {
        assert_eq!(options.column_for(key).unwrap().len, 5, "{}", key);
    }

    let operation = rendered.layout.sheet("Operation").unwrap();
    let risk_rows: Vec<&str> = operation
        .input_rows()
        .map(|row| row.name.as_str())
        .filter(|name| name.starts_with("risk_security__"))
        .collect();
    assert_eq!(risk_rows.len(), 10);
    assert_eq!(risk_rows[0], "risk_security__risk__0__risk");
    assert_eq!(risk_rows[9], "risk_security__risk__4__mitigation");
}

#[test]
fn test_slot_count_bounds_the_slot_lists() {
    let template = dref_template(2);
    let rendered = render(&template);
    assert_eq!(rendered.layout.options.column_for("risk_security").unwrap().len, 2);

    let event = rendered.layout.sheet("Event Detail").unwrap();
    let sources = event
        .input_rows()
        .filter(|row| row.name.starts_with("source_information__"))
        .count();
    assert_eq!(sources, 4);
}

#[test]
fn test_list_validation_points_at_options_column() {
    let template = dref_template(5);
    let rendered = render(&template);
    let overview = rendered.layout.sheet("Operation Overview").unwrap();

    let country = overview.row_named("country").unwrap();
    let column = rendered.layout.options.column_for("country").unwrap();
    assert_eq!(column.len, 2);
    assert_eq!(
        country.validation,
        Some(ValidationRule::List { formula: column.range_formula().unwrap() })
    );
    assert!(column.range_formula().unwrap().ends_with("$3"));

    let title = overview.row_named("title").unwrap();
    assert_eq!(title.validation, None);
    assert_eq!(title.kind, RowKind::Input);
}

#[test]
fn test_options_sheet_holds_labels_and_named_cells() {
    let template = dref_template(5);
    let mut rendered = render(&template);
    let mut workbook = open(rendered.to_buffer().unwrap());

    let column = rendered.layout.options.column_for("national_society").unwrap().column;
    let range = workbook.worksheet_range(OPTIONS_SHEET_NAME).unwrap();
    assert_eq!(
        range.get_value((0, u32::from(column))),
        Some(&Data::String("national_society".into()))
    );
    assert_eq!(
        range.get_value((1, u32::from(column))),
        Some(&Data::String("Nepal Red Cross Society".into()))
    );

    let names: Vec<String> = workbook
        .defined_names()
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    assert!(names.contains(&"national_society__123".to_string()));
    assert!(names.contains(&"title".to_string()));
    assert!(names.contains(&"planned_interventions__health__indicators__indicator__0__target".to_string()));
}

#[test]
fn test_value_cells_start_blank_below_header() {
    let template = dref_template(5);
    let mut rendered = render(&template);
    let mut workbook = open(rendered.to_buffer().unwrap());

    let range = workbook.worksheet_range("Operation Overview").unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Field".into())));
    assert_eq!(range.get_value((0, 1)), Some(&Data::String("Value".into())));
    assert_eq!(range.get_value((0, 2)), Some(&Data::String("Description".into())));

    let title = rendered.layout.sheet("Operation Overview").unwrap().row_named("title").unwrap();
    assert!(matches!(
        range.get_value((title.row, 1)),
        None | Some(Data::Empty)
    ));
}

#[test]
fn test_layout_is_identical_across_runs() {
    let template = dref_template(5);
    let first = render(&template);
    let second = render(&template);
    assert_eq!(first.layout, second.layout);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn test_empty_reference_data_degrades_to_warnings() {
    let template = DrefTemplate::build(
        &ReferenceData::default(),
        &SectorDescriptions::default(),
        5,
    )
    .unwrap();
    let mut rendered = render(&template);

    let overview = rendered.layout.sheet("Operation Overview").unwrap();
    assert_eq!(overview.row_named("disaster_type").unwrap().validation, None);
    assert!(!rendered.warnings.is_empty());
    assert!(!rendered.to_buffer().unwrap().is_empty());
}
