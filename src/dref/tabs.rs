use crate::template::tabs::TabAssignment;

pub const SHEET_OPERATION_OVERVIEW: &str = "Operation Overview";
pub const SHEET_EVENT_DETAIL: &str = "Event Detail";
pub const SHEET_ACTIONS_NEEDS: &str = "Actions-Needs";
pub const SHEET_OPERATION: &str = "Operation";
pub const SHEET_TIMEFRAMES_AND_CONTACTS: &str = "Timeframes and Contacts";

/// Content sheets in workbook order
pub const CONTENT_SHEETS: [&str; 5] = [
    SHEET_OPERATION_OVERVIEW,
    SHEET_EVENT_DETAIL,
    SHEET_ACTIONS_NEEDS,
    SHEET_OPERATION,
    SHEET_TIMEFRAMES_AND_CONTACTS,
];

// Form fields per tab of the DREF application. Some of them (files, field
// report, districts) are not part of the import schema and route nothing.

const OVERVIEW_FIELDS: &[&str] = &[
    "national_society",
    "field_report",
    "type_of_dref",
    "disaster_type",
    "is_man_made_event",
    "type_of_onset",
    "disaster_category",
    "country",
    "district",
    "title_prefix",
    "title",
    "event_map_file",
    "cover_image_file",
];

const EVENT_DETAIL_FIELDS: &[&str] = &[
    "did_it_affect_same_population",
    "did_it_affect_same_area",
    "did_ns_respond",
    "did_ns_request_fund",
    "ns_request_text",
    "dref_recurrent_text",
    "lessons_learned",
    "child_safeguarding_risk_level",
    "complete_child_safeguarding_risk",
    "event_date",
    "event_text",
    "num_affected",
    "estimated_number_of_affected_male",
    "estimated_number_of_affected_female",
    "estimated_number_of_affected_minors",
    "estimated_number_of_affected_girls_under_18",
    "estimated_number_of_affected_boys_under_18",
    "people_in_need",
    "event_description",
    "event_scope",
    "source_information",
    "images_file",
    "hazard_vulnerabilities_and_risks",
    "scenario_analysis_supporting_document",
];

const ACTIONS_NEEDS_FIELDS: &[&str] = &[
    "did_national_society",
    "ns_respond_date",
    "national_society_actions",
    "ifrc",
    "partner_national_society",
    "icrc",
    "government_requested_assistance",
    "national_authorities",
    "un_or_other_actor",
    "is_there_major_coordination_mechanism",
    "major_coordination_mechanism",
    "assessment_report",
    "needs_identified",
    "identified_gaps",
];

const OPERATION_FIELDS: &[&str] = &[
    "operation_objective",
    "response_strategy",
    "people_assisted",
    "selection_criteria",
    "targeting_strategy_support_file",
    "women",
    "men",
    "girls",
    "boys",
    "total_targeted_population",
    "disability_people_per",
    "people_per_urban",
    "people_per_local",
    "displaced_people",
    "people_targeted_with_early_actions",
    "risk_security",
    "risk_security_concern",
    "has_child_safeguarding_risk_analysis_assessment",
    "has_anti_fraud_corruption_policy",
    "has_sexual_abuse_policy",
    "has_child_protection_policy",
    "has_whistleblower_protection_policy",
    "has_anti_sexual_harassment_policy",
    "budget_file",
    "amount_requested",
    "planned_interventions",
    "human_resource",
    "is_volunteer_team_diverse",
    "is_surge_personnel_deployed",
    "surge_personnel_deployed",
    "logistic_capacity_of_ns",
    "pmer",
    "communication",
    "addressed_humanitarian_impacts",
    "contingency_plans_supporting_document",
    "proposed_action",
];

const TIMEFRAMES_AND_CONTACTS_FIELDS: &[&str] = &[
    "ns_request_date",
    "submission_to_geneva",
    "date_of_approval",
    "operation_timeframe",
    "end_date",
    "publishing_date",
    "appeal_code",
    "glide_code",
    "ifrc_appeal_manager_name",
    "ifrc_appeal_manager_email",
    "ifrc_appeal_manager_phone_number",
    "ifrc_appeal_manager_title",
    "ifrc_project_manager_name",
    "ifrc_project_manager_email",
    "ifrc_project_manager_phone_number",
    "ifrc_project_manager_title",
    "national_society_contact_name",
    "national_society_contact_email",
    "national_society_contact_phone_number",
    "national_society_contact_title",
    "ifrc_emergency_name",
    "ifrc_emergency_email",
    "ifrc_emergency_phone_number",
    "ifrc_emergency_title",
    "media_contact_name",
    "media_contact_email",
    "media_contact_phone_number",
    "media_contact_title",
    "national_society_integrity_contact_name",
    "national_society_integrity_contact_title",
    "national_society_integrity_contact_email",
    "national_society_integrity_contact_phone_number",
    "national_society_hotline_phone_number",
];

/// Which sheet each top-level DREF field lands on
pub fn dref_tab_assignment() -> TabAssignment {
    TabAssignment::new()
        .assign(SHEET_OPERATION_OVERVIEW, OVERVIEW_FIELDS.iter().copied())
        .assign(SHEET_EVENT_DETAIL, EVENT_DETAIL_FIELDS.iter().copied())
        .assign(SHEET_ACTIONS_NEEDS, ACTIONS_NEEDS_FIELDS.iter().copied())
        .assign(SHEET_OPERATION, OPERATION_FIELDS.iter().copied())
        .assign(
            SHEET_TIMEFRAMES_AND_CONTACTS,
            TIMEFRAMES_AND_CONTACTS_FIELDS.iter().copied(),
        )
}
