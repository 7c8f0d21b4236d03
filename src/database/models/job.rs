use crate::database::store::Document;

/// Counter field bumped once per application
pub const APPLICANT_COUNTER: &str = "job_applicants_number";

/// The fixed field set of a job record, in the order it is written.
pub const JOB_FIELDS: [&str; 10] = [
    "category",
    "name",
    "email",
    "job_title",
    "job_posting_date",
    "application_deadline",
    "salary_range",
    APPLICANT_COUNTER,
    "image",
    "job_description",
];

/// Copy the fixed job fields out of `body`, values untouched.
///
/// Keys absent from `body` stay absent; an explicit `null` is kept as `null`.
/// Anything outside the fixed set is left behind.
pub fn job_fields(body: &Document) -> Document {
    JOB_FIELDS
        .iter()
        .filter_map(|name| body.get(*name).map(|value| (name.to_string(), value.clone())))
        .collect()
}
