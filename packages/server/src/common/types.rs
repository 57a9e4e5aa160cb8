/// Content types recognized by the admin pending scan, in the order
/// they are reported.
///
/// Submissions carry a caller-supplied type string that is NOT checked
/// against this list at write time; the list is only consulted when an
/// admin asks for the outstanding queue.
pub const CONTENT_TYPES: [&str; 5] = [
    "cheatsheet",
    "template",
    "testcase",
    "testscript",
    "boilerplate",
];

/// Key of the per-type pending index (`pending_<type>`)
pub fn pending_key(content_type: &str) -> String {
    format!("pending_{}", content_type)
}

/// Key of the per-type approved index (`approved_<type>`)
pub fn approved_key(content_type: &str) -> String {
    format!("approved_{}", content_type)
}
