//! Header alias resolution and enrollment value parsing.
//!
//! Input files name their columns inconsistently ("Course Code", "courseCode",
//! "coursecode", ...). Header names are normalized (lowercased, with spaces,
//! underscores and hyphens removed) and matched against a fixed alias list per
//! logical field.

/// Logical fields recognised in an enrollment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Term,
    CourseId,
    Enrollment,
}

impl Field {
    /// Normalized aliases in priority order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Term => &["semester", "term"],
            Field::CourseId => &["coursecode", "courseid"],
            Field::Enrollment => &["totalstudents", "enrollmentcount", "enrollment"],
        }
    }
}

/// Source column names resolved for each logical field.
///
/// Each list is ordered by alias priority, then by column position, so the first
/// entry holding a value for a row is the one that wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub term: Vec<String>,
    pub course_id: Vec<String>,
    pub enrollment: Vec<String>,
}

impl HeaderMap {
    /// Resolves the given column names against every field's aliases.
    pub fn resolve<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            term: resolve_field(columns, Field::Term),
            course_id: resolve_field(columns, Field::CourseId),
            enrollment: resolve_field(columns, Field::Enrollment),
        }
    }

    /// Returns `true` if both the grouping key and the trained quantity have a column.
    pub fn is_usable(&self) -> bool {
        !self.course_id.is_empty() && !self.enrollment.is_empty()
    }
}

/// Lowercases a header and strips whitespace, `_`, `-` and a leading byte-order mark.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn resolve_field<S: AsRef<str>>(columns: &[S], field: Field) -> Vec<String> {
    let normalized: Vec<String> = columns
        .iter()
        .map(|c| normalize_header(c.as_ref()))
        .collect();

    field
        .aliases()
        .iter()
        .flat_map(|alias| {
            normalized
                .iter()
                .zip(columns)
                .filter(move |(name, _)| name.as_str() == *alias)
                .map(|(_, original)| original.as_ref().to_string())
        })
        .collect()
}

/// Parses an enrollment cell using leading-integer semantics.
///
/// Surrounding whitespace is ignored, an optional sign is accepted, and the value
/// is the run of ASCII digits at the start; trailing text such as `".0"` or
/// `" students"` is ignored. Returns `None` when there is no leading digit, when
/// the value is negative, or when it does not fit in a `u32`.
///
/// # Examples
///
/// ```
/// use course_forecast::parsing::headers::parse_enrollment;
///
/// assert_eq!(parse_enrollment(" 42 "), Some(42));
/// assert_eq!(parse_enrollment("12.7"), Some(12));
/// assert_eq!(parse_enrollment("n/a"), None);
/// assert_eq!(parse_enrollment("-3"), None);
/// ```
pub fn parse_enrollment(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = unsigned
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if end == 0 {
        return None;
    }

    let value: u32 = unsigned[..end].parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}
