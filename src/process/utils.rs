use once_cell::sync::Lazy;
use regex::Regex;

static NON_PATH_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w/]").expect("non-path regex should compile"));
static DASH_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}").expect("dash-run regex should compile"));

/// Turn a display label into a URI path segment.
///
/// Lowercases, maps every character that is neither a word character nor `/`
/// to `-`, collapses runs of `-`, and drops one trailing `-`. Slashes survive.
pub fn pathify(label: &str) -> String {
    let lowered = label.to_lowercase();
    let dashed = NON_PATH_CHARS.replace_all(&lowered, "-");
    let collapsed = DASH_RUNS.replace_all(&dashed, "-");
    collapsed
        .strip_suffix('-')
        .unwrap_or(&collapsed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathify_labels() {
        assert_eq!(pathify("Owner occupied"), "owner-occupied");
        assert_eq!(pathify("Registered Social Landlord"), "registered-social-landlord");
        assert_eq!(pathify("Local authority (council)"), "local-authority-council");
        assert_eq!(pathify("Rented privately/other"), "rented-privately/other");
        assert_eq!(pathify("Measure Type"), "measure-type");
        assert_eq!(pathify("  spaced  "), "-spaced");
    }
}
