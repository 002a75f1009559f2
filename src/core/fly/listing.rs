//! Decoder for `fly pipelines` output.
//!
//! The listing is a legacy text table: one pipeline per line, columns
//! separated by two or more spaces, name first. Names containing two
//! consecutive spaces cannot be recovered from this format.

/// Column separator in the listing table.
const COLUMN_SEPARATOR: &str = "  ";

/// Take the first column of every line.
///
/// Output ending in a newline yields a trailing empty name; this mirrors the
/// raw line split so callers decide how to treat it (see [`non_empty`]).
pub fn parse_pipeline_names(output: &str) -> Vec<String> {
    output
        .split('\n')
        .map(|line| {
            line.split(COLUMN_SEPARATOR)
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Drop blank entries (the trailing line, and any empty rows).
pub fn non_empty(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_trailing_empty_entry() {
        assert_eq!(
            parse_pipeline_names("a  url1\nb  url2\n"),
            vec!["a", "b", ""]
        );
    }

    #[test]
    fn splits_on_first_double_space_only() {
        assert_eq!(
            parse_pipeline_names("my pipeline  no     yes"),
            vec!["my pipeline"]
        );
    }

    #[test]
    fn line_without_separator_is_whole_name() {
        assert_eq!(parse_pipeline_names("solo"), vec!["solo"]);
    }

    #[test]
    fn empty_output_is_single_empty_name() {
        assert_eq!(parse_pipeline_names(""), vec![""]);
    }

    #[test]
    fn non_empty_filters_blank_rows() {
        let names = parse_pipeline_names("a  x\n\nb  y\n");
        assert_eq!(non_empty(names), vec!["a", "b"]);
    }
}
