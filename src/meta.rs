use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// Configuration metadata harvested from the leading comment block
/// of a chrony sync csv.
#[derive(Debug, Clone, Default)]
pub struct RunMeta {
    pub subtitle_lines: Vec<String>,
    pub learning_period: Option<f64>,
}

impl RunMeta {
    /// Reads key: value pairs from the comment lines at the top of the file,
    /// in file order, stopping at the first non-comment line.
    /// Comment lines of the form #[+...] are data-sample echoes and are
    /// skipped without contributing to the subtitle.
    pub fn from_csv(fin: &PathBuf) -> Result<RunMeta, Box<dyn std::error::Error>> {
        let file = File::open(fin)?;
        let buf = BufReader::new(file);
        let mut meta = RunMeta::default();
        for l in buf.lines() {
            let l = l?;
            if l.starts_with("# ") || l.starts_with("#\t") {
                let stripped = l.trim_start_matches('#').trim();
                if let Some((key, value)) = stripped.split_once(':') {
                    let key = key.trim();
                    let value = value.trim();
                    meta.subtitle_lines.push(format!("{}: {}", key, value));
                    if key.eq_ignore_ascii_case("time_period") {
                        if let Some(first_token) = value.split_whitespace().next() {
                            if let Ok(level) = first_token.parse::<f64>() {
                                meta.learning_period = Some(level);
                            }
                        }
                    }
                }
            } else if !l.starts_with('#') {
                break;
            }
        }
        Ok(meta)
    }

    /// joins the metadata fragments into the chart subtitle
    pub fn subtitle(&self) -> String {
        self.subtitle_lines.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn subtitle_joins_fragments_in_order() {
        let file = write_csv(
            "# refclock: PHC\n\
             #\tpoll: 4\n\
             # time_period: 300 s\n\
             [+0s],1.0\n",
        );
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(
            meta.subtitle(),
            "refclock: PHC | poll: 4 | time_period: 300 s"
        );
        assert_eq!(meta.learning_period, Some(300.0));
    }

    #[test]
    fn scanning_stops_at_first_non_comment_line() {
        let file = write_csv(
            "# before: yes\n\
             [+0s],1.0\n\
             # after: no\n",
        );
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(meta.subtitle(), "before: yes");
    }

    #[test]
    fn sample_comments_do_not_contribute() {
        let file = write_csv(
            "# mode: pll\n\
             #[+12s] raw sample\n\
             # poll: 4\n\
             [+0s],1.0\n",
        );
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(meta.subtitle(), "mode: pll | poll: 4");
    }

    #[test]
    fn time_period_key_is_case_insensitive() {
        let file = write_csv("# Time_Period: 120\n[+0s],1.0\n");
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(meta.learning_period, Some(120.0));
    }

    #[test]
    fn absent_time_period_leaves_level_unset() {
        let file = write_csv("# mode: pll\n[+0s],1.0\n");
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(meta.learning_period, None);
    }

    #[test]
    fn unparsable_time_period_still_appends_fragment() {
        let file = write_csv("# time_period: fast\n[+0s],1.0\n");
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(meta.subtitle(), "time_period: fast");
        assert_eq!(meta.learning_period, None);
    }

    #[test]
    fn comment_lines_without_colon_are_skipped() {
        let file = write_csv("# just a remark\n# poll: 4\n[+0s],1.0\n");
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(meta.subtitle(), "poll: 4");
    }

    #[test]
    fn duplicate_keys_append_fragments() {
        let file = write_csv("# poll: 4\n# poll: 6\n[+0s],1.0\n");
        let meta = RunMeta::from_csv(&file.path().to_path_buf()).unwrap();
        assert_eq!(meta.subtitle(), "poll: 4 | poll: 6");
    }
}
