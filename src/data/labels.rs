use std::path::Path;
use anyhow::Context;
use regex::Regex;
use crate::utils;

/// Reads a label file, one class name per line. Blank lines are skipped.
pub fn load_labels<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let path = path.as_ref();
    let lines = utils::file_to_vec(path).with_context(|| format!("reading labels from {}", path.display()))?;
    let labels: Vec<String> = lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if labels.is_empty() {
        anyhow::bail!("label file {} is empty", path.display());
    }
    log::info!("Loaded {} labels from {}", labels.len(), path.display());
    Ok(labels)
}

/// Extracts class names from the metadata string Ultralytics writes into
/// exported models.
/// String format: `{0: 'person', 1: 'bicycle', 2: 'sports ball', ..., 27: "yellow_lady's_slipper"}`
pub fn parse_names_metadata(names: &str) -> Vec<String> {
    let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#).expect("static regex");
    re.captures_iter(names)
        .map(|caps| {
            let (_, [_, name, _]) = caps.extract();
            name.to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_metadata_names() {
        let names = parse_names_metadata("{0: 'person', 1: 'bicycle', 2: 'sports ball', 43: 'knife'}");
        assert_eq!(names, vec!["person", "bicycle", "sports ball", "knife"]);
    }

    #[test]
    fn loads_label_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "person\nbicycle\n\n  car  ").unwrap();
        assert_eq!(load_labels(f.path()).unwrap(), vec!["person", "bicycle", "car"]);
    }

    #[test]
    fn empty_label_file_is_an_error() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(load_labels(f.path()).is_err());
        assert!(load_labels("/definitely/not/here.txt").is_err());
    }
}
